pub mod types;
pub mod normalize;
pub mod extract;
pub mod classify;
pub mod keywords;
pub mod summary;
pub mod orchestrator;

pub use types::*;
pub use normalize::*;
pub use extract::*;
pub use classify::*;
pub use keywords::*;
pub use summary::*;
pub use orchestrator::*;
