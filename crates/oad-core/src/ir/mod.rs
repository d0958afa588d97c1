pub mod compile;
pub mod summary;
pub mod types;

pub use compile::compile;
pub use types::*;
