pub mod errors;
pub mod id;

pub use errors::{ConfigError, PagewiseError};
pub use id::{new_thread_id, ThreadId};

pub type Result<T> = std::result::Result<T, PagewiseError>;
