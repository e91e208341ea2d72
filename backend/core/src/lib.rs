pub mod error;
pub mod operation;
pub mod snapshot;
pub mod types;

pub use error::{ForumError, Result};
pub use operation::{OperationRequest, OperationResult};
pub use snapshot::{CacheStatus, SessionSnapshot};
pub use types::{Post, Topic, TopicDetail, TopicPost};
