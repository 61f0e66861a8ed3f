pub mod blocking_queue;
pub use blocking_queue::{BlockingQueue, EmptyQueueError};

pub mod countdown_latch;
pub use countdown_latch::CountdownLatch;

/// Error returned by the demo binaries.
///
/// The queue itself has a single failure, [`EmptyQueueError`], which
/// converts into this boxed form through `?`.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for the demo binaries.
pub type Result<T> = std::result::Result<T, Error>;
