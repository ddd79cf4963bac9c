//! Message queue abstraction
//!
//! Stages hand work to each other by sending JSON messages to a queue URL.

pub mod memory;
pub mod sqs;

pub use memory::{MemoryQueue, SentMessage};
pub use sqs::SqsQueue;

use crate::domain::Result;
use async_trait::async_trait;

/// Message queue capability
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Send one message body to `queue_url`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PipelineError::Queue`] if the send fails.
    async fn send_message(&self, queue_url: &str, body: String) -> Result<()>;
}
