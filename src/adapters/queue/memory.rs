//! In-process message queue

use super::MessageQueue;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A message captured by [`MemoryQueue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub queue_url: String,
    pub body: String,
}

/// [`MessageQueue`] that records messages in FIFO order
#[derive(Debug, Default)]
pub struct MemoryQueue {
    messages: Mutex<VecDeque<SentMessage>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the oldest message
    pub fn pop(&self) -> Option<SentMessage> {
        self.lock().pop_front()
    }

    /// Snapshot of all pending messages, oldest first
    pub fn messages(&self) -> Vec<SentMessage> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<SentMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn send_message(&self, queue_url: &str, body: String) -> Result<()> {
        if queue_url.trim().is_empty() {
            return Err(PipelineError::Queue("queue URL is empty".to_string()));
        }
        self.lock().push_back(SentMessage {
            queue_url: queue_url.to_string(),
            body,
        });
        Ok(())
    }
}
