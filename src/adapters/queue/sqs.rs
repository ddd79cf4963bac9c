//! Amazon SQS message queue

use super::MessageQueue;
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client;

/// [`MessageQueue`] backed by the AWS SDK SQS client
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
}

impl SqsQueue {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn send_message(&self, queue_url: &str, body: String) -> Result<()> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::Queue(format!(
                    "failed to enqueue message: {}",
                    e.into_service_error()
                ))
            })?;

        tracing::debug!(
            queue_url,
            message_id = output.message_id().unwrap_or_default(),
            "Message sent"
        );
        Ok(())
    }
}
