//! Lambda event handlers
//!
//! Decode raw event JSON (API Gateway proxy, S3 notification, SQS batch) and
//! delegate to [`crate::core::stages`]. The `src/bin` entry points wire AWS
//! adapters into these functions.

pub mod http;
pub mod s3;
pub mod sqs;

pub use http::{handle_create_report_event, handle_query_event, ApiGatewayResponse};
pub use s3::{decode_s3_records, handle_s3_event, S3ObjectRef};
pub use sqs::{decode_sqs_bodies, handle_sqs_event};
