//! `export-csv` Lambda: SQS consumer writing CSV artifacts

use lambda_runtime::{service_fn, Error, LambdaEvent};
use report_pipeline::handlers::handle_sqs_event;
use report_pipeline::lambda::{close_database, AwsRuntime};
use serde_json::Value;
use std::sync::Arc;

async fn handle_request(runtime: &AwsRuntime, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let db = runtime.database()?;
    let services = runtime.services(db.clone());

    let result = handle_sqs_event(&event.payload, &services).await;
    close_database(db.as_ref()).await;

    Ok(result?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let (runtime, _guard) = AwsRuntime::init().await?;
    let runtime = Arc::new(runtime);

    lambda_runtime::run(service_fn(move |event| {
        let runtime = runtime.clone();
        async move { handle_request(&runtime, event).await }
    }))
    .await
}
