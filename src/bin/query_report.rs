//! `query-report` Lambda: API Gateway `GET /query`

use lambda_runtime::{service_fn, Error, LambdaEvent};
use report_pipeline::handlers::handle_query_event;
use report_pipeline::lambda::{close_database, AwsRuntime};
use serde_json::Value;
use std::sync::Arc;

async fn handle_request(runtime: &AwsRuntime, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let db = runtime.database()?;

    let response = handle_query_event(
        event.payload,
        db.as_ref(),
        runtime.queue.as_ref(),
        &runtime.config.queue.export_queue_url,
    )
    .await;
    close_database(db.as_ref()).await;

    serde_json::to_value(response)
        .map_err(|error| Error::from(format!("failed to serialize api response: {error}")))
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
