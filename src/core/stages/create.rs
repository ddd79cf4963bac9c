//! Report creation stage

use super::PipelineServices;
use crate::adapters::datalake::ExportRequest;
use crate::domain::{PipelineError, Report, ReportRequest, Result, TemplateId};
use chrono::NaiveDate;
use serde_json::Value;

/// Parse the `{"filter": {...}}` body of a create request
///
/// `startDate` and `endDate` are required `YYYY-MM-DD` dates; `dealerIds`
/// and `templateId` are optional.
///
/// # Errors
///
/// Returns [`PipelineError::Validation`] naming every missing or unparseable
/// field.
pub fn parse_create_request(body: &Value) -> Result<ReportRequest> {
    let filter = body.get("filter").unwrap_or(&Value::Null);

    let start_date = date_field(filter, "startDate");
    let end_date = date_field(filter, "endDate");

    let (start_date, end_date) = match (start_date, end_date) {
        (Some(start), Some(end)) => (start, end),
        (start, end) => {
            let mut missing = Vec::new();
            if start.is_none() {
                missing.push("startDate");
            }
            if end.is_none() {
                missing.push("endDate");
            }
            return Err(PipelineError::Validation(format!(
                "Missing required filter parameters: {}",
                missing.join(", ")
            )));
        }
    };

    let dealer_ids = match filter.get("dealerIds") {
        None | Some(Value::Null) => None,
        Some(Value::Array(ids)) => Some(
            ids.iter()
                .map(|id| {
                    id.as_str().map(str::to_string).ok_or_else(|| {
                        PipelineError::Validation("dealerIds must be an array of strings".to_string())
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => {
            return Err(PipelineError::Validation(
                "dealerIds must be an array of strings".to_string(),
            ))
        }
    };

    let template_id = filter
        .get("templateId")
        .and_then(Value::as_str)
        .map(TemplateId::new)
        .transpose()
        .map_err(PipelineError::Validation)?;

    Ok(ReportRequest {
        start_date,
        end_date,
        dealer_ids,
        template_id,
    })
}

fn date_field(filter: &Value, name: &str) -> Option<NaiveDate> {
    filter
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// Insert a pending report and start its data lake export
///
/// If the export cannot be started the report is marked `failed` before the
/// error is returned.
pub async fn create_report(services: &PipelineServices, request: ReportRequest) -> Result<Report> {
    let report = services.lifecycle.create(request).await?;

    let output_location = format!(
        "s3://{}/{}/{}",
        services.settings.bucket, services.settings.export_prefix, report.report_id
    );
    let export = ExportRequest::for_report(
        report.report_id.clone(),
        &report.request,
        output_location,
    );

    if let Err(err) = services.data_lake.start_export(&export).await {
        crate::log_stage_failure!("create", report.report_id, err);
        services
            .lifecycle
            .record_failure(&report.report_id, &err)
            .await;
        return Err(err);
    }

    tracing::info!(
        report_id = %report.report_id,
        output_location = %export.output_location,
        "Report export started"
    );
    Ok(report)
}
