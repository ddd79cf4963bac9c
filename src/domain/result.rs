//! Result type alias for the pipeline

use super::errors::PipelineError;

/// Result type alias using [`PipelineError`]
///
/// ```
/// use report_pipeline::domain::result::Result;
/// use report_pipeline::domain::errors::PipelineError;
///
/// fn failing_function() -> Result<()> {
///     Err(PipelineError::Validation("Invalid input".to_string()))
/// }
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, PipelineError>;
