use crate::drawio::{SerializeError, TemplateError};
use crate::measure::SizingError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("document template unusable: {0}")]
    Template(#[from] TemplateError),
    #[error("cannot size {0}")]
    Unmeasurable(#[from] SizingError),
    #[error("field {field:?} of table {table:?} has no type")]
    MissingType { table: String, field: String },
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}
