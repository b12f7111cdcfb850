//! draw.io (mxGraph) document model and XML output.

mod document;
mod label;
mod serialize;
mod style;

pub use document::{DocumentBuilder, Element, TemplateError, DOCUMENT_TEMPLATE};
pub use label::{escape_html, table_label};
pub use serialize::{serialize, SerializeError};
pub use style::{connection_style, table_style, Style};
