pub mod drawio;
pub mod error;
pub mod export;
pub mod filter;
pub mod ids;
pub mod layout;
pub mod measure;
pub mod routing;
pub mod schema;

use wasm_bindgen::prelude::*;

pub use error::ExportError;
pub use export::{DrawioExporter, Export, export_drawio};
pub use filter::SchemaFilter;
pub use schema::{Field, Reference, Schema, Table};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a schema given as JSON to draw.io XML
#[wasm_bindgen(js_name = "schemaToDrawio")]
pub fn render_drawio(schema_json: &str) -> Result<String, String> {
    schema_json_to_drawio(schema_json).map_err(|e| e.to_string())
}

pub fn schema_json_to_drawio(schema_json: &str) -> Result<String, ExportError> {
    let schema: Schema = serde_json::from_str(schema_json)?;
    export_drawio(&schema)
}
