//! The export pipeline: measure, pack, route, build, serialize.

use std::collections::HashSet;

use crate::drawio::{DOCUMENT_TEMPLATE, DocumentBuilder, serialize};
use crate::error::ExportError;
use crate::ids::IdGenerator;
use crate::layout::{Layout, ShelfPacker};
use crate::measure::{TableMetrics, TextMetrics};
use crate::routing::{Connection, UnresolvedReference, route};
use crate::schema::{Field, Schema};

/// Result of one export.
#[derive(Debug, Clone)]
pub struct Export {
    pub xml: String,
    /// Generated cell id per table, in schema order.
    pub table_ids: Vec<String>,
    pub tables: Vec<TableMetrics>,
    pub layout: Layout,
    pub connections: Vec<Connection>,
    pub unresolved: Vec<UnresolvedReference>,
}

#[derive(Debug)]
pub struct DrawioExporter {
    metrics: TextMetrics,
    packer: ShelfPacker,
    template: DocumentBuilder,
    first_id: u64,
}

impl DrawioExporter {
    /// Exporter over the built-in document skeleton.
    pub fn new() -> Result<Self, ExportError> {
        Self::with_template(DOCUMENT_TEMPLATE)
    }

    pub fn with_template(template: &str) -> Result<Self, ExportError> {
        Ok(Self {
            metrics: TextMetrics::default(),
            packer: ShelfPacker::default(),
            template: DocumentBuilder::from_template(template)?,
            first_id: IdGenerator::default().next_id(),
        })
    }

    pub fn metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn packer(mut self, packer: ShelfPacker) -> Self {
        self.packer = packer;
        self
    }

    /// Export with a fresh id generator, so repeated runs produce identical ids.
    pub fn export(&self, schema: &Schema) -> Result<Export, ExportError> {
        let mut ids = IdGenerator::starting_at(self.first_id);
        self.export_with_ids(schema, &mut ids)
    }

    /// Export drawing table ids from `ids`, for callers that share one
    /// sequence across several diagrams.
    pub fn export_with_ids(
        &self,
        schema: &Schema,
        ids: &mut IdGenerator,
    ) -> Result<Export, ExportError> {
        for table in &schema.tables {
            if let Some(field) = find_untyped(&table.fields) {
                return Err(ExportError::MissingType {
                    table: table.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let tables = self.metrics.schema_metrics(schema)?;
        let layout = self.packer.pack(&tables);
        let routes = route(schema, &layout);

        let table_ids: Vec<String> = schema.tables.iter().map(|t| ids.table_id(&t.name)).collect();

        let mut builder = self.template.clone();
        for (idx, table) in schema.tables.iter().enumerate() {
            builder.add_table(
                &table_ids[idx],
                table,
                &tables[idx],
                &layout.placements[idx],
                &self.metrics,
            );
        }

        let mut taken: HashSet<String> = table_ids.iter().cloned().collect();
        for conn in &routes.connections {
            let source = &table_ids[conn.from_table];
            let target = &table_ids[conn.to_table];
            let field = &schema.tables[conn.from_table].fields[conn.from_field].name;
            let id = edge_id(&mut taken, source, target, field);
            builder.add_connection(&id, source, target, conn);
        }

        let xml = serialize(&builder.finish())?;

        tracing::debug!(
            tables = schema.tables.len(),
            connections = routes.connections.len(),
            skipped = routes.unresolved.len(),
            bytes = xml.len(),
            "exported diagram"
        );

        Ok(Export {
            xml,
            table_ids,
            tables,
            layout,
            connections: routes.connections,
            unresolved: routes.unresolved,
        })
    }
}

/// `source_target`; repeats between the same pair get the field name, then a counter.
fn edge_id(taken: &mut HashSet<String>, source: &str, target: &str, field: &str) -> String {
    let base = format!("{}_{}", source, target);
    if taken.insert(base.clone()) {
        return base;
    }
    let with_field = format!("{}_{}", base, field);
    let mut id = with_field.clone();
    let mut n = 2;
    while !taken.insert(id.clone()) {
        id = format!("{}_{}", with_field, n);
        n += 1;
    }
    id
}

fn find_untyped(fields: &[Field]) -> Option<&Field> {
    fields.iter().find_map(|f| {
        if f.typ.trim().is_empty() {
            Some(f)
        } else {
            find_untyped(&f.fields)
        }
    })
}

/// Export `schema` with the default settings and return the XML.
pub fn export_drawio(schema: &Schema) -> Result<String, ExportError> {
    Ok(DrawioExporter::new()?.export(schema)?.xml)
}
