use crate::schema::{Field, Schema, Table};

/// Which tables and top-level fields make it into the diagram.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    pub exclude_tables: Vec<String>,
    pub exclude_fields: Vec<String>,
    /// When set, only listed fields (and dotted children of listed fields) are kept.
    pub include_fields: Option<Vec<String>>,
}

impl SchemaFilter {
    pub fn is_empty(&self) -> bool {
        self.exclude_tables.is_empty() && self.exclude_fields.is_empty() && self.include_fields.is_none()
    }

    pub fn apply(&self, schema: &Schema) -> Schema {
        let tables = schema
            .tables
            .iter()
            .filter(|t| !self.exclude_tables.contains(&t.name))
            .map(|t| Table {
                name: t.name.clone(),
                fields: t
                    .fields
                    .iter()
                    .filter(|f| self.keeps_field(f))
                    .cloned()
                    .collect(),
            })
            .collect();

        Schema {
            name: schema.name.clone(),
            tables,
        }
    }

    fn keeps_field(&self, field: &Field) -> bool {
        if self.exclude_fields.contains(&field.name) {
            return false;
        }

        match &self.include_fields {
            None => true,
            Some(include) => {
                if include.contains(&field.name) {
                    return true;
                }
                // "mixed" keeps "mixed.sub1"
                include.iter().any(|n| {
                    field
                        .name
                        .strip_prefix(n.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
                })
            }
        }
    }
}
