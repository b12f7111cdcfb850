//! Neutral entity model consumed by the exporter.
//!
//! Built once by an extraction step (or deserialized from JSON) and never
//! mutated by layout: all derived geometry lives in side tables keyed by
//! table/field position.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    /// Embedded document or array-of-embedded members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

/// Foreign-key style link to `table.key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub table: String,
    pub key: String,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn create_table(&mut self, name: impl Into<String>) -> &mut Table {
        self.add_table(Table::new(name))
    }

    pub fn add_table(&mut self, table: Table) -> &mut Table {
        self.tables.push(table);
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Append the tables of `other`, keeping order.
    pub fn merge(&mut self, other: Schema) {
        if self.name.is_empty() {
            self.name = other.name;
        }
        self.tables.extend(other.tables);
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn create_field(&mut self, name: impl Into<String>, typ: impl Into<String>) -> &mut Field {
        self.add_field(Field::new(name, typ))
    }

    pub fn add_field(&mut self, field: Field) -> &mut Field {
        self.fields.push(field);
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Field {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            reference: None,
            fields: Vec::new(),
        }
    }

    pub fn add_ref(&mut self, table: impl Into<String>, key: impl Into<String>) -> &mut Self {
        self.reference = Some(Reference {
            table: table.into(),
            key: key.into(),
        });
        self
    }

    pub fn create_field(&mut self, name: impl Into<String>, typ: impl Into<String>) -> &mut Field {
        self.fields.push(Field::new(name, typ));
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    pub fn is_embedded(&self) -> bool {
        !self.fields.is_empty()
    }
}
