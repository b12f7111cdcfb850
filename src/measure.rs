use crate::schema::{Field, Schema, Table};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("cannot measure {text:?}: character {ch:?} cannot be drawn")]
    Unmeasurable { text: String, ch: char },
    #[error("font family {0:?} has no glyph table")]
    UnknownFont(String),
}

/// Text width as a function of text, font family and size.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> Result<f64, MeasureError>;
}

/// Fixed-advance glyph table for monospace faces.
///
/// Every narrow cell advances `advance * font_size`; wide (East Asian)
/// characters take two cells.
#[derive(Debug, Clone)]
pub struct MonospaceGlyphs {
    pub families: Vec<String>,
    pub advance: f64,
}

impl Default for MonospaceGlyphs {
    fn default() -> Self {
        Self {
            families: vec![
                "courier new".to_string(),
                "courier".to_string(),
                "monospace".to_string(),
            ],
            advance: 0.6,
        }
    }
}

impl TextMeasure for MonospaceGlyphs {
    fn measure(&self, text: &str, font_family: &str, font_size: f64) -> Result<f64, MeasureError> {
        if !self.families.iter().any(|f| f.eq_ignore_ascii_case(font_family)) {
            return Err(MeasureError::UnknownFont(font_family.to_string()));
        }

        let mut cells = 0usize;
        for ch in text.chars() {
            match UnicodeWidthChar::width(ch).filter(|_| is_xml_char(ch)) {
                Some(w) => cells += w,
                None => {
                    return Err(MeasureError::Unmeasurable {
                        text: text.to_string(),
                        ch,
                    });
                }
            }
        }

        Ok(cells as f64 * self.advance * font_size)
    }
}

/// XML 1.0 `Char`: labels and names end up in attribute values.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMetrics {
    pub name_width: f64,
    pub type_width: f64,
    pub height: f64,
}

impl FieldMetrics {
    pub fn row_width(&self) -> f64 {
        self.name_width + self.type_width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMetrics {
    pub title_width: f64,
    pub title_height: f64,
    pub width: f64,
    pub height: f64,
    /// One entry per immediate field, in field order.
    pub fields: Vec<FieldMetrics>,
    /// Nested members, flattened depth-first with their depth.
    pub nested: Vec<Vec<(usize, FieldMetrics)>>,
}

/// What could not be sized, and why.
#[derive(Debug, thiserror::Error)]
#[error("{subject}")]
pub struct SizingError {
    pub subject: String,
    #[source]
    pub source: MeasureError,
}

pub struct TextMetrics {
    pub font_family: String,
    pub font_size: f64,
    pub cell_padding: f64,
    measurer: Box<dyn TextMeasure>,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            font_family: "courier new".to_string(),
            font_size: 12.0,
            cell_padding: 3.0,
            measurer: Box::new(MonospaceGlyphs::default()),
        }
    }
}

impl std::fmt::Debug for TextMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextMetrics")
            .field("font_family", &self.font_family)
            .field("font_size", &self.font_size)
            .field("cell_padding", &self.cell_padding)
            .finish_non_exhaustive()
    }
}

impl TextMetrics {
    pub fn with_measurer(measurer: impl TextMeasure + 'static) -> Self {
        Self {
            measurer: Box::new(measurer),
            ..Self::default()
        }
    }

    /// Width of `text`. Characters XML cannot carry are rejected whatever
    /// the measurer says.
    pub fn text_width(&self, text: &str) -> Result<f64, MeasureError> {
        if let Some(ch) = text.chars().find(|&c| !is_xml_char(c)) {
            return Err(MeasureError::Unmeasurable {
                text: text.to_string(),
                ch,
            });
        }
        self.measurer.measure(text, &self.font_family, self.font_size)
    }

    /// `pad + ceil(width) + pad`
    pub fn cell_width(&self, text: &str) -> Result<f64, MeasureError> {
        let width = self.text_width(text)?;
        Ok(self.cell_padding + width.ceil() + self.cell_padding)
    }

    /// Rows never wrap, so every row has the same height.
    pub fn row_height(&self) -> f64 {
        self.cell_padding + self.font_size + self.cell_padding
    }

    pub fn field_metrics(&self, field: &Field) -> Result<FieldMetrics, MeasureError> {
        Ok(FieldMetrics {
            name_width: self.cell_width(&field.name)?,
            type_width: self.cell_width(&field.typ)?,
            height: self.row_height(),
        })
    }

    pub fn table_metrics(&self, table: &Table) -> Result<TableMetrics, SizingError> {
        let title_width = self.cell_width(&table.name).map_err(|source| SizingError {
            subject: format!("table {:?}", table.name),
            source,
        })?;
        let title_height = self.row_height();

        let mut fields = Vec::with_capacity(table.fields.len());
        let mut nested = Vec::with_capacity(table.fields.len());
        for field in &table.fields {
            fields.push(self.field_metrics(field).map_err(|source| SizingError {
                subject: format!("field {:?} of table {:?}", field.name, table.name),
                source,
            })?);

            let mut members = Vec::new();
            self.collect_nested(table, &field.fields, 1, &mut members)?;
            nested.push(members);
        }

        // An empty table is exactly its title.
        let width = match fields.iter().map(FieldMetrics::row_width).reduce(f64::max) {
            Some(widest_row) => title_width.max(widest_row),
            None => title_width,
        };
        let height = fields.iter().map(|f| f.height).sum::<f64>() + title_height;

        Ok(TableMetrics {
            title_width,
            title_height,
            width,
            height,
            fields,
            nested,
        })
    }

    fn collect_nested(
        &self,
        table: &Table,
        fields: &[Field],
        depth: usize,
        out: &mut Vec<(usize, FieldMetrics)>,
    ) -> Result<(), SizingError> {
        for field in fields {
            let metrics = self.field_metrics(field).map_err(|source| SizingError {
                subject: format!("embedded field {:?} of table {:?}", field.name, table.name),
                source,
            })?;
            out.push((depth, metrics));
            self.collect_nested(table, &field.fields, depth + 1, out)?;
        }
        Ok(())
    }

    /// Size every table of the schema, in schema order.
    pub fn schema_metrics(&self, schema: &Schema) -> Result<Vec<TableMetrics>, SizingError> {
        schema.tables.iter().map(|t| self.table_metrics(t)).collect()
    }
}
