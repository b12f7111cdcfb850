use crate::measure::{FieldMetrics, TableMetrics, TextMetrics};
use crate::schema::{Field, Table};

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Minimal HTML writer for labels. Attribute values and text are escaped.
#[derive(Default)]
struct Html {
    out: String,
}

impl Html {
    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.out.push('<');
        self.out.push_str(tag);
        for (key, value) in attrs {
            self.out
                .push_str(&format!(" {}=\"{}\"", key, escape_html(value)));
        }
        self.out.push('>');
        self
    }

    fn close(&mut self, tag: &str) -> &mut Self {
        self.out.push_str(&format!("</{}>", tag));
        self
    }

    fn text(&mut self, text: &str) -> &mut Self {
        self.out.push_str(&escape_html(text));
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

/// `name | type` block of one field, each cell at its measured width.
fn row(html: &mut Html, field: &Field, metrics: &FieldMetrics, indent: f64) {
    let row_style = format!(
        "display:flex;white-space:nowrap;height:{}px;line-height:{}px;",
        metrics.height, metrics.height
    );
    let name_style = format!(
        "flex:none;box-sizing:border-box;width:{}px;padding-left:{}px;",
        metrics.name_width + indent,
        indent
    );
    let type_style = format!("flex:none;width:{}px;", metrics.type_width);

    html.open("div", &[("style", row_style.as_str())]);
    html.open("div", &[("style", name_style.as_str())]);
    if field.reference.is_some() {
        html.open("i", &[]).text(&field.name).close("i");
    } else {
        html.text(&field.name);
    }
    html.close("div");
    html.open("div", &[("style", type_style.as_str())])
        .text(&field.typ)
        .close("div");
    html.close("div");
}

/// Depth-first, matching the order of `TableMetrics::nested`.
fn flatten<'a>(fields: &'a [Field], depth: usize, out: &mut Vec<(usize, &'a Field)>) {
    for field in fields {
        out.push((depth, field));
        flatten(&field.fields, depth + 1, out);
    }
}

/// HTML label of a table vertex: a title bar followed by one
/// `name | type` row per immediate field.
///
/// Every row is laid out on its own at `name_width + type_width`, which the
/// table width covers. Embedded members follow their parent row, indented by
/// depth, outside the row grid: they never add to the table height.
pub fn table_label(table: &Table, sizes: &TableMetrics, metrics: &TextMetrics) -> String {
    let mut html = Html::default();

    let title_style = format!(
        "box-sizing:border-box;width:100%;height:{}px;background:#e4e4e4;padding:{}px;font-weight:bold;white-space:nowrap;",
        sizes.title_height, metrics.cell_padding
    );
    html.open("div", &[("style", title_style.as_str())])
        .text(&table.name)
        .close("div");

    let indent_step = metrics.font_size;
    for (idx, field) in table.fields.iter().enumerate() {
        let Some(field_sizes) = sizes.fields.get(idx) else {
            continue;
        };
        row(&mut html, field, field_sizes, 0.0);

        let mut members = Vec::new();
        flatten(&field.fields, 1, &mut members);
        let nested = sizes.nested.get(idx).map(Vec::as_slice).unwrap_or_default();
        if nested.is_empty() {
            continue;
        }
        html.open("div", &[("style", "height:0;overflow:visible;")]);
        for ((depth, member), (_, member_sizes)) in members.iter().zip(nested) {
            row(&mut html, member, member_sizes, *depth as f64 * indent_step);
        }
        html.close("div");
    }

    html.finish()
}
