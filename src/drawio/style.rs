use crate::measure::{TableMetrics, TextMetrics};
use crate::routing::Anchor;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Flag(&'static str),
    Pair(&'static str, String),
}

/// Ordered `key=value;` style string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    entries: Vec<Entry>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bare style name such as `swimlane`.
    pub fn flag(mut self, name: &'static str) -> Self {
        self.entries.push(Entry::Flag(name));
        self
    }

    pub fn set(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        match self
            .entries
            .iter_mut()
            .find(|e| matches!(e, Entry::Pair(k, _) if *k == key))
        {
            Some(Entry::Pair(_, v)) => *v = value,
            _ => self.entries.push(Entry::Pair(key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|e| match e {
            Entry::Pair(k, v) if *k == key => Some(v.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                Entry::Flag(name) => write!(f, "{};", name)?,
                Entry::Pair(key, value) => write!(f, "{}={};", key, value)?,
            }
        }
        Ok(())
    }
}

/// Style of a table vertex. Padding lives in the label, so the cell adds none.
/// Rows never wrap; the box is sized to the widest row.
pub fn table_style(metrics: &TextMetrics, sizes: &TableMetrics) -> Style {
    Style::new()
        .set("verticalAlign", "top")
        .set("align", "left")
        .set("overflow", "fill")
        .set("fontSize", metrics.font_size)
        .set("fontFamily", &metrics.font_family)
        .set("html", 1)
        .set("whiteSpace", "nowrap")
        .set("startSize", sizes.title_height)
        .set("minWidth", sizes.width)
        .set("spacing", 0)
        .set("rounded", 0)
        .set("shadow", 0)
        .set("comic", 0)
        .set("labelBackgroundColor", "none")
        .set("strokeWidth", 1)
}

/// One-to-many at the referencing side, mandatory one at the referenced side.
pub fn connection_style(anchor: Anchor) -> Style {
    Style::new()
        .set("edgeStyle", "orthogonalEdgeStyle")
        .set("html", 1)
        .set("rounded", 0)
        .set("startArrow", "ERoneToMany")
        .set("startFill", 0)
        .set("endArrow", "ERmandOne")
        .set("endFill", 0)
        .set("entryX", anchor.entry_x)
        .set("entryY", anchor.entry_y)
        .set("entryDx", 0)
        .set("entryDy", 0)
}
