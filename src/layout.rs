use crate::measure::TableMetrics;

/// Top-left corner and size of one table on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Placements in schema order, plus the extent they cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub placements: Vec<Placement>,
    pub width: f64,
    pub height: f64,
    /// Index of the first table of each row.
    pub row_starts: Vec<usize>,
}

/// Single-pass shelf packer: left to right, wrapping at the page width.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    pub margin_x: f64,
    pub margin_y: f64,
    pub page_width: f64,
}

impl Default for ShelfPacker {
    fn default() -> Self {
        Self {
            margin_x: 20.0,
            margin_y: 20.0,
            page_width: 2000.0,
        }
    }
}

impl ShelfPacker {
    pub fn pack(&self, tables: &[TableMetrics]) -> Layout {
        let sizes: Vec<(f64, f64)> = tables.iter().map(|t| (t.width, t.height)).collect();
        self.pack_sizes(&sizes)
    }

    pub fn pack_sizes(&self, sizes: &[(f64, f64)]) -> Layout {
        let mut placements = Vec::with_capacity(sizes.len());
        let mut row_starts = Vec::new();

        let mut x = self.margin_x;
        let mut y = self.margin_y;
        let mut row_max_height: f64 = 0.0;

        for (idx, &(width, height)) in sizes.iter().enumerate() {
            let wraps = x + width > self.page_width;
            if wraps {
                y += row_max_height + self.margin_y;
                row_max_height = 0.0;
                placements.push(Placement {
                    x: self.margin_x,
                    y,
                    width,
                    height,
                });
                // Cursor lands after the wrapped table: its width plus a margin on each side.
                x = width + self.margin_x + self.margin_x;
            } else {
                placements.push(Placement { x, y, width, height });
                x += width + self.margin_x;
            }
            if wraps || idx == 0 {
                row_starts.push(idx);
            }

            row_max_height = row_max_height.max(height);
        }

        let width = placements
            .iter()
            .map(|p| p.right() + self.margin_x)
            .fold(0.0, f64::max);
        let height = placements
            .iter()
            .map(|p| p.y + p.height + self.margin_y)
            .fold(0.0, f64::max);

        tracing::debug!(
            tables = placements.len(),
            rows = row_starts.len(),
            width,
            height,
            "packed tables"
        );

        Layout {
            placements,
            width,
            height,
            row_starts,
        }
    }
}

impl Layout {
    /// Placements grouped by row, in order.
    pub fn rows(&self) -> Vec<&[Placement]> {
        let mut rows = Vec::with_capacity(self.row_starts.len());
        for (i, &start) in self.row_starts.iter().enumerate() {
            let end = self
                .row_starts
                .get(i + 1)
                .copied()
                .unwrap_or(self.placements.len());
            rows.push(&self.placements[start..end]);
        }
        rows
    }
}
