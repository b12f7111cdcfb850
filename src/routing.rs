//! Reference resolution and entry-point selection for connections.

use crate::layout::Layout;
use crate::schema::{Reference, Schema};
use std::fmt;

/// Relative docking point on the target box, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub entry_x: f64,
    pub entry_y: f64,
}

impl Anchor {
    pub const TOP: Anchor = Anchor {
        entry_x: 0.5,
        entry_y: 0.0,
    };
    pub const LEFT: Anchor = Anchor {
        entry_x: 0.0,
        entry_y: 0.5,
    };
    pub const RIGHT: Anchor = Anchor {
        entry_x: 1.0,
        entry_y: 0.5,
    };

    /// Pick the side of the target facing the source.
    ///
    /// A source above the target enters from the top. Otherwise the edge
    /// enters from the side the source lies on.
    pub fn between(source_center_x: f64, source_y: f64, target_center_x: f64, target_y: f64) -> Self {
        let target_is_right = source_center_x < target_center_x;
        let target_is_below = source_y < target_y;

        match (target_is_right, target_is_below) {
            (true, true) => Anchor::TOP,
            (true, false) => Anchor::LEFT,
            (false, true) => Anchor::TOP,
            (false, false) => Anchor::RIGHT,
        }
    }
}

/// A resolved reference, by table and field index.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from_table: usize,
    pub from_field: usize,
    pub to_table: usize,
    pub to_field: usize,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Table,
    Field,
}

/// A reference that points nowhere; the connection is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedReference {
    pub table: String,
    pub field: String,
    pub target: Reference,
    pub missing: Missing,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.missing {
            Missing::Table => write!(
                f,
                "{}.{}: table {} not found",
                self.table, self.field, self.target.table
            ),
            Missing::Field => write!(
                f,
                "{}.{}: field {} not found in table {}",
                self.table, self.field, self.target.key, self.target.table
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Routes {
    pub connections: Vec<Connection>,
    pub unresolved: Vec<UnresolvedReference>,
}

/// Resolve every reference-bearing field against the schema.
///
/// `layout.placements` must be indexed like `schema.tables`.
pub fn route(schema: &Schema, layout: &Layout) -> Routes {
    let mut routes = Routes::default();

    for (from_idx, from_table) in schema.tables.iter().enumerate() {
        for (field_idx, field) in from_table.fields.iter().enumerate() {
            let Some(target) = &field.reference else {
                continue;
            };

            let Some(to_idx) = schema.tables.iter().position(|t| t.name == target.table) else {
                tracing::warn!(
                    table = %from_table.name,
                    field = %field.name,
                    "table {} not found",
                    target.table
                );
                routes.unresolved.push(UnresolvedReference {
                    table: from_table.name.clone(),
                    field: field.name.clone(),
                    target: target.clone(),
                    missing: Missing::Table,
                });
                continue;
            };

            let to_table = &schema.tables[to_idx];
            let Some(to_field) = to_table.fields.iter().position(|f| f.name == target.key) else {
                tracing::warn!(
                    table = %from_table.name,
                    field = %field.name,
                    "field {} not found in table {}",
                    target.key,
                    target.table
                );
                routes.unresolved.push(UnresolvedReference {
                    table: from_table.name.clone(),
                    field: field.name.clone(),
                    target: target.clone(),
                    missing: Missing::Field,
                });
                continue;
            };

            let from = &layout.placements[from_idx];
            let to = &layout.placements[to_idx];
            routes.connections.push(Connection {
                from_table: from_idx,
                from_field: field_idx,
                to_table: to_idx,
                to_field,
                anchor: Anchor::between(from.center_x(), from.y, to.center_x(), to.y),
            });
        }
    }

    tracing::debug!(
        connections = routes.connections.len(),
        unresolved = routes.unresolved.len(),
        "routed references"
    );

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Placement;

    fn layout_of(placements: Vec<Placement>) -> Layout {
        Layout {
            placements,
            width: 0.0,
            height: 0.0,
            row_starts: vec![0],
        }
    }

    fn boxed(x: f64, y: f64) -> Placement {
        Placement {
            x,
            y,
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_anchor_source_left_and_above() {
        // centers 70 < 250, tops 20 < 150
        let a = boxed(20.0, 20.0);
        let b = boxed(200.0, 150.0);
        assert_eq!(Anchor::between(a.center_x(), a.y, b.center_x(), b.y), Anchor::TOP);
    }

    #[test]
    fn test_anchor_quadrants() {
        assert_eq!(Anchor::between(0.0, 100.0, 50.0, 0.0), Anchor::LEFT);
        assert_eq!(Anchor::between(50.0, 0.0, 0.0, 100.0), Anchor::TOP);
        assert_eq!(Anchor::between(50.0, 100.0, 0.0, 0.0), Anchor::RIGHT);
    }

    #[test]
    fn test_anchor_ties_fall_to_right_side() {
        // same box position: neither strictly left nor strictly above
        assert_eq!(Anchor::between(10.0, 10.0, 10.0, 10.0), Anchor::RIGHT);
        // self reference from a table to itself
        assert_eq!(Anchor::between(70.0, 20.0, 70.0, 20.0), Anchor::RIGHT);
    }

    fn shop() -> Schema {
        let mut schema = Schema::new("shop");
        schema.create_table("User").create_field("id", "ObjectID");
        let order = schema.create_table("Order");
        order.create_field("id", "ObjectID");
        order.create_field("user", "ObjectID").add_ref("User", "id");
        order.create_field("ghost", "ObjectID").add_ref("Ghost", "id");
        order.create_field("owner", "ObjectID").add_ref("User", "uuid");
        schema
    }

    #[test]
    fn test_route_resolves_and_skips() {
        let schema = shop();
        let layout = layout_of(vec![boxed(20.0, 20.0), boxed(140.0, 20.0)]);
        let routes = route(&schema, &layout);

        assert_eq!(routes.connections.len(), 1);
        let conn = &routes.connections[0];
        assert_eq!((conn.from_table, conn.from_field), (1, 1));
        assert_eq!((conn.to_table, conn.to_field), (0, 0));
        // Order is right of User on the same shelf.
        assert_eq!(conn.anchor, Anchor::RIGHT);

        assert_eq!(routes.unresolved.len(), 2);
        assert_eq!(routes.unresolved[0].missing, Missing::Table);
        assert_eq!(routes.unresolved[0].to_string(), "Order.ghost: table Ghost not found");
        assert_eq!(routes.unresolved[1].missing, Missing::Field);
        assert_eq!(
            routes.unresolved[1].to_string(),
            "Order.owner: field uuid not found in table User"
        );
    }

    #[test]
    fn test_route_ignores_nested_references() {
        let mut schema = Schema::new("blog");
        schema.create_table("User").create_field("id", "ObjectID");
        schema
            .create_table("Post")
            .create_field("comments", "Array<Embedded>")
            .create_field("author", "ObjectID")
            .add_ref("User", "id");
        let layout = layout_of(vec![boxed(20.0, 20.0), boxed(140.0, 20.0)]);

        let routes = route(&schema, &layout);
        assert!(routes.connections.is_empty());
        assert!(routes.unresolved.is_empty());
    }
}
