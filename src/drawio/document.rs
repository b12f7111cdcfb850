use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::label::table_label;
use super::style::{connection_style, table_style};
use crate::layout::Placement;
use crate::measure::{TableMetrics, TextMetrics};
use crate::routing::Connection;
use crate::schema::Table;

/// Empty diagram: one page whose `root` holds the base cell `0` and the layer cell `1`.
pub const DOCUMENT_TEMPLATE: &str = include_str!("template/document.xml");

/// Id of the layer every table and connection is attached to.
const LAYER_ID: &str = "1";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("malformed document template: {0}")]
    Malformed(String),
    #[error("document template has no <root> container")]
    MissingRoot,
    #[error("document template has no layer cell with id=\"1\"")]
    MissingLayer,
}

/// Owned XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attrs.push((key.into(), value.to_string()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the first element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Child indices leading from `self` to the first element named `name`.
    pub fn path_to(&self, name: &str) -> Option<Vec<usize>> {
        if self.name == name {
            return Some(Vec::new());
        }
        self.children.iter().enumerate().find_map(|(idx, c)| {
            c.path_to(name).map(|mut path| {
                path.insert(0, idx);
                path
            })
        })
    }

    /// Parse a single-rooted XML document. Whitespace-only text, comments and
    /// declarations are dropped.
    pub fn parse(xml: &str) -> Result<Element, TemplateError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut top: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(Self::from_start(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_start(e)?;
                    Self::attach(&mut stack, &mut top, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| TemplateError::Malformed("unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut top, element)?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.decode().unwrap_or_default();
                    if !text.trim().is_empty() {
                        return Err(TemplateError::Malformed(format!(
                            "unexpected text {:?}",
                            text.trim()
                        )));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TemplateError::Malformed(e.to_string())),
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(TemplateError::Malformed("unclosed element".to_string()));
        }
        top.ok_or_else(|| TemplateError::Malformed("empty document".to_string()))
    }

    fn from_start(e: &quick_xml::events::BytesStart<'_>) -> Result<Element, TemplateError> {
        let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).to_string());
        for attr in e.attributes() {
            let attr = attr.map_err(|err| TemplateError::Malformed(err.to_string()))?;
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw).map_err(|err| TemplateError::Malformed(err.to_string()))?;
            element.attrs.push((
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    fn attach(
        stack: &mut [Element],
        top: &mut Option<Element>,
        element: Element,
    ) -> Result<(), TemplateError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if top.is_none() => *top = Some(element),
            None => {
                return Err(TemplateError::Malformed(
                    "more than one top-level element".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Builds the cell tree of one diagram on top of a validated skeleton.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    document: Element,
    root_path: Vec<usize>,
}

impl DocumentBuilder {
    pub fn from_template(template: &str) -> Result<Self, TemplateError> {
        let document = Element::parse(template)?;
        let root_path = document.path_to("root").ok_or(TemplateError::MissingRoot)?;
        let root = Self::walk(&document, &root_path);
        let has_layer = root
            .children
            .iter()
            .any(|c| c.name == "mxCell" && c.get("id") == Some(LAYER_ID));
        if !has_layer {
            return Err(TemplateError::MissingLayer);
        }
        Ok(Self {
            document,
            root_path,
        })
    }

    fn walk<'a>(document: &'a Element, path: &[usize]) -> &'a Element {
        path.iter().fold(document, |el, &idx| &el.children[idx])
    }

    fn root_mut(&mut self) -> &mut Element {
        self.root_path
            .iter()
            .fold(&mut self.document, |el, &idx| &mut el.children[idx])
    }

    /// Vertex cell with absolute geometry.
    pub fn add_table(
        &mut self,
        id: &str,
        table: &Table,
        sizes: &TableMetrics,
        placement: &Placement,
        metrics: &TextMetrics,
    ) {
        let cell = Element::new("mxCell")
            .attr("id", id)
            .attr("value", table_label(table, sizes, metrics))
            .attr("style", table_style(metrics, sizes))
            .attr("parent", LAYER_ID)
            .attr("vertex", 1)
            .child(
                Element::new("mxGeometry")
                    .attr("x", placement.x)
                    .attr("y", placement.y)
                    .attr("width", placement.width)
                    .attr("height", placement.height)
                    .attr("as", "geometry"),
            );
        self.root_mut().children.push(cell);
    }

    /// Edge cell; draw.io derives the endpoints from `source` and `target`.
    pub fn add_connection(
        &mut self,
        id: &str,
        source_id: &str,
        target_id: &str,
        connection: &Connection,
    ) {
        let cell = Element::new("mxCell")
            .attr("id", id)
            .attr("style", connection_style(connection.anchor))
            .attr("source", source_id)
            .attr("target", target_id)
            .attr("parent", LAYER_ID)
            .attr("edge", 1)
            .child(
                Element::new("mxGeometry")
                    .attr("relative", 1)
                    .attr("as", "geometry"),
            );
        self.root_mut().children.push(cell);
    }

    pub fn finish(self) -> Element {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Anchor;

    #[test]
    fn test_parse_template() {
        let doc = Element::parse(DOCUMENT_TEMPLATE).unwrap();
        assert_eq!(doc.name, "mxfile");
        let root = doc.find("root").unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].get("parent"), Some("0"));
    }

    #[test]
    fn test_template_entities_are_decoded() {
        let xml = r#"<mxfile host="a &amp; b" note="&lt;x&gt;"><root><mxCell id="1"/></root></mxfile>"#;
        let doc = Element::parse(xml).unwrap();
        assert_eq!(doc.get("host"), Some("a & b"));
        assert_eq!(doc.get("note"), Some("<x>"));

        let again = crate::drawio::serialize(&doc).unwrap();
        assert!(again.contains(r#"host="a &amp; b""#));
        assert!(!again.contains("&amp;amp;"));
    }

    #[test]
    fn test_template_bad_entity() {
        assert!(matches!(
            Element::parse(r#"<root a="&nope;"/>"#),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_template_without_root() {
        let err = DocumentBuilder::from_template("<mxfile><diagram/></mxfile>").unwrap_err();
        assert!(matches!(err, TemplateError::MissingRoot));
    }

    #[test]
    fn test_template_without_layer() {
        let err = DocumentBuilder::from_template(r#"<root><mxCell id="0"/></root>"#).unwrap_err();
        assert!(matches!(err, TemplateError::MissingLayer));
    }

    #[test]
    fn test_malformed_template() {
        assert!(matches!(
            DocumentBuilder::from_template("<root><mxCell id=\"1\"></root>"),
            Err(TemplateError::Malformed(_))
        ));
        assert!(matches!(
            DocumentBuilder::from_template(""),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_add_table_and_connection() {
        let metrics = TextMetrics::default();
        let mut table = Table::new("User");
        table.create_field("id", "ObjectID");
        let sizes = metrics.table_metrics(&table).unwrap();
        let placement = Placement {
            x: 20.0,
            y: 20.0,
            width: sizes.width,
            height: sizes.height,
        };

        let mut builder = DocumentBuilder::from_template(DOCUMENT_TEMPLATE).unwrap();
        builder.add_table("User_1", &table, &sizes, &placement, &metrics);
        builder.add_connection(
            "Order_2_User_1",
            "Order_2",
            "User_1",
            &Connection {
                from_table: 1,
                from_field: 0,
                to_table: 0,
                to_field: 0,
                anchor: Anchor::TOP,
            },
        );
        let doc = builder.finish();
        let root = doc.find("root").unwrap();
        assert_eq!(root.children.len(), 4);

        let vertex = &root.children[2];
        assert_eq!(vertex.get("id"), Some("User_1"));
        assert_eq!(vertex.get("vertex"), Some("1"));
        let geometry = &vertex.children[0];
        assert_eq!(geometry.get("x"), Some("20"));
        assert_eq!(geometry.get("height"), Some("36"));
        assert_eq!(geometry.get("as"), Some("geometry"));

        let edge = &root.children[3];
        assert_eq!(edge.get("id"), Some("Order_2_User_1"));
        assert_eq!(edge.get("source"), Some("Order_2"));
        assert_eq!(edge.get("target"), Some("User_1"));
        assert_eq!(edge.get("edge"), Some("1"));
        assert_eq!(edge.children[0].get("relative"), Some("1"));
    }
}
