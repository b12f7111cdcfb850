use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use super::document::Element;

#[derive(Debug, thiserror::Error)]
#[error("failed to write XML: {0}")]
pub struct SerializeError(String);

/// Render the tree as compact UTF-8 XML. Attribute values are escaped;
/// childless elements are self-closed.
pub fn serialize(document: &Element) -> Result<String, SerializeError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, document)?;
    String::from_utf8(writer.into_inner()).map_err(|e| SerializeError(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), SerializeError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| SerializeError(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| SerializeError(e.to_string()))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| SerializeError(e.to_string()))
}
