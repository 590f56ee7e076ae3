//! Multistatus XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::dav::core::{
    CALDAV_NS, CALENDARSERVER_NS, DAV_NS, DavProperty, DavResponse, Multistatus, PropertyValue,
    QName, status_line,
};

/// Serializes a multistatus response to XML.
///
/// ## Summary
/// Writes `D:multistatus` with the `DAV:`, CalDAV and CalendarServer
/// namespaces bound to `D`, `C` and `CS`. Properties in other namespaces are
/// written with a local default namespace declaration.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn serialize_multistatus(multistatus: &Multistatus) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut elem = BytesStart::new("D:multistatus");
    elem.push_attribute(("xmlns:D", DAV_NS));
    elem.push_attribute(("xmlns:C", CALDAV_NS));
    elem.push_attribute(("xmlns:CS", CALENDARSERVER_NS));
    writer.write_event(Event::Start(elem))?;

    for response in &multistatus.responses {
        write_response(&mut writer, response)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:multistatus")))?;

    let result = writer.into_inner();
    String::from_utf8(result).map_err(|e| {
        tracing::error!("Generated invalid UTF-8 in multistatus XML: {}", e);
        quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Invalid UTF-8 in XML output",
        )))
    })
}

fn write_response<W: std::io::Write>(
    writer: &mut Writer<W>,
    response: &DavResponse,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("D:response")))?;

    write_text_element(writer, "D:href", &response.href)?;

    for propstat in &response.propstats {
        writer.write_event(Event::Start(BytesStart::new("D:propstat")))?;
        writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

        for prop in &propstat.properties {
            write_property(writer, prop)?;
        }

        writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
        write_text_element(writer, "D:status", &status_line(propstat.status))?;
        writer.write_event(Event::End(BytesEnd::new("D:propstat")))?;
    }

    if let Some(status) = response.status {
        write_text_element(writer, "D:status", &status_line(status))?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:response")))?;

    Ok(())
}

fn write_property<W: std::io::Write>(
    writer: &mut Writer<W>,
    prop: &DavProperty,
) -> Result<(), quick_xml::Error> {
    let (elem_name, default_ns) = element_name(&prop.name);
    let start = || {
        let mut start = BytesStart::new(elem_name.as_str());
        if let Some(namespace) = default_ns {
            start.push_attribute(("xmlns", namespace));
        }
        start
    };

    match &prop.value {
        PropertyValue::Text(text) => {
            writer.write_event(Event::Start(start()))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::Href(href) => {
            writer.write_event(Event::Start(start()))?;
            write_text_element(writer, "D:href", href)?;
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::ResourceType(types) => {
            writer.write_event(Event::Start(start()))?;
            for resource_type in types {
                let (rt_name, _) = element_name(resource_type);
                writer.write_event(Event::Empty(BytesStart::new(rt_name.as_str())))?;
            }
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::Components(components) => {
            writer.write_event(Event::Start(start()))?;
            for component in components {
                let mut comp = BytesStart::new("C:comp");
                comp.push_attribute(("name", *component));
                writer.write_event(Event::Empty(comp))?;
            }
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::Empty => {
            writer.write_event(Event::Empty(start()))?;
        }
    }

    Ok(())
}

/// Returns the element name to write for `name`, and the default namespace
/// to declare on it when the namespace has no bound prefix.
fn element_name(name: &QName) -> (String, Option<&str>) {
    let prefix = match name.namespace.as_str() {
        DAV_NS => Some("D"),
        CALDAV_NS => Some("C"),
        CALENDARSERVER_NS => Some("CS"),
        _ => None,
    };
    match prefix {
        Some(prefix) => (format!("{prefix}:{}", name.local_name), None),
        None if name.namespace.is_empty() => (name.local_name.clone(), None),
        None => (name.local_name.clone(), Some(name.namespace.as_str())),
    }
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
