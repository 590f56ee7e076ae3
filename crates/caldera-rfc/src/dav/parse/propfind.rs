//! PROPFIND request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::namespace::NamespaceScope;
use crate::dav::core::{DAV_NS, PropfindRequest, QName};

/// Parses a PROPFIND request body.
///
/// ## Summary
/// An empty body is an `allprop` request. Otherwise the root must be
/// `DAV:propfind` holding one of `allprop`, `propname` or `prop`.
///
/// ## Errors
/// Returns an error if the XML is malformed or is not a `propfind` document.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_propfind(xml: &[u8]) -> ParseResult<PropfindRequest> {
    if xml.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!("Empty PROPFIND body, returning allprop");
        return Ok(PropfindRequest::AllProp);
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scope = NamespaceScope::default();
    let mut path: Vec<QName> = Vec::new();
    let mut request: Option<PropfindRequest> = None;
    let mut properties: Vec<QName> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                scope.enter(e)?;
                let name = scope.resolve(e.name().as_ref())?;
                open_element(&path, &name, &mut request, &mut properties)?;
                path.push(name);
            }
            Event::Empty(ref e) => {
                scope.enter(e)?;
                let name = scope.resolve(e.name().as_ref())?;
                open_element(&path, &name, &mut request, &mut properties)?;
                scope.leave();
            }
            Event::End(_) => {
                path.pop();
                scope.leave();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match request {
        Some(PropfindRequest::Prop(_)) => Ok(PropfindRequest::Prop(properties)),
        Some(other) => Ok(other),
        None => Err(ParseError::missing_element("propfind")),
    }
}

fn open_element(
    path: &[QName],
    name: &QName,
    request: &mut Option<PropfindRequest>,
    properties: &mut Vec<QName>,
) -> ParseResult<()> {
    match path {
        [] => {
            if *name != QName::dav("propfind") {
                return Err(ParseError::unexpected_element(&name.to_string()));
            }
            // A bare propfind element asks for everything
            request.get_or_insert(PropfindRequest::AllProp);
        }
        [_root] if name.namespace == DAV_NS => match name.local_name.as_str() {
            "allprop" => *request = Some(PropfindRequest::AllProp),
            "propname" => *request = Some(PropfindRequest::PropName),
            "prop" => *request = Some(PropfindRequest::Prop(Vec::new())),
            _ => {}
        },
        [_root, parent] if *parent == QName::dav("prop") => properties.push(name.clone()),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dav::core::CALDAV_NS;
    use crate::dav::parse::error::ParseErrorKind;

    #[test]
    fn empty_body_is_allprop() {
        assert_eq!(parse_propfind(b"").unwrap(), PropfindRequest::AllProp);
        assert_eq!(parse_propfind(b"  \r\n").unwrap(), PropfindRequest::AllProp);
    }

    #[test]
    fn parses_requested_properties_with_namespaces() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:getetag/>
    <D:displayname/>
    <C:supported-calendar-component-set/>
    <X:color xmlns:X="http://apple.com/ns/ical/"/>
  </D:prop>
</D:propfind>"#;

        let request = parse_propfind(xml).unwrap();

        assert_eq!(
            request,
            PropfindRequest::Prop(vec![
                QName::dav("getetag"),
                QName::dav("displayname"),
                QName::new(CALDAV_NS, "supported-calendar-component-set"),
                QName::new("http://apple.com/ns/ical/", "color"),
            ])
        );
    }

    #[test]
    fn parses_default_namespace() {
        let xml = br#"<propfind xmlns="DAV:"><prop><resourcetype/></prop></propfind>"#;

        let request = parse_propfind(xml).unwrap();

        assert_eq!(
            request,
            PropfindRequest::Prop(vec![QName::dav("resourcetype")])
        );
    }

    #[test]
    fn parses_allprop_and_propname() {
        let allprop = br#"<D:propfind xmlns:D="DAV:"><D:allprop/></D:propfind>"#;
        let propname = br#"<D:propfind xmlns:D="DAV:"><D:propname/></D:propfind>"#;

        assert_eq!(parse_propfind(allprop).unwrap(), PropfindRequest::AllProp);
        assert_eq!(parse_propfind(propname).unwrap(), PropfindRequest::PropName);
    }

    #[test]
    fn rejects_other_root_elements() {
        let xml = br#"<D:propertyupdate xmlns:D="DAV:"/>"#;

        let err = parse_propfind(xml).unwrap_err();

        assert_eq!(err.kind, ParseErrorKind::UnexpectedElement);
    }

    #[test]
    fn rejects_undeclared_prefix() {
        let xml = br#"<D:propfind xmlns:D="DAV:"><D:prop><Z:foo/></D:prop></D:propfind>"#;

        assert!(parse_propfind(xml).is_err());
    }
}
