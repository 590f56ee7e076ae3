//! Namespace prefix resolution for the streaming parsers.

use quick_xml::events::BytesStart;

use super::error::{ParseError, ParseResult};
use crate::dav::core::QName;

/// Stack of `xmlns` declarations in scope at the current element.
#[derive(Debug, Default)]
pub(super) struct NamespaceScope {
    bindings: Vec<(String, String)>,
    marks: Vec<usize>,
}

impl NamespaceScope {
    /// Opens the scope of `element`, recording its namespace declarations.
    pub(super) fn enter(&mut self, element: &BytesStart<'_>) -> ParseResult<()> {
        self.marks.push(self.bindings.len());
        for attr in element.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = std::str::from_utf8(&attr.value)?;
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                self.bindings.push((prefix.to_owned(), value.to_owned()));
            } else if key == "xmlns" {
                self.bindings.push((String::new(), value.to_owned()));
            } else {
                // Other attributes carry no namespace information
            }
        }
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.bindings.truncate(mark);
        }
    }

    /// Resolves a raw `prefix:local` element name.
    pub(super) fn resolve(&self, raw_name: &[u8]) -> ParseResult<QName> {
        let name = std::str::from_utf8(raw_name)?;
        let (prefix, local_name) = name.split_once(':').unwrap_or(("", name));

        let namespace = self
            .bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, namespace)| namespace.as_str());

        match namespace {
            Some(namespace) => Ok(QName::new(namespace, local_name)),
            None if prefix.is_empty() => Ok(QName::new("", local_name)),
            None => Err(ParseError::unknown_prefix(prefix)),
        }
    }
}
