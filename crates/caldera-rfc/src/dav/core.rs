//! DAV request and response model.

use std::fmt;

use http::StatusCode;

pub const DAV_NS: &str = "DAV:";
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";
pub const CALENDARSERVER_NS: &str = "http://calendarserver.org/ns/";

/// A namespace-qualified XML element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: String,
    pub local_name: String,
}

impl QName {
    #[must_use]
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    #[must_use]
    pub fn dav(local_name: &str) -> Self {
        Self::new(DAV_NS, local_name)
    }

    #[must_use]
    pub fn caldav(local_name: &str) -> Self {
        Self::new(CALDAV_NS, local_name)
    }

    #[must_use]
    pub fn calendarserver(local_name: &str) -> Self {
        Self::new(CALENDARSERVER_NS, local_name)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local_name)
    }
}

/// What a PROPFIND asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindRequest {
    /// Every live property; also what an empty body means.
    AllProp,
    /// Property names only.
    PropName,
    Prop(Vec<QName>),
}

/// Calendar REPORT types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportType {
    /// `calendar-query`; filters are not evaluated, every object matches.
    CalendarQuery,
    /// `calendar-multiget` with the requested hrefs.
    CalendarMultiget { hrefs: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub properties: Vec<QName>,
}

/// Value of a property in a propstat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Href(String),
    ResourceType(Vec<QName>),
    /// `supported-calendar-component-set` entries.
    Components(Vec<&'static str>),
    /// No value: used for property names and missing properties.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavProperty {
    pub name: QName,
    pub value: PropertyValue,
}

impl DavProperty {
    #[must_use]
    pub fn new(name: QName, value: PropertyValue) -> Self {
        Self { name, value }
    }

    #[must_use]
    pub fn empty(name: QName) -> Self {
        Self::new(name, PropertyValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Propstat {
    pub status: StatusCode,
    pub properties: Vec<DavProperty>,
}

/// One `response` element: either propstats or a bare status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavResponse {
    pub href: String,
    pub propstats: Vec<Propstat>,
    pub status: Option<StatusCode>,
}

impl DavResponse {
    #[must_use]
    pub fn with_propstats(href: impl Into<String>, propstats: Vec<Propstat>) -> Self {
        Self {
            href: href.into(),
            propstats,
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(href: impl Into<String>, status: StatusCode) -> Self {
        Self {
            href: href.into(),
            propstats: Vec::new(),
            status: Some(status),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multistatus {
    pub responses: Vec<DavResponse>,
}

/// ## Summary
/// Formats a status as the `HTTP/1.1 <code> <reason>` line used in
/// multistatus bodies.
#[must_use]
pub fn status_line(status: StatusCode) -> String {
    format!(
        "HTTP/1.1 {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
}
