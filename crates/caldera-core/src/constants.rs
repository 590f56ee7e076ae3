/// Separator between the principal and the calendar name in a calendar key.
pub const CALENDAR_KEY_SEPARATOR: char = '/';

/// File extension of stored calendars and of calendar object hrefs.
pub const ICS_EXTENSION: &str = "ics";
pub const ICS_SUFFIX: &str = const_str::concat!(".", ICS_EXTENSION);

/// Methods a calendar endpoint answers, as advertised by `Allow`.
pub const ALLOW_METHODS: &str = "DELETE, OPTIONS, PROPFIND, PUT, REPORT";

/// Compliance classes advertised by the `DAV` header.
pub const DAV_CAPABILITIES: &str = "1, calendar-access";

pub const MULTISTATUS_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar";

/// Configuration section and key of the default request encoding.
pub const ENCODING_SECTION: &str = "encoding";
pub const REQUEST_ENCODING_KEY: &str = "request";
pub const DEFAULT_ENCODING: &str = "utf-8";
