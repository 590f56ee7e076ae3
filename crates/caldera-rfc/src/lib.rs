//! Wire formats of the Caldera server: WebDAV XML and iCalendar text, and
//! the codec that binds them to stored calendars.

pub mod codec;
pub mod dav;
pub mod error;
pub mod ical;
