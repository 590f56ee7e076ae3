// One handler per supported method. Handlers only translate between the
// request/response and the codec.

pub mod delete;
pub mod options;
pub mod propfind;
pub mod put;
pub mod report;
