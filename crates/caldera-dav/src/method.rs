use http::Method;

/// Methods a calendar endpoint dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    Delete,
    Options,
    Propfind,
    Put,
    Report,
    /// Any other method; answered with 405.
    Unsupported,
}

impl DavMethod {
    #[must_use]
    pub fn from_method(method: &Method) -> Self {
        match method.as_str() {
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            "PROPFIND" => Self::Propfind,
            "PUT" => Self::Put,
            "REPORT" => Self::Report,
            _ => Self::Unsupported,
        }
    }
}

impl From<&Method> for DavMethod {
    fn from(method: &Method) -> Self {
        Self::from_method(method)
    }
}
