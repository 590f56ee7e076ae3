//! Request body charset resolution and decoding.

use encoding_rs::Encoding;

use crate::error::{DavError, DavResult};

const CHARSET_PARAM: &str = "charset=";

/// ## Summary
/// Picks the charset label of a request body.
///
/// The label is the text after `charset=` in `Content-Type`, up to the next
/// parameter, stripped of whitespace and quotes. Without such a parameter the
/// configured default applies.
#[must_use]
pub fn resolve_charset<'a>(content_type: Option<&'a str>, default: &'a str) -> &'a str {
    content_type
        .and_then(|value| {
            let lower = value.to_ascii_lowercase();
            let start = lower.find(CHARSET_PARAM)? + CHARSET_PARAM.len();
            let rest = &value[start..];
            let label = rest.split(';').next().unwrap_or(rest);
            let label = label.trim().trim_matches('"').trim();
            (!label.is_empty()).then_some(label)
        })
        .unwrap_or(default)
}

/// ## Summary
/// Decodes `body` with the charset named by `label`.
///
/// Decoding is strict: a byte order mark is not stripped and malformed
/// sequences are rejected rather than replaced.
///
/// ## Errors
/// Returns `DavError::UnsupportedCharset` for unknown labels and
/// `DavError::UndecodableBody` when `body` is not valid in that charset.
pub fn decode_body(body: &[u8], label: &str) -> DavResult<String> {
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| DavError::UnsupportedCharset(label.to_owned()))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| DavError::UndecodableBody {
            charset: encoding.name().to_owned(),
        })
}
