//! URL decoding helpers
//!
//! Percent-decoding for path segments and `application/x-www-form-urlencoded`
//! query strings.

use std::borrow::Cow;

/// Percent-decode `input`. With `plus_as_space`, `+` decodes to a space
/// (query strings only). Malformed escapes are kept verbatim; invalid UTF-8
/// is replaced lossily.
pub fn percent_decode(input: &str, plus_as_space: bool) -> String {
    let input = if plus_as_space {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };

    match urlencoding::decode(&input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            String::from_utf8_lossy(&urlencoding::decode_binary(input.as_bytes())).into_owned()
        }
    }
}

/// First value of query parameter `name`, decoded
///
/// A key present without `=` yields an empty value.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key, true) == name).then(|| percent_decode(value, true))
        })
}
