//! Translation of the parts of a request into the environment variables
//! defined for CGI in [RFC 3875](https://tools.ietf.org/html/rfc3875).

use super::grammar::RequestLine;
use std::collections::HashMap;

// Headers which become variables without the `HTTP_` prefix.
const HTTP_LESS_HEADERS: [&str; 2] = ["Content-Length", "Content-Type"];

const HTTP_PREFIX: &str = "HTTP_";

/// Build the variables every request starts with.
#[must_use]
pub fn seed() -> HashMap<String, String> {
    [
        ("GATEWAY_INTERFACE", "CGI/1.2"),
        ("HTTP_VERSION", "HTTP/1.1"),
        ("SERVER_PROTOCOL", "HTTP/1.1"),
    ].iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

pub fn apply_request_line(
    params: &mut HashMap<String, String>,
    request_line: &RequestLine,
) {
    params.insert("REQUEST_URI".into(), request_line.uri.into());
    if let Some(fragment) = request_line.fragment {
        params.insert("FRAGMENT".into(), fragment.into());
    }
    params.insert("REQUEST_PATH".into(), request_line.path.into());
    params.insert("PATH_INFO".into(), request_line.path.into());
    params.insert("SCRIPT_NAME".into(), "/".into());
    params.insert("REQUEST_METHOD".into(), request_line.method.into());
    if let Some(query_string) = request_line.query_string {
        params.insert("QUERY_STRING".into(), query_string.into());
    }
}

/// Return the variable name for the header with the given name, e.g.
/// `HTTP_X_FORWARDED_FOR` for `X-Forwarded-For`.  The exceptions are matched
/// against the name exactly as received.
#[must_use]
pub fn header_key(name: &str) -> String {
    let prefix = if HTTP_LESS_HEADERS.contains(&name) {
        ""
    } else {
        HTTP_PREFIX
    };
    format!("{}{}", prefix, name.to_ascii_uppercase().replace('-', "_"))
}

pub fn apply_header(
    params: &mut HashMap<String, String>,
    name: &str,
    value: &str,
) {
    params.insert(header_key(name), value.into());
}

/// Set `SERVER_NAME` from the host part of the `Host` header, if any.
pub fn derive_server_name(params: &mut HashMap<String, String>) {
    let server_name = params.get("HTTP_HOST")
        .and_then(|host| host.split(':').next())
        .filter(|server_name| !server_name.is_empty())
        .map(String::from);
    if let Some(server_name) = server_name {
        params.insert("SERVER_NAME".into(), server_name);
    }
}

/// Interpret a `CONTENT_LENGTH` value leniently: leading whitespace is
/// skipped, then an optional sign and as many decimal digits as follow are
/// read.  Anything unreadable, negative or absent counts as zero, and values
/// too large for `usize` saturate.
#[must_use]
pub fn parse_content_length(value: Option<&str>) -> usize {
    let value = match value {
        Some(value) => value.trim_start(),
        None => return 0,
    };
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let content_length = digits.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_usize, |content_length, digit| {
            content_length
                .saturating_mul(10)
                .saturating_add(usize::from(digit - b'0'))
        });
    if negative {
        0
    } else {
        content_length
    }
}
