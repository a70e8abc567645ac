use super::error::Error;
use super::limits::{
    MAX_FIELD_NAME_LENGTH,
    MAX_FIELD_VALUE_LENGTH,
    MAX_FRAGMENT_LENGTH,
    MAX_HEADER_LINE_LENGTH,
    MAX_QUERY_STRING_LENGTH,
    MAX_REQUEST_LINE_LENGTH,
    MAX_REQUEST_PATH_LENGTH,
    MAX_REQUEST_URI_LENGTH,
};

// The request target ends where this appears, and the protocol begins.
const PROTOCOL_DELIMITER: &str = " HTTP";

// Separates a header name from its value.
const HEADER_DELIMITER: &str = ": ";

/// The parts of a request line, borrowed from the line itself.
#[derive(Debug, Eq, PartialEq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub fragment: Option<&'a str>,
    pub path: &'a str,
    pub query_string: Option<&'a str>,
}

/// A line of the header block: either one header or the blank line which
/// ends the block.
#[derive(Debug, Eq, PartialEq)]
pub enum Line<'a> {
    Blank,
    Header {
        name: &'a str,
        value: &'a [u8],
    },
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-'
}

fn method_length<T>(line: T) -> usize
    where T: AsRef<[u8]>
{
    line.as_ref().iter()
        .take_while(|byte| byte.is_ascii_uppercase())
        .count()
}

fn name_length<T>(line: T) -> usize
    where T: AsRef<[u8]>
{
    line.as_ref().iter()
        .take_while(|&&byte| is_name_byte(byte))
        .count()
}

/// Remove the line terminator, either LF or CRLF, from the end of the given
/// line.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn split_uri(uri: &str) -> Result<(&str, Option<&str>), Error> {
    if uri.bytes().any(|byte| byte.is_ascii_control()) {
        return Err(Error::MalformedUri(uri.into()));
    }
    Ok(match uri.find('?') {
        Some(delimiter) => (&uri[..delimiter], Some(&uri[delimiter+1..])),
        None => (uri, None),
    })
}

/// Break a request line (terminator already removed) into its parts,
/// checking the length of each part as soon as it is found.
///
/// The line must begin with an uppercase method and a space, and the
/// target ends at the first `" HTTP"`.  When a `#` appears in the target,
/// everything after it up to the last `" HTTP"` on the line is the fragment.
pub fn parse_request_line(line: &str) -> Result<RequestLine, Error> {
    // Parse the method.
    let method_end = method_length(line);
    match line.as_bytes().get(method_end) {
        Some(b' ') if method_end == 0 => return Err(Error::MissingMethod),
        Some(b' ') => (),
        _ => return Err(Error::MalformedRequestLine(line.into())),
    }
    let method = &line[..method_end];

    // Parse the target and fragment.
    let line_at_target = &line[method_end+1..];
    let protocol_delimiter = line_at_target.find(PROTOCOL_DELIMITER)
        .ok_or_else(|| Error::MalformedRequestLine(line.into()))?;
    let (uri, fragment) = match line_at_target[..protocol_delimiter].find('#') {
        Some(fragment_delimiter) => {
            let fragment_end = line_at_target.rfind(PROTOCOL_DELIMITER)
                .unwrap_or(protocol_delimiter);
            (
                &line_at_target[..fragment_delimiter],
                Some(&line_at_target[fragment_delimiter+1..fragment_end]),
            )
        },
        None => (&line_at_target[..protocol_delimiter], None),
    };
    if uri.is_empty() {
        return Err(Error::MissingUri);
    }
    if uri.len() > MAX_REQUEST_URI_LENGTH {
        return Err(Error::UriTooLong);
    }
    if matches!(fragment, Some(fragment) if fragment.len() > MAX_FRAGMENT_LENGTH) {
        return Err(Error::FragmentTooLong);
    }

    // Split the target into path and query string.
    let (path, query_string) = split_uri(uri)?;
    if path.len() > MAX_REQUEST_PATH_LENGTH {
        return Err(Error::PathTooLong);
    }
    if matches!(query_string, Some(query) if query.len() > MAX_QUERY_STRING_LENGTH) {
        return Err(Error::QueryTooLong);
    }
    Ok(RequestLine {
        method,
        uri,
        fragment,
        path,
        query_string,
    })
}

/// Recognize one line of the header block (terminator already removed).
///
/// The name is checked against its limit before anything else, so an
/// over-long name is reported as such no matter what follows it.  The value
/// is passed through as bytes, whatever its encoding.
pub fn parse_header_line(line: &[u8]) -> Result<Line, Error> {
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    let name_end = name_length(line);
    if name_end > MAX_FIELD_NAME_LENGTH {
        return Err(Error::FieldNameTooLong);
    }
    if name_end == 0 || !line[name_end..].starts_with(HEADER_DELIMITER.as_bytes()) {
        return Err(Error::MalformedHeaderLine(
            String::from_utf8_lossy(line).into_owned()
        ));
    }
    let value = &line[name_end+HEADER_DELIMITER.len()..];
    if value.len() > MAX_FIELD_VALUE_LENGTH {
        return Err(Error::FieldValueTooLong);
    }
    let name = std::str::from_utf8(&line[..name_end])
        .map_err(|_| Error::LineNotValidText(line.to_vec()))?;
    Ok(Line::Header {
        name,
        value,
    })
}

/// Check the beginning of a request line whose terminator has not arrived
/// yet.  Fails once the buffered bytes can no longer become an acceptable
/// request line.
pub fn check_partial_request_line(partial: &[u8]) -> Result<(), Error> {
    if partial.len() <= MAX_REQUEST_LINE_LENGTH {
        return Ok(());
    }
    let method_end = method_length(partial);
    match partial.get(method_end) {
        Some(b' ') if method_end == 0 => return Err(Error::MissingMethod),
        Some(b' ') => (),
        _ => return Err(Error::MalformedRequestLine(
            String::from_utf8_lossy(partial).into_owned()
        )),
    }

    // Once the target has ended within its limit, the excess is elsewhere.
    let line_at_target = &partial[method_end+1..];
    let target_end = line_at_target
        .windows(PROTOCOL_DELIMITER.len())
        .position(|window| window == PROTOCOL_DELIMITER.as_bytes())
        .map(|protocol_delimiter| {
            line_at_target[..protocol_delimiter].iter()
                .position(|&byte| byte == b'#')
                .unwrap_or(protocol_delimiter)
        });
    match target_end {
        Some(target_end) if target_end <= MAX_REQUEST_URI_LENGTH => {
            Err(Error::MalformedRequestLine(
                String::from_utf8_lossy(partial).into_owned()
            ))
        },
        _ => Err(Error::UriTooLong),
    }
}

/// Check the beginning of a header line whose terminator has not arrived
/// yet.  Fails as soon as the name or the value is known to be over its
/// limit, or the line is too long to be a header at all.
pub fn check_partial_header_line(partial: &[u8]) -> Result<(), Error> {
    // A trailing CR may turn out to be part of the terminator.
    let partial = partial.strip_suffix(b"\r").unwrap_or(partial);
    let name_end = name_length(partial);
    if name_end > MAX_FIELD_NAME_LENGTH {
        return Err(Error::FieldNameTooLong);
    }
    let line_at_delimiter = &partial[name_end..];
    if line_at_delimiter.starts_with(HEADER_DELIMITER.as_bytes())
        && line_at_delimiter.len() - HEADER_DELIMITER.len() > MAX_FIELD_VALUE_LENGTH
    {
        return Err(Error::FieldValueTooLong);
    }
    if partial.len() > MAX_HEADER_LINE_LENGTH {
        return Err(Error::MalformedHeaderLine(
            String::from_utf8_lossy(partial).into_owned()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn strip_either_terminator() {
        assert_eq!(b"Host: x", strip_terminator(b"Host: x\r\n"));
        assert_eq!(b"Host: x", strip_terminator(b"Host: x\n"));
        assert_eq!(b"", strip_terminator(b"\r\n"));
        assert_eq!(b"", strip_terminator(b"\n"));
        assert_eq!(b"Host: x\r", strip_terminator(b"Host: x\r\r\n"));
    }

    #[test]
    fn parse_request_line_with_query() {
        assert_eq!(
            Ok(RequestLine {
                method: "GET",
                uri: "/foo?bar=1",
                fragment: None,
                path: "/foo",
                query_string: Some("bar=1"),
            }),
            parse_request_line("GET /foo?bar=1 HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_with_fragment() {
        assert_eq!(
            Ok(RequestLine {
                method: "GET",
                uri: "/page?x=y",
                fragment: Some("section-2"),
                path: "/page",
                query_string: Some("x=y"),
            }),
            parse_request_line("GET /page?x=y#section-2 HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_fragment_extends_to_last_protocol() {
        let request_line = parse_request_line("GET /a#b HTTP c HTTP/1.1").unwrap();
        assert_eq!("/a", request_line.uri);
        assert_eq!(Some("b HTTP c"), request_line.fragment);
    }

    #[test]
    fn parse_request_line_hash_after_protocol_is_not_fragment() {
        let request_line = parse_request_line("GET /a HTTP/1.1 #x").unwrap();
        assert_eq!("/a", request_line.uri);
        assert_eq!(None, request_line.fragment);
    }

    #[test]
    fn parse_request_line_trailing_question_mark_gives_empty_query() {
        let request_line = parse_request_line("GET /a? HTTP/1.1").unwrap();
        assert_eq!("/a", request_line.path);
        assert_eq!(Some(""), request_line.query_string);
    }

    #[test]
    fn parse_request_line_protocol_is_only_checked_for_prefix() {
        assert!(parse_request_line("GET / HTTPS/9").is_ok());
    }

    #[test]
    fn parse_request_line_no_method() {
        assert_eq!(
            Err(Error::MissingMethod),
            parse_request_line(" /x HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_lowercase_method() {
        assert_eq!(
            Err(Error::MalformedRequestLine("get /x HTTP/1.1".into())),
            parse_request_line("get /x HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_no_protocol() {
        assert_eq!(
            Err(Error::MalformedRequestLine("GET /x".into())),
            parse_request_line("GET /x")
        );
    }

    #[test]
    fn parse_request_line_not_a_request() {
        assert_eq!(
            Err(Error::MalformedRequestLine("hello there".into())),
            parse_request_line("hello there")
        );
    }

    #[test]
    fn parse_request_line_no_target() {
        assert_eq!(
            Err(Error::MissingUri),
            parse_request_line("GET  HTTP/1.1")
        );
        assert_eq!(
            Err(Error::MissingUri),
            parse_request_line("GET #top HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_control_character_in_target() {
        assert_eq!(
            Err(Error::MalformedUri("/a\tb".into())),
            parse_request_line("GET /a\tb HTTP/1.1")
        );
    }

    #[test]
    fn parse_request_line_lengths_at_limits() {
        let path = format!("/{}", "p".repeat(MAX_REQUEST_PATH_LENGTH - 1));
        let query = "q".repeat(MAX_QUERY_STRING_LENGTH);
        let fragment = "f".repeat(MAX_FRAGMENT_LENGTH);
        let line = format!("GET {}?{}#{} HTTP/1.1", path, query, fragment);
        let request_line = parse_request_line(&line).unwrap();
        assert_eq!(path, request_line.path);
        assert_eq!(Some(query.as_str()), request_line.query_string);
        assert_eq!(Some(fragment.as_str()), request_line.fragment);
    }

    #[test]
    fn parse_request_line_uri_too_long() {
        let line = format!("GET /{} HTTP/1.1", "u".repeat(MAX_REQUEST_URI_LENGTH));
        assert_eq!(Err(Error::UriTooLong), parse_request_line(&line));
    }

    #[test]
    fn parse_request_line_fragment_too_long() {
        let line = format!("GET /#{} HTTP/1.1", "f".repeat(MAX_FRAGMENT_LENGTH + 1));
        assert_eq!(Err(Error::FragmentTooLong), parse_request_line(&line));
    }

    #[test]
    fn parse_request_line_path_too_long() {
        let line = format!("GET /{} HTTP/1.1", "p".repeat(MAX_REQUEST_PATH_LENGTH));
        assert_eq!(Err(Error::PathTooLong), parse_request_line(&line));
    }

    #[test]
    fn parse_request_line_query_too_long() {
        let line = format!("GET /?{} HTTP/1.1", "q".repeat(MAX_QUERY_STRING_LENGTH + 1));
        assert_eq!(Err(Error::QueryTooLong), parse_request_line(&line));
    }

    #[test]
    fn parse_header_line_blank() {
        assert_eq!(Ok(Line::Blank), parse_header_line(b""));
    }

    #[test]
    fn parse_header_line_value_is_verbatim() {
        assert_eq!(
            Ok(Line::Header {
                name: "X-Forwarded-For",
                value: b" 10.0.0.1,  10.0.0.2 ",
            }),
            parse_header_line(b"X-Forwarded-For:  10.0.0.1,  10.0.0.2 ")
        );
        assert_eq!(
            Ok(Line::Header {
                name: "X-Empty",
                value: b"",
            }),
            parse_header_line(b"X-Empty: ")
        );
    }

    #[test]
    fn parse_header_line_missing_delimiter() {
        for line in &[
            "User-Agent curl/7.16.3",
            "Host:example.com",
            "Head er: value",
            ": value",
            "X_Under: score",
            "\r",
        ] {
            assert_eq!(
                Err(Error::MalformedHeaderLine((*line).into())),
                parse_header_line(line.as_bytes())
            );
        }
    }

    #[test]
    fn parse_header_line_name_too_long_regardless_of_value() {
        let name = "N".repeat(MAX_FIELD_NAME_LENGTH + 1);
        assert_eq!(
            Err(Error::FieldNameTooLong),
            parse_header_line(format!("{}: v", name).as_bytes())
        );
        assert_eq!(
            Err(Error::FieldNameTooLong),
            parse_header_line(format!("{}junk", name).as_bytes())
        );
    }

    #[test]
    fn parse_header_line_value_too_long() {
        let line = format!("X-Big: {}", "v".repeat(MAX_FIELD_VALUE_LENGTH + 1));
        assert_eq!(Err(Error::FieldValueTooLong), parse_header_line(line.as_bytes()));
        let line = format!("X-Big: {}", "v".repeat(MAX_FIELD_VALUE_LENGTH));
        assert!(parse_header_line(line.as_bytes()).is_ok());
    }

    #[test]
    fn parse_header_line_value_is_not_decoded() {
        assert_eq!(
            Ok(Line::Header {
                name: "Content-Disposition",
                value: b"attachment; filename=caf\xe9.txt",
            }),
            parse_header_line(b"Content-Disposition: attachment; filename=caf\xe9.txt")
        );
    }

    #[test]
    fn partial_request_line_within_bound() {
        let partial = format!("GET /{}", "u".repeat(MAX_REQUEST_URI_LENGTH + 10));
        assert_eq!(Ok(()), check_partial_request_line(partial.as_bytes()));
    }

    #[test]
    fn partial_request_line_over_bound() {
        let partial = format!("GET /{}", "u".repeat(MAX_REQUEST_LINE_LENGTH));
        assert_eq!(
            Err(Error::UriTooLong),
            check_partial_request_line(partial.as_bytes())
        );
        let partial = format!(" /{}", "u".repeat(MAX_REQUEST_LINE_LENGTH));
        assert_eq!(
            Err(Error::MissingMethod),
            check_partial_request_line(partial.as_bytes())
        );
        let partial = format!(
            "GET /{}#{} HTTP/1.1",
            "u".repeat(MAX_REQUEST_URI_LENGTH),
            "f".repeat(MAX_FRAGMENT_LENGTH * 2)
        );
        assert_eq!(
            Err(Error::UriTooLong),
            check_partial_request_line(partial.as_bytes())
        );
        let partial = "x".repeat(MAX_REQUEST_LINE_LENGTH + 1);
        assert!(matches!(
            check_partial_request_line(partial.as_bytes()),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn partial_request_line_over_bound_after_protocol() {
        let partial = format!("GET /a HTTP/1.1{}", "x".repeat(MAX_REQUEST_LINE_LENGTH));
        assert!(matches!(
            check_partial_request_line(partial.as_bytes()),
            Err(Error::MalformedRequestLine(_))
        ));
        let partial = format!("GET /a#b HTTP/1.1{}", "x".repeat(MAX_REQUEST_LINE_LENGTH));
        assert!(matches!(
            check_partial_request_line(partial.as_bytes()),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn partial_header_line_name_too_long() {
        let partial = "N".repeat(MAX_FIELD_NAME_LENGTH + 1);
        assert_eq!(
            Err(Error::FieldNameTooLong),
            check_partial_header_line(partial.as_bytes())
        );
        let partial = "N".repeat(MAX_FIELD_NAME_LENGTH);
        assert_eq!(Ok(()), check_partial_header_line(partial.as_bytes()));
    }

    #[test]
    fn partial_header_line_value_too_long() {
        let partial = format!("X-Big: {}", "v".repeat(MAX_FIELD_VALUE_LENGTH + 1));
        assert_eq!(
            Err(Error::FieldValueTooLong),
            check_partial_header_line(partial.as_bytes())
        );
    }

    #[test]
    fn partial_header_line_value_at_limit_awaiting_line_feed() {
        let partial = format!("X-Big: {}\r", "v".repeat(MAX_FIELD_VALUE_LENGTH));
        assert_eq!(Ok(()), check_partial_header_line(partial.as_bytes()));
    }

    #[test]
    fn partial_header_line_too_long_to_be_a_header() {
        let partial = format!("X-Big:{}", "v".repeat(MAX_HEADER_LINE_LENGTH));
        assert!(matches!(
            check_partial_header_line(partial.as_bytes()),
            Err(Error::MalformedHeaderLine(_))
        ));
    }

}
