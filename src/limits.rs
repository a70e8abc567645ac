//! Maximum lengths of the different parts of a request.  Each one bounds how
//! much memory a single client can make the server hold before its request
//! is rejected.

/// Maximum length of a header name.
pub const MAX_FIELD_NAME_LENGTH: usize = 256;

/// Maximum length of a header value.
pub const MAX_FIELD_VALUE_LENGTH: usize = 80 * 1024;

/// Maximum length of the request target, fragment excluded.
pub const MAX_REQUEST_URI_LENGTH: usize = 12 * 1024;

/// Maximum length of the fragment following `#` in the request target.
pub const MAX_FRAGMENT_LENGTH: usize = 1024;

/// Maximum length of the path part of the request target.
pub const MAX_REQUEST_PATH_LENGTH: usize = 1024;

/// Maximum length of the query string part of the request target.
pub const MAX_QUERY_STRING_LENGTH: usize = 10 * 1024;

/// Maximum length of the whole request head: request line, header lines and
/// the blank line ending them, line terminators included.
pub const MAX_HEADER_LENGTH: usize = (80 + 32) * 1024;

/// Maximum number of bytes buffered while waiting for the end of the request
/// line.  Leaves room for the method, the separators and the protocol on top
/// of the longest acceptable target and fragment.
pub const MAX_REQUEST_LINE_LENGTH: usize =
    MAX_REQUEST_URI_LENGTH + MAX_FRAGMENT_LENGTH + 1024;

/// Maximum number of bytes buffered while waiting for the end of a header
/// line: the longest acceptable name and value, `": "` and CRLF.
pub const MAX_HEADER_LINE_LENGTH: usize =
    MAX_FIELD_NAME_LENGTH + MAX_FIELD_VALUE_LENGTH + 4;
