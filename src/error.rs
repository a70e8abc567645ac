/// This is the enumeration of all the reasons a request can be rejected as
/// invalid.  Every variant belongs to the same category: the client sent
/// something the server can not process, and the connection carrying the
/// request should be closed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The declared `Content-Length` exceeds the body size limit configured
    /// on the parser.
    #[error("body too long")]
    BodyTooLong,

    /// A header name is longer than
    /// [`MAX_FIELD_NAME_LENGTH`](limits/constant.MAX_FIELD_NAME_LENGTH.html).
    #[error("header name too long")]
    FieldNameTooLong,

    /// A header value is longer than
    /// [`MAX_FIELD_VALUE_LENGTH`](limits/constant.MAX_FIELD_VALUE_LENGTH.html).
    #[error("header value too long")]
    FieldValueTooLong,

    /// The fragment of the request target is longer than
    /// [`MAX_FRAGMENT_LENGTH`](limits/constant.MAX_FRAGMENT_LENGTH.html).
    #[error("fragment too long")]
    FragmentTooLong,

    /// The request line and headers together are longer than
    /// [`MAX_HEADER_LENGTH`](limits/constant.MAX_HEADER_LENGTH.html).
    #[error("headers too long")]
    HeadersTooLong,

    /// The attached bytes are a line of the request head which is not valid
    /// text.
    #[error("request line or header is not valid text")]
    LineNotValidText(Vec<u8>),

    /// The attached line was expected to be a header but does not have the
    /// form `Name: value`.
    #[error("expected header: {0}")]
    MalformedHeaderLine(String),

    /// The attached line was expected to be a request line but does not have
    /// the form `METHOD target HTTP/version`.
    #[error("no valid request line found: {0}")]
    MalformedRequestLine(String),

    /// No valid path could be found in the attached request target.
    #[error("no valid path found in {0}")]
    MalformedUri(String),

    /// The request line has no method.
    #[error("no method specified")]
    MissingMethod,

    /// The request line has no target.
    #[error("no URI specified")]
    MissingUri,

    /// The path of the request target is longer than
    /// [`MAX_REQUEST_PATH_LENGTH`](limits/constant.MAX_REQUEST_PATH_LENGTH.html).
    #[error("request path too long")]
    PathTooLong,

    /// The query string of the request target is longer than
    /// [`MAX_QUERY_STRING_LENGTH`](limits/constant.MAX_QUERY_STRING_LENGTH.html).
    #[error("query string too long")]
    QueryTooLong,

    /// The request target is longer than
    /// [`MAX_REQUEST_URI_LENGTH`](limits/constant.MAX_REQUEST_URI_LENGTH.html).
    #[error("URI too long")]
    UriTooLong,
}
