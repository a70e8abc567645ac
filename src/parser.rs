use super::error::Error;
use super::grammar::{
    self,
    Line,
};
use super::limits::{
    MAX_HEADER_LENGTH,
    MAX_HEADER_LINE_LENGTH,
    MAX_REQUEST_LINE_LENGTH,
};
use super::params;
use super::request::Request;

// Extra room on top of a line limit for its terminator, so that a line
// over the limit is always recognized as such by the partial-line checks.
const TERMINATOR_ALLOWANCE: usize = 2;

fn line_text(line: &[u8]) -> Result<&str, Error> {
    let line = grammar::strip_terminator(line);
    std::str::from_utf8(line)
        .map_err(|_| Error::LineNotValidText(line.to_vec()))
}

#[derive(Debug, Eq, PartialEq)]
enum ParserState {
    Body(usize),
    Complete,
    Failed(Error),
    Headers,
    RequestLine,
}

/// Whether or not a request has been completely received.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseStatus {
    Complete,
    Incomplete,
}

enum ParseStatusInternal {
    CompletePart,
    CompleteWhole,
    Incomplete,
}

/// Incremental parser for one request on a connection.
///
/// Bytes are handed to [`feed`](#method.feed) in whatever pieces the
/// connection delivers them.  The parser works through the request line,
/// the headers and the body, filling in a [`Request`](struct.Request.html)
/// as it goes, and never needs more than the bytes already given to it.
/// Any bytes following a complete request are kept aside as the
/// [`remainder`](#method.remainder), to begin the next request on the
/// connection.
#[derive(Debug)]
pub struct Parser {
    header_length: usize,

    /// Largest `Content-Length` accepted, if any.  A request declaring more
    /// is rejected with [`Error::BodyTooLong`] before any of its body is
    /// buffered.
    pub max_body_size: Option<usize>,

    pending: Vec<u8>,
    remainder: Vec<u8>,
    request: Request,
    state: ParserState,
}

impl Parser {
    // Move up to `limit` bytes of the current line from the given input into
    // the pending line buffer.  Returns whether the whole line, terminator
    // included, is now buffered, and how much input was consumed.
    fn buffer_line(
        &mut self,
        raw_message: &[u8],
        limit: usize,
    ) -> (bool, usize) {
        let (line_complete, consumed) = match raw_message.iter().position(|&byte| byte == b'\n') {
            Some(line_end) => (true, line_end + 1),
            None => (false, raw_message.len()),
        };
        let room = limit.saturating_sub(self.pending.len());
        if consumed > room {
            self.pending.extend(&raw_message[..room]);
            (false, consumed)
        } else {
            self.pending.extend(&raw_message[..consumed]);
            (line_complete, consumed)
        }
    }

    fn check_header_length(&self, bytes: usize) -> Result<(), Error> {
        if self.header_length + bytes > MAX_HEADER_LENGTH {
            Err(Error::HeadersTooLong)
        } else {
            Ok(())
        }
    }

    /// Release every buffer held by the parser, including the body of the
    /// request.
    pub fn close(&mut self) {
        self.request.close();
        self.pending = Vec::new();
        self.remainder = Vec::new();
    }

    fn count_header_bytes(&mut self, bytes: usize) -> Result<(), Error> {
        self.check_header_length(bytes)?;
        self.header_length += bytes;
        Ok(())
    }

    fn end_headers(&mut self) -> Result<ParseStatusInternal, Error> {
        params::derive_server_name(&mut self.request.params);
        let content_length = self.request.content_length();
        match self.max_body_size {
            Some(max_body_size) if content_length > max_body_size => {
                return Err(Error::BodyTooLong);
            },
            _ => (),
        }
        log::debug!(
            "headers complete for {} ({} header bytes, {} body bytes expected)",
            self.request,
            self.header_length,
            content_length
        );
        if content_length == 0 {
            Ok(ParseStatusInternal::CompleteWhole)
        } else {
            self.state = ParserState::Body(content_length);
            Ok(ParseStatusInternal::CompletePart)
        }
    }

    /// The reason the request was rejected, if it was.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            ParserState::Failed(error) => Some(error),
            _ => None,
        }
    }

    fn fail(
        &mut self,
        error: Error,
    ) {
        log::warn!("rejecting request: {}", error);
        self.close();
        self.state = ParserState::Failed(error);
    }

    /// Advance the parser with the next bytes received from the connection.
    ///
    /// Returns [`ParseStatus::Complete`] once the request line, headers and
    /// body have all been received.  Bytes given after that point are added
    /// to the [`remainder`](#method.remainder).
    ///
    /// # Errors
    ///
    /// The request is invalid.  The parser keeps the error, releases its
    /// buffers, and returns the same error from every later call.
    pub fn feed<T>(
        &mut self,
        raw_message: T,
    ) -> Result<ParseStatus, Error>
        where T: AsRef<[u8]>
    {
        let result = self.parse(raw_message.as_ref());
        if let Err(error) = &result {
            if !self.is_failed() {
                self.fail(error.clone());
            }
        }
        result
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, ParserState::Complete)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, ParserState::Failed(_))
    }

    #[must_use]
    pub fn new() -> Self {
        Self{
            header_length: 0,
            max_body_size: None,
            pending: Vec::new(),
            remainder: Vec::new(),
            request: Request::new(),
            state: ParserState::RequestLine,
        }
    }

    fn parse(
        &mut self,
        raw_message: &[u8],
    ) -> Result<ParseStatus, Error> {
        let mut total_consumed = 0;
        loop {
            let raw_message_remainder = &raw_message[total_consumed..];
            let (parse_status, consumed) = match self.state {
                ParserState::Body(content_length) => {
                    self.parse_message_for_body(raw_message_remainder, content_length)
                },
                ParserState::Complete => {
                    self.remainder.extend(raw_message_remainder);
                    return Ok(ParseStatus::Complete);
                },
                ParserState::Failed(ref error) => {
                    return Err(error.clone());
                },
                ParserState::Headers => {
                    self.parse_message_for_headers(raw_message_remainder)?
                },
                ParserState::RequestLine => {
                    self.parse_message_for_request_line(raw_message_remainder)?
                },
            };
            total_consumed += consumed;
            match parse_status {
                ParseStatusInternal::CompletePart => (),
                ParseStatusInternal::CompleteWhole => {
                    log::debug!("request complete: {}", self.request);
                    self.state = ParserState::Complete;
                },
                ParseStatusInternal::Incomplete => {
                    return Ok(ParseStatus::Incomplete);
                },
            };
        }
    }

    fn parse_message_for_body(
        &mut self,
        raw_message: &[u8],
        content_length: usize,
    ) -> (ParseStatusInternal, usize) {
        let needed = content_length.saturating_sub(self.request.body.len());
        if raw_message.len() >= needed {
            self.request.body.extend(&raw_message[..needed]);
            (ParseStatusInternal::CompleteWhole, needed)
        } else {
            self.request.body.extend(raw_message);
            (ParseStatusInternal::Incomplete, raw_message.len())
        }
    }

    fn parse_message_for_headers(
        &mut self,
        raw_message: &[u8],
    ) -> Result<(ParseStatusInternal, usize), Error> {
        let (line_complete, consumed) = self.buffer_line(
            raw_message,
            MAX_HEADER_LINE_LENGTH + TERMINATOR_ALLOWANCE
        );
        if !line_complete {
            grammar::check_partial_header_line(&self.pending)?;
            self.check_header_length(self.pending.len())?;
            return Ok((ParseStatusInternal::Incomplete, consumed));
        }
        let line = std::mem::take(&mut self.pending);
        let header_line = grammar::parse_header_line(
            grammar::strip_terminator(&line)
        )?;
        self.count_header_bytes(line.len())?;
        match header_line {
            Line::Blank => Ok((self.end_headers()?, consumed)),
            Line::Header {
                name,
                value,
            } => {
                log::trace!("header {}", name);
                params::apply_header(
                    &mut self.request.params,
                    name,
                    &String::from_utf8_lossy(value)
                );
                Ok((ParseStatusInternal::CompletePart, consumed))
            },
        }
    }

    fn parse_message_for_request_line(
        &mut self,
        raw_message: &[u8],
    ) -> Result<(ParseStatusInternal, usize), Error> {
        let (line_complete, consumed) = self.buffer_line(
            raw_message,
            MAX_REQUEST_LINE_LENGTH + TERMINATOR_ALLOWANCE
        );
        if !line_complete {
            grammar::check_partial_request_line(&self.pending)?;
            self.check_header_length(self.pending.len())?;
            return Ok((ParseStatusInternal::Incomplete, consumed));
        }
        let line = std::mem::take(&mut self.pending);
        self.count_header_bytes(line.len())?;
        let request_line = grammar::parse_request_line(line_text(&line)?)?;
        log::debug!(
            "request line: {} {}",
            request_line.method,
            request_line.uri
        );
        params::apply_request_line(&mut self.request.params, &request_line);
        self.request.verb = request_line.method.into();
        self.request.path = request_line.path.into();
        self.state = ParserState::Headers;
        Ok((ParseStatusInternal::CompletePart, consumed))
    }

    /// Bytes received after the end of the request, which belong to the
    /// next request on the connection.
    #[must_use]
    pub fn remainder(&self) -> &[u8] {
        &self.remainder
    }

    /// The request as parsed so far.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Hand over the bytes received after the end of the request.
    pub fn take_remainder(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.remainder)
    }

    /// Hand over the request, once it is complete.
    pub fn take_request(&mut self) -> Option<Request> {
        if self.is_complete() {
            Some(std::mem::take(&mut self.request))
        } else {
            None
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
