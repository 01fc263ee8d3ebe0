// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::frame::Exception;
use alloc::string::{String, ToString};
use core::fmt;

/// Frame codec error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Invalid coil value
    CoilValue(u16),
    /// Invalid buffer size
    BufferSize,
    /// Invalid function code
    FnCode(u8),
    /// Invalid exception code
    ExceptionCode(u8),
    /// Invalid exception function code
    ExceptionFnCode(u8),
    /// Invalid CRC
    Crc(u16, u16),
    /// Invalid byte count
    ByteCount(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            CoilValue(v) => write!(f, "Invalid coil value: {v}"),
            BufferSize => write!(f, "Invalid buffer size"),
            FnCode(fn_code) => write!(f, "Invalid function code: 0x{fn_code:0>2X}"),
            ExceptionCode(code) => write!(f, "Invalid exception code: 0x{code:0>2X}"),
            ExceptionFnCode(code) => write!(f, "Invalid exception function code: 0x{code:0>2X}"),
            Crc(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ByteCount(cnt) => write!(f, "Invalid byte count: {cnt}"),
        }
    }
}

impl core::error::Error for Error {}

/// A failure detected by the client itself, before or after talking to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// Fewer bytes than the smallest valid frame were received.
    #[error("Response length too short")]
    ResponseTooShort(usize),
    /// The trailing CRC does not match the frame.
    #[error("Error check fails")]
    ErrorCheck { expected: u16, actual: u16 },
    /// The function byte is neither the request's nor its exception code.
    #[error("Illegal error code")]
    IllegalErrorCode(u8),
    /// The number of values does not match the declared quantity.
    #[error("Incorrect number of arguments")]
    ArgumentCount { expected: u16, actual: usize },
    /// A CRC-valid frame that does not match its own layout.
    #[error("Malformed response")]
    MalformedResponse(#[source] Error),
    /// The request does not fit into an RTU frame.
    #[error("Invalid request")]
    InvalidRequest(#[source] Error),
}

impl Failure {
    /// Numeric code, always negative to stay apart from device exception codes.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::ResponseTooShort(_) => -1,
            Self::ErrorCheck { .. } => -2,
            Self::IllegalErrorCode(_) => -3,
            Self::ArgumentCount { .. } => -4,
            Self::MalformedResponse(_) | Self::InvalidRequest(_) => -5,
        }
    }
}

/// What went wrong in a request/response exchange.
#[derive(Debug)]
pub enum ErrorKind<E> {
    /// Local validation failure.
    Local(Failure),
    /// The device answered with an exception frame carrying this code.
    Device(u8),
    /// The transport failed.
    Transport(E),
}

/// The error returned by every [`Client`](crate::Client) operation.
///
/// Request and response bytes are captured as lower-case hex strings
/// whenever they were available at the point of failure.
#[derive(Debug)]
pub struct ProtocolError<E> {
    kind: ErrorKind<E>,
    message: String,
    request: Option<String>,
    response: Option<String>,
}

impl<E> ProtocolError<E>
where
    E: core::error::Error + 'static,
{
    /// Create an error with an explicit message.
    pub fn new(kind: ErrorKind<E>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request: None,
            response: None,
        }
    }

    /// Create a local failure, described by its own message.
    pub fn local(failure: Failure) -> Self {
        Self::new(ErrorKind::Local(failure), failure.to_string())
    }

    /// Create a device exception, described by the exception taxonomy.
    pub fn device(code: u8) -> Self {
        Self::new(ErrorKind::Device(code), Exception::describe(code))
    }

    /// Wrap a transport error, the message is taken from it.
    pub fn transport(err: E) -> Self {
        let message = err.to_string();
        Self::new(ErrorKind::Transport(err), message)
    }

    /// Capture the request frame.
    #[must_use]
    pub fn with_request(mut self, request: &[u8]) -> Self {
        self.request = Some(hex::encode(request));
        self
    }

    /// Capture the received bytes.
    #[must_use]
    pub fn with_response(mut self, response: &[u8]) -> Self {
        self.response = Some(hex::encode(response));
        self
    }

    /// What went wrong.
    pub const fn kind(&self) -> &ErrorKind<E> {
        &self.kind
    }

    /// Consume the error, e.g. to take the transport error out of it.
    pub fn into_kind(self) -> ErrorKind<E> {
        self.kind
    }

    /// Human readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Device exception code, negative local failure code, or `0` for transport failures.
    pub const fn code(&self) -> i32 {
        match &self.kind {
            ErrorKind::Local(failure) => failure.code(),
            ErrorKind::Device(code) => *code as i32,
            ErrorKind::Transport(_) => 0,
        }
    }

    /// The captured request as hex.
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    /// The captured response as hex.
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// `true` if the device answered with an exception frame.
    pub const fn is_device_exception(&self) -> bool {
        matches!(self.kind, ErrorKind::Device(_))
    }
}

impl<E> fmt::Display for ProtocolError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(request) = &self.request {
            write!(f, " (request: {request})")?;
        }
        if let Some(response) = &self.response {
            write!(f, " (response: {response})")?;
        }
        Ok(())
    }
}

impl<E> core::error::Error for ProtocolError<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Local(failure) => core::error::Error::source(failure),
            ErrorKind::Device(_) => None,
            ErrorKind::Transport(err) => Some(err),
        }
    }
}
