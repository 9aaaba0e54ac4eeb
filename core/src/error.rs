// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for manta operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

macro_rules! error_kinds {
    (
        service { $( $(#[$smeta:meta])* $svc:ident, )* }
        local { $( $(#[$lmeta:meta])* $local:ident, )* }
    ) => {
        /// The kind of error that occurred.
        ///
        /// Service kinds are named after the `code` field the service puts in
        /// its JSON error bodies. Local kinds are raised by the client itself.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorKind {
            $( $(#[$smeta])* $svc, )*
            $( $(#[$lmeta])* $local, )*
        }

        /// Wire `code` to kind, one entry per service kind.
        const SERVICE_CODES: &[(&str, ErrorKind)] = &[
            $( (stringify!($svc), ErrorKind::$svc), )*
        ];

        impl ErrorKind {
            /// The name of this kind, which is also its wire code for service kinds.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( ErrorKind::$svc => stringify!($svc), )*
                    $( ErrorKind::$local => stringify!($local), )*
                }
            }
        }
    };
}

error_kinds! {
    service {
        /// The authorization scheme is not supported.
        AuthSchemeNotAllowed,
        /// The caller is not allowed to perform the operation.
        AuthorizationFailed,
        /// The request is malformed.
        BadRequest,
        /// The uploaded content failed a checksum.
        Checksum,
        /// Another request modified the same resource concurrently.
        ConcurrentRequest,
        /// `Content-Length` does not match the body.
        ContentLength,
        /// `Content-MD5` does not match the uploaded body.
        ContentMD5Mismatch,
        /// The parent directory does not exist.
        DirectoryDoesNotExist,
        /// A directory already exists at the path.
        DirectoryExists,
        /// The directory holds too many entries.
        DirectoryLimitExceeded,
        /// The directory still has entries.
        DirectoryNotEmpty,
        /// The operation is not valid on a directory.
        DirectoryOperation,
        /// The entity already exists.
        EntityExists,
        /// The service failed internally.
        InternalError,
        /// An argument was rejected, locally or by the service.
        InvalidArgument,
        /// The auth token is invalid.
        InvalidAuthToken,
        /// The credentials are invalid.
        InvalidCredentials,
        /// The requested durability level is out of range.
        InvalidDurabilityLevel,
        /// The job description is invalid.
        InvalidJob,
        /// The job is not in a state that allows the operation.
        InvalidJobState,
        /// The key id is unknown to the service.
        InvalidKeyId,
        /// The link is invalid.
        InvalidLink,
        /// A query parameter is invalid.
        InvalidQueryParameter,
        /// The request signature does not verify.
        InvalidSignature,
        /// The metadata update is invalid.
        InvalidUpdate,
        /// No job with that id exists.
        JobNotFound,
        /// The JSON body is malformed.
        JsonFormat,
        /// The snaplink source does not exist.
        LinkNotFound,
        /// The snaplink source is not an object.
        LinkNotObject,
        /// The `Location` header is missing on a snaplink request.
        LinkRequired,
        /// The requested representation is not acceptable.
        NotAcceptable,
        /// The service is out of space.
        NotEnoughSpace,
        /// The parent of the path is not a directory.
        ParentNotDirectory,
        /// A conditional request precondition failed.
        PreconditionFailed,
        /// The pre-signed request is invalid or expired.
        PreSignedRequest,
        /// The request body is too large.
        RequestEntityTooLarge,
        /// The resource does not exist.
        ResourceNotFound,
        /// The operation is not valid on the root directory.
        RootDirectory,
        /// The request must use a secure transport.
        SecureTransportRequired,
        /// The service is temporarily unavailable.
        ServiceUnavailable,
        /// The source object of a copy or link does not exist.
        SourceObjectNotFound,
        /// The request must be made over TLS.
        SSLRequired,
        /// A job task failed to initialize.
        TaskInit,
        /// A job task failed in user code.
        UserTask,
        /// The upload did not complete in time.
        UploadTimeout,
        /// The user does not exist.
        UserDoesNotExist,
    }
    local {
        /// The private key type is not supported.
        UnsupportedKey,
        /// The response body failed an integrity check.
        CorruptResult,
        /// The connection to the service was refused.
        ConnectionRefused,
        /// The request or response timed out.
        Timeout,
        /// Any other transport failure.
        Transport,
        /// Unexpected local failure.
        Unexpected,
        /// The service returned an error this client does not recognize.
        UnknownError,
    }
}

impl ErrorKind {
    /// Look up a service error kind by its wire `code`.
    ///
    /// Returns `None` for codes the client does not recognize.
    pub fn from_code(code: &str) -> Option<ErrorKind> {
        SERVICE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// Check if this kind is worth retrying.
    ///
    /// Only network-level and integrity-level failures are transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectionRefused | ErrorKind::Timeout | ErrorKind::CorruptResult
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the HTTP status of the response that caused this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the raw response body that caused this error.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the raw response body, if this error came from a response.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Check if this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

// Convenience constructors
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create an unsupported key error
    pub fn unsupported_key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedKey, message)
    }

    /// Create a corrupt result error
    pub fn corrupt_result(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptResult, message)
    }

    /// Create a connection refused error
    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionRefused, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an unknown service error that keeps the raw status and body.
    pub fn unknown(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(
            ErrorKind::UnknownError,
            format!("unrecognized error response with status {status}"),
        )
        .with_status(status)
        .with_body(body)
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::invalid_argument(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
