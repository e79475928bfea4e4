use serde::{Deserialize, Serialize};

/// Unified error type for every call made through the API client.
///
/// Failures fall into two broad classes:
/// - transport failures ([`Transport`](Self::Transport), [`Timeout`](Self::Timeout)):
///   the server was unreachable, or answered with a non-2xx status and a body that
///   carried no structured error;
/// - API failures ([`Api`](Self::Api)): the body was an error envelope such as
///   `{"Error": "..."}`, regardless of the HTTP status.
///
/// All variants are serializable for structured error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ClientError {
    /// The request did not complete with a usable response.
    ///
    /// `status` is `None` for connection-level failures (DNS, refused, reset)
    /// and `Some` when a non-2xx response carried no error envelope.
    Transport {
        /// HTTP status code, if a response was received.
        status: Option<u16>,
        /// Status line or error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The server answered with an error envelope.
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message carried by the envelope.
        message: String,
    },

    /// A successful response body could not be decoded.
    Parse {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    Serialization {
        /// Details about the serialization failure.
        detail: String,
    },

    /// The configured base URL could not be combined with an endpoint path.
    InvalidUrl {
        /// Details about the URL failure.
        detail: String,
    },
}

impl ClientError {
    /// 是否为预期行为（服务端拒绝、参数错误等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// HTTP status attached to the error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message a form would show inline for this error.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Api { message, .. } => message,
            Self::Transport { detail, .. }
            | Self::Timeout { detail }
            | Self::Parse { detail }
            | Self::Serialization { detail }
            | Self::InvalidUrl { detail } => detail,
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport {
                status: Some(code),
                detail,
            } => write!(f, "Transport error (HTTP {code}): {detail}"),
            Self::Transport {
                status: None,
                detail,
            } => write!(f, "Transport error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::Api { message, .. } => write!(f, "API error: {message}"),
            Self::Parse { detail } => write!(f, "Parse error: {detail}"),
            Self::Serialization { detail } => write!(f, "Serialization error: {detail}"),
            Self::InvalidUrl { detail } => write!(f, "Invalid URL: {detail}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
