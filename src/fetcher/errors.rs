use reqwest::StatusCode;
use thiserror::Error;

/// Why a search page or image download produced nothing usable.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("malformed url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// DNS failure, refused or reset connection.
    #[error("could not reach host: {0}")]
    Unreachable(String),

    #[error("timed out connecting")]
    ConnectTimeout,

    #[error("timed out waiting for response")]
    RequestTimeout,

    #[error("redirect limit exceeded")]
    RedirectLoop,

    #[error("server answered {status}")]
    Http { status: StatusCode },

    #[error("payload of {0} bytes exceeds the download limit")]
    BodyTooLarge(u64),

    #[error("failed reading body: {0}")]
    Body(String),

    #[error("http client setup: {0}")]
    Setup(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            };
        }
        if err.is_redirect() {
            return Self::RedirectLoop;
        }
        if let Some(status) = err.status() {
            return Self::Http { status };
        }

        let detail = err.to_string();
        if err.is_connect() || err.is_request() {
            Self::Unreachable(detail)
        } else if err.is_body() || err.is_decode() {
            Self::Body(detail)
        } else {
            Self::Other(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_timeouts() {
        assert!(FetchError::ConnectTimeout.is_timeout());
        assert!(FetchError::RequestTimeout.is_timeout());
        assert!(!FetchError::Unreachable("no such host".into()).is_timeout());
        assert!(
            !FetchError::Http {
                status: StatusCode::NOT_FOUND
            }
            .is_timeout()
        );
    }

    #[test]
    fn messages_carry_status_and_size() {
        let err = FetchError::Http {
            status: StatusCode::FORBIDDEN,
        };
        assert_eq!(err.to_string(), "server answered 403 Forbidden");
        assert_eq!(
            FetchError::BodyTooLarge(42).to_string(),
            "payload of 42 bytes exceeds the download limit"
        );
    }
}
