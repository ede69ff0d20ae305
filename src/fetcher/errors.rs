use reqwest::StatusCode;
use thiserror::Error;

/// Status codes worth another attempt: rate limiting and gateway hiccups.
pub const RETRIABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: StatusCode, retriable: bool },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn http(status: StatusCode) -> Self {
        Self::Http {
            status,
            retriable: RETRIABLE_STATUSES.contains(&status),
        }
    }

    pub fn should_retry(&self) -> bool {
        match self {
            Self::Connect(_) => true,
            Self::ConnectTimeout => true,
            Self::Http { retriable, .. } => *retriable,

            // The request timeout is the per-section cancellation boundary.
            Self::RequestTimeout => false,
            Self::InvalidUrl(_) => false,
            Self::Client(_) => false,
            Self::RedirectLoop => false,
            Self::BodyTooLarge(_) => false,
            Self::UnsupportedContentType(_) => false,
            Self::Io(_) => false,
            Self::RetriesExhausted { .. } => false,
            Self::Unknown(_) => false,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::http(status)
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Io(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        for status in [429, 500, 502, 503, 504] {
            let err = FetchError::http(StatusCode::from_u16(status).unwrap());
            assert!(err.should_retry(), "{status} should be retried");
        }
        for status in [400, 403, 404, 501] {
            let err = FetchError::http(StatusCode::from_u16(status).unwrap());
            assert!(!err.should_retry(), "{status} should not be retried");
        }
    }

    #[test]
    fn test_exhausted_is_final() {
        let err = FetchError::RetriesExhausted {
            attempts: 4,
            last: Box::new(FetchError::http(StatusCode::SERVICE_UNAVAILABLE)),
        };
        assert!(!err.should_retry());
        assert_eq!(err.to_string(), "gave up after 4 attempts: http error 503 Service Unavailable");
    }
}
