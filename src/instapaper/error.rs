use thiserror::Error;

use super::PublishOutcome;

/// Instapaper rejected the stored credentials. No further item can succeed,
/// so this aborts the whole sync run.
#[derive(Debug, Error)]
#[error(
    "Instapaper authentication failed - check your email and password\n\
     Run 'goodlinks2insta init' to update your credentials"
)]
pub struct AuthenticationFailed;

/// Typed failure of a single publish attempt, enabling retry classification.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Authentication rejected (status 403)")]
    AuthRejected,

    #[error("Bad request (status 400)")]
    BadRequest,

    #[error("Server error (status {0})")]
    Server(u16),

    #[error("Instapaper returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Request timeout")]
    Timeout(#[source] reqwest::Error),

    #[error("Connection error")]
    Connect(#[source] reqwest::Error),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl PublishError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::AuthRejected,
            400 => Self::BadRequest,
            s if s >= 500 => Self::Server(s),
            s => Self::UnexpectedStatus(s),
        }
    }

    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Network(e)
        }
    }

    /// Whether this failure is worth retrying.
    ///
    /// Authentication rejections are reported as permanent here; the
    /// publisher escalates them to [`AuthenticationFailed`] separately.
    pub fn outcome(&self) -> PublishOutcome {
        match self {
            Self::Server(_) | Self::Timeout(_) | Self::Connect(_) => {
                PublishOutcome::TransientFailure
            }
            Self::AuthRejected
            | Self::BadRequest
            | Self::UnexpectedStatus(_)
            | Self::Network(_) => PublishOutcome::PermanentFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_403_is_auth_rejection() {
        assert!(matches!(PublishError::from_status(403), PublishError::AuthRejected));
    }

    #[test]
    fn test_400_permanent() {
        let e = PublishError::from_status(400);
        assert!(matches!(e, PublishError::BadRequest));
        assert_eq!(e.outcome(), PublishOutcome::PermanentFailure);
    }

    #[test]
    fn test_5xx_transient() {
        for status in [500, 502, 503, 599] {
            let e = PublishError::from_status(status);
            assert_eq!(e.outcome(), PublishOutcome::TransientFailure, "status {status}");
        }
    }

    #[test]
    fn test_other_statuses_permanent() {
        for status in [301, 401, 404, 429] {
            let e = PublishError::from_status(status);
            assert!(matches!(e, PublishError::UnexpectedStatus(s) if s == status));
            assert_eq!(e.outcome(), PublishOutcome::PermanentFailure);
        }
    }

    #[test]
    fn test_server_error_message() {
        assert_eq!(PublishError::Server(503).to_string(), "Server error (status 503)");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::Client::new()
            .post(format!("http://{addr}/api/add"))
            .send()
            .await
            .unwrap_err();
        let e = PublishError::from_reqwest(err);
        assert!(matches!(e, PublishError::Connect(_)));
        assert_eq!(e.outcome(), PublishOutcome::TransientFailure);
    }
}
