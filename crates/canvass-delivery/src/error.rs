//! Delivery error types and conversions.

use canvass_core::error::CanvassError;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected the message (status={status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage path: {0}")]
    InvalidPath(String),
}

impl From<DeliveryError> for CanvassError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::InvalidPath(path) => CanvassError::Validation {
                message: format!("invalid storage path: {path}"),
            },
            other => CanvassError::DependencyFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_rejection_is_a_dependency_failure() {
        let err: CanvassError = DeliveryError::Rejected {
            status: 401,
            body: "unauthorized".into(),
        }
        .into();
        assert!(matches!(err, CanvassError::DependencyFailure(_)));
    }

    #[test]
    fn traversal_is_a_validation_error() {
        let err: CanvassError = DeliveryError::InvalidPath("../etc/passwd".into()).into();
        assert!(matches!(err, CanvassError::Validation { .. }));
    }
}
