//! Error types shared by the remote service wrappers.

use thiserror::Error;

/// Failures surfaced by the analysis and BaaS wrappers.
///
/// The result mapper never produces these; it substitutes defaults instead.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("At least one image (front or back) is required")]
    MissingImage,

    #[error("Failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: wreq::Error,
    },

    #[error("Server error {status} from {endpoint}: {body}")]
    Server { endpoint: String, status: u16, body: String },

    #[error("Invalid JSON from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not signed in. Run `veriscan login` first.")]
    NotSignedIn,

    #[error("BaaS is not configured: set baas_url and baas_key")]
    BaasNotConfigured,

    #[error("Account created for {email}; confirm the email address, then run `veriscan login`")]
    ConfirmationRequired { email: String },
}

impl ServiceError {
    /// Returns the HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
