//! AI enhancement engine
//!
//! One enhancement is a round-trip: serialize the form into a prompt, call
//! the text-improvement model, recover structured JSON from the free-form
//! reply, and reconcile the suggestions back into the live form under user
//! control. The prompt/parse/merge pipeline is shared between the live
//! network path and the manual paste-a-response path.

pub mod client;
pub mod parser;
pub mod prompt;
pub mod reconcile;

pub use client::AiClient;
pub use reconcile::{
    default_prd_selection, default_review_selection, AcceptedChanges, ItemSelection,
    PrdAcceptedChanges, PrdSelection, ReviewSelection,
};

use thiserror::Error;

/// Failures of the enhancement pipeline. None of these mutate the form;
/// callers surface the message and leave the document untouched.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// No API credential configured on the server
    #[error("AI enhancement is not configured: missing API key")]
    CredentialMissing,

    /// Could not reach the upstream model API
    #[error("AI request failed: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("AI request failed ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The model reply contained no usable text block
    #[error("Empty response from AI")]
    EmptyResponse,

    /// All parse recovery strategies were exhausted; `raw` keeps the
    /// original reply for diagnostics
    #[error("AI returned an unexpected response format. Please try again.")]
    MalformedResponse { raw: String },
}

impl EnhanceError {
    /// HTTP status this error maps to when surfaced through the API
    pub fn status_code(&self) -> u16 {
        match self {
            EnhanceError::CredentialMissing => 503,
            EnhanceError::Upstream { status, .. } => *status,
            EnhanceError::Network(_) => 502,
            EnhanceError::EmptyResponse | EnhanceError::MalformedResponse { .. } => 502,
        }
    }
}
