//! Profile enrichment and contact verification.
//!
//! External contact services sit behind two traits: [`ProfileCollector`] for
//! full-profile lookups and [`ContactVerifier`] for email/phone verification
//! and discovery. The [`EnrichmentRunner`] drives them sequentially with
//! pacing, per-call timeouts, and retry with backoff; per-candidate failures
//! never abort the stage.

mod offline;
mod runner;

use async_trait::async_trait;
use buyerscope_shared::Candidate;
use serde::{Deserialize, Serialize};

pub use offline::{HeuristicVerifier, PreviewCollector};
pub use runner::{EnrichmentRunner, EnrichmentStats};

// ---------------------------------------------------------------------------
// Collaborator error
// ---------------------------------------------------------------------------

/// Failure from an external contact service. `retryable` decides whether the
/// runner's backoff loop tries again.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CollectError {
    pub message: String,
    pub retryable: bool,
}

impl CollectError {
    /// Transient failure (timeouts, rate limits, 5xx-class conditions).
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// Permanent failure (not found, authorization, malformed input).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Profile collection
// ---------------------------------------------------------------------------

/// A candidate's full directory profile. Fields mirror the preview record;
/// anything the provider exposes beyond the preview lands here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullProfile {
    pub candidate_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Full-profile lookup for one candidate.
#[async_trait]
pub trait ProfileCollector: Send + Sync {
    async fn collect(&self, candidate: &Candidate) -> Result<FullProfile, CollectError>;
}

// ---------------------------------------------------------------------------
// Contact verification
// ---------------------------------------------------------------------------

/// Outcome of verifying a known email or phone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub valid: bool,
    /// 0.0..=1.0; gated by `min_contact_confidence` before a contact attaches.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A contact value found by discovery rather than supplied by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredContact {
    pub value: String,
    pub confidence: f64,
}

/// Email/phone verification and discovery for one candidate.
#[async_trait]
pub trait ContactVerifier: Send + Sync {
    async fn verify_email(&self, email: &str) -> Result<VerificationVerdict, CollectError>;
    async fn verify_phone(&self, phone: &str) -> Result<VerificationVerdict, CollectError>;
    async fn discover_email(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<DiscoveredContact>, CollectError>;
    async fn discover_phone(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<DiscoveredContact>, CollectError>;
}
