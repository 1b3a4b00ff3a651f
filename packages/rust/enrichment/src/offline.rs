//! Offline enrichment: no external services, preview data only.
//!
//! These are the default implementations the CLI runs with. The collector
//! treats the preview record as the full profile; the verifier applies format
//! checks and pattern-based discovery with honest (low) confidence values.

use async_trait::async_trait;
use buyerscope_shared::Candidate;

use crate::{
    CollectError, ContactVerifier, DiscoveredContact, FullProfile, ProfileCollector,
    VerificationVerdict,
};

/// Confidence for a format-checked (not externally verified) email.
const EMAIL_FORMAT_CONFIDENCE: f64 = 0.85;
/// Confidence for a format-checked phone number.
const PHONE_FORMAT_CONFIDENCE: f64 = 0.75;
/// Confidence for a pattern-guessed address. Below the default attachment
/// floor on purpose; a guess is not a contact.
const DISCOVERY_CONFIDENCE: f64 = 0.55;

/// Echoes the candidate's preview fields as the full profile.
pub struct PreviewCollector;

#[async_trait]
impl ProfileCollector for PreviewCollector {
    async fn collect(&self, candidate: &Candidate) -> Result<FullProfile, CollectError> {
        Ok(FullProfile {
            candidate_id: candidate.id.clone(),
            title: Some(candidate.title.clone()).filter(|t| !t.trim().is_empty()),
            department: candidate.department.clone(),
            location: candidate.location.clone(),
            connections: candidate.connections,
            followers: candidate.followers,
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
        })
    }
}

/// Format-based verification and name-pattern email discovery.
pub struct HeuristicVerifier {
    company_domain: Option<String>,
}

impl HeuristicVerifier {
    pub fn new(company_domain: Option<String>) -> Self {
        Self { company_domain }
    }
}

fn email_is_well_formed(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn phone_digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// "Jane Q. Doe" becomes `jane.doe`; empty when no usable name parts remain.
fn email_local_part(name: &str) -> Option<String> {
    let parts: Vec<String> = name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|part| part.len() > 1)
        .collect();

    match parts.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        [first, .., last] => Some(format!("{first}.{last}")),
    }
}

#[async_trait]
impl ContactVerifier for HeuristicVerifier {
    async fn verify_email(&self, email: &str) -> Result<VerificationVerdict, CollectError> {
        if email_is_well_formed(email) {
            Ok(VerificationVerdict {
                valid: true,
                confidence: EMAIL_FORMAT_CONFIDENCE,
                details: Some("format check only".into()),
            })
        } else {
            Ok(VerificationVerdict {
                valid: false,
                confidence: 0.0,
                details: Some("malformed address".into()),
            })
        }
    }

    async fn verify_phone(&self, phone: &str) -> Result<VerificationVerdict, CollectError> {
        if phone_digit_count(phone) >= 7 {
            Ok(VerificationVerdict {
                valid: true,
                confidence: PHONE_FORMAT_CONFIDENCE,
                details: Some("format check only".into()),
            })
        } else {
            Ok(VerificationVerdict {
                valid: false,
                confidence: 0.0,
                details: Some("too few digits".into()),
            })
        }
    }

    async fn discover_email(
        &self,
        candidate: &Candidate,
    ) -> Result<Option<DiscoveredContact>, CollectError> {
        let Some(domain) = &self.company_domain else {
            return Ok(None);
        };
        let Some(local) = email_local_part(&candidate.name) else {
            return Ok(None);
        };
        Ok(Some(DiscoveredContact {
            value: format!("{local}@{domain}"),
            confidence: DISCOVERY_CONFIDENCE,
        }))
    }

    async fn discover_phone(
        &self,
        _candidate: &Candidate,
    ) -> Result<Option<DiscoveredContact>, CollectError> {
        Ok(None)
    }
}
