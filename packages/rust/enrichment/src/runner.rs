//! Sequential enrichment driver: pacing, per-call timeouts, retry with
//! exponential backoff, and cost accounting.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use buyerscope_shared::{
    BuyerGroupMember, ContactInfo, CostLedger, CostsConfig, DiscoveryConfig, EnrichmentConfig,
};
use tracing::{debug, instrument, warn};

use crate::{CollectError, ContactVerifier, ProfileCollector};

/// Stage counters surfaced in the run report.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichmentStats {
    pub succeeded: u32,
    pub failed: u32,
}

/// Drives profile collection and contact verification for a selected group,
/// one candidate at a time.
pub struct EnrichmentRunner {
    collector: Arc<dyn ProfileCollector>,
    verifier: Arc<dyn ContactVerifier>,
    config: EnrichmentConfig,
    costs: CostsConfig,
}

impl EnrichmentRunner {
    pub fn new(
        collector: Arc<dyn ProfileCollector>,
        verifier: Arc<dyn ContactVerifier>,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            collector,
            verifier,
            config: config.enrichment.clone(),
            costs: config.costs.clone(),
        }
    }

    /// Enrich every member in place. A member whose enrichment fails keeps its
    /// preview data and is annotated; the stage always completes.
    #[instrument(skip_all, fields(members = members.len()))]
    pub async fn enrich_group(
        &self,
        members: &mut [BuyerGroupMember],
        ledger: &mut CostLedger,
    ) -> EnrichmentStats {
        let mut stats = EnrichmentStats::default();

        for (index, member) in members.iter_mut().enumerate() {
            if index > 0 && self.config.pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.pacing_ms)).await;
            }

            match self.enrich_member(member, ledger).await {
                Ok(contact) => {
                    member.contact = Some(contact);
                    stats.succeeded += 1;
                }
                Err(error) => {
                    warn!(
                        candidate = %member.candidate.name,
                        %error,
                        "enrichment failed; keeping preview data"
                    );
                    member.enrichment_error = Some(error.to_string());
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    async fn enrich_member(
        &self,
        member: &BuyerGroupMember,
        ledger: &mut CostLedger,
    ) -> Result<ContactInfo, CollectError> {
        let candidate = &member.candidate;

        let profile = self
            .with_retry("collect profile", || self.collector.collect(candidate))
            .await?;
        ledger.record_profile(self.costs.profile_usd);

        let mut contact = ContactInfo::default();
        let floor = self.config.min_contact_confidence;

        // Email: verify a known address, otherwise try discovery. Verifier
        // failures degrade the channel rather than the member.
        match profile.email.clone().or_else(|| candidate.email.clone()) {
            Some(email) => {
                match self
                    .with_retry("verify email", || self.verifier.verify_email(&email))
                    .await
                {
                    Ok(verdict) => {
                        ledger.record_email_check(self.costs.email_check_usd);
                        if verdict.valid && verdict.confidence >= floor {
                            contact.email = Some(email);
                            contact.email_confidence = Some(verdict.confidence);
                        }
                    }
                    Err(error) => warn!(%error, "email verification failed"),
                }
            }
            None => {
                match self
                    .with_retry("discover email", || self.verifier.discover_email(candidate))
                    .await
                {
                    Ok(found) => {
                        ledger.record_email_check(self.costs.email_check_usd);
                        if let Some(found) = found {
                            if found.confidence >= floor {
                                contact.email = Some(found.value);
                                contact.email_confidence = Some(found.confidence);
                            }
                        }
                    }
                    Err(error) => warn!(%error, "email discovery failed"),
                }
            }
        }

        // Phone: same shape as the email channel.
        match profile.phone.clone().or_else(|| candidate.phone.clone()) {
            Some(phone) => {
                match self
                    .with_retry("verify phone", || self.verifier.verify_phone(&phone))
                    .await
                {
                    Ok(verdict) => {
                        ledger.record_phone_check(self.costs.phone_check_usd);
                        if verdict.valid && verdict.confidence >= floor {
                            contact.phone = Some(phone);
                            contact.phone_confidence = Some(verdict.confidence);
                        }
                    }
                    Err(error) => warn!(%error, "phone verification failed"),
                }
            }
            None => {
                match self
                    .with_retry("discover phone", || self.verifier.discover_phone(candidate))
                    .await
                {
                    Ok(found) => {
                        ledger.record_phone_check(self.costs.phone_check_usd);
                        if let Some(found) = found {
                            if found.confidence >= floor {
                                contact.phone = Some(found.value);
                                contact.phone_confidence = Some(found.confidence);
                            }
                        }
                    }
                    Err(error) => warn!(%error, "phone discovery failed"),
                }
            }
        }

        Ok(contact)
    }

    /// Run one external call with a timeout, retrying transient failures with
    /// exponential backoff. Permanent failures return immediately.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, CollectError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollectError>>,
    {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let mut attempt: u32 = 0;

        loop {
            let error = match tokio::time::timeout(timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) => error,
                Err(_) => CollectError::retryable(format!(
                    "{operation} timed out after {}s",
                    self.config.timeout_secs
                )),
            };

            if !error.retryable || attempt >= self.config.max_retries {
                return Err(error);
            }

            let backoff = Duration::from_millis(
                self.config
                    .retry_backoff_ms
                    .saturating_mul(1u64 << attempt.min(16)),
            );
            debug!(
                operation,
                attempt = attempt + 1,
                backoff_ms = backoff.as_millis() as u64,
                %error,
                "retrying after backoff"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}
