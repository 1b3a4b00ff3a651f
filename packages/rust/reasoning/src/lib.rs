//! Optional reasoning capability for second-opinion scoring and validation.
//!
//! A [`Reasoner`] can re-estimate candidate relevance, second-guess role
//! assignments, and review the final group. The capability is optional by
//! design: the pipeline probes availability and skips the reasoning stages
//! when there is nothing to call. [`NoopReasoner`] is that absence;
//! [`ScriptedReasoner`] is a deterministic stand-in for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use buyerscope_shared::{
    BuyerGroup, BuyerGroupMember, BuyerRole, BuyerScopeError, Candidate, ProductCategory, Result,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Judgment types
// ---------------------------------------------------------------------------

/// Second-opinion relevance for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceJudgment {
    /// 0.0..=1.0; replaces the heuristic relevance when present.
    pub relevance: f64,
    pub rationale: String,
}

/// Second-opinion role for one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleJudgment {
    pub role: BuyerRole,
    /// 0..=100.
    pub confidence: f64,
    pub rationale: String,
}

/// Review of the assembled group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupJudgment {
    pub approved: bool,
    /// 0..=100.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concerns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Reasoner trait
// ---------------------------------------------------------------------------

/// The optional reasoning service.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Whether the service can take calls right now. `false` makes the
    /// pipeline skip every reasoning stage for the run.
    async fn is_available(&self) -> bool;

    async fn score_relevance(
        &self,
        candidate: &Candidate,
        category: ProductCategory,
    ) -> Result<RelevanceJudgment>;

    async fn validate_role(&self, member: &BuyerGroupMember) -> Result<RoleJudgment>;

    async fn validate_group(&self, group: &BuyerGroup) -> Result<GroupJudgment>;
}

// ---------------------------------------------------------------------------
// NoopReasoner
// ---------------------------------------------------------------------------

/// The absent reasoner: never available, never called.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReasoner;

#[async_trait]
impl Reasoner for NoopReasoner {
    async fn is_available(&self) -> bool {
        false
    }

    async fn score_relevance(
        &self,
        _candidate: &Candidate,
        _category: ProductCategory,
    ) -> Result<RelevanceJudgment> {
        Err(BuyerScopeError::Reasoning("reasoner unavailable".into()))
    }

    async fn validate_role(&self, _member: &BuyerGroupMember) -> Result<RoleJudgment> {
        Err(BuyerScopeError::Reasoning("reasoner unavailable".into()))
    }

    async fn validate_group(&self, _group: &BuyerGroup) -> Result<GroupJudgment> {
        Err(BuyerScopeError::Reasoning("reasoner unavailable".into()))
    }
}

// ---------------------------------------------------------------------------
// ScriptedReasoner
// ---------------------------------------------------------------------------

/// Deterministic reasoner driven by per-candidate overrides. Counts calls so
/// tests can assert which stages ran.
pub struct ScriptedReasoner {
    default_relevance: f64,
    relevance_overrides: HashMap<String, f64>,
    role_overrides: HashMap<String, BuyerRole>,
    approve_groups: bool,
    fail_calls: bool,
    calls: AtomicU32,
}

impl ScriptedReasoner {
    /// A reasoner that approves everything at moderate relevance.
    pub fn approving() -> Self {
        Self {
            default_relevance: 0.6,
            relevance_overrides: HashMap::new(),
            role_overrides: HashMap::new(),
            approve_groups: true,
            fail_calls: false,
            calls: AtomicU32::new(0),
        }
    }

    /// An available reasoner whose every call errors, for degraded-path tests.
    pub fn failing() -> Self {
        Self {
            fail_calls: true,
            ..Self::approving()
        }
    }

    /// Fix the relevance returned for one candidate id.
    pub fn with_relevance(mut self, candidate_id: impl Into<String>, relevance: f64) -> Self {
        self.relevance_overrides
            .insert(candidate_id.into(), relevance);
        self
    }

    /// Fix the role returned for one candidate id.
    pub fn with_role(mut self, candidate_id: impl Into<String>, role: BuyerRole) -> Self {
        self.role_overrides.insert(candidate_id.into(), role);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn bump(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls {
            Err(BuyerScopeError::Reasoning("scripted failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn is_available(&self) -> bool {
        true
    }

    async fn score_relevance(
        &self,
        candidate: &Candidate,
        _category: ProductCategory,
    ) -> Result<RelevanceJudgment> {
        self.bump()?;
        let relevance = self
            .relevance_overrides
            .get(&candidate.id)
            .copied()
            .unwrap_or(self.default_relevance);
        Ok(RelevanceJudgment {
            relevance,
            rationale: "scripted relevance".into(),
        })
    }

    async fn validate_role(&self, member: &BuyerGroupMember) -> Result<RoleJudgment> {
        self.bump()?;
        let role = self
            .role_overrides
            .get(&member.candidate.id)
            .copied()
            .unwrap_or(member.role);
        Ok(RoleJudgment {
            role,
            confidence: 88.0,
            rationale: "scripted role review".into(),
        })
    }

    async fn validate_group(&self, _group: &BuyerGroup) -> Result<GroupJudgment> {
        self.bump()?;
        Ok(GroupJudgment {
            approved: self.approve_groups,
            confidence: 80.0,
            concerns: if self.approve_groups {
                Vec::new()
            } else {
                vec!["scripted rejection".into()]
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(id: &str) -> Candidate {
        Candidate {
            id: id.into(),
            name: "Test Person".into(),
            title: "VP of Sales".into(),
            department: None,
            management_level: None,
            location: None,
            connections: None,
            followers: None,
            email: None,
            phone: None,
            profile_url: None,
        }
    }

    #[tokio::test]
    async fn noop_reasoner_is_never_available() {
        let reasoner = NoopReasoner;
        assert!(!reasoner.is_available().await);
        assert!(
            reasoner
                .score_relevance(&make_candidate("a"), ProductCategory::Sales)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn scripted_reasoner_returns_overrides_and_counts_calls() {
        let reasoner = ScriptedReasoner::approving().with_relevance("a", 0.95);

        let a = reasoner
            .score_relevance(&make_candidate("a"), ProductCategory::Sales)
            .await
            .expect("judgment");
        let b = reasoner
            .score_relevance(&make_candidate("b"), ProductCategory::Sales)
            .await
            .expect("judgment");

        assert_eq!(a.relevance, 0.95);
        assert_eq!(b.relevance, 0.6);
        assert_eq!(reasoner.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_reasoner_is_available_but_errors() {
        let reasoner = ScriptedReasoner::failing();
        assert!(reasoner.is_available().await);
        let error = reasoner
            .score_relevance(&make_candidate("a"), ProductCategory::Sales)
            .await
            .unwrap_err();
        assert!(error.to_string().contains("reasoning error"));
    }
}
