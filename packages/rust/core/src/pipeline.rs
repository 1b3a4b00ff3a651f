//! End-to-end discovery pipeline: directory records → scored, role-assigned,
//! size-constrained, cohesion-validated buyer group.
//!
//! Stages run strictly in sequence. A stage failure aborts the run wrapped in
//! a stage-attributed error; the reasoning stages are optional and skipped
//! when no reasoner is available; per-candidate enrichment failures never
//! abort the stage. A cancel token is checked between stages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use buyerscope_directory::{DirectorySearch, SearchFilters};
use buyerscope_engine::{
    CandidateScorer, CoverageValidator, GroupSelector, GroupSizer, RoleAssigner, cohesion_report,
};
use buyerscope_enrichment::{ContactVerifier, EnrichmentRunner, ProfileCollector};
use buyerscope_reasoning::{NoopReasoner, Reasoner};
use buyerscope_shared::{
    BuyerGroup, BuyerGroupMember, BuyerScopeError, CostLedger, DiscoveryConfig, Result, RunId,
    ScoredCandidate,
};

use crate::report::{DiscoveryReport, RunOutcome};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The pipeline's stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Intelligence,
    PreviewSearch,
    Scoring,
    AiRelevance,
    RoleAssignment,
    AiRoleValidation,
    Sizing,
    GroupSelection,
    CrossFunctional,
    ProfileEnrichment,
    CohesionValidation,
    AiGroupValidation,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 13] = [
        Stage::Intelligence,
        Stage::PreviewSearch,
        Stage::Scoring,
        Stage::AiRelevance,
        Stage::RoleAssignment,
        Stage::AiRoleValidation,
        Stage::Sizing,
        Stage::GroupSelection,
        Stage::CrossFunctional,
        Stage::ProfileEnrichment,
        Stage::CohesionValidation,
        Stage::AiGroupValidation,
        Stage::Report,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Intelligence => "intelligence",
            Stage::PreviewSearch => "preview-search",
            Stage::Scoring => "scoring",
            Stage::AiRelevance => "ai-relevance",
            Stage::RoleAssignment => "role-assignment",
            Stage::AiRoleValidation => "ai-role-validation",
            Stage::Sizing => "sizing",
            Stage::GroupSelection => "group-selection",
            Stage::CrossFunctional => "cross-functional",
            Stage::ProfileEnrichment => "profile-enrichment",
            Stage::CohesionValidation => "cohesion-validation",
            Stage::AiGroupValidation => "ai-group-validation",
            Stage::Report => "report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared with the caller. The pipeline checks
/// it between stages; a cancelled run reports the last completed stage.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Run stats
// ---------------------------------------------------------------------------

/// Wall-clock time one stage took.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub elapsed_ms: u64,
}

/// Counters and timings accumulated across the run. Mutated only by the
/// orchestrator task; no locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub candidates_seen: usize,
    pub candidates_scored: usize,
    /// Final group size after coverage backfill.
    pub group_size: usize,
    pub enriched: usize,
    pub enrichment_failures: usize,
    /// Successful reasoner calls across the ai stages.
    pub reasoner_calls: u32,
    /// Stages that did not run at all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages_skipped: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timings: Vec<StageTiming>,
    pub costs: CostLedger,
}

impl RunStats {
    fn record_timing(&mut self, stage: Stage, started: Instant) {
        self.timings.push(StageTiming {
            stage: stage.name().into(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
    }

    fn record_skip(&mut self, stage: Stage) {
        self.stages_skipped.push(stage.name().into());
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn stage(&self, name: &str);
    /// Called when a candidate is scored.
    fn candidate_scored(&self, name: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &DiscoveryReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _name: &str) {}
    fn candidate_scored(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &DiscoveryReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The discovery pipeline with its collaborators bound.
pub struct DiscoveryPipeline {
    config: DiscoveryConfig,
    directory: Arc<dyn DirectorySearch>,
    collector: Arc<dyn ProfileCollector>,
    verifier: Arc<dyn ContactVerifier>,
    reasoner: Arc<dyn Reasoner>,
    cancel: CancelToken,
}

impl DiscoveryPipeline {
    /// Bind the required collaborators. The reasoner defaults to absent.
    pub fn new(
        config: DiscoveryConfig,
        directory: Arc<dyn DirectorySearch>,
        collector: Arc<dyn ProfileCollector>,
        verifier: Arc<dyn ContactVerifier>,
    ) -> Self {
        Self {
            config,
            directory,
            collector,
            verifier,
            reasoner: Arc::new(NoopReasoner),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_reasoner(mut self, reasoner: Arc<dyn Reasoner>) -> Self {
        self.reasoner = reasoner;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run every stage in order and assemble the final report.
    #[instrument(skip_all, fields(
        company = %self.config.company.name,
        deal_size = self.config.deal_size_usd,
        category = %self.config.product_category,
    ))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<DiscoveryReport> {
        let start = Instant::now();
        let run_id = RunId::new();
        let mut stats = RunStats::default();

        info!(%run_id, company = %self.config.company.name, "starting discovery run");

        // --- Stage: intelligence ---
        progress.stage(Stage::Intelligence.name());
        let stage_start = Instant::now();
        self.config
            .validate()
            .map_err(|e| BuyerScopeError::stage(Stage::Intelligence.name(), e))?;

        let scorer = CandidateScorer::new(&self.config);
        let band = scorer.band();
        let reasoner_available = self.reasoner.is_available().await;

        info!(
            band = band.label(),
            headcount = ?self.config.company.headcount,
            industry = ?self.config.company.industry,
            reasoner_available,
            "company intelligence assembled"
        );
        stats.record_timing(Stage::Intelligence, stage_start);
        self.bail_if_cancelled(Stage::Intelligence)?;

        // --- Stage: preview-search ---
        progress.stage(Stage::PreviewSearch.name());
        let stage_start = Instant::now();
        let filters = SearchFilters {
            title_query: None,
            usa_only: self.config.usa_only,
            limit: self.config.search_limit,
        };
        let outcome = self
            .directory
            .search(&self.config.company, &filters)
            .await
            .map_err(|e| BuyerScopeError::stage(Stage::PreviewSearch.name(), e))?;

        stats.costs.record_search(self.config.costs.search_usd);
        stats.candidates_seen = outcome.candidates.len();
        info!(
            candidates = outcome.candidates.len(),
            total_available = outcome.total_available,
            hit_limit = outcome.hit_limit,
            "preview search complete"
        );
        stats.record_timing(Stage::PreviewSearch, stage_start);
        self.bail_if_cancelled(Stage::PreviewSearch)?;

        if outcome.candidates.is_empty() {
            warn!("directory returned no candidates, ending run");
            progress.stage(Stage::Report.name());
            let report = self.build_report(
                run_id,
                band.label(),
                RunOutcome::NoCandidates,
                None,
                stats,
                start,
            );
            progress.done(&report);
            return Ok(report);
        }

        // --- Stage: scoring ---
        progress.stage(Stage::Scoring.name());
        let stage_start = Instant::now();
        let total = outcome.candidates.len();
        let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(total);
        for (index, candidate) in outcome.candidates.iter().enumerate() {
            progress.candidate_scored(&candidate.name, index + 1, total);
            scored.push(scorer.score(candidate));
        }
        stats.candidates_scored = scored.len();
        debug!(scored = scored.len(), "scoring complete");
        stats.record_timing(Stage::Scoring, stage_start);
        self.bail_if_cancelled(Stage::Scoring)?;

        // --- Stage: ai-relevance (optional) ---
        if reasoner_available {
            progress.stage(Stage::AiRelevance.name());
            let stage_start = Instant::now();
            self.ai_relevance(&mut scored, &mut stats).await;
            stats.record_timing(Stage::AiRelevance, stage_start);
            self.bail_if_cancelled(Stage::AiRelevance)?;
        } else {
            debug!(stage = Stage::AiRelevance.name(), "reasoner unavailable, stage skipped");
            stats.record_skip(Stage::AiRelevance);
        }

        // --- Stage: role-assignment ---
        progress.stage(Stage::RoleAssignment.name());
        let stage_start = Instant::now();
        let assigner = RoleAssigner::new(self.config.product_category);
        let mut pool: Vec<BuyerGroupMember> = scored
            .iter()
            .map(|sc| {
                let assignment = assigner.assign(sc);
                BuyerGroupMember {
                    candidate: sc.candidate.clone(),
                    scores: sc.scores.clone(),
                    role: assignment.role,
                    role_confidence: assignment.confidence,
                    role_reasoning: assignment.reasoning,
                    contact: None,
                    enrichment_error: None,
                }
            })
            .collect();
        debug!(pool = pool.len(), "roles assigned");
        stats.record_timing(Stage::RoleAssignment, stage_start);
        self.bail_if_cancelled(Stage::RoleAssignment)?;

        // --- Stage: ai-role-validation (optional) ---
        if reasoner_available {
            progress.stage(Stage::AiRoleValidation.name());
            let stage_start = Instant::now();
            self.ai_role_validation(&mut pool, &mut stats).await;
            stats.record_timing(Stage::AiRoleValidation, stage_start);
            self.bail_if_cancelled(Stage::AiRoleValidation)?;
        } else {
            debug!(stage = Stage::AiRoleValidation.name(), "reasoner unavailable, stage skipped");
            stats.record_skip(Stage::AiRoleValidation);
        }

        // --- Stage: sizing ---
        progress.stage(Stage::Sizing.name());
        let stage_start = Instant::now();
        let sizer = GroupSizer::new(&self.config);
        let constraints = sizer.constraints(pool.len());
        info!(
            min = constraints.min,
            max = constraints.max,
            ideal = constraints.ideal,
            accept_single = constraints.accept_single_person,
            "size constraints derived"
        );
        stats.record_timing(Stage::Sizing, stage_start);
        self.bail_if_cancelled(Stage::Sizing)?;

        // --- Stage: group-selection ---
        progress.stage(Stage::GroupSelection.name());
        let stage_start = Instant::now();
        let selector = GroupSelector::new(self.config.role_priorities.clone());
        let (mut members, fallback) = selector.select(&pool, &constraints);
        if fallback != buyerscope_shared::FallbackLevel::Strict {
            warn!(level = %fallback, "strict filters thinned the pool, selection fell back");
        }
        info!(selected = members.len(), level = %fallback, "group selected");
        stats.record_timing(Stage::GroupSelection, stage_start);
        self.bail_if_cancelled(Stage::GroupSelection)?;

        // --- Stage: cross-functional ---
        progress.stage(Stage::CrossFunctional.name());
        let stage_start = Instant::now();
        let validator = CoverageValidator::new(band);
        let coverage = validator.validate(&mut members, &pool, &constraints);
        if !coverage.is_fully_covered() {
            warn!(unfilled = ?coverage.unfilled, "required roles remain unfilled");
        }
        stats.group_size = members.len();
        stats.record_timing(Stage::CrossFunctional, stage_start);
        self.bail_if_cancelled(Stage::CrossFunctional)?;

        // --- Stage: profile-enrichment ---
        progress.stage(Stage::ProfileEnrichment.name());
        let stage_start = Instant::now();
        let runner =
            EnrichmentRunner::new(self.collector.clone(), self.verifier.clone(), &self.config);
        let enrich_stats = runner.enrich_group(&mut members, &mut stats.costs).await;
        stats.enriched = enrich_stats.succeeded as usize;
        stats.enrichment_failures = enrich_stats.failed as usize;
        stats.record_timing(Stage::ProfileEnrichment, stage_start);
        self.bail_if_cancelled(Stage::ProfileEnrichment)?;

        // --- Stage: cohesion-validation ---
        progress.stage(Stage::CohesionValidation.name());
        let stage_start = Instant::now();
        let cohesion = cohesion_report(&members);
        info!(
            score = cohesion.score,
            role_balance = cohesion.role_balance,
            department_diversity = cohesion.department_diversity,
            "cohesion computed"
        );
        stats.record_timing(Stage::CohesionValidation, stage_start);
        self.bail_if_cancelled(Stage::CohesionValidation)?;

        let group = BuyerGroup {
            members,
            constraints,
            coverage,
            cohesion,
            selected_via: fallback,
        };

        // --- Stage: ai-group-validation (optional) ---
        let reasoner_review = if reasoner_available {
            progress.stage(Stage::AiGroupValidation.name());
            let stage_start = Instant::now();
            let review = self.ai_group_validation(&group, &mut stats).await;
            stats.record_timing(Stage::AiGroupValidation, stage_start);
            self.bail_if_cancelled(Stage::AiGroupValidation)?;
            review
        } else {
            debug!(stage = Stage::AiGroupValidation.name(), "reasoner unavailable, stage skipped");
            stats.record_skip(Stage::AiGroupValidation);
            None
        };

        // --- Stage: report ---
        progress.stage(Stage::Report.name());
        let report = self.build_report(
            run_id,
            band.label(),
            RunOutcome::Group(group),
            reasoner_review,
            stats,
            start,
        );
        progress.done(&report);

        info!(
            run_id = %report.run_id,
            members = report.stats.group_size,
            fallback = ?report.fallback_level(),
            cost_usd = report.stats.costs.total_usd,
            elapsed_ms = report.elapsed_ms,
            "discovery run complete"
        );

        Ok(report)
    }

    /// Replace heuristic relevance with the reasoner's estimate. A failing
    /// call abandons the rest of the stage; scores keep their heuristic value.
    async fn ai_relevance(&self, scored: &mut [ScoredCandidate], stats: &mut RunStats) {
        for sc in scored.iter_mut() {
            match self
                .reasoner
                .score_relevance(&sc.candidate, self.config.product_category)
                .await
            {
                Ok(judgment) => {
                    stats.reasoner_calls += 1;
                    sc.scores.relevance = judgment.relevance.clamp(0.0, 1.0);
                }
                Err(e) => {
                    warn!(error = %e, "relevance call failed, keeping heuristic values");
                    return;
                }
            }
        }
        debug!(rescored = scored.len(), "reasoner relevance applied");
    }

    /// Let the reasoner second-guess role assignments. Corrections replace
    /// the role, its confidence, and its reasoning.
    async fn ai_role_validation(&self, pool: &mut [BuyerGroupMember], stats: &mut RunStats) {
        for member in pool.iter_mut() {
            match self.reasoner.validate_role(member).await {
                Ok(judgment) => {
                    stats.reasoner_calls += 1;
                    if judgment.role != member.role {
                        info!(
                            candidate = %member.candidate.name,
                            from = %member.role,
                            to = %judgment.role,
                            "role corrected by reasoner"
                        );
                        member.role = judgment.role;
                        member.role_confidence = judgment.confidence;
                        member.role_reasoning = judgment.rationale;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "role validation call failed, keeping assigned roles");
                    return;
                }
            }
        }
    }

    /// Ask the reasoner to review the assembled group. Failure leaves the
    /// group as-is with no review attached.
    async fn ai_group_validation(
        &self,
        group: &BuyerGroup,
        stats: &mut RunStats,
    ) -> Option<buyerscope_reasoning::GroupJudgment> {
        match self.reasoner.validate_group(group).await {
            Ok(judgment) => {
                stats.reasoner_calls += 1;
                if !judgment.approved {
                    warn!(concerns = ?judgment.concerns, "reasoner flagged the group");
                }
                Some(judgment)
            }
            Err(e) => {
                warn!(error = %e, "group validation call failed, shipping unreviewed group");
                None
            }
        }
    }

    fn bail_if_cancelled(&self, last_completed: Stage) -> Result<()> {
        if self.cancel.is_cancelled() {
            info!(stage = last_completed.name(), "cancellation requested, stopping run");
            return Err(BuyerScopeError::Cancelled {
                last_completed: last_completed.name().into(),
            });
        }
        Ok(())
    }

    fn build_report(
        &self,
        run_id: RunId,
        band_label: &str,
        outcome: RunOutcome,
        reasoner_review: Option<buyerscope_reasoning::GroupJudgment>,
        stats: RunStats,
        started: Instant,
    ) -> DiscoveryReport {
        let overall_confidence = match &outcome {
            RunOutcome::Group(group) => Some(group.overall_confidence()),
            RunOutcome::NoCandidates => None,
        };
        DiscoveryReport {
            run_id,
            company: self.config.company.clone(),
            deal_size_usd: self.config.deal_size_usd,
            deal_band: band_label.into(),
            product_category: self.config.product_category,
            outcome,
            overall_confidence,
            reasoner_review,
            stats,
            elapsed_ms: started.elapsed().as_millis() as u64,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use buyerscope_directory::InMemoryDirectory;
    use buyerscope_enrichment::{HeuristicVerifier, PreviewCollector};
    use buyerscope_reasoning::ScriptedReasoner;
    use buyerscope_shared::{
        BuyerRole, Candidate, CompanyIntel, ProductCategory, SizingOverride,
    };

    fn make_candidate(
        id: &str,
        name: &str,
        title: &str,
        department: Option<&str>,
        connections: u32,
        followers: u32,
    ) -> Candidate {
        Candidate {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            department: department.map(Into::into),
            management_level: None,
            location: Some("Austin, Texas, United States".into()),
            connections: Some(connections),
            followers: Some(followers),
            email: Some(format!("{id}@meridian.example")),
            phone: None,
            profile_url: None,
        }
    }

    /// Twenty-candidate pool for a mid-six-figure sales deal: a clear decision
    /// maker, championable directors, a deny-listed account manager, a CFO
    /// gatekeeper, and assorted neighbors.
    fn sales_pool() -> Vec<Candidate> {
        vec![
            make_candidate("vp-sales", "Priya Natarajan", "VP of Sales", Some("Sales"), 620, 840),
            make_candidate("dir-revops", "Marcus Webb", "Director of Revenue Operations", Some("Sales"), 480, 510),
            make_candidate("dir-marketing", "Dana Kim", "Director of Marketing", Some("Marketing"), 450, 600),
            make_candidate("mgr-salesops", "Jae Park", "Sales Operations Manager", Some("Sales"), 350, 220),
            make_candidate("mgr-enablement", "Ana Duarte", "Sales Enablement Manager", Some("Sales"), 410, 460),
            make_candidate("cfo", "Elena Vasquez", "CFO", Some("Finance"), 710, 1300),
            make_candidate("ceo", "Sarah Lindqvist", "CEO", Some("Executive"), 950, 2400),
            make_candidate("acct-mgr", "Tom Okafor", "Account Manager", Some("Sales"), 390, 310),
            make_candidate("counsel", "Ingrid Bauer", "General Counsel", Some("Legal"), 260, 150),
            make_candidate("dir-product", "Leo Martinez", "Director of Product", Some("Product"), 420, 380),
            make_candidate("eng-mgr", "Nina Petrova", "Engineering Manager", Some("Engineering"), 310, 120),
            make_candidate("swe-1", "Omar Haddad", "Senior Software Engineer", Some("Engineering"), 180, 90),
            make_candidate("swe-2", "Grace Chen", "Software Engineer", Some("Engineering"), 120, 40),
            make_candidate("mgr-marketing", "Felix Wagner", "Marketing Operations Manager", Some("Marketing"), 280, 330),
            make_candidate("hr-dir", "Rosa Alvarez", "Director of Human Resources", Some("HR"), 330, 270),
            make_candidate("recruiter", "Sam Porter", "Technical Recruiter", Some("HR"), 510, 640),
            make_candidate("cs-head", "Mia Johansson", "Head of Customer Success", Some("Customer Success"), 440, 390),
            make_candidate("ops-analyst", "Derek Boone", "Operations Analyst", Some("Operations"), 150, 60),
            make_candidate("exec-asst", "Lena Fischer", "Executive Assistant", Some("Executive"), 230, 110),
            make_candidate("bdr", "Kyle Tran", "Business Development Representative", Some("Sales"), 90, 30),
        ]
    }

    fn quiet_config(deal_size: f64) -> DiscoveryConfig {
        let mut config = DiscoveryConfig::new(
            CompanyIntel::named("Meridian Analytics"),
            deal_size,
            ProductCategory::Sales,
        );
        config.enrichment.pacing_ms = 0;
        config
    }

    fn make_pipeline(candidates: Vec<Candidate>, config: DiscoveryConfig) -> DiscoveryPipeline {
        DiscoveryPipeline::new(
            config,
            Arc::new(InMemoryDirectory::with_candidates(candidates)),
            Arc::new(PreviewCollector),
            Arc::new(HeuristicVerifier::new(Some("meridian.example".into()))),
        )
    }

    struct FailingDirectory;

    #[async_trait]
    impl DirectorySearch for FailingDirectory {
        async fn search(
            &self,
            _company: &CompanyIntel,
            _filters: &SearchFilters,
        ) -> Result<buyerscope_directory::SearchOutcome> {
            Err(BuyerScopeError::Directory("search backend unreachable".into()))
        }
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(Stage::ALL.len(), 13);
        assert_eq!(Stage::ALL[0].name(), "intelligence");
        assert_eq!(Stage::ALL[12].name(), "report");
        for stage in Stage::ALL {
            assert!(!stage.name().contains(' '));
        }
    }

    #[tokio::test]
    async fn enterprise_sales_deal_forms_a_covered_group() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0));
        let report = pipeline.run(&SilentProgress).await.expect("run");

        let group = report.group().expect("group formed");
        assert!(
            (4..=8).contains(&group.members.len()),
            "got {} members",
            group.members.len()
        );
        assert!(group.has_role(BuyerRole::Decision));
        assert!(
            group
                .members_with_role(BuyerRole::Blocker)
                .any(|m| m.candidate.title == "CFO"),
            "CFO should gate a six-figure deal"
        );
        assert!(
            group
                .members
                .iter()
                .all(|m| m.candidate.title != "Account Manager"),
            "post-sale titles must not be selected"
        );
        assert_eq!(report.stats.candidates_seen, 20);
        assert_eq!(report.stats.group_size, group.members.len());
        let confidence = report.overall_confidence.expect("confidence for a formed group");
        assert!((0.0..=100.0).contains(&confidence));
        assert!(confidence > 0.0);
    }

    #[tokio::test]
    async fn zero_candidates_yields_the_no_data_outcome() {
        let pipeline = DiscoveryPipeline::new(
            quiet_config(80_000.0),
            Arc::new(InMemoryDirectory::empty()),
            Arc::new(PreviewCollector),
            Arc::new(HeuristicVerifier::new(None)),
        );
        let report = pipeline.run(&SilentProgress).await.expect("run");

        assert!(matches!(report.outcome, RunOutcome::NoCandidates));
        assert!(report.group().is_none());
        assert!(report.overall_confidence.is_none());
        assert_eq!(report.stats.candidates_seen, 0);
        assert_eq!(report.stats.group_size, 0);
    }

    #[tokio::test]
    async fn single_candidate_pool_collapses_to_one_member() {
        let mut config = quiet_config(100_000.0);
        config.sizing_override = Some(SizingOverride {
            min: 2,
            max: 6,
            ideal: 4,
        });
        let pool = vec![make_candidate(
            "vp-sales",
            "Priya Natarajan",
            "VP of Sales",
            Some("Sales"),
            620,
            840,
        )];
        let pipeline = make_pipeline(pool, config);
        let report = pipeline.run(&SilentProgress).await.expect("run");

        let group = report.group().expect("group formed");
        assert_eq!(group.members.len(), 1);
        assert!(group.constraints.accept_single_person);
        assert!(group.cohesion.score.is_finite());
        assert!(group.cohesion.score > 0.0);
    }

    #[tokio::test]
    async fn stage_failures_name_the_failing_stage() {
        let pipeline = DiscoveryPipeline::new(
            quiet_config(50_000.0),
            Arc::new(FailingDirectory),
            Arc::new(PreviewCollector),
            Arc::new(HeuristicVerifier::new(None)),
        );
        let error = pipeline.run(&SilentProgress).await.unwrap_err();
        let text = error.to_string();

        assert!(text.contains("stage 'preview-search' failed"), "got: {text}");
    }

    #[tokio::test]
    async fn invalid_config_fails_in_the_intelligence_stage() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(-5.0));
        let error = pipeline.run(&SilentProgress).await.unwrap_err();
        let text = error.to_string();

        assert!(text.contains("stage 'intelligence' failed"), "got: {text}");
        assert!(text.contains("config error"));
    }

    #[tokio::test]
    async fn pre_cancelled_run_reports_the_last_completed_stage() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let pipeline =
            make_pipeline(sales_pool(), quiet_config(150_000.0)).with_cancel_token(cancel);

        let error = pipeline.run(&SilentProgress).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "run cancelled after stage 'intelligence'"
        );
    }

    #[tokio::test]
    async fn noop_reasoner_skips_every_ai_stage() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0));
        let report = pipeline.run(&SilentProgress).await.expect("run");

        assert_eq!(
            report.stats.stages_skipped,
            vec!["ai-relevance", "ai-role-validation", "ai-group-validation"]
        );
        assert_eq!(report.stats.reasoner_calls, 0);
        assert!(report.reasoner_review.is_none());
    }

    #[tokio::test]
    async fn scripted_reasoner_drives_the_ai_stages() {
        let reasoner = ScriptedReasoner::approving().with_relevance("vp-sales", 0.93);
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0))
            .with_reasoner(Arc::new(reasoner));

        let report = pipeline.run(&SilentProgress).await.expect("run");
        let group = report.group().expect("group formed");

        let vp = group
            .members
            .iter()
            .find(|m| m.candidate.id == "vp-sales")
            .expect("vp selected");
        assert_eq!(vp.scores.relevance, 0.93);

        assert!(report.stats.stages_skipped.is_empty());
        assert!(report.stats.reasoner_calls > 0);
        let review = report.reasoner_review.expect("review attached");
        assert!(review.approved);
    }

    #[tokio::test]
    async fn failing_reasoner_degrades_without_failing_the_run() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0))
            .with_reasoner(Arc::new(ScriptedReasoner::failing()));

        let report = pipeline.run(&SilentProgress).await.expect("run");

        assert!(report.group().is_some());
        assert_eq!(report.stats.reasoner_calls, 0);
        assert!(report.reasoner_review.is_none());
    }

    #[tokio::test]
    async fn costs_accrue_across_search_and_enrichment() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0));
        let report = pipeline.run(&SilentProgress).await.expect("run");

        let costs = &report.stats.costs;
        assert_eq!(costs.searches, 1);
        assert_eq!(costs.profiles_collected as usize, report.stats.group_size);
        assert!(costs.total_usd > 0.0);
    }

    #[tokio::test]
    async fn stage_timings_cover_the_stages_that_ran() {
        let pipeline = make_pipeline(sales_pool(), quiet_config(150_000.0));
        let report = pipeline.run(&SilentProgress).await.expect("run");

        let timed: Vec<&str> = report
            .stats
            .timings
            .iter()
            .map(|t| t.stage.as_str())
            .collect();
        assert!(timed.contains(&"preview-search"));
        assert!(timed.contains(&"group-selection"));
        assert!(timed.contains(&"profile-enrichment"));
        assert!(!timed.contains(&"ai-relevance"));
    }

    #[tokio::test]
    async fn sizer_ideal_grows_with_deal_size() {
        let small = make_pipeline(sales_pool(), quiet_config(30_000.0));
        let large = make_pipeline(sales_pool(), quiet_config(2_000_000.0));

        let small_report = small.run(&SilentProgress).await.expect("run");
        let large_report = large.run(&SilentProgress).await.expect("run");

        let small_ideal = small_report.group().expect("group").constraints.ideal;
        let large_ideal = large_report.group().expect("group").constraints.ideal;
        assert!(small_ideal < large_ideal);
    }

    #[tokio::test]
    async fn identical_inputs_select_identical_groups() {
        let first = make_pipeline(sales_pool(), quiet_config(150_000.0))
            .run(&SilentProgress)
            .await
            .expect("run");
        let second = make_pipeline(sales_pool(), quiet_config(150_000.0))
            .run(&SilentProgress)
            .await
            .expect("run");

        let ids = |report: &DiscoveryReport| -> Vec<String> {
            report
                .group()
                .expect("group")
                .members
                .iter()
                .map(|m| m.candidate.id.clone())
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }
}
