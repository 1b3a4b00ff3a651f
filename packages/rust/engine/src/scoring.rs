//! Candidate scoring: seven bounded dimensions and the weighted composite.
//!
//! Scoring is pure string/threshold work over [`TitleFacts`] and network
//! counters. All keyword judgment is delegated to the tables in [`rules`];
//! this module owns the numeric bands and the composite.

use buyerscope_shared::{
    Candidate, DiscoveryConfig, ManagementLevel, ProductCategory, ScoreVector, ScoredCandidate,
};
use regex::Regex;

use crate::rules::{
    self, CategoryProfile, Department, SegmentPolicy, SeniorityTable, category_profile,
    education_seniority_table,
};
use crate::titles::TitleFacts;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Relative weight of each composite dimension.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub seniority: f64,
    pub department_fit: f64,
    pub influence: f64,
    pub champion_potential: f64,
    pub cross_functional: f64,
    pub geo_alignment: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.seniority
            + self.department_fit
            + self.influence
            + self.champion_potential
            + self.cross_functional
            + self.geo_alignment
    }
}

pub const DEFAULT_WEIGHTS: Weights = Weights {
    seniority: 0.25,
    department_fit: 0.20,
    influence: 0.20,
    champion_potential: 0.15,
    cross_functional: 0.10,
    geo_alignment: 0.10,
};

// ---------------------------------------------------------------------------
// Deal bands
// ---------------------------------------------------------------------------

/// Deal-size band. Larger deals pull scoring toward more senior titles and
/// sizing toward larger committees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealBand {
    /// Under $50K.
    Smb,
    /// $50K to $150K.
    MidMarket,
    /// $150K to $500K.
    Enterprise,
    /// $500K to $1M.
    Major,
    /// $1M and up.
    Strategic,
}

impl DealBand {
    pub fn from_usd(deal_size: f64) -> Self {
        if deal_size < 50_000.0 {
            DealBand::Smb
        } else if deal_size < 150_000.0 {
            DealBand::MidMarket
        } else if deal_size < 500_000.0 {
            DealBand::Enterprise
        } else if deal_size < 1_000_000.0 {
            DealBand::Major
        } else {
            DealBand::Strategic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DealBand::Smb => "sub-$50K",
            DealBand::MidMarket => "$50K-$150K",
            DealBand::Enterprise => "$150K-$500K",
            DealBand::Major => "$500K-$1M",
            DealBand::Strategic => "$1M+",
        }
    }
}

// ---------------------------------------------------------------------------
// Custom filter compilation
// ---------------------------------------------------------------------------

/// Caller filter lists compiled to matchers. Replaces the built-in category
/// table when present.
struct CompiledFilters {
    dept_primary: Option<Regex>,
    dept_secondary: Option<Regex>,
    dept_exclude: Option<Regex>,
    title_primary: Option<Regex>,
    title_secondary: Option<Regex>,
    title_exclude: Option<Regex>,
}

impl CompiledFilters {
    fn from_config(filtering: &buyerscope_shared::CustomFiltering) -> Self {
        Self {
            dept_primary: rules::compile_terms(&filtering.departments.primary),
            dept_secondary: rules::compile_terms(&filtering.departments.secondary),
            dept_exclude: rules::compile_terms(&filtering.departments.exclude),
            title_primary: rules::compile_terms(&filtering.titles.primary),
            title_secondary: rules::compile_terms(&filtering.titles.secondary),
            title_exclude: rules::compile_terms(&filtering.titles.exclude),
        }
    }
}

fn matches_any(re: &Option<Regex>, texts: &[&str]) -> bool {
    re.as_ref()
        .map(|re| texts.iter().any(|t| re.is_match(t)))
        .unwrap_or(false)
}

/// How a candidate's department/title relate to the product's buyer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FitRelation {
    Primary,
    Secondary,
    Neutral,
    /// Deny-listed: post-sale or caller-excluded roles. Scores low no matter
    /// what else the title matches.
    Denied,
}

// ---------------------------------------------------------------------------
// CandidateScorer
// ---------------------------------------------------------------------------

/// Computes a [`ScoreVector`] per candidate for one discovery run.
pub struct CandidateScorer {
    weights: Weights,
    band: DealBand,
    profile: CategoryProfile,
    custom: Option<CompiledFilters>,
    segment: Option<SegmentPolicy>,
    seniority_table: Option<SeniorityTable>,
    geo_alignment: Option<f64>,
}

impl CandidateScorer {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let custom = config
            .custom_filtering
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(CompiledFilters::from_config);

        let segment = matches!(config.product_category, ProductCategory::Sales)
            .then(SegmentPolicy::default);

        let seniority_table = matches!(config.product_category, ProductCategory::Education)
            .then(education_seniority_table);

        Self {
            weights: DEFAULT_WEIGHTS,
            band: DealBand::from_usd(config.deal_size_usd),
            profile: category_profile(config.product_category),
            custom,
            segment,
            seniority_table,
            geo_alignment: config.geo_alignment_score,
        }
    }

    /// Replace the sales segment policy (swappable per engagement).
    pub fn with_segment_policy(mut self, policy: SegmentPolicy) -> Self {
        self.segment = Some(policy);
        self
    }

    /// Replace the vertical seniority tier table.
    pub fn with_seniority_table(mut self, table: SeniorityTable) -> Self {
        self.seniority_table = Some(table);
        self
    }

    pub fn band(&self) -> DealBand {
        self.band
    }

    /// Score one candidate.
    pub fn score(&self, candidate: &Candidate) -> ScoredCandidate {
        let facts = TitleFacts::derive(candidate);
        let relation = self.fit_relation(candidate, &facts);

        let seniority = self.seniority_score(candidate, &facts);
        let department_fit = self.department_fit(relation);
        let influence = self.influence(candidate, &facts);
        let champion_potential = self.champion_potential(candidate, &facts, relation);
        let cross_functional = self.cross_functional(candidate, &facts);
        let segment_adjustment = self
            .segment
            .as_ref()
            .map(|p| p.classify(&candidate.title, facts.level));
        let relevance = self.relevance(candidate, &facts, relation);

        let mut scores = ScoreVector {
            seniority,
            department_fit,
            influence,
            champion_potential,
            cross_functional,
            geo_alignment: self.geo_alignment,
            segment_adjustment,
            overall: 0.0,
            relevance,
        }
        .clamped();
        scores.overall = self.overall(&scores);

        ScoredCandidate {
            candidate: candidate.clone(),
            scores,
        }
    }

    /// Score a whole pool, preserving input order.
    pub fn score_all(&self, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
        candidates.iter().map(|c| self.score(c)).collect()
    }

    // --- dimensions ---

    fn fit_relation(&self, candidate: &Candidate, facts: &TitleFacts) -> FitRelation {
        let dept_label = candidate.department.as_deref().unwrap_or("");
        let texts = [candidate.title.as_str(), dept_label];

        if let Some(custom) = &self.custom {
            if matches_any(&custom.title_exclude, &[candidate.title.as_str()])
                || matches_any(&custom.dept_exclude, &texts)
            {
                return FitRelation::Denied;
            }
            if matches_any(&custom.dept_primary, &texts)
                || matches_any(&custom.title_primary, &[candidate.title.as_str()])
            {
                return FitRelation::Primary;
            }
            if matches_any(&custom.dept_secondary, &texts)
                || matches_any(&custom.title_secondary, &[candidate.title.as_str()])
            {
                return FitRelation::Secondary;
            }
            return FitRelation::Neutral;
        }

        if self.profile.is_denied_title(&candidate.title) {
            return FitRelation::Denied;
        }
        match facts.department {
            Some(dept) if self.profile.is_primary(dept) => FitRelation::Primary,
            Some(dept) if self.profile.is_secondary(dept) => FitRelation::Secondary,
            _ => FitRelation::Neutral,
        }
    }

    fn seniority_score(&self, candidate: &Candidate, facts: &TitleFacts) -> f64 {
        if let Some(table) = &self.seniority_table {
            if let Some(score) = table.score_for(&candidate.title) {
                return score;
            }
        }
        if facts.is_c_level {
            return 10.0;
        }

        // Band matrix: larger deals discount everything below the C-suite.
        match self.band {
            DealBand::Smb | DealBand::MidMarket => match facts.level {
                ManagementLevel::CLevel => 10.0,
                ManagementLevel::Vp => 9.0,
                ManagementLevel::Director => 8.0,
                ManagementLevel::Manager => 6.0,
                ManagementLevel::Individual => 3.0,
                ManagementLevel::Entry => 1.0,
            },
            DealBand::Enterprise => match facts.level {
                ManagementLevel::CLevel => 10.0,
                ManagementLevel::Vp => 9.0,
                ManagementLevel::Director => 7.0,
                ManagementLevel::Manager => 5.0,
                ManagementLevel::Individual => 2.0,
                ManagementLevel::Entry => 1.0,
            },
            DealBand::Major | DealBand::Strategic => match facts.level {
                ManagementLevel::CLevel => 10.0,
                ManagementLevel::Vp => 7.0,
                ManagementLevel::Director => 5.0,
                ManagementLevel::Manager => 3.0,
                ManagementLevel::Individual => 1.0,
                ManagementLevel::Entry => 0.0,
            },
        }
    }

    fn department_fit(&self, relation: FitRelation) -> f64 {
        if self.custom.is_some() {
            match relation {
                FitRelation::Primary => 10.0,
                FitRelation::Secondary => 8.0,
                FitRelation::Neutral => 3.0,
                FitRelation::Denied => 1.0,
            }
        } else {
            match relation {
                FitRelation::Primary => 10.0,
                FitRelation::Secondary => 7.0,
                FitRelation::Neutral => 3.0,
                FitRelation::Denied => 2.0,
            }
        }
    }

    fn influence(&self, candidate: &Candidate, facts: &TitleFacts) -> f64 {
        if facts.is_c_level {
            return 10.0;
        }

        let mut score: f64 = match facts.level {
            ManagementLevel::Vp => 4.0,
            ManagementLevel::Director => 3.0,
            ManagementLevel::Manager => 2.0,
            _ => 0.0,
        };

        let connections = candidate.connections.unwrap_or(0);
        score += if connections > 500 {
            4.0
        } else if connections > 300 {
            3.0
        } else if connections > 150 {
            2.0
        } else if connections > 50 {
            1.0
        } else {
            0.0
        };

        let followers = candidate.followers.unwrap_or(0);
        score += if followers > 1000 {
            3.0
        } else if followers > 500 {
            2.0
        } else if followers > 100 {
            1.0
        } else {
            0.0
        };

        score.min(10.0)
    }

    fn champion_potential(
        &self,
        candidate: &Candidate,
        facts: &TitleFacts,
        relation: FitRelation,
    ) -> f64 {
        if relation == FitRelation::Denied || rules::is_structurally_irrelevant(&candidate.title) {
            return 0.0;
        }

        // Directors and managers use the tool daily and advocate upward;
        // executives sponsor but rarely champion.
        let mut score: f64 = match facts.level {
            ManagementLevel::Director => 10.0,
            ManagementLevel::Manager => 7.0,
            ManagementLevel::Vp => 5.0,
            ManagementLevel::Individual => 3.0,
            ManagementLevel::CLevel => 2.0,
            ManagementLevel::Entry => 0.0,
        };

        score += match relation {
            FitRelation::Primary => 8.0,
            FitRelation::Secondary => 5.0,
            _ => 0.0,
        };

        let connections = candidate.connections.unwrap_or(0);
        if connections > 400 {
            score += 4.0;
        } else if connections > 200 {
            score += 2.0;
        }
        let followers = candidate.followers.unwrap_or(0);
        if followers > 500 {
            score += 3.0;
        } else if followers > 250 {
            score += 1.0;
        }

        score.min(25.0)
    }

    fn cross_functional(&self, candidate: &Candidate, facts: &TitleFacts) -> f64 {
        let mut score: f64 = match facts.department {
            Some(
                Department::Operations
                | Department::Product
                | Department::Marketing
                | Department::Executive,
            ) => 3.0,
            Some(Department::Sales | Department::CustomerSuccess | Department::Hr) => 2.0,
            Some(_) => 1.0,
            None => 0.0,
        };

        if rules::has_collaborative_keywords(&candidate.title) {
            score += 3.0;
        }

        score += match facts.level {
            ManagementLevel::CLevel | ManagementLevel::Vp | ManagementLevel::Director => 2.0,
            ManagementLevel::Manager => 1.0,
            _ => 0.0,
        };

        let connections = candidate.connections.unwrap_or(0);
        if connections > 400 {
            score += 2.0;
        } else if connections > 200 {
            score += 1.0;
        }

        score.min(10.0)
    }

    fn relevance(&self, candidate: &Candidate, facts: &TitleFacts, relation: FitRelation) -> f64 {
        if rules::is_structurally_irrelevant(&candidate.title) {
            return 0.0;
        }
        if relation == FitRelation::Denied {
            return 0.05;
        }

        let dept_label = candidate.department.as_deref().unwrap_or("");
        let keyword_hit = self.profile.title_keywords.is_match(&candidate.title)
            || self.profile.title_keywords.is_match(dept_label);

        let mut score: f64 = 0.0;
        score += match relation {
            FitRelation::Primary => 0.5,
            FitRelation::Secondary => 0.25,
            _ if keyword_hit => 0.5,
            _ => 0.0,
        };
        if rules::has_decision_keywords(&candidate.title) {
            score += 0.3;
        }
        if candidate.connections.unwrap_or(0) > 300 {
            score += 0.1;
        }
        if candidate.followers.unwrap_or(0) > 400 {
            score += 0.1;
        }

        // Network-inferred titles are guesses; halve their gating weight.
        if facts.inferred_title {
            score *= 0.5;
        }

        score.min(1.0)
    }

    /// Weighted composite scaled to 0-100. Absent dimensions drop out of the
    /// numerator and denominator; the segment adjustment applies afterward.
    fn overall(&self, scores: &ScoreVector) -> f64 {
        let w = self.weights;
        let mut numerator = scores.seniority / 10.0 * 100.0 * w.seniority
            + scores.department_fit / 10.0 * 100.0 * w.department_fit
            + scores.influence / 10.0 * 100.0 * w.influence
            + scores.champion_potential / 25.0 * 100.0 * w.champion_potential
            + scores.cross_functional / 10.0 * 100.0 * w.cross_functional;
        let mut denominator =
            w.seniority + w.department_fit + w.influence + w.champion_potential + w.cross_functional;

        if let Some(geo) = scores.geo_alignment {
            numerator += geo / 10.0 * 100.0 * w.geo_alignment;
            denominator += w.geo_alignment;
        }

        let composite = numerator / denominator + scores.segment_adjustment.unwrap_or(0.0);
        composite.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyerscope_shared::{CompanyIntel, CustomFiltering, DiscoveryConfig};

    fn make_config(deal_size: f64, category: ProductCategory) -> DiscoveryConfig {
        DiscoveryConfig::new(CompanyIntel::named("Acme Corp"), deal_size, category)
    }

    fn make_candidate(id: &str, title: &str, connections: u32, followers: u32) -> Candidate {
        Candidate {
            id: id.into(),
            name: format!("Person {id}"),
            title: title.into(),
            department: None,
            management_level: None,
            location: None,
            connections: Some(connections),
            followers: Some(followers),
            email: None,
            phone: None,
            profile_url: None,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((DEFAULT_WEIGHTS.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn deal_bands_partition_the_axis() {
        assert_eq!(DealBand::from_usd(25_000.0), DealBand::Smb);
        assert_eq!(DealBand::from_usd(50_000.0), DealBand::MidMarket);
        assert_eq!(DealBand::from_usd(150_000.0), DealBand::Enterprise);
        assert_eq!(DealBand::from_usd(750_000.0), DealBand::Major);
        assert_eq!(DealBand::from_usd(2_000_000.0), DealBand::Strategic);
    }

    #[test]
    fn vp_sales_scores_high_for_sales_deal() {
        let scorer = CandidateScorer::new(&make_config(150_000.0, ProductCategory::Sales));
        let scored = scorer.score(&make_candidate("c1", "VP of Sales", 520, 800));

        assert_eq!(scored.scores.seniority, 9.0);
        assert_eq!(scored.scores.department_fit, 10.0);
        assert_eq!(scored.scores.influence, 10.0);
        assert!(scored.scores.overall > 80.0);
        assert!(scored.scores.relevance > 0.9);
        // Leadership is exempt from segment classification.
        assert_eq!(scored.scores.segment_adjustment, Some(0.0));
    }

    #[test]
    fn account_manager_is_denied_for_sales_category() {
        let scorer = CandidateScorer::new(&make_config(150_000.0, ProductCategory::Sales));
        let scored = scorer.score(&make_candidate("c2", "Account Manager", 350, 200));

        assert!(scored.scores.relevance <= 0.1);
        assert_eq!(scored.scores.champion_potential, 0.0);
        assert_eq!(scored.scores.segment_adjustment, Some(-25.0));
        assert!(scored.scores.overall < 30.0);
    }

    #[test]
    fn cfo_fit_depends_on_category() {
        let cfo = make_candidate("c3", "CFO", 600, 900);

        let sales = CandidateScorer::new(&make_config(150_000.0, ProductCategory::Sales));
        let finance = CandidateScorer::new(&make_config(150_000.0, ProductCategory::Finance));

        assert_eq!(sales.score(&cfo).scores.department_fit, 3.0);
        assert_eq!(finance.score(&cfo).scores.department_fit, 10.0);
        // C-level short-circuits influence regardless of category.
        assert_eq!(sales.score(&cfo).scores.influence, 10.0);
    }

    #[test]
    fn education_category_uses_tier_table() {
        let scorer = CandidateScorer::new(&make_config(200_000.0, ProductCategory::Education));
        let provost = scorer.score(&make_candidate("c4", "Provost", 100, 50));
        let dean = scorer.score(&make_candidate("c5", "Dean of Engineering", 100, 50));

        assert_eq!(provost.scores.seniority, 10.0);
        assert_eq!(dean.scores.seniority, 7.0);
    }

    #[test]
    fn segment_adjustment_only_for_sales_category() {
        let marketing = CandidateScorer::new(&make_config(80_000.0, ProductCategory::Marketing));
        let scored = marketing.score(&make_candidate("c6", "Account Manager", 200, 100));
        assert_eq!(scored.scores.segment_adjustment, None);
    }

    #[test]
    fn absent_geo_dimension_is_excluded_not_zeroed() {
        let candidate = make_candidate("c7", "Director of Sales Operations", 450, 600);

        let mut with_zero_geo = make_config(100_000.0, ProductCategory::Sales);
        with_zero_geo.geo_alignment_score = Some(0.0);
        let mut without_geo = make_config(100_000.0, ProductCategory::Sales);
        without_geo.geo_alignment_score = None;

        let zeroed = CandidateScorer::new(&with_zero_geo).score(&candidate);
        let excluded = CandidateScorer::new(&without_geo).score(&candidate);

        assert_eq!(excluded.scores.geo_alignment, None);
        assert!(excluded.scores.overall > zeroed.scores.overall);
    }

    #[test]
    fn custom_filtering_replaces_builtin_table() {
        let mut config = make_config(150_000.0, ProductCategory::Sales);
        let mut filtering = CustomFiltering::default();
        filtering.departments.primary = vec!["clinical operations".into()];
        filtering.titles.exclude = vec!["pharmacist".into()];
        config.custom_filtering = Some(filtering);
        let scorer = CandidateScorer::new(&config);

        let mut nurse_lead = make_candidate("c8", "Clinical Operations Lead", 300, 100);
        nurse_lead.department = Some("Clinical Operations".into());
        assert_eq!(scorer.score(&nurse_lead).scores.department_fit, 10.0);

        let pharmacist = make_candidate("c9", "Staff Pharmacist", 300, 100);
        assert_eq!(scorer.score(&pharmacist).scores.department_fit, 1.0);
        assert!(scorer.score(&pharmacist).scores.relevance <= 0.05);

        // VP of Sales no longer matches once custom lists replace the table.
        let vp = make_candidate("c10", "VP of Sales", 520, 800);
        assert_eq!(scorer.score(&vp).scores.department_fit, 3.0);
    }

    #[test]
    fn inferred_titles_derate_relevance() {
        let scorer = CandidateScorer::new(&make_config(100_000.0, ProductCategory::Sales));
        let blank = scorer.score(&make_candidate("c11", "--", 700, 1200));
        assert!(blank.scores.relevance <= 0.5);
    }

    #[test]
    fn all_scores_stay_in_bounds() {
        let scorer = CandidateScorer::new(&make_config(5_000_000.0, ProductCategory::Sales));
        for (i, title) in [
            "CEO & Founder",
            "SVP Global Revenue Operations",
            "Account Manager",
            "Security Guard",
            "Junior Marketing Associate",
            "--",
        ]
        .iter()
        .enumerate()
        {
            let scored = scorer.score(&make_candidate(&format!("b{i}"), title, 4000, 9000));
            let s = &scored.scores;
            assert!((0.0..=10.0).contains(&s.seniority), "{title}");
            assert!((0.0..=10.0).contains(&s.department_fit), "{title}");
            assert!((0.0..=10.0).contains(&s.influence), "{title}");
            assert!((0.0..=25.0).contains(&s.champion_potential), "{title}");
            assert!((0.0..=10.0).contains(&s.cross_functional), "{title}");
            assert!((0.0..=100.0).contains(&s.overall), "{title}");
            assert!((0.0..=1.0).contains(&s.relevance), "{title}");
        }
    }
}
