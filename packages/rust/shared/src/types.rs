//! Core domain types for BuyerScope discovery runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for discovery run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// BuyerRole
// ---------------------------------------------------------------------------

/// The role a member plays in the buying committee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyerRole {
    /// Signs off on the purchase.
    Decision,
    /// Drives the deal internally.
    Champion,
    /// Affected by the purchase, consulted but not deciding.
    Stakeholder,
    /// Can veto or stall (finance, legal, procurement).
    Blocker,
    /// Opens doors; low authority, high connectivity.
    Introducer,
}

impl BuyerRole {
    /// All five roles, in default priority order.
    pub const ALL: [BuyerRole; 5] = [
        BuyerRole::Decision,
        BuyerRole::Champion,
        BuyerRole::Stakeholder,
        BuyerRole::Blocker,
        BuyerRole::Introducer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerRole::Decision => "decision",
            BuyerRole::Champion => "champion",
            BuyerRole::Stakeholder => "stakeholder",
            BuyerRole::Blocker => "blocker",
            BuyerRole::Introducer => "introducer",
        }
    }
}

impl std::fmt::Display for BuyerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ManagementLevel
// ---------------------------------------------------------------------------

/// Coarse seniority band derived from a title (or provided by the directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementLevel {
    CLevel,
    Vp,
    Director,
    Manager,
    Individual,
    Entry,
}

impl ManagementLevel {
    /// Numeric rank used for seniority-spread metrics (higher is more senior).
    pub fn rank(&self) -> u8 {
        match self {
            ManagementLevel::CLevel => 5,
            ManagementLevel::Vp => 4,
            ManagementLevel::Director => 3,
            ManagementLevel::Manager => 2,
            ManagementLevel::Individual => 1,
            ManagementLevel::Entry => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagementLevel::CLevel => "c_level",
            ManagementLevel::Vp => "vp",
            ManagementLevel::Director => "director",
            ManagementLevel::Manager => "manager",
            ManagementLevel::Individual => "individual",
            ManagementLevel::Entry => "entry",
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A prospective buyer-group member as returned by directory search.
///
/// Raw identity fields are immutable after record mapping; everything derived
/// (scores, role, verified contact data) attaches via wrapper types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable external identifier (directory id or record fingerprint).
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Job title as reported by the directory.
    pub title: String,
    /// Department, when the directory provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Management level hint from the directory, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_level: Option<ManagementLevel>,
    /// Free-form location string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Professional-network connection count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,
    /// Follower count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u32>,
    /// Preview email from the directory (unverified).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Preview phone from the directory (unverified).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Public profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

// ---------------------------------------------------------------------------
// ScoreVector
// ---------------------------------------------------------------------------

/// Per-candidate fit scores. Each dimension is clamped to its declared range;
/// `geo_alignment` and `segment_adjustment` may be absent, in which case they
/// are excluded from the weighted composite entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    /// Title seniority relative to the deal size, 0..=10.
    pub seniority: f64,
    /// Department match for the product category, 0..=10.
    pub department_fit: f64,
    /// Network/authority signals, 0..=10.
    pub influence: f64,
    /// Likelihood of internal advocacy, 0..=25.
    pub champion_potential: f64,
    /// Cross-department collaboration signals, 0..=10.
    pub cross_functional: f64,
    /// Geographic alignment, 0..=10 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_alignment: Option<f64>,
    /// Sales-segment adjustment, -30..=20 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_adjustment: Option<f64>,
    /// Weighted composite, 0..=100.
    pub overall: f64,
    /// Independent gating estimate, 0.0..=1.0.
    pub relevance: f64,
}

/// Upper bound of the champion-potential dimension.
pub const CHAMPION_POTENTIAL_MAX: f64 = 25.0;
/// Upper bound of every 0..=10 dimension.
pub const DIMENSION_MAX: f64 = 10.0;
/// Bounds of the sales-segment adjustment.
pub const SEGMENT_ADJUSTMENT_MIN: f64 = -30.0;
pub const SEGMENT_ADJUSTMENT_MAX: f64 = 20.0;

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

impl ScoreVector {
    /// Return a copy with every dimension forced into its declared range.
    pub fn clamped(mut self) -> Self {
        self.seniority = clamp(self.seniority, 0.0, DIMENSION_MAX);
        self.department_fit = clamp(self.department_fit, 0.0, DIMENSION_MAX);
        self.influence = clamp(self.influence, 0.0, DIMENSION_MAX);
        self.champion_potential = clamp(self.champion_potential, 0.0, CHAMPION_POTENTIAL_MAX);
        self.cross_functional = clamp(self.cross_functional, 0.0, DIMENSION_MAX);
        self.geo_alignment = self.geo_alignment.map(|g| clamp(g, 0.0, DIMENSION_MAX));
        self.segment_adjustment = self
            .segment_adjustment
            .map(|s| clamp(s, SEGMENT_ADJUSTMENT_MIN, SEGMENT_ADJUSTMENT_MAX));
        self.overall = clamp(self.overall, 0.0, 100.0);
        self.relevance = clamp(self.relevance, 0.0, 1.0);
        self
    }
}

/// A candidate together with its computed scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub scores: ScoreVector,
}

// ---------------------------------------------------------------------------
// Buyer group membership
// ---------------------------------------------------------------------------

/// Verified contact data attached by the enrichment stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Verification confidence for the email, 0.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Verification confidence for the phone, 0.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_confidence: Option<f64>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// A scored candidate with an assigned committee role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerGroupMember {
    pub candidate: Candidate,
    pub scores: ScoreVector,
    /// Exactly one role per member; never unset.
    pub role: BuyerRole,
    /// Assignment confidence, 0..=100.
    pub role_confidence: f64,
    /// Which rule produced the assignment, in plain language.
    pub role_reasoning: String,
    /// Verified contact data; `None` until enrichment runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    /// Set when per-candidate enrichment failed; preview data is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

// ---------------------------------------------------------------------------
// SizeConstraints
// ---------------------------------------------------------------------------

/// Target group size derived from deal size, company scale, and pool size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeConstraints {
    pub min: usize,
    pub max: usize,
    pub ideal: usize,
    /// Whether a single-member group is acceptable (tiny candidate pools).
    pub accept_single_person: bool,
    /// How the numbers were derived, for audit.
    pub reasoning: String,
}

impl SizeConstraints {
    /// Invariant: `min <= ideal <= max`.
    pub fn is_consistent(&self) -> bool {
        self.min <= self.ideal && self.ideal <= self.max
    }
}

// ---------------------------------------------------------------------------
// Validation reports
// ---------------------------------------------------------------------------

/// Cross-functional coverage outcome: which required roles were present,
/// which the validator back-filled, and which could not be filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Roles required for this deal band.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<BuyerRole>,
    /// Required roles added from the remaining pool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backfilled: Vec<BuyerRole>,
    /// Required roles that remain missing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unfilled: Vec<BuyerRole>,
}

impl CoverageReport {
    pub fn is_fully_covered(&self) -> bool {
        self.unfilled.is_empty()
    }
}

/// Group cohesion metrics; all values 0..=100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohesionReport {
    /// Weighted composite of the metrics below.
    pub score: f64,
    /// How evenly the five roles are represented.
    pub role_balance: f64,
    /// Departmental mix (all-one-department groups score low).
    pub department_diversity: f64,
    /// Spread of management levels.
    pub seniority_spread: f64,
}

// ---------------------------------------------------------------------------
// FallbackLevel
// ---------------------------------------------------------------------------

/// Which filter policy in the adaptive cascade produced the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackLevel {
    /// Full thresholds applied.
    Strict,
    /// Relaxed relevance/influence thresholds.
    Relaxed,
    /// C-level titles only.
    CLevel,
    /// Top scorers minus the structural deny-list.
    TopScorers,
    /// Entire pool, best-first.
    Unfiltered,
}

impl FallbackLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackLevel::Strict => "strict",
            FallbackLevel::Relaxed => "relaxed",
            FallbackLevel::CLevel => "c-level",
            FallbackLevel::TopScorers => "top-scorers",
            FallbackLevel::Unfiltered => "unfiltered",
        }
    }
}

impl std::fmt::Display for FallbackLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BuyerGroup
// ---------------------------------------------------------------------------

/// The finished buyer group, with the constraints and validation reports that
/// shaped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerGroup {
    /// Members in selection order (best-first within each role pass).
    pub members: Vec<BuyerGroupMember>,
    /// The size constraints selection ran under.
    pub constraints: SizeConstraints,
    /// Cross-functional coverage outcome.
    pub coverage: CoverageReport,
    /// Cohesion metrics for the final composition.
    pub cohesion: CohesionReport,
    /// Which fallback level produced the underlying candidate set.
    pub selected_via: FallbackLevel,
}

impl BuyerGroup {
    /// Members holding the given role.
    pub fn members_with_role(&self, role: BuyerRole) -> impl Iterator<Item = &BuyerGroupMember> {
        self.members.iter().filter(move |m| m.role == role)
    }

    /// Whether at least one member holds the given role.
    pub fn has_role(&self, role: BuyerRole) -> bool {
        self.members.iter().any(|m| m.role == role)
    }

    /// Mean member role confidence, 0..=100. Zero for an empty group.
    pub fn overall_confidence(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        let total: f64 = self.members.iter().map(|m| m.role_confidence).sum();
        total / self.members.len() as f64
    }
}

// ---------------------------------------------------------------------------
// CostLedger
// ---------------------------------------------------------------------------

/// Running tally of external-call counts and accrued cost for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    pub searches: u32,
    pub profiles_collected: u32,
    pub emails_verified: u32,
    pub phones_verified: u32,
    /// Accrued cost in USD across all call classes.
    pub total_usd: f64,
}

impl CostLedger {
    pub fn record_search(&mut self, unit_cost: f64) {
        self.searches += 1;
        self.total_usd += unit_cost;
    }

    pub fn record_profile(&mut self, unit_cost: f64) {
        self.profiles_collected += 1;
        self.total_usd += unit_cost;
    }

    pub fn record_email_check(&mut self, unit_cost: f64) {
        self.emails_verified += 1;
        self.total_usd += unit_cost;
    }

    pub fn record_phone_check(&mut self, unit_cost: f64) {
        self.phones_verified += 1;
        self.total_usd += unit_cost;
    }

    /// Fold another ledger into this one.
    pub fn absorb(&mut self, other: &CostLedger) {
        self.searches += other.searches;
        self.profiles_collected += other.profiles_collected;
        self.emails_verified += other.emails_verified;
        self.phones_verified += other.phones_verified;
        self.total_usd += other.total_usd;
    }
}
