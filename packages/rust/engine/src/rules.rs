//! Data-driven keyword rule tables.
//!
//! Every title/department judgment in the engine goes through the tables in
//! this module: ordered regex rows with word-boundary matching, evaluated
//! first-match-wins. Policies that callers may swap per engagement (sales
//! segment orientation, institutional seniority tiers) are plain structs with
//! defaults; the fixed vocabulary lives in `LazyLock` statics.

use std::sync::LazyLock;

use regex::Regex;

use buyerscope_shared::{ManagementLevel, ProductCategory};

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

/// Normalized functional department inferred from a title or department label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Department {
    Sales,
    Marketing,
    Product,
    Engineering,
    Operations,
    Finance,
    Hr,
    Legal,
    CustomerSuccess,
    Security,
    Academics,
    Executive,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Sales => "sales",
            Department::Marketing => "marketing",
            Department::Product => "product",
            Department::Engineering => "engineering",
            Department::Operations => "operations",
            Department::Finance => "finance",
            Department::Hr => "hr",
            Department::Legal => "legal",
            Department::CustomerSuccess => "customer success",
            Department::Security => "security",
            Department::Academics => "academics",
            Department::Executive => "executive",
        }
    }

    /// Departments that typically gate rather than drive a purchase.
    pub fn is_blocker_leaning(&self) -> bool {
        matches!(
            self,
            Department::Finance | Department::Legal | Department::Security
        )
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered department inference table. Order matters: specific functions are
/// listed before broad ones so "security engineer" lands in security, not
/// engineering.
static DEPARTMENT_PATTERNS: LazyLock<Vec<(Department, Regex)>> = LazyLock::new(|| {
    let table: [(Department, &str); 12] = [
        (
            Department::Academics,
            r"\b(provost|dean|faculty|academic|chancellor|registrar|admissions|curriculum)\b",
        ),
        (
            Department::Security,
            r"\b(security|infosec|ciso|grc)\b",
        ),
        (
            Department::CustomerSuccess,
            r"\b(customer success|client success|solutions|architect|support|onboarding)\b",
        ),
        (
            Department::Sales,
            r"\b(sales|revenue|account|business development|bd|ae|sdr|bdr)\b",
        ),
        (
            Department::Marketing,
            r"\b(marketing|growth|demand gen|content|brand|communications)\b",
        ),
        (
            Department::Product,
            r"\b(product|pm|product manager|ux|ui|design)\b",
        ),
        (
            Department::Engineering,
            r"\b(engineer|developer|dev|software|frontend|backend|fullstack|swe)\b",
        ),
        (
            Department::Operations,
            r"\b(operations|ops|revops|salesops|marketingops|business operations)\b",
        ),
        (
            Department::Finance,
            r"\b(finance|accounting|fp&a|controller|cfo|treasurer|procurement|purchasing|sourcing)\b",
        ),
        (
            Department::Hr,
            r"\b(hr|human resources|people|talent|recruiting|recruitment)\b",
        ),
        (
            Department::Legal,
            r"\b(legal|counsel|compliance|regulatory)\b",
        ),
        (
            Department::Executive,
            r"\b(ceo|cto|coo|cio|cmo|cro|president|chief|founder|owner)\b",
        ),
    ];
    table
        .into_iter()
        .map(|(dept, pattern)| {
            (
                dept,
                Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
            )
        })
        .collect()
});

/// Infer a department from free text (a title or a department label).
pub fn match_department(text: &str) -> Option<Department> {
    DEPARTMENT_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(dept, _)| *dept)
}

/// Title-based power contribution per department.
pub fn department_power(dept: Option<Department>) -> f64 {
    match dept {
        Some(Department::Executive) => 0.3,
        Some(Department::Sales) => 0.25,
        Some(Department::Product) => 0.2,
        Some(Department::Engineering) => 0.15,
        Some(Department::Marketing) => 0.15,
        Some(Department::Academics) => 0.15,
        Some(Department::Operations) => 0.1,
        Some(Department::Finance) => 0.1,
        Some(Department::Security) => 0.1,
        Some(Department::CustomerSuccess) => 0.1,
        Some(Department::Hr) => 0.05,
        Some(Department::Legal) => 0.05,
        None => 0.05,
    }
}

// ---------------------------------------------------------------------------
// Management levels and title keyword sets
// ---------------------------------------------------------------------------

static C_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ceo|cfo|cto|coo|cio|cmo|cro|chief|president|founder|owner|c-suite)\b")
        .expect("valid regex")
});

/// Whether a title carries a recognized C-level indicator.
pub fn is_c_level(title: &str) -> bool {
    C_LEVEL_RE.is_match(title)
}

/// Ordered management-level table; C-level is checked separately first.
static LEVEL_PATTERNS: LazyLock<Vec<(ManagementLevel, Regex)>> = LazyLock::new(|| {
    let table: [(ManagementLevel, &str); 5] = [
        (ManagementLevel::Vp, r"\b(vp|svp|evp|vice president)\b"),
        (ManagementLevel::Director, r"\b(director|head of)\b"),
        (ManagementLevel::Manager, r"\b(manager|lead|senior|principal)\b"),
        (
            ManagementLevel::Individual,
            r"\b(engineer|developer|analyst|specialist|coordinator)\b",
        ),
        (
            ManagementLevel::Entry,
            r"\b(associate|junior|intern|assistant)\b",
        ),
    ];
    table
        .into_iter()
        .map(|(level, pattern)| {
            (
                level,
                Regex::new(&format!("(?i){pattern}")).expect("valid regex"),
            )
        })
        .collect()
});

/// Derive a management level from a title.
pub fn match_level(title: &str) -> Option<ManagementLevel> {
    if is_c_level(title) {
        return Some(ManagementLevel::CLevel);
    }
    LEVEL_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(title))
        .map(|(level, _)| *level)
}

static DECISION_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(vp|vice president|director|head|lead|manager|chief|president)\b")
        .expect("valid regex")
});

/// Title suggests decision-making authority (used by relevance scoring).
pub fn has_decision_keywords(title: &str) -> bool {
    DECISION_TITLE_RE.is_match(title)
}

static CHAMPION_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(vp|vice president|director|head of|senior)\b").expect("valid regex")
});

/// Title suggests the influential mid-leadership band champions come from.
pub fn has_champion_keywords(title: &str) -> bool {
    CHAMPION_TITLE_RE.is_match(title)
}

static OPENER_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(associate|coordinator|specialist|junior|assistant)\b")
        .expect("valid regex")
});

/// Title suggests an entry point rather than an authority.
pub fn has_opener_keywords(title: &str) -> bool {
    OPENER_TITLE_RE.is_match(title)
}

static COLLABORATIVE_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(cross[ -]functional|program|partnership|partner|alliance|collaboration|integration|transformation|strategy)\b",
    )
    .expect("valid regex")
});

/// Title suggests work that spans departments.
pub fn has_collaborative_keywords(title: &str) -> bool {
    COLLABORATIVE_TITLE_RE.is_match(title)
}

/// Titles that never belong in a buying committee, regardless of score.
static STRUCTURAL_DENY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(facilities|maintenance|janitor|custodian|security guard|receptionist|front desk|cafeteria|warehouse|driver)\b",
    )
    .expect("valid regex")
});

pub fn is_structurally_irrelevant(title: &str) -> bool {
    STRUCTURAL_DENY_RE.is_match(title)
}

// ---------------------------------------------------------------------------
// Product category profiles
// ---------------------------------------------------------------------------

/// Which departments and title keywords indicate fit for a product category.
#[derive(Debug, Clone)]
pub struct CategoryProfile {
    /// Departments that score full department fit.
    pub primary: Vec<Department>,
    /// Departments that score medium department fit.
    pub secondary: Vec<Department>,
    /// Title keywords that raise relevance for this category.
    pub title_keywords: Regex,
    /// Titles structurally irrelevant to this category (post-sale roles for
    /// acquisition products). Scores low even on keyword overlap.
    pub deny_titles: Option<Regex>,
}

impl CategoryProfile {
    pub fn is_primary(&self, dept: Department) -> bool {
        self.primary.contains(&dept)
    }

    pub fn is_secondary(&self, dept: Department) -> bool {
        self.secondary.contains(&dept)
    }

    pub fn is_denied_title(&self, title: &str) -> bool {
        self.deny_titles
            .as_ref()
            .map(|re| re.is_match(title))
            .unwrap_or(false)
    }
}

fn keywords(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid regex")
}

/// Post-sale roles: they work existing accounts, they do not buy
/// acquisition-oriented tooling.
const POST_SALE_DENY: &str =
    r"\b(account manager|account management|customer success|client success|renewal|retention)\b";

/// Built-in fit table for a product category. Custom filter lists, when
/// supplied, replace this table entirely.
pub fn category_profile(category: ProductCategory) -> CategoryProfile {
    use Department::*;
    match category {
        ProductCategory::Sales => CategoryProfile {
            primary: vec![Sales, Operations],
            secondary: vec![Marketing, Executive],
            title_keywords: keywords(
                r"\b(sales|revenue|revops|crm|enablement|pipeline|quota|gtm|go[ -]to[ -]market|salesforce)\b",
            ),
            deny_titles: Some(keywords(POST_SALE_DENY)),
        },
        ProductCategory::Marketing => CategoryProfile {
            primary: vec![Marketing],
            secondary: vec![Sales, Product, Executive],
            title_keywords: keywords(
                r"\b(marketing|demand gen|growth|brand|content|campaign|seo|events)\b",
            ),
            deny_titles: None,
        },
        ProductCategory::Engineering => CategoryProfile {
            primary: vec![Engineering],
            secondary: vec![Product, Security, Operations],
            title_keywords: keywords(
                r"\b(engineering|platform|infrastructure|devops|sre|architecture|developer)\b",
            ),
            deny_titles: None,
        },
        ProductCategory::Finance => CategoryProfile {
            primary: vec![Finance],
            secondary: vec![Operations, Executive],
            title_keywords: keywords(
                r"\b(finance|fp&a|accounting|budget|treasury|controller|audit)\b",
            ),
            deny_titles: None,
        },
        ProductCategory::Hr => CategoryProfile {
            primary: vec![Hr],
            secondary: vec![Operations, Executive],
            title_keywords: keywords(
                r"\b(people|talent|hr|recruiting|benefits|culture|workforce)\b",
            ),
            deny_titles: None,
        },
        ProductCategory::Security => CategoryProfile {
            primary: vec![Security],
            secondary: vec![Engineering, Legal, Operations],
            title_keywords: keywords(r"\b(security|infosec|ciso|grc|risk|compliance)\b"),
            deny_titles: None,
        },
        ProductCategory::Education => CategoryProfile {
            primary: vec![Academics],
            secondary: vec![Operations, Executive],
            title_keywords: keywords(
                r"\b(academic|provost|dean|curriculum|instruction|learning|student)\b",
            ),
            deny_titles: None,
        },
        ProductCategory::Generic => CategoryProfile {
            primary: vec![Executive, Operations],
            secondary: vec![Sales, Marketing, Product, Engineering, Finance],
            title_keywords: keywords(r"\b(strategy|operations|transformation|innovation)\b"),
            deny_titles: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Sales segment policy (swappable)
// ---------------------------------------------------------------------------

/// Hunter/farmer title classification for acquisition-style products.
/// Leadership titles are exempt: a VP owns both motions.
#[derive(Debug, Clone)]
pub struct SegmentPolicy {
    hunter: Regex,
    farmer: Regex,
    pub hunter_adjustment: f64,
    pub farmer_adjustment: f64,
}

impl SegmentPolicy {
    /// Build a policy from plain keyword lists.
    pub fn from_keywords(
        hunter: &[&str],
        farmer: &[&str],
        hunter_adjustment: f64,
        farmer_adjustment: f64,
    ) -> Self {
        Self {
            hunter: compile_term_set(hunter),
            farmer: compile_term_set(farmer),
            hunter_adjustment,
            farmer_adjustment,
        }
    }

    /// Signed adjustment for a title, 0 for leadership or unclassified titles.
    pub fn classify(&self, title: &str, level: ManagementLevel) -> f64 {
        if matches!(level, ManagementLevel::CLevel | ManagementLevel::Vp) {
            return 0.0;
        }
        if self.farmer.is_match(title) {
            return self.farmer_adjustment;
        }
        if self.hunter.is_match(title) {
            return self.hunter_adjustment;
        }
        0.0
    }
}

impl Default for SegmentPolicy {
    fn default() -> Self {
        Self::from_keywords(
            &[
                "new business",
                "new logo",
                "net new",
                "acquisition",
                "hunter",
                "business development",
                "pipeline",
                "outbound",
            ],
            &[
                "account manager",
                "account management",
                "customer success",
                "client success",
                "renewal",
                "retention",
                "expansion",
                "existing accounts",
            ],
            15.0,
            -25.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Seniority tier tables (swappable)
// ---------------------------------------------------------------------------

/// One row of a vertical-specific seniority table.
#[derive(Debug, Clone)]
pub struct SeniorityTier {
    pub pattern: Regex,
    pub score: f64,
}

/// Ordered tier table replacing the generic deal-band seniority matrix when a
/// vertical hierarchy is configured. First matching tier wins.
#[derive(Debug, Clone)]
pub struct SeniorityTable {
    tiers: Vec<SeniorityTier>,
}

impl SeniorityTable {
    pub fn new(tiers: Vec<SeniorityTier>) -> Self {
        Self { tiers }
    }

    pub fn score_for(&self, title: &str) -> Option<f64> {
        self.tiers
            .iter()
            .find(|tier| tier.pattern.is_match(title))
            .map(|tier| tier.score)
    }
}

/// Institutional hierarchy for the education vertical:
/// Provost > VP > Dean > Director > Chair.
pub fn education_seniority_table() -> SeniorityTable {
    let rows: [(&str, f64); 6] = [
        (r"\b(provost|chancellor|president|superintendent)\b", 10.0),
        (r"\b(vp|vice president|vice provost|vice chancellor)\b", 8.0),
        (r"\b(dean)\b", 7.0),
        (r"\b(director|head of)\b", 6.0),
        (r"\b(chair|department head|principal)\b", 5.0),
        (r"\b(professor|faculty|instructor|teacher)\b", 3.0),
    ];
    SeniorityTable::new(
        rows.into_iter()
            .map(|(pattern, score)| SeniorityTier {
                pattern: keywords(pattern),
                score,
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Custom term compilation
// ---------------------------------------------------------------------------

/// Compile one alternation regex from caller-supplied terms. Terms are
/// escaped, matched case-insensitively on word boundaries.
fn compile_term_set(terms: &[&str]) -> Regex {
    let escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"(?i)\b({})\b", escaped.join("|"))).expect("valid regex")
}

/// Compile caller-supplied filter terms for custom department/title lists.
/// Empty input yields `None` so callers can distinguish "no list" cheaply.
pub fn compile_terms(terms: &[String]) -> Option<Regex> {
    if terms.is_empty() {
        return None;
    }
    let borrowed: Vec<&str> = terms.iter().map(|s| s.as_str()).collect();
    Some(compile_term_set(&borrowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_inference_prefers_specific_functions() {
        assert_eq!(
            match_department("Security Engineer"),
            Some(Department::Security)
        );
        assert_eq!(
            match_department("VP of Sales"),
            Some(Department::Sales)
        );
        assert_eq!(match_department("CFO"), Some(Department::Finance));
        assert_eq!(
            match_department("Chief Executive Officer"),
            Some(Department::Executive)
        );
        assert_eq!(match_department("Bartender"), None);
    }

    #[test]
    fn procurement_lands_in_finance() {
        assert_eq!(
            match_department("Head of Procurement"),
            Some(Department::Finance)
        );
        assert!(Department::Finance.is_blocker_leaning());
    }

    #[test]
    fn level_matching_orders_by_seniority() {
        assert_eq!(match_level("CTO"), Some(ManagementLevel::CLevel));
        assert_eq!(match_level("SVP Revenue"), Some(ManagementLevel::Vp));
        assert_eq!(match_level("Head of Growth"), Some(ManagementLevel::Director));
        assert_eq!(match_level("Senior Engineer"), Some(ManagementLevel::Manager));
        assert_eq!(match_level("Data Analyst"), Some(ManagementLevel::Individual));
        assert_eq!(match_level("Junior Associate"), Some(ManagementLevel::Entry));
        assert_eq!(match_level("Wizard"), None);
    }

    #[test]
    fn sales_profile_denies_post_sale_titles() {
        let profile = category_profile(ProductCategory::Sales);
        assert!(profile.is_denied_title("Account Manager"));
        assert!(profile.is_denied_title("Customer Success Lead"));
        assert!(!profile.is_denied_title("VP of Sales"));
        assert!(profile.is_primary(Department::Sales));
        assert!(profile.is_secondary(Department::Marketing));
    }

    #[test]
    fn segment_policy_classifies_hunters_and_farmers() {
        let policy = SegmentPolicy::default();
        assert!(policy.classify("New Business Account Executive", ManagementLevel::Individual) > 0.0);
        assert!(policy.classify("Account Manager", ManagementLevel::Manager) < 0.0);
        // Leadership is exempt even with farmer keywords in the title.
        assert_eq!(
            policy.classify("VP Customer Success", ManagementLevel::Vp),
            0.0
        );
        assert_eq!(
            policy.classify("Software Engineer", ManagementLevel::Individual),
            0.0
        );
    }

    #[test]
    fn education_table_ranks_provost_over_dean() {
        let table = education_seniority_table();
        assert_eq!(table.score_for("Provost"), Some(10.0));
        assert_eq!(table.score_for("Dean of Students"), Some(7.0));
        assert_eq!(table.score_for("Director of Admissions"), Some(6.0));
        assert_eq!(table.score_for("Groundskeeper"), None);
    }

    #[test]
    fn structural_deny_list_catches_non_buyers() {
        assert!(is_structurally_irrelevant("Facilities Coordinator"));
        assert!(is_structurally_irrelevant("Security Guard"));
        assert!(!is_structurally_irrelevant("Chief Security Officer"));
    }

    #[test]
    fn custom_terms_compile_and_match() {
        let terms = vec!["Revenue Operations".to_string(), "Sales Enablement".to_string()];
        let re = compile_terms(&terms).expect("non-empty");
        assert!(re.is_match("Director of revenue operations"));
        assert!(!re.is_match("Field Marketing"));
        assert!(compile_terms(&[]).is_none());
    }
}
