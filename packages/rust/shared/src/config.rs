//! Application configuration for BuyerScope.
//!
//! User config lives at `~/.buyerscope/buyerscope.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuyerScopeError, Result};
use crate::types::BuyerRole;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "buyerscope.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".buyerscope";

// ---------------------------------------------------------------------------
// Config structs (matching buyerscope.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External-call throttling and verification settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Unit costs per external call class.
    #[serde(default)]
    pub costs: CostsConfig,

    /// Role tie-break weights.
    #[serde(default)]
    pub role_priorities: RolePriorities,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default report output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default product category when the CLI does not pass one.
    #[serde(default = "default_product_category")]
    pub product_category: String,

    /// Restrict directory search to US-located candidates.
    #[serde(default)]
    pub usa_only: bool,

    /// Placeholder geo-alignment score applied to every candidate.
    #[serde(default = "default_geo_alignment")]
    pub geo_alignment_score: f64,

    /// Maximum candidates requested from directory search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            product_category: default_product_category(),
            usa_only: false,
            geo_alignment_score: default_geo_alignment(),
            search_limit: default_search_limit(),
        }
    }
}

fn default_output_dir() -> String {
    "~/buyerscope-reports".into()
}
fn default_product_category() -> String {
    "sales".into()
}
fn default_geo_alignment() -> f64 {
    5.0
}
fn default_search_limit() -> usize {
    100
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Minimum ms between consecutive external calls.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts for retryable failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff in ms, doubled per retry.
    #[serde(default = "default_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Verification confidence below which a contact is discarded.
    #[serde(default = "default_min_contact_confidence")]
    pub min_contact_confidence: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_backoff_ms(),
            min_contact_confidence: default_min_contact_confidence(),
        }
    }
}

fn default_pacing_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    500
}
fn default_min_contact_confidence() -> f64 {
    0.7
}

/// `[costs]` section. USD per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostsConfig {
    #[serde(default = "default_search_cost")]
    pub search_usd: f64,
    #[serde(default = "default_profile_cost")]
    pub profile_usd: f64,
    #[serde(default = "default_email_cost")]
    pub email_check_usd: f64,
    #[serde(default = "default_phone_cost")]
    pub phone_check_usd: f64,
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            search_usd: default_search_cost(),
            profile_usd: default_profile_cost(),
            email_check_usd: default_email_cost(),
            phone_check_usd: default_phone_cost(),
        }
    }
}

fn default_search_cost() -> f64 {
    0.05
}
fn default_profile_cost() -> f64 {
    0.10
}
fn default_email_cost() -> f64 {
    0.02
}
fn default_phone_cost() -> f64 {
    0.03
}

/// `[role_priorities]` section. Higher weight wins role tie-breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePriorities {
    #[serde(default = "default_decision_weight")]
    pub decision: f64,
    #[serde(default = "default_champion_weight")]
    pub champion: f64,
    #[serde(default = "default_stakeholder_weight")]
    pub stakeholder: f64,
    #[serde(default = "default_blocker_weight")]
    pub blocker: f64,
    #[serde(default = "default_introducer_weight")]
    pub introducer: f64,
}

impl Default for RolePriorities {
    fn default() -> Self {
        Self {
            decision: default_decision_weight(),
            champion: default_champion_weight(),
            stakeholder: default_stakeholder_weight(),
            blocker: default_blocker_weight(),
            introducer: default_introducer_weight(),
        }
    }
}

fn default_decision_weight() -> f64 {
    5.0
}
fn default_champion_weight() -> f64 {
    4.0
}
fn default_stakeholder_weight() -> f64 {
    3.0
}
fn default_blocker_weight() -> f64 {
    2.0
}
fn default_introducer_weight() -> f64 {
    1.0
}

impl RolePriorities {
    /// Tie-break weight for a role.
    pub fn weight_for(&self, role: BuyerRole) -> f64 {
        match role {
            BuyerRole::Decision => self.decision,
            BuyerRole::Champion => self.champion,
            BuyerRole::Stakeholder => self.stakeholder,
            BuyerRole::Blocker => self.blocker,
            BuyerRole::Introducer => self.introducer,
        }
    }

    /// Roles ordered by descending weight, id order breaking exact ties.
    pub fn ordered_roles(&self) -> Vec<BuyerRole> {
        let mut roles = BuyerRole::ALL.to_vec();
        roles.sort_by(|a, b| {
            self.weight_for(*b)
                .partial_cmp(&self.weight_for(*a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        roles
    }
}

// ---------------------------------------------------------------------------
// Product category
// ---------------------------------------------------------------------------

/// Which buyer persona the product sells to. Drives the built-in department
/// and title rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Sales,
    Marketing,
    Engineering,
    Finance,
    Hr,
    Security,
    Education,
    /// No category-specific table; generic business fit only.
    Generic,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Sales => "sales",
            ProductCategory::Marketing => "marketing",
            ProductCategory::Engineering => "engineering",
            ProductCategory::Finance => "finance",
            ProductCategory::Hr => "hr",
            ProductCategory::Security => "security",
            ProductCategory::Education => "education",
            ProductCategory::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = BuyerScopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(ProductCategory::Sales),
            "marketing" => Ok(ProductCategory::Marketing),
            "engineering" => Ok(ProductCategory::Engineering),
            "finance" => Ok(ProductCategory::Finance),
            "hr" => Ok(ProductCategory::Hr),
            "security" => Ok(ProductCategory::Security),
            "education" => Ok(ProductCategory::Education),
            "generic" => Ok(ProductCategory::Generic),
            other => Err(BuyerScopeError::config(format!(
                "unknown product category '{other}' (expected one of: sales, marketing, \
                 engineering, finance, hr, security, education, generic)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime discovery config (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// What we know about the target company going into a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyIntel {
    /// Company display name. Required.
    pub name: String,
    /// Primary web domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Industry label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Total employee count, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    /// Annual revenue in USD, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_usd: Option<f64>,
}

impl CompanyIntel {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            industry: None,
            headcount: None,
            revenue_usd: None,
        }
    }
}

/// Primary/secondary/exclude term lists for one filtering axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterLists {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Caller-provided filtering that replaces the built-in category tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFiltering {
    #[serde(default)]
    pub departments: FilterLists,
    #[serde(default)]
    pub titles: FilterLists,
}

impl CustomFiltering {
    pub fn is_empty(&self) -> bool {
        self.departments.primary.is_empty()
            && self.departments.secondary.is_empty()
            && self.departments.exclude.is_empty()
            && self.titles.primary.is_empty()
            && self.titles.secondary.is_empty()
            && self.titles.exclude.is_empty()
    }
}

/// Explicit group-size override; still pool-clamped by the sizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizingOverride {
    pub min: usize,
    pub max: usize,
    pub ideal: usize,
}

/// Runtime discovery configuration for one run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Target company.
    pub company: CompanyIntel,
    /// Deal size in USD. Must be positive and finite.
    pub deal_size_usd: f64,
    /// Buyer persona category.
    pub product_category: ProductCategory,
    /// Caller filtering that overrides the built-in category tables.
    pub custom_filtering: Option<CustomFiltering>,
    /// Explicit size override.
    pub sizing_override: Option<SizingOverride>,
    /// Role tie-break weights.
    pub role_priorities: RolePriorities,
    /// Restrict search to US-located candidates.
    pub usa_only: bool,
    /// Placeholder geo-alignment score; `None` drops the dimension.
    pub geo_alignment_score: Option<f64>,
    /// Maximum candidates requested from directory search.
    pub search_limit: usize,
    /// External-call throttling and verification settings.
    pub enrichment: EnrichmentConfig,
    /// Unit costs per external call class.
    pub costs: CostsConfig,
}

impl DiscoveryConfig {
    /// Build a runtime config with library defaults for everything optional.
    pub fn new(
        company: CompanyIntel,
        deal_size_usd: f64,
        product_category: ProductCategory,
    ) -> Self {
        Self {
            company,
            deal_size_usd,
            product_category,
            custom_filtering: None,
            sizing_override: None,
            role_priorities: RolePriorities::default(),
            usa_only: false,
            geo_alignment_score: Some(default_geo_alignment()),
            search_limit: default_search_limit(),
            enrichment: EnrichmentConfig::default(),
            costs: CostsConfig::default(),
        }
    }

    /// Fold app-config defaults into this runtime config.
    pub fn with_app_config(mut self, config: &AppConfig) -> Self {
        self.usa_only = config.defaults.usa_only;
        self.geo_alignment_score = Some(config.defaults.geo_alignment_score);
        self.search_limit = config.defaults.search_limit;
        self.enrichment = config.enrichment.clone();
        self.costs = config.costs.clone();
        self.role_priorities = config.role_priorities.clone();
        self
    }

    /// Reject configs the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.company.name.trim().is_empty() {
            return Err(BuyerScopeError::config("company name must not be empty"));
        }
        if !self.deal_size_usd.is_finite() || self.deal_size_usd <= 0.0 {
            return Err(BuyerScopeError::config(format!(
                "deal_size_usd must be positive, got {}",
                self.deal_size_usd
            )));
        }
        if let Some(sizing) = &self.sizing_override {
            if sizing.min == 0 || sizing.min > sizing.ideal || sizing.ideal > sizing.max {
                return Err(BuyerScopeError::config(format!(
                    "sizing override must satisfy 1 <= min <= ideal <= max, got \
                     min={} ideal={} max={}",
                    sizing.min, sizing.ideal, sizing.max
                )));
            }
        }
        if self.search_limit == 0 {
            return Err(BuyerScopeError::config("search_limit must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.buyerscope/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BuyerScopeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.buyerscope/buyerscope.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BuyerScopeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BuyerScopeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BuyerScopeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BuyerScopeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BuyerScopeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("pacing_ms"));
        assert!(toml_str.contains("search_usd"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.enrichment.timeout_secs, 30);
        assert_eq!(parsed.defaults.product_category, "sales");
        assert_eq!(parsed.role_priorities.decision, 5.0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
usa_only = true

[role_priorities]
blocker = 4.5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.defaults.usa_only);
        assert_eq!(config.defaults.search_limit, 100);
        assert_eq!(config.role_priorities.blocker, 4.5);
        assert_eq!(config.role_priorities.decision, 5.0);
    }

    #[test]
    fn product_category_parses() {
        let cat: ProductCategory = "Sales".parse().expect("parse");
        assert_eq!(cat, ProductCategory::Sales);
        assert!("warehouse-robotics".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn ordered_roles_follow_weights() {
        let mut priorities = RolePriorities::default();
        priorities.blocker = 9.0;
        let ordered = priorities.ordered_roles();
        assert_eq!(ordered[0], BuyerRole::Blocker);
        assert_eq!(ordered[1], BuyerRole::Decision);
    }

    #[test]
    fn discovery_config_rejects_bad_deal_size() {
        let config = DiscoveryConfig::new(
            CompanyIntel::named("Acme Corp"),
            0.0,
            ProductCategory::Sales,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deal_size_usd"));
    }

    #[test]
    fn discovery_config_rejects_empty_company() {
        let config =
            DiscoveryConfig::new(CompanyIntel::named("  "), 150_000.0, ProductCategory::Sales);
        assert!(config.validate().is_err());
    }

    #[test]
    fn discovery_config_rejects_inconsistent_override() {
        let mut config = DiscoveryConfig::new(
            CompanyIntel::named("Acme Corp"),
            150_000.0,
            ProductCategory::Sales,
        );
        config.sizing_override = Some(SizingOverride {
            min: 5,
            max: 4,
            ideal: 4,
        });
        assert!(config.validate().is_err());
    }
}
