//! Shared types, error model, and configuration for BuyerScope.
//!
//! This crate is the foundation depended on by all other BuyerScope crates.
//! It provides:
//! - [`BuyerScopeError`] — the unified error type
//! - Domain types ([`Candidate`], [`ScoreVector`], [`BuyerGroup`], [`RunId`])
//! - Configuration ([`AppConfig`], [`DiscoveryConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompanyIntel, CostsConfig, CustomFiltering, DefaultsConfig, DiscoveryConfig,
    EnrichmentConfig, FilterLists, ProductCategory, RolePriorities, SizingOverride, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{BuyerScopeError, Result};
pub use types::{
    BuyerGroup, BuyerGroupMember, BuyerRole, Candidate, CohesionReport, ContactInfo, CostLedger,
    CoverageReport, FallbackLevel, ManagementLevel, RunId, ScoreVector, ScoredCandidate,
    SizeConstraints,
};
