//! The buyer-group engine: every pure stage between a scored pool and a
//! validated group.
//!
//! Stages are independent structs wired together by the pipeline crate:
//! - [`CandidateScorer`] — seven bounded score dimensions per candidate
//! - [`RoleAssigner`] — the decision-power role cascade
//! - [`GroupSizer`] — deal-band size constraints
//! - [`GroupSelector`] — adaptive filtering plus role-aware selection
//! - [`CoverageValidator`] — required-role back-fill
//! - [`cohesion_report`] — composition metrics for the final group
//!
//! Everything in this crate is deterministic and I/O-free.

pub mod cohesion;
pub mod coverage;
pub mod roles;
pub mod rules;
pub mod scoring;
pub mod selection;
pub mod sizing;
pub mod titles;

pub use cohesion::cohesion_report;
pub use coverage::{CoverageValidator, required_roles};
pub use roles::{DecisionPower, RoleAssigner, RoleAssignment};
pub use scoring::{CandidateScorer, DEFAULT_WEIGHTS, DealBand, Weights};
pub use selection::{
    FilterThresholds, GroupSelector, RELAXED_THRESHOLDS, STRICT_THRESHOLDS, filter_cascade,
};
pub use sizing::GroupSizer;
pub use titles::TitleFacts;
