//! Core pipeline orchestration and report assembly for BuyerScope.
//!
//! This crate ties scoring, role assignment, sizing, selection, coverage,
//! enrichment, and cohesion validation into the end-to-end discovery run,
//! and renders the resulting [`report::DiscoveryReport`].

pub mod pipeline;
pub mod report;

pub use pipeline::{
    CancelToken, DiscoveryPipeline, ProgressReporter, RunStats, SilentProgress, Stage,
    StageTiming,
};
pub use report::{
    DiscoveryReport, RunOutcome, WrittenReport, render_json, render_markdown, write_report,
};
