//! Discovery report assembly, rendering, and on-disk output.
//!
//! The report is the engine's only persistent output: a plain serializable
//! value with a markdown summary renderer, a JSON renderer, and an atomic
//! writer that emits both files side by side.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use buyerscope_reasoning::GroupJudgment;
use buyerscope_shared::{
    BuyerGroup, BuyerScopeError, CompanyIntel, FallbackLevel, ProductCategory, Result, RunId,
};

use crate::pipeline::RunStats;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// What the run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "group", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// A formed buyer group with its validation reports.
    Group(BuyerGroup),
    /// The directory returned zero candidates; nothing to form a group from.
    NoCandidates,
}

/// The complete record of one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub run_id: RunId,
    pub company: CompanyIntel,
    pub deal_size_usd: f64,
    /// Deal-band label derived from the deal size.
    pub deal_band: String,
    pub product_category: ProductCategory,
    pub outcome: RunOutcome,
    /// Mean member role confidence, present when a group formed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,
    /// Present only when the reasoner reviewed the final group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoner_review: Option<GroupJudgment>,
    pub stats: RunStats,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl DiscoveryReport {
    /// The formed group, when the run produced one.
    pub fn group(&self) -> Option<&BuyerGroup> {
        match &self.outcome {
            RunOutcome::Group(group) => Some(group),
            RunOutcome::NoCandidates => None,
        }
    }

    /// Which fallback level produced the group's candidate set.
    pub fn fallback_level(&self) -> Option<FallbackLevel> {
        self.group().map(|g| g.selected_via)
    }

    /// Stable file stem for on-disk output: company slug plus run id.
    pub fn file_stem(&self) -> String {
        let slug = slugify(&self.company.name);
        format!("buyerscope-{slug}-{}", self.run_id)
    }
}

/// Lowercase the name and collapse every non-alphanumeric run into one dash.
fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "company".into()
    } else {
        trimmed.into()
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &DiscoveryReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| BuyerScopeError::validation(format!("report serialization failed: {e}")))
}

/// Render the human-readable markdown summary.
pub fn render_markdown(report: &DiscoveryReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Buyer Group: {}\n\n", report.company.name));
    out.push_str(&format!("- Run: {}\n", report.run_id));
    out.push_str(&format!(
        "- Date: {}\n",
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!(
        "- Deal size: {} ({})\n",
        format_usd(report.deal_size_usd),
        report.deal_band
    ));
    out.push_str(&format!("- Category: {}\n", report.product_category));
    if let Some(level) = report.fallback_level() {
        out.push_str(&format!("- Filter level: {level}\n"));
    }
    if let Some(confidence) = report.overall_confidence {
        out.push_str(&format!("- Confidence: {confidence:.0}%\n"));
    }
    out.push('\n');

    match &report.outcome {
        RunOutcome::NoCandidates => {
            out.push_str(
                "No buyer group could be formed: the directory search returned zero \
                 candidates for this company.\n",
            );
        }
        RunOutcome::Group(group) => {
            render_group(&mut out, group);
        }
    }

    if let Some(review) = &report.reasoner_review {
        out.push_str("## Reasoner review\n\n");
        out.push_str(&format!(
            "- Approved: {} (confidence {:.0})\n",
            if review.approved { "yes" } else { "no" },
            review.confidence
        ));
        for concern in &review.concerns {
            out.push_str(&format!("- Concern: {concern}\n"));
        }
        out.push('\n');
    }

    render_stats(&mut out, report);
    out
}

fn render_group(out: &mut String, group: &BuyerGroup) {
    out.push_str(&format!("## Members ({})\n\n", group.members.len()));

    for (index, member) in group.members.iter().enumerate() {
        out.push_str(&format!(
            "### {}. {} ({})\n\n",
            index + 1,
            member.candidate.name,
            member.role
        ));
        match member.candidate.department.as_deref() {
            Some(dept) => out.push_str(&format!(
                "- Title: {} ({dept})\n",
                display_title(&member.candidate.title)
            )),
            None => out.push_str(&format!(
                "- Title: {}\n",
                display_title(&member.candidate.title)
            )),
        }
        out.push_str(&format!(
            "- Scores: overall {:.1}, relevance {:.2}, seniority {:.1}, influence {:.1}, \
             champion {:.1}\n",
            member.scores.overall,
            member.scores.relevance,
            member.scores.seniority,
            member.scores.influence,
            member.scores.champion_potential
        ));
        out.push_str(&format!(
            "- Role confidence: {:.0}% ({})\n",
            member.role_confidence, member.role_reasoning
        ));
        if let Some(contact) = &member.contact {
            if let Some(email) = &contact.email {
                out.push_str(&format!(
                    "- Email: {email} (confidence {:.2})\n",
                    contact.email_confidence.unwrap_or(0.0)
                ));
            }
            if let Some(phone) = &contact.phone {
                out.push_str(&format!(
                    "- Phone: {phone} (confidence {:.2})\n",
                    contact.phone_confidence.unwrap_or(0.0)
                ));
            }
        }
        if let Some(error) = &member.enrichment_error {
            out.push_str(&format!("- Enrichment failed: {error}\n"));
        }
        out.push('\n');
    }

    out.push_str("## Size constraints\n\n");
    out.push_str(&format!(
        "- Target: {} to {} members, ideal {}\n",
        group.constraints.min, group.constraints.max, group.constraints.ideal
    ));
    if group.constraints.accept_single_person {
        out.push_str("- A single-member group was acceptable for this pool\n");
    }
    out.push_str(&format!("- Derivation: {}\n\n", group.constraints.reasoning));

    out.push_str("## Coverage\n\n");
    out.push_str(&format!(
        "- Required: {}\n",
        join_roles(&group.coverage.required)
    ));
    if !group.coverage.backfilled.is_empty() {
        out.push_str(&format!(
            "- Backfilled: {}\n",
            join_roles(&group.coverage.backfilled)
        ));
    }
    if group.coverage.unfilled.is_empty() {
        out.push_str("- Unfilled: none\n");
    } else {
        out.push_str(&format!(
            "- Unfilled: {}\n",
            join_roles(&group.coverage.unfilled)
        ));
    }
    out.push('\n');

    out.push_str("## Cohesion\n\n");
    out.push_str(&format!("- Score: {:.1}\n", group.cohesion.score));
    out.push_str(&format!(
        "- Role balance: {:.1}\n",
        group.cohesion.role_balance
    ));
    out.push_str(&format!(
        "- Department diversity: {:.1}\n",
        group.cohesion.department_diversity
    ));
    out.push_str(&format!(
        "- Seniority spread: {:.1}\n\n",
        group.cohesion.seniority_spread
    ));
}

fn render_stats(out: &mut String, report: &DiscoveryReport) {
    let stats = &report.stats;
    out.push_str("## Run\n\n");
    out.push_str(&format!(
        "- Candidates: {} seen, {} scored\n",
        stats.candidates_seen, stats.candidates_scored
    ));
    out.push_str(&format!(
        "- Enrichment: {} enriched, {} failed\n",
        stats.enriched, stats.enrichment_failures
    ));
    if stats.reasoner_calls > 0 {
        out.push_str(&format!("- Reasoner calls: {}\n", stats.reasoner_calls));
    }
    if !stats.stages_skipped.is_empty() {
        out.push_str(&format!(
            "- Stages skipped: {}\n",
            stats.stages_skipped.join(", ")
        ));
    }
    out.push_str(&format!(
        "- External calls: {} searches, {} profiles, {} email checks, {} phone checks\n",
        stats.costs.searches,
        stats.costs.profiles_collected,
        stats.costs.emails_verified,
        stats.costs.phones_verified
    ));
    out.push_str(&format!("- Accrued cost: ${:.2}\n", stats.costs.total_usd));
    out.push_str(&format!(
        "- Elapsed: {:.1}s\n",
        report.elapsed_ms as f64 / 1000.0
    ));
}

fn join_roles(roles: &[buyerscope_shared::BuyerRole]) -> String {
    if roles.is_empty() {
        return "none".into();
    }
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Network-inferred titles may be empty in the raw record; show a placeholder.
fn display_title(title: &str) -> &str {
    if title.trim().is_empty() { "(no title)" } else { title }
}

/// Whole-dollar formatting with thousands separators.
fn format_usd(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

// ---------------------------------------------------------------------------
// On-disk output
// ---------------------------------------------------------------------------

/// Paths of the files a report was written to.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Write the JSON and markdown renderings side by side under `output_dir`.
///
/// Files are written to a temp name and renamed into place so a crashed run
/// never leaves a half-written report behind.
#[instrument(skip_all, fields(dir = %output_dir.display()))]
pub fn write_report(output_dir: &Path, report: &DiscoveryReport) -> Result<WrittenReport> {
    std::fs::create_dir_all(output_dir).map_err(|e| BuyerScopeError::io(output_dir, e))?;

    let stem = report.file_stem();
    let json_path = output_dir.join(format!("{stem}.json"));
    let markdown_path = output_dir.join(format!("{stem}.md"));

    write_atomic(&json_path, &render_json(report)?)?;
    write_atomic(&markdown_path, &render_markdown(report))?;

    info!(
        json = %json_path.display(),
        markdown = %markdown_path.display(),
        "report written"
    );

    Ok(WrittenReport {
        json_path,
        markdown_path,
    })
}

fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("report");
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| BuyerScopeError::io(&temp, e))?;
    std::fs::rename(&temp, target).map_err(|e| BuyerScopeError::io(target, e))?;

    debug!(path = %target.display(), bytes = content.len(), "wrote report file");
    Ok(())
}
