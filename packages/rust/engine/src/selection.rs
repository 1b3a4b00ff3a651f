//! Adaptive candidate filtering and role-aware group selection.
//!
//! Filtering never returns an empty set while the pool has anyone in it:
//! thresholds relax level by level until candidates appear, and the level
//! that produced the set is reported on the final group.

use buyerscope_shared::{BuyerGroupMember, FallbackLevel, RolePriorities, SizeConstraints};
use tracing::debug;

use crate::rules;

// ---------------------------------------------------------------------------
// Filter cascade
// ---------------------------------------------------------------------------

/// Score floors applied by the threshold-based cascade levels.
#[derive(Debug, Clone, Copy)]
pub struct FilterThresholds {
    pub min_relevance: f64,
    pub min_influence: f64,
    pub min_cross_functional: f64,
}

pub const STRICT_THRESHOLDS: FilterThresholds = FilterThresholds {
    min_relevance: 0.4,
    min_influence: 3.0,
    min_cross_functional: 4.0,
};

pub const RELAXED_THRESHOLDS: FilterThresholds = FilterThresholds {
    min_relevance: 0.2,
    min_influence: 1.0,
    min_cross_functional: 2.0,
};

fn passes(thresholds: FilterThresholds, member: &BuyerGroupMember) -> bool {
    member.scores.relevance >= thresholds.min_relevance
        && member.scores.influence >= thresholds.min_influence
        && member.scores.cross_functional >= thresholds.min_cross_functional
}

/// Run the fallback cascade over a role-assigned pool. Returns the first
/// non-empty candidate set and the level that produced it.
pub fn filter_cascade(pool: &[BuyerGroupMember]) -> (Vec<BuyerGroupMember>, FallbackLevel) {
    let levels: [(FallbackLevel, Box<dyn Fn(&BuyerGroupMember) -> bool>); 5] = [
        (
            FallbackLevel::Strict,
            Box::new(|m| passes(STRICT_THRESHOLDS, m)),
        ),
        (
            FallbackLevel::Relaxed,
            Box::new(|m| passes(RELAXED_THRESHOLDS, m)),
        ),
        (
            FallbackLevel::CLevel,
            Box::new(|m| rules::is_c_level(&m.candidate.title)),
        ),
        (
            FallbackLevel::TopScorers,
            Box::new(|m| !rules::is_structurally_irrelevant(&m.candidate.title)),
        ),
        (FallbackLevel::Unfiltered, Box::new(|_| true)),
    ];

    for (level, keep) in &levels {
        let kept: Vec<BuyerGroupMember> = pool.iter().filter(|m| keep(m)).cloned().collect();
        debug!(level = %level, kept = kept.len(), pool = pool.len(), "filter pass");
        if !kept.is_empty() {
            return (kept, *level);
        }
    }
    (Vec::new(), FallbackLevel::Unfiltered)
}

// ---------------------------------------------------------------------------
// Group selection
// ---------------------------------------------------------------------------

/// Picks the final group from a filtered pool: one pass to cover each role in
/// priority order, then best-remaining fill up to the ideal size.
pub struct GroupSelector {
    priorities: RolePriorities,
}

impl GroupSelector {
    pub fn new(priorities: RolePriorities) -> Self {
        Self { priorities }
    }

    /// Select up to `constraints.ideal` members. Input order does not matter;
    /// output is deterministic (score descending, candidate id ascending).
    pub fn select(
        &self,
        pool: &[BuyerGroupMember],
        constraints: &SizeConstraints,
    ) -> (Vec<BuyerGroupMember>, FallbackLevel) {
        let (filtered, level) = filter_cascade(pool);

        let mut ranked = filtered;
        sort_ranked(&mut ranked);

        let target = constraints.ideal.min(constraints.max).max(1);
        let mut selected: Vec<BuyerGroupMember> = Vec::with_capacity(target);

        // Pass 1: best candidate per role, highest-priority roles first.
        for role in self.priorities.ordered_roles() {
            if selected.len() >= target {
                break;
            }
            if let Some(best) = ranked
                .iter()
                .find(|m| m.role == role && !is_selected(&selected, m))
            {
                selected.push(best.clone());
            }
        }

        // Pass 2: fill remaining slots with the best of the rest.
        for member in &ranked {
            if selected.len() >= target {
                break;
            }
            if !is_selected(&selected, member) {
                selected.push(member.clone());
            }
        }

        debug!(
            selected = selected.len(),
            target,
            level = %level,
            "group selection complete"
        );
        (selected, level)
    }
}

fn is_selected(selected: &[BuyerGroupMember], member: &BuyerGroupMember) -> bool {
    selected.iter().any(|m| m.candidate.id == member.candidate.id)
}

/// Stable ranking: overall score descending, candidate id as the tie-break.
pub fn sort_ranked(members: &mut [BuyerGroupMember]) {
    members.sort_by(|a, b| {
        b.scores
            .overall
            .partial_cmp(&a.scores.overall)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
}
