//! Group cohesion metrics.
//!
//! All three metrics and their composite land in 0..=100. Denominators adapt
//! to the group size so a deliberate single-member group is not punished for
//! having one role and one department.

use std::collections::HashSet;

use buyerscope_shared::{BuyerGroupMember, CohesionReport};

use crate::titles::TitleFacts;

/// Composite weights: balance matters most, diversity and spread split the rest.
const ROLE_BALANCE_WEIGHT: f64 = 0.4;
const DEPARTMENT_DIVERSITY_WEIGHT: f64 = 0.3;
const SENIORITY_SPREAD_WEIGHT: f64 = 0.3;

/// Compute cohesion metrics for a final group. Empty groups score zero.
pub fn cohesion_report(members: &[BuyerGroupMember]) -> CohesionReport {
    if members.is_empty() {
        return CohesionReport {
            score: 0.0,
            role_balance: 0.0,
            department_diversity: 0.0,
            seniority_spread: 0.0,
        };
    }

    let size = members.len();
    let facts: Vec<TitleFacts> = members
        .iter()
        .map(|m| TitleFacts::derive(&m.candidate))
        .collect();

    let distinct_roles = members
        .iter()
        .map(|m| m.role)
        .collect::<HashSet<_>>()
        .len();
    let distinct_departments = facts
        .iter()
        .map(|f| f.department)
        .collect::<HashSet<_>>()
        .len();
    let distinct_levels = facts.iter().map(|f| f.level).collect::<HashSet<_>>().len();

    let role_balance = ratio_metric(distinct_roles, size.min(5));
    let department_diversity = ratio_metric(distinct_departments, size.min(4));
    let seniority_spread = ratio_metric(distinct_levels, size.min(3));

    let score = ROLE_BALANCE_WEIGHT * role_balance
        + DEPARTMENT_DIVERSITY_WEIGHT * department_diversity
        + SENIORITY_SPREAD_WEIGHT * seniority_spread;

    CohesionReport {
        score,
        role_balance,
        department_diversity,
        seniority_spread,
    }
}

fn ratio_metric(distinct: usize, expected: usize) -> f64 {
    (distinct as f64 / expected.max(1) as f64 * 100.0).min(100.0)
}
