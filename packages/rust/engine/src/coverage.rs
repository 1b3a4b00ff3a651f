//! Cross-functional coverage: which roles the deal size demands.
//!
//! Back-fill draws from the full role-assigned pool, not the filtered set. A
//! CFO who failed the relevance thresholds is still the blocker a six-figure
//! deal has to account for.

use buyerscope_shared::{BuyerGroupMember, BuyerRole, CoverageReport, SizeConstraints};
use tracing::debug;

use crate::scoring::DealBand;
use crate::selection;

/// Roles a group must cover at this deal size.
pub fn required_roles(band: DealBand) -> Vec<BuyerRole> {
    let mut roles = vec![BuyerRole::Decision];
    if !matches!(band, DealBand::Smb) {
        roles.push(BuyerRole::Champion);
    }
    if matches!(
        band,
        DealBand::Enterprise | DealBand::Major | DealBand::Strategic
    ) {
        roles.push(BuyerRole::Blocker);
    }
    roles
}

/// Validates and repairs role coverage for one deal band.
pub struct CoverageValidator {
    band: DealBand,
}

impl CoverageValidator {
    pub fn new(band: DealBand) -> Self {
        Self { band }
    }

    /// Grow `group` toward `constraints.max` until every required role is
    /// covered or the pool runs out. Returns what was required, added, and
    /// still missing.
    pub fn validate(
        &self,
        group: &mut Vec<BuyerGroupMember>,
        pool: &[BuyerGroupMember],
        constraints: &SizeConstraints,
    ) -> CoverageReport {
        let required = required_roles(self.band);

        let mut ranked: Vec<BuyerGroupMember> = pool.to_vec();
        selection::sort_ranked(&mut ranked);

        let mut backfilled = Vec::new();
        let mut unfilled = Vec::new();

        for role in &required {
            if group.iter().any(|m| m.role == *role) {
                continue;
            }
            let candidate = ranked.iter().find(|m| {
                m.role == *role && !group.iter().any(|g| g.candidate.id == m.candidate.id)
            });
            match candidate {
                Some(member) if group.len() < constraints.max => {
                    debug!(
                        role = %role,
                        candidate = %member.candidate.name,
                        "back-filling required role"
                    );
                    group.push(member.clone());
                    backfilled.push(*role);
                }
                _ => unfilled.push(*role),
            }
        }

        CoverageReport {
            required,
            backfilled,
            unfilled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyerscope_shared::{Candidate, ScoreVector};

    fn make_member(id: &str, title: &str, role: BuyerRole, overall: f64) -> BuyerGroupMember {
        BuyerGroupMember {
            candidate: Candidate {
                id: id.into(),
                name: format!("Person {id}"),
                title: title.into(),
                department: None,
                management_level: None,
                location: None,
                connections: None,
                followers: None,
                email: None,
                phone: None,
                profile_url: None,
            },
            scores: ScoreVector {
                overall,
                ..ScoreVector::default()
            },
            role,
            role_confidence: 80.0,
            role_reasoning: "test".into(),
            contact: None,
            enrichment_error: None,
        }
    }

    fn make_constraints(max: usize) -> SizeConstraints {
        SizeConstraints {
            min: 2,
            max,
            ideal: max.min(5),
            accept_single_person: false,
            reasoning: "test".into(),
        }
    }

    #[test]
    fn required_roles_scale_with_deal_band() {
        assert_eq!(required_roles(DealBand::Smb), vec![BuyerRole::Decision]);
        assert_eq!(
            required_roles(DealBand::MidMarket),
            vec![BuyerRole::Decision, BuyerRole::Champion]
        );
        assert_eq!(
            required_roles(DealBand::Enterprise),
            vec![BuyerRole::Decision, BuyerRole::Champion, BuyerRole::Blocker]
        );
    }

    #[test]
    fn backfills_missing_blocker_from_the_full_pool() {
        let mut group = vec![
            make_member("d1", "VP of Sales", BuyerRole::Decision, 85.0),
            make_member("c1", "Director of Marketing", BuyerRole::Champion, 70.0),
        ];
        let pool = vec![
            group[0].clone(),
            group[1].clone(),
            make_member("b1", "CFO", BuyerRole::Blocker, 40.0),
        ];

        let report = CoverageValidator::new(DealBand::Enterprise).validate(
            &mut group,
            &pool,
            &make_constraints(8),
        );

        assert_eq!(report.backfilled, vec![BuyerRole::Blocker]);
        assert!(report.is_fully_covered());
        assert_eq!(group.len(), 3);
        assert_eq!(group[2].candidate.id, "b1");
    }

    #[test]
    fn backfill_respects_the_size_ceiling() {
        let mut group = vec![
            make_member("d1", "VP of Sales", BuyerRole::Decision, 85.0),
            make_member("c1", "Director of Marketing", BuyerRole::Champion, 70.0),
        ];
        let pool = vec![make_member("b1", "CFO", BuyerRole::Blocker, 40.0)];

        let report = CoverageValidator::new(DealBand::Enterprise).validate(
            &mut group,
            &pool,
            &make_constraints(2),
        );

        assert_eq!(report.unfilled, vec![BuyerRole::Blocker]);
        assert!(!report.is_fully_covered());
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn reports_unfilled_when_the_pool_lacks_the_role() {
        let mut group = vec![make_member("d1", "VP of Sales", BuyerRole::Decision, 85.0)];
        let pool = group.clone();

        let report = CoverageValidator::new(DealBand::MidMarket).validate(
            &mut group,
            &pool,
            &make_constraints(6),
        );

        assert_eq!(report.unfilled, vec![BuyerRole::Champion]);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn fully_covered_group_needs_no_backfill() {
        let mut group = vec![
            make_member("d1", "VP of Sales", BuyerRole::Decision, 85.0),
            make_member("c1", "Director of Marketing", BuyerRole::Champion, 70.0),
            make_member("b1", "CFO", BuyerRole::Blocker, 40.0),
        ];
        let pool = group.clone();

        let report = CoverageValidator::new(DealBand::Enterprise).validate(
            &mut group,
            &pool,
            &make_constraints(8),
        );

        assert!(report.backfilled.is_empty());
        assert!(report.unfilled.is_empty());
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn backfill_picks_the_best_scoring_holder_of_the_role() {
        let mut group = vec![
            make_member("d1", "VP of Sales", BuyerRole::Decision, 85.0),
            make_member("c1", "Director of Marketing", BuyerRole::Champion, 70.0),
        ];
        let pool = vec![
            make_member("b2", "Head of Procurement", BuyerRole::Blocker, 30.0),
            make_member("b1", "CFO", BuyerRole::Blocker, 45.0),
        ];

        CoverageValidator::new(DealBand::Enterprise).validate(
            &mut group,
            &pool,
            &make_constraints(8),
        );

        assert_eq!(group[2].candidate.id, "b1");
    }
}
