//! Buyer-role assignment via the decision-power cascade.
//!
//! Every candidate lands in exactly one of the five roles. Gatekeeping
//! departments are checked before authority so a CFO stays a blocker on a
//! sales deal; the exemption is the category's own primary departments (a
//! finance product is bought by finance, not blocked by it).

use buyerscope_shared::{BuyerRole, ManagementLevel, ProductCategory, ScoredCandidate};

use crate::rules::{self, CategoryProfile, category_profile};
use crate::titles::TitleFacts;

// ---------------------------------------------------------------------------
// Decision power
// ---------------------------------------------------------------------------

/// Additive decision-power breakdown, capped at 1.0 in total.
#[derive(Debug, Clone, Copy)]
pub struct DecisionPower {
    /// From the title's seniority band.
    pub title_component: f64,
    /// From the functional department.
    pub department_component: f64,
    /// Extra weight when the department is primary for the product category.
    pub primary_bonus: f64,
}

impl DecisionPower {
    pub fn total(&self) -> f64 {
        (self.title_component + self.department_component + self.primary_bonus).min(1.0)
    }
}

// ---------------------------------------------------------------------------
// RoleAssigner
// ---------------------------------------------------------------------------

/// One candidate's assigned role with the evidence behind it.
#[derive(Debug, Clone)]
pub struct RoleAssignment {
    pub role: BuyerRole,
    /// 0-100; halved for network-inferred titles.
    pub confidence: f64,
    pub reasoning: String,
}

/// Assigns buyer roles for one product category.
pub struct RoleAssigner {
    profile: CategoryProfile,
}

impl RoleAssigner {
    pub fn new(category: ProductCategory) -> Self {
        Self {
            profile: category_profile(category),
        }
    }

    /// Decision power for a candidate's derived title facts. Deny-listed
    /// titles never receive the primary-department bonus.
    pub fn decision_power(&self, facts: &TitleFacts, title: &str) -> DecisionPower {
        let title_component = if facts.is_c_level {
            0.4
        } else {
            match facts.level {
                ManagementLevel::CLevel => 0.4,
                ManagementLevel::Vp => 0.3,
                ManagementLevel::Director => 0.2,
                ManagementLevel::Manager => 0.1,
                ManagementLevel::Individual | ManagementLevel::Entry => 0.0,
            }
        };

        let department_component = rules::department_power(facts.department);

        let primary_bonus = match facts.department {
            Some(dept)
                if self.profile.is_primary(dept) && !self.profile.is_denied_title(title) =>
            {
                0.1
            }
            _ => 0.0,
        };

        DecisionPower {
            title_component,
            department_component,
            primary_bonus,
        }
    }

    /// Assign a role to one scored candidate.
    pub fn assign(&self, scored: &ScoredCandidate) -> RoleAssignment {
        let candidate = &scored.candidate;
        let facts = TitleFacts::derive(candidate);
        let power = self.decision_power(&facts, &candidate.title);
        let total = power.total();

        let (role, confidence, reasoning) = match facts.department {
            // Gatekeepers first, unless this category buys through them.
            Some(dept) if dept.is_blocker_leaning() && !self.profile.is_primary(dept) => {
                let confidence = if facts.is_c_level { 85.0 } else { 75.0 };
                (
                    BuyerRole::Blocker,
                    confidence,
                    format!("{dept} reviews and gates purchases rather than driving them"),
                )
            }
            _ if total >= 0.6 => (
                BuyerRole::Decision,
                (60.0 + total * 50.0).min(95.0),
                format!(
                    "decision power {total:.2} from {} title in {} department",
                    facts.level.as_str(),
                    facts
                        .department
                        .map(|d| d.as_str())
                        .unwrap_or("an unknown"),
                ),
            ),
            _ if total >= 0.4 => (
                BuyerRole::Champion,
                75.0,
                format!("decision power {total:.2} with standing to advocate internally"),
            ),
            _ if rules::has_champion_keywords(&candidate.title) => (
                BuyerRole::Champion,
                60.0,
                "leadership title suggests internal advocacy without final authority".to_string(),
            ),
            _ if total >= 0.2 => (
                BuyerRole::Stakeholder,
                65.0,
                format!("moderate decision power {total:.2}; affected by the purchase"),
            ),
            _ => (
                BuyerRole::Introducer,
                50.0,
                "limited authority; useful as an entry point into the account".to_string(),
            ),
        };

        // Network-inferred titles are guesses; report them as such.
        let confidence = if facts.inferred_title {
            confidence * 0.5
        } else {
            confidence
        };

        RoleAssignment {
            role,
            confidence,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyerscope_shared::{Candidate, ScoreVector};

    fn make_scored(title: &str) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                id: "x1".into(),
                name: "Test Person".into(),
                title: title.into(),
                department: None,
                management_level: None,
                location: None,
                connections: Some(400),
                followers: Some(300),
                email: None,
                phone: None,
                profile_url: None,
            },
            scores: ScoreVector::default(),
        }
    }

    #[test]
    fn vp_of_sales_gets_decision_for_sales_category() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let assignment = assigner.assign(&make_scored("VP of Sales"));
        assert_eq!(assignment.role, BuyerRole::Decision);
        assert!(assignment.confidence >= 90.0);
        assert!(assignment.reasoning.contains("decision power"));
    }

    #[test]
    fn ceo_gets_decision_regardless_of_category() {
        let assigner = RoleAssigner::new(ProductCategory::Marketing);
        let assignment = assigner.assign(&make_scored("CEO"));
        assert_eq!(assignment.role, BuyerRole::Decision);
    }

    #[test]
    fn cfo_blocks_deals_outside_finance_products() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let assignment = assigner.assign(&make_scored("CFO"));
        assert_eq!(assignment.role, BuyerRole::Blocker);
        assert_eq!(assignment.confidence, 85.0);
        assert!(assignment.reasoning.contains("finance"));
    }

    #[test]
    fn finance_buyers_are_not_blockers_for_finance_products() {
        let assigner = RoleAssigner::new(ProductCategory::Finance);
        let assignment = assigner.assign(&make_scored("CFO"));
        assert_eq!(assignment.role, BuyerRole::Decision);
    }

    #[test]
    fn security_chief_decides_for_security_products() {
        let assigner = RoleAssigner::new(ProductCategory::Security);
        let assignment = assigner.assign(&make_scored("Chief Information Security Officer"));
        assert_eq!(assignment.role, BuyerRole::Decision);
    }

    #[test]
    fn marketing_director_champions_sales_deals() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let assignment = assigner.assign(&make_scored("Director of Marketing"));
        assert_eq!(assignment.role, BuyerRole::Champion);
    }

    #[test]
    fn denied_titles_lose_the_primary_bonus() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        // Manager 0.1 + sales 0.25, no bonus: stakeholder, not champion.
        let assignment = assigner.assign(&make_scored("Account Manager"));
        assert_eq!(assignment.role, BuyerRole::Stakeholder);
    }

    #[test]
    fn legal_counsel_blocks() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let assignment = assigner.assign(&make_scored("General Counsel"));
        assert_eq!(assignment.role, BuyerRole::Blocker);
    }

    #[test]
    fn junior_titles_default_to_introducer() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let assignment = assigner.assign(&make_scored("Marketing Intern"));
        assert_eq!(assignment.role, BuyerRole::Introducer);
    }

    #[test]
    fn inferred_titles_halve_confidence() {
        let assigner = RoleAssigner::new(ProductCategory::Sales);
        let mut scored = make_scored("--");
        scored.candidate.connections = Some(620);
        let assignment = assigner.assign(&scored);
        assert!(assignment.confidence <= 40.0);
    }
}
