//! Per-title fact derivation, computed once and reused by every dimension.

use buyerscope_shared::{Candidate, ManagementLevel};

use crate::rules::{self, Department};

/// Facts derived from a candidate's title and network counters.
#[derive(Debug, Clone)]
pub struct TitleFacts {
    /// Canonical form of the title ("VP, Sales" becomes "Vice President").
    pub standardized: String,
    /// Coarse seniority band.
    pub level: ManagementLevel,
    /// Recognized C-level indicator present in the title.
    pub is_c_level: bool,
    /// Functional department, from the record's department label when usable,
    /// else inferred from the title.
    pub department: Option<Department>,
    /// The record had no usable title; level was estimated from network size.
    pub inferred_title: bool,
    /// Derivation confidence: 0.8 for real titles, 0.3 for inferred ones.
    pub confidence: f64,
}

/// Placeholder strings some directories emit instead of an empty title.
fn is_junk_title(title: &str) -> bool {
    let trimmed = title.trim();
    trimmed.is_empty() || trimmed == "--" || trimmed.eq_ignore_ascii_case("none")
}

impl TitleFacts {
    /// Derive facts for one candidate. Pure; safe to call repeatedly.
    pub fn derive(candidate: &Candidate) -> Self {
        let raw = candidate.title.trim();

        if is_junk_title(raw) {
            return Self::from_network(candidate);
        }

        let level = candidate
            .management_level
            .or_else(|| rules::match_level(raw))
            .unwrap_or(ManagementLevel::Individual);

        let department = candidate
            .department
            .as_deref()
            .filter(|d| !is_junk_title(d))
            .and_then(rules::match_department)
            .or_else(|| rules::match_department(raw));

        Self {
            standardized: standardize(raw),
            level,
            is_c_level: rules::is_c_level(raw),
            department,
            inferred_title: false,
            confidence: 0.8,
        }
    }

    /// No usable title: estimate the level from network counters. A large
    /// network suggests a senior role; department stays unknown.
    fn from_network(candidate: &Candidate) -> Self {
        let connections = candidate.connections.unwrap_or(0);
        let followers = candidate.followers.unwrap_or(0);

        let (standardized, level) = if connections > 500 || followers > 1000 {
            ("Senior Manager".to_string(), ManagementLevel::Manager)
        } else if connections > 200 {
            ("Manager".to_string(), ManagementLevel::Manager)
        } else {
            ("Individual Contributor".to_string(), ManagementLevel::Individual)
        };

        let level = candidate.management_level.unwrap_or(level);

        Self {
            standardized,
            level,
            is_c_level: false,
            department: candidate
                .department
                .as_deref()
                .filter(|d| !is_junk_title(d))
                .and_then(rules::match_department),
            inferred_title: true,
            confidence: 0.3,
        }
    }
}

/// Canonicalize a title to its level name. Unrecognized titles pass through.
fn standardize(title: &str) -> String {
    let lower = title.to_lowercase();

    let canon = [
        ("ceo", "Chief Executive Officer"),
        ("chief executive officer", "Chief Executive Officer"),
        ("cfo", "Chief Financial Officer"),
        ("chief financial officer", "Chief Financial Officer"),
        ("cto", "Chief Technology Officer"),
        ("chief technology officer", "Chief Technology Officer"),
        ("coo", "Chief Operating Officer"),
        ("chief operating officer", "Chief Operating Officer"),
    ];
    for (needle, full) in canon {
        if word_match(&lower, needle) {
            return full.to_string();
        }
    }

    if word_match(&lower, "vp") || lower.contains("vice president") {
        return "Vice President".to_string();
    }
    if word_match(&lower, "director") || lower.contains("head of") {
        return "Director".to_string();
    }
    if word_match(&lower, "manager") || word_match(&lower, "lead") {
        return "Manager".to_string();
    }
    for needle in ["engineer", "developer", "analyst", "specialist"] {
        if word_match(&lower, needle) {
            return "Individual Contributor".to_string();
        }
    }

    title.to_string()
}

/// Whole-word containment without a regex for hot-path standardization.
fn word_match(haystack: &str, needle: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidate(title: &str, connections: Option<u32>, followers: Option<u32>) -> Candidate {
        Candidate {
            id: "c1".into(),
            name: "Test Person".into(),
            title: title.into(),
            department: None,
            management_level: None,
            location: None,
            connections,
            followers,
            email: None,
            phone: None,
            profile_url: None,
        }
    }

    #[test]
    fn derives_level_and_department_from_title() {
        let facts = TitleFacts::derive(&make_candidate("VP of Sales", Some(400), None));
        assert_eq!(facts.level, ManagementLevel::Vp);
        assert_eq!(facts.department, Some(Department::Sales));
        assert_eq!(facts.standardized, "Vice President");
        assert!(!facts.inferred_title);
        assert!((facts.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn c_level_detection() {
        let facts = TitleFacts::derive(&make_candidate("Co-Founder & CEO", None, None));
        assert!(facts.is_c_level);
        assert_eq!(facts.level, ManagementLevel::CLevel);
        assert_eq!(facts.standardized, "Chief Executive Officer");
    }

    #[test]
    fn junk_title_falls_back_to_network_bands() {
        let facts = TitleFacts::derive(&make_candidate("--", Some(620), Some(200)));
        assert!(facts.inferred_title);
        assert_eq!(facts.standardized, "Senior Manager");
        assert_eq!(facts.level, ManagementLevel::Manager);
        assert!((facts.confidence - 0.3).abs() < f64::EPSILON);

        let facts = TitleFacts::derive(&make_candidate("", Some(250), None));
        assert_eq!(facts.standardized, "Manager");

        let facts = TitleFacts::derive(&make_candidate("", Some(50), Some(10)));
        assert_eq!(facts.standardized, "Individual Contributor");
        assert_eq!(facts.level, ManagementLevel::Individual);
    }

    #[test]
    fn record_department_label_wins_over_title_inference() {
        let mut candidate = make_candidate("Platform Lead", None, None);
        candidate.department = Some("Marketing".into());
        let facts = TitleFacts::derive(&candidate);
        assert_eq!(facts.department, Some(Department::Marketing));
    }

    #[test]
    fn unrecognized_title_passes_through_standardization() {
        let facts = TitleFacts::derive(&make_candidate("Astronaut", None, None));
        assert_eq!(facts.standardized, "Astronaut");
        assert_eq!(facts.level, ManagementLevel::Individual);
        assert_eq!(facts.department, None);
    }
}
