//! Raw directory-record ingestion: JSONL parsing, mapping, fingerprint dedup.

use buyerscope_shared::{Candidate, ManagementLevel};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

/// One employee record as exported by a people directory. Everything beyond
/// the name is optional; junk titles are preserved and handled downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEmployeeRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub management_level: Option<ManagementLevel>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub connections: Option<u32>,
    #[serde(default)]
    pub followers: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// SHA-256 over the identity fields, truncated to 16 hex chars. Stable across
/// overlapping search pages even when the directory omits its own id.
pub fn fingerprint(name: &str, title: &str, profile_url: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([0x1f]);
    hasher.update(title.as_bytes());
    hasher.update([0x1f]);
    hasher.update(profile_url.unwrap_or("").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Map one raw record to a [`Candidate`]. The directory id is used when
/// present; otherwise the identity fingerprint becomes the id.
pub fn map_record(raw: RawEmployeeRecord) -> Candidate {
    let title = raw.title.unwrap_or_default();
    let id = raw
        .id
        .clone()
        .unwrap_or_else(|| fingerprint(&raw.name, &title, raw.profile_url.as_deref()));

    Candidate {
        id,
        name: raw.name,
        title,
        department: raw.department,
        management_level: raw.management_level,
        location: raw.location,
        connections: raw.connections,
        followers: raw.followers,
        email: raw.email,
        phone: raw.phone,
        profile_url: raw.profile_url,
    }
}

/// Parse a JSONL export into deduplicated candidates. Malformed lines are
/// logged and skipped; identical identities collapse to the first occurrence.
pub fn parse_jsonl(text: &str) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: RawEmployeeRecord = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(line = line_no + 1, %error, "skipping malformed directory record");
                continue;
            }
        };
        let key = fingerprint(
            &raw.name,
            raw.title.as_deref().unwrap_or(""),
            raw.profile_url.as_deref(),
        );
        if seen.insert(key) {
            candidates.push(map_record(raw));
        }
    }

    candidates
}
