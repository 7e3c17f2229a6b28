//! Recipient directory lookup.
//!
//! Team members come from the staff directory and customers from the
//! customer repository. Both sit behind [`RecipientDirectory`]; the
//! in-memory [`StaticDirectory`] serves headless runs and tests.

use crate::recipients::RecipientType;
use serde::{Deserialize, Serialize};

/// Queries shorter than this (after trimming) return nothing.
pub const MIN_QUERY_LEN: usize = 2;

/// One directory search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub unique_id: String,
    pub name: String,
    pub email: String,
    /// Customer account number. Team members have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DirectoryEntry {
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            email: email.into(),
            account_number: None,
            department: None,
            title: None,
        }
    }

    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    // `needle` is already lowercase.
    fn matches(&self, needle: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(needle);
        hit(self.name.as_str())
            || hit(self.email.as_str())
            || hit(self.unique_id.as_str())
            || self.account_number.as_deref().is_some_and(hit)
    }
}

/// Source of people who can be added as recipients.
pub trait RecipientDirectory {
    /// Case-insensitive substring search over the entries of `kind`.
    fn search(&self, query: &str, kind: RecipientType) -> Vec<DirectoryEntry>;
}

/// Directory held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticDirectory {
    #[serde(default)]
    pub team_members: Vec<DirectoryEntry>,
    #[serde(default)]
    pub customers: Vec<DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new(team_members: Vec<DirectoryEntry>, customers: Vec<DirectoryEntry>) -> Self {
        Self {
            team_members,
            customers,
        }
    }
}

impl RecipientDirectory for StaticDirectory {
    fn search(&self, query: &str, kind: RecipientType) -> Vec<DirectoryEntry> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        let entries = match kind {
            RecipientType::TeamMember => &self.team_members,
            RecipientType::Customer => &self.customers,
        };
        let hits: Vec<DirectoryEntry> = entries
            .iter()
            .filter(|e| e.matches(&needle))
            .cloned()
            .collect();
        tracing::debug!("Directory search '{}' ({}) -> {} hits", query, kind, hits.len());
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::new(
            vec![
                DirectoryEntry::new("AD001", "John Doe", "john.doe@example.com"),
                DirectoryEntry::new("AD002", "Jane Smith", "jane.smith@example.com"),
            ],
            vec![DirectoryEntry::new("CUST001", "Acme Corporation", "contracts@acme.test")
                .with_account_number("ACC-12345")],
        )
    }

    #[test]
    fn test_short_query_returns_nothing() {
        assert!(directory().search("j", RecipientType::TeamMember).is_empty());
        assert!(directory().search("  j ", RecipientType::TeamMember).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let hits = directory().search("JANE", RecipientType::TeamMember);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].unique_id, "AD002");

        let hits = directory().search("ad00", RecipientType::TeamMember);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_scoped_by_kind() {
        assert!(directory().search("acme", RecipientType::TeamMember).is_empty());
        let hits = directory().search("acc-123", RecipientType::Customer);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Acme Corporation");
    }
}
