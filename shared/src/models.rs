//! Shared data models.

use serde::{Deserialize, Serialize};

/// One user's declaration that they are unavailable on one calendar day.
///
/// A row's existence is the unavailable state. Rows written under the old
/// schema carry `is_available = false` instead of `is_unavailable = true`;
/// readers accept both until those rows cycle out, writers only ever
/// produce the current form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AvailabilityMarker {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    pub is_available: Option<bool>,
    pub is_unavailable: Option<bool>,
    pub created_at: String,
}

impl AvailabilityMarker {
    /// Effective state under both the current and the legacy representation.
    pub fn is_effectively_unavailable(&self) -> bool {
        self.is_unavailable.unwrap_or(false) || self.is_available == Some(false)
    }
}

/// A month-query row: the marker fields plus the owner's display name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailabilityEntry {
    pub id: i64,
    pub user_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unavailable: Option<bool>,
    pub user_name: String,
}

/// Display name preference: profile name, then email, then "Unknown".
/// Empty strings count as missing.
pub fn resolve_user_name(display_name: Option<String>, email: Option<String>) -> String {
    display_name
        .filter(|name| !name.is_empty())
        .or_else(|| email.filter(|email| !email.is_empty()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Toggle request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub date: String,
}

/// Toggle response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub date: String,
    pub unavailable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(is_available: Option<bool>, is_unavailable: Option<bool>) -> AvailabilityMarker {
        AvailabilityMarker {
            id: 1,
            user_id: "user".to_string(),
            date: "2024-03-15".to_string(),
            is_available,
            is_unavailable,
            created_at: String::new(),
        }
    }

    #[test]
    fn current_rows_read_as_unavailable() {
        assert!(marker(None, Some(true)).is_effectively_unavailable());
    }

    #[test]
    fn legacy_false_rows_read_as_unavailable() {
        assert!(marker(Some(false), None).is_effectively_unavailable());
    }

    #[test]
    fn other_rows_read_as_available() {
        assert!(!marker(Some(true), None).is_effectively_unavailable());
        assert!(!marker(None, Some(false)).is_effectively_unavailable());
        assert!(!marker(None, None).is_effectively_unavailable());
    }

    #[test]
    fn name_falls_back_to_email_then_unknown() {
        assert_eq!(
            resolve_user_name(Some("Alice".to_string()), Some("alice@example.com".to_string())),
            "Alice"
        );
        assert_eq!(
            resolve_user_name(Some(String::new()), Some("alice@example.com".to_string())),
            "alice@example.com"
        );
        assert_eq!(resolve_user_name(None, Some(String::new())), "Unknown");
        assert_eq!(resolve_user_name(None, None), "Unknown");
    }
}
