//! Report reason catalog entries

use serde::{Deserialize, Serialize};

/// A selectable reason for filing a report (e.g. "Griefing").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportReason {
    /// Reason ID
    pub id: i64,

    /// Display / translation key (unique)
    pub text_key: String,
}

impl ReportReason {
    /// Creates a catalog entry.
    pub fn new(id: i64, text_key: impl Into<String>) -> Self {
        Self {
            id,
            text_key: text_key.into(),
        }
    }
}

/// Payload for adding a reason to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReportReason {
    /// Display / translation key
    #[serde(default)]
    pub text_key: Option<String>,
}

impl NewReportReason {
    /// Payload with the given key.
    pub fn new(text_key: impl Into<String>) -> Self {
        Self {
            text_key: Some(text_key.into()),
        }
    }

    /// The trimmed key, if one was supplied and is not blank.
    pub fn text_key(&self) -> Option<&str> {
        self.text_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Default catalog installed on a fresh tracker.
pub const DEFAULT_REPORT_REASONS: [&str; 4] = [
    "Inappropriate Communications",
    "Griefing",
    "Cheating",
    "Other",
];
