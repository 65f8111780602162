//! Window selection criteria shared by window conditions and actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arguments::ConfigMap;

/// How `title` is compared against window titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleMatchMode {
    StartsWith,
    Contains,
    Exact,
    Regex,
}

impl TitleMatchMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartsWith => "starts_with",
            Self::Contains => "contains",
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }
}

/// Selects a window. Every field is optional; an empty criteria matches any
/// window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_match_mode: Option<TitleMatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detect_hidden_windows: Option<bool>,
}

impl WindowCriteria {
    /// Criteria matching windows by title only.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl From<&WindowCriteria> for ConfigMap {
    fn from(criteria: &WindowCriteria) -> Self {
        let mut map = ConfigMap::new();
        let text_fields = [
            ("title", &criteria.title),
            ("text", &criteria.text),
            ("exclude_title", &criteria.exclude_title),
            ("exclude_text", &criteria.exclude_text),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value {
                map = map.with(name, value.as_str());
            }
        }
        if let Some(mode) = criteria.title_match_mode {
            map = map.with("title_match_mode", mode.as_str());
        }
        if let Some(hidden) = criteria.detect_hidden_windows {
            map = map.with("detect_hidden_windows", hidden);
        }
        map
    }
}

impl fmt::Display for WindowCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "window(title={title:?})"),
            None => f.write_str("window(*)"),
        }
    }
}
