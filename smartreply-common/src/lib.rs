//! Common types and utilities shared across smartreply crates.
//!
//! This crate defines the review/business data model, the shared error type,
//! collaborator trait seams, and observability helpers used throughout the
//! smartreply workspace. It is intentionally lightweight so that all crates
//! can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`Review`]: normalized representation of one customer review
//! - [`BusinessRef`]: one managed storefront
//! - [`SmartReplyError`] and [`Result`]: shared error handling
//! - [`cascade`]: ranked selector fallback used by every page query
//! - [`collab`]: trait seams for external collaborators (reply generation,
//!   settings, reply history)
//! - [`observability`]: centralised tracing/logging initialisation
use serde::{Deserialize, Serialize};

pub mod cascade;
pub mod collab;
pub mod observability;

/// Filter applied to an extracted review set.
///
/// Filtering is always a local, post-extraction predicate; the remote
/// surface is never asked to filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    All,
    NoReply,
    HasReply,
}

impl ReviewFilter {
    /// Whether a review with the given reply state passes this filter.
    pub fn accepts(&self, has_reply: bool) -> bool {
        match self {
            ReviewFilter::All => true,
            ReviewFilter::NoReply => !has_reply,
            ReviewFilter::HasReply => has_reply,
        }
    }
}

impl std::str::FromStr for ReviewFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(ReviewFilter::All),
            "no_reply" => Ok(ReviewFilter::NoReply),
            "has_reply" => Ok(ReviewFilter::HasReply),
            other => Err(format!("unknown review filter: {other}")),
        }
    }
}

/// One managed storefront, as discovered on the landing surface or supplied
/// manually. No uniqueness is enforced beyond a non-empty identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Normalized representation of one customer review and its owner-reply
/// state.
///
/// Every instance is produced fresh by extraction and never mutated
/// afterwards. Field bounds are enforced at extraction time: `rating` is
/// clamped to `1..=5`, `author` to 20 characters, `content` to 500
/// characters, `photos` to 3 entries, and
/// `has_reply == reply_content.is_some()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Site-provided identifier when present, else a 12-hex-char content
    /// hash. Stable for identical content, not globally unique.
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub content: String,
    /// Free-form date text, best effort.
    pub date: String,
    pub visit_count: String,
    pub photos: Vec<String>,
    pub has_reply: bool,
    pub reply_content: Option<String>,
    pub reply_date: Option<String>,
}

/// Best-effort counters scraped from the review overview surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: u32,
    pub average_rating: f32,
    pub no_reply_count: u32,
}

/// Result of one reply submission.
///
/// `success == true` means the submit control was found and activated, not
/// that the remote service confirmed persistence; there is no read-back
/// contract to verify against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOutcome {
    pub success: bool,
    pub message: String,
}

impl ReplyOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One pending reply in a bulk submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReplyItem {
    pub review_id: String,
    pub reply_text: String,
}

/// Per-item result of a bulk submission, tagged with the originating
/// review identifier. Output order matches input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReplyOutcome {
    pub review_id: String,
    pub success: bool,
    pub message: String,
}

/// Write-path stage at which a required element could not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuateStage {
    Review,
    Composer,
    Input,
    Submit,
}

impl std::fmt::Display for ActuateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActuateStage::Review => "target review",
            ActuateStage::Composer => "reply composer",
            ActuateStage::Input => "reply input",
            ActuateStage::Submit => "submit control",
        };
        f.write_str(s)
    }
}

/// Error types used across the smartreply system.
///
/// This is a closed taxonomy: callers branch on the kind while the carried
/// message stays renderable as-is. Extraction and write-path entry points
/// convert these into values (empty sequences, [`ReplyOutcome`] failures)
/// rather than letting them cross the component boundary.
#[derive(thiserror::Error, Debug)]
pub enum SmartReplyError {
    /// The browser process or WebDriver session could not be started.
    /// Fatal: nothing else can proceed.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Post-injection navigation landed on a login surface; the supplied
    /// cookies are not (or no longer) valid.
    #[error("authentication redirected to login surface: {url}")]
    AuthRedirect { url: String },

    /// A required element was missing at a specific write-path stage.
    #[error("{stage} not found")]
    ElementNotFound { stage: ActuateStage },

    /// Navigation did not settle within the bounded wait. Never retried.
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// The underlying WebDriver client reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

impl SmartReplyError {
    /// Stage carried by [`SmartReplyError::ElementNotFound`], if any.
    pub fn stage(&self) -> Option<ActuateStage> {
        match self {
            SmartReplyError::ElementNotFound { stage } => Some(*stage),
            _ => None,
        }
    }
}

/// Convenient alias for results that use [`SmartReplyError`].
pub type Result<T> = std::result::Result<T, SmartReplyError>;

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Clamp an extracted rating into the valid `1..=5` range.
pub fn clamp_rating(raw: u32) -> u8 {
    raw.clamp(1, 5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn filter_accepts() {
        assert!(ReviewFilter::All.accepts(true));
        assert!(ReviewFilter::All.accepts(false));
        assert!(ReviewFilter::NoReply.accepts(false));
        assert!(!ReviewFilter::NoReply.accepts(true));
        assert!(ReviewFilter::HasReply.accepts(true));
        assert!(!ReviewFilter::HasReply.accepts(false));
    }

    #[test]
    fn filter_from_str() {
        assert_eq!(ReviewFilter::from_str("all").unwrap(), ReviewFilter::All);
        assert_eq!(
            ReviewFilter::from_str("no_reply").unwrap(),
            ReviewFilter::NoReply
        );
        assert!(ReviewFilter::from_str("replied").is_err());
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        // Hangul is 3 bytes per char; a byte slice would panic here.
        let s = "사장님 감사합니다";
        assert_eq!(truncate_chars(s, 3), "사장님");
        assert_eq!(truncate_chars("ab", 20), "ab");
    }

    #[test]
    fn rating_clamps_both_ends() {
        assert_eq!(clamp_rating(0), 1);
        assert_eq!(clamp_rating(3), 3);
        assert_eq!(clamp_rating(6), 5);
    }

    #[test]
    fn element_not_found_renders_stage() {
        let err = SmartReplyError::ElementNotFound {
            stage: ActuateStage::Submit,
        };
        assert_eq!(err.to_string(), "submit control not found");
        assert_eq!(err.stage(), Some(ActuateStage::Submit));
    }
}
