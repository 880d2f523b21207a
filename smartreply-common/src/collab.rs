//! Trait seams for external collaborators.
//!
//! The core never implements reply-text generation, settings persistence,
//! or reply history itself; those live outside this workspace. The traits
//! here fix the shapes both sides agree on so the core can hand data across
//! the boundary without knowing what sits behind it.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tone requested for a generated owner reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyTone {
    #[default]
    Friendly,
    Professional,
    Casual,
    Apologetic,
}

impl ReplyTone {
    /// Map a human-facing tone label to its enum value.
    ///
    /// The label set matches what the control surface shows; anything
    /// unrecognized falls back to [`ReplyTone::Friendly`].
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "친절하고 감사한" | "friendly" => ReplyTone::Friendly,
            "전문적이고 격식있는" | "professional" => ReplyTone::Professional,
            "친근하고 캐주얼한" | "casual" => ReplyTone::Casual,
            "정중하고 사과하는" | "apologetic" => ReplyTone::Apologetic,
            _ => ReplyTone::Friendly,
        }
    }
}

/// Everything a generator needs to draft one owner reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub review_content: String,
    pub store_name: String,
    pub rating: u8,
    pub tone: ReplyTone,
    pub include_emoji: bool,
    /// Character budget for the generated reply.
    pub max_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instruction: Option<String>,
}

/// Produces reply text for a review.
///
/// This collaborator never raises to its caller: provider failures come
/// back as an inline string with a distinct error prefix, so the result is
/// always displayable.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> String;
}

/// Key/value setting store.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);

    /// Read a setting, falling back to `default` when unset.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// One posted reply as remembered by the history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub business_id: String,
    pub business_name: String,
    pub review_id: String,
    pub review_author: String,
    pub review_content: String,
    pub review_rating: u8,
    pub reply_content: String,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// Append-only reply history, queried most-recent-first.
#[async_trait]
pub trait ReplyHistory: Send + Sync {
    async fn append(&self, record: ReplyRecord) -> anyhow::Result<()>;
    async fn recent(&self, limit: usize) -> anyhow::Result<Vec<ReplyRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_labels_map_to_variants() {
        assert_eq!(
            ReplyTone::from_label("친절하고 감사한"),
            ReplyTone::Friendly
        );
        assert_eq!(
            ReplyTone::from_label("전문적이고 격식있는"),
            ReplyTone::Professional
        );
        assert_eq!(
            ReplyTone::from_label("친근하고 캐주얼한"),
            ReplyTone::Casual
        );
        assert_eq!(
            ReplyTone::from_label("정중하고 사과하는"),
            ReplyTone::Apologetic
        );
    }

    #[test]
    fn unknown_tone_label_defaults_to_friendly() {
        assert_eq!(ReplyTone::from_label("sarcastic"), ReplyTone::Friendly);
        assert_eq!(ReplyTone::from_label(""), ReplyTone::Friendly);
    }

    #[test]
    fn settings_get_or_falls_back() {
        struct Mem(std::collections::HashMap<String, String>);
        impl SettingsStore for Mem {
            fn get(&self, key: &str) -> Option<String> {
                self.0.get(key).cloned()
            }
            fn set(&mut self, key: &str, value: &str) {
                self.0.insert(key.to_string(), value.to_string());
            }
        }

        let mut store = Mem(Default::default());
        assert_eq!(store.get_or("tone", "friendly"), "friendly");
        store.set("tone", "casual");
        assert_eq!(store.get_or("tone", "friendly"), "casual");
    }
}
