//! Per-field extraction from a live review container.
//!
//! Every field is resolved through its own cascade so that one missing or
//! renamed sub-element never blocks the others. Values are defensively
//! clamped and truncated before they reach a [`Review`]; the engine never
//! returns unbounded or out-of-range data.
use crate::selectors;
use regex::Regex;
use smartreply_common::{clamp_rating, truncate_chars, Review};
use smartreply_drivers::review_browser::page::PageElement;
use std::sync::OnceLock;

pub const AUTHOR_MAX_CHARS: usize = 20;
pub const CONTENT_MAX_CHARS: usize = 500;
pub const PHOTO_CAP: usize = 3;
pub const DEFAULT_RATING: u8 = 5;
/// Shown when no author candidate yields text.
pub const DEFAULT_AUTHOR: &str = "익명";

/// Body text shorter than this is assumed to be a label, not the review.
const CONTENT_MIN_CHARS: usize = 10;
/// Reply blocks shorter than this are chrome, not an owner reply.
const REPLY_MIN_CHARS: usize = 5;

fn digits_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static pattern"))
}

/// Identifier derived from content when the markup carries none: first 12
/// hex chars of a blake3 hash. Stable for identical content, not globally
/// unique.
pub fn content_hash_id(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex()[..12].to_string()
}

/// First integer run in free-form rating text ("별점 4점" -> 4).
pub fn parse_rating_text(text: &str) -> Option<u32> {
    digits_pattern()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract one review from a live container element.
///
/// Returns `None` only when no identifier can be derived at all (no id
/// attribute and unreadable text); that element is skipped and the batch
/// continues.
pub async fn extract_review(elem: &PageElement) -> Option<Review> {
    let id = match first_attr(elem, &["data-review-id", "data-id"]).await {
        Some(id) => id,
        None => content_hash_id(&elem.text().await?),
    };

    let author = selectors::AUTHOR
        .select(|sel| nonempty_child_text(elem, sel))
        .await
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let rating = extract_rating(elem).await;
    let content = extract_content(elem).await;

    let date = selectors::DATE
        .select(|sel| nonempty_child_text(elem, sel))
        .await
        .unwrap_or_default();

    let visit_count = selectors::VISIT_COUNT
        .select(|sel| nonempty_child_text(elem, sel))
        .await
        .unwrap_or_default();

    let mut photos = Vec::new();
    for img in elem.find_all(selectors::PHOTOS).await.into_iter() {
        if photos.len() == PHOTO_CAP {
            break;
        }
        if let Some(src) = img.attr("src").await {
            photos.push(src);
        }
    }

    let (has_reply, reply_content, reply_date) = extract_reply(elem).await;

    Some(Review {
        id,
        author: truncate_chars(author.trim(), AUTHOR_MAX_CHARS),
        rating,
        content: truncate_chars(content.trim(), CONTENT_MAX_CHARS),
        date,
        visit_count,
        photos,
        has_reply,
        reply_content,
        reply_date,
    })
}

async fn first_attr(elem: &PageElement, names: &[&str]) -> Option<String> {
    for name in names {
        if let Some(value) = elem.attr(name).await {
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

async fn nonempty_child_text(elem: &PageElement, selector: &str) -> Option<String> {
    let text = elem.find(selector).await?.text().await?;
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Rating resolution: first candidate whose text parses as an integer,
/// clamped into `1..=5`; failing that, count filled star indicators;
/// failing that, default 5.
async fn extract_rating(elem: &PageElement) -> u8 {
    let parsed = selectors::RATING_TEXT
        .select(|sel| async move {
            let text = elem.find(sel).await?.text().await?;
            parse_rating_text(&text)
        })
        .await;

    if let Some(raw) = parsed {
        return clamp_rating(raw);
    }

    match elem.find_all(selectors::RATING_STARS_FILLED).await.len() {
        0 => DEFAULT_RATING,
        stars => clamp_rating(stars as u32),
    }
}

/// Body resolution: first candidate long enough to be a review body wins;
/// if none clears the label guard, the first non-empty candidate is taken
/// so short reviews ("Good!") still survive.
async fn extract_content(elem: &PageElement) -> String {
    let long = selectors::CONTENT
        .select(|sel| async move {
            let text = nonempty_child_text(elem, sel).await?;
            (text.chars().count() > CONTENT_MIN_CHARS).then_some(text)
        })
        .await;

    if let Some(text) = long {
        return text;
    }

    selectors::CONTENT
        .select(|sel| nonempty_child_text(elem, sel))
        .await
        .unwrap_or_default()
}

/// Reply resolution: a candidate block with meaningful text marks the
/// review as replied and captures content plus a nested best-effort date.
/// Both sides of the `has_reply`/`reply_content` invariant are set here,
/// together, and nowhere else.
async fn extract_reply(elem: &PageElement) -> (bool, Option<String>, Option<String>) {
    let block = selectors::REPLY
        .select(|sel| async move {
            let child = elem.find(sel).await?;
            let text = child.text().await?.trim().to_string();
            (text.chars().count() > REPLY_MIN_CHARS).then_some((child, text))
        })
        .await;

    match block {
        Some((child, text)) => {
            let reply_date = selectors::REPLY_DATE
                .select(|sel| nonempty_child_text(&child, sel))
                .await;
            (true, Some(text), reply_date)
        }
        None => (false, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_and_short() {
        let a = content_hash_id("고기가 정말 맛있어요");
        let b = content_hash_id("고기가 정말 맛있어요");
        let c = content_hash_id("다른 리뷰");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn rating_text_takes_first_integer() {
        assert_eq!(parse_rating_text("별점 4점 / 5점"), Some(4));
        assert_eq!(parse_rating_text("5"), Some(5));
        assert_eq!(parse_rating_text("별점 없음"), None);
        assert_eq!(parse_rating_text(""), None);
    }
}
