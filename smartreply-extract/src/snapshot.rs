//! Static-snapshot fallback extraction.
//!
//! When no live container candidate matches anything, the rendered markup
//! is captured once and re-parsed as a static document. Same cascade
//! abstraction, different execution substrate: queries run against
//! `scraper`'s DOM instead of live WebDriver handles. The field set is
//! simplified relative to the live path (no photos, no visit count, no
//! reply date). This is a degraded mode, not a second implementation.
use crate::fields::{content_hash_id, AUTHOR_MAX_CHARS, CONTENT_MAX_CHARS, DEFAULT_AUTHOR, DEFAULT_RATING};
use crate::selectors;
use scraper::{ElementRef, Html, Selector};
use smartreply_common::{clamp_rating, truncate_chars, Review};
use tracing::debug;

const AUTHOR_SEL: &str = "[class*=\"name\"], [class*=\"author\"], strong";
const CONTENT_SEL: &str = "[class*=\"content\"], [class*=\"txt\"], p";
const DATE_SEL: &str = "time, [class*=\"date\"]";
const REPLY_SEL: &str = "[class*=\"reply\"], [class*=\"answer\"]";

/// Parse up to `limit` reviews out of captured markup. Containers without
/// body text are dropped; a static snapshot with no recognizable content
/// is noise, not a review.
pub fn parse_reviews(html: &str, limit: usize) -> Vec<Review> {
    let doc = Html::parse_document(html);

    let containers: Vec<ElementRef> = selectors::SNAPSHOT_CONTAINERS
        .select_sync(|candidate| {
            let sel = Selector::parse(candidate).ok()?;
            let found: Vec<ElementRef> = doc.select(&sel).collect();
            (!found.is_empty()).then_some(found)
        })
        .unwrap_or_default();

    let extracted: Vec<Review> = containers
        .into_iter()
        .take(limit)
        .filter_map(extract_snapshot_review)
        .collect();

    debug!(
        target: "extract.snapshot",
        count = extracted.len(),
        "snapshot fallback parse finished"
    );
    extracted
}

fn extract_snapshot_review(container: ElementRef) -> Option<Review> {
    let content = child_text(container, CONTENT_SEL).unwrap_or_default();
    if content.is_empty() {
        return None;
    }

    let id = container
        .value()
        .attr("data-review-id")
        .or_else(|| container.value().attr("data-id"))
        .map(str::to_string)
        .unwrap_or_else(|| content_hash_id(&own_text(container)));

    let author = child_text(container, AUTHOR_SEL).unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let rating = match count_matches(container, selectors::RATING_STARS_FILLED) {
        0 => DEFAULT_RATING,
        stars => clamp_rating(stars as u32),
    };

    let date = child_text(container, DATE_SEL).unwrap_or_default();

    let (has_reply, reply_content) = match child_text(container, REPLY_SEL) {
        Some(text) => (true, Some(text)),
        None => (false, None),
    };

    Some(Review {
        id,
        author: truncate_chars(&author, AUTHOR_MAX_CHARS),
        rating,
        content: truncate_chars(&content, CONTENT_MAX_CHARS),
        date,
        visit_count: String::new(),
        photos: Vec::new(),
        has_reply,
        reply_content,
        reply_date: None,
    })
}

fn child_text(container: ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let child = container.select(&sel).next()?;
    let text = own_text(child);
    (!text.is_empty()).then_some(text)
}

fn own_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn count_matches(container: ElementRef, selector: &str) -> usize {
    Selector::parse(selector)
        .map(|sel| container.select(&sel).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
    <html><body><ul>
      <li class="review_item" data-review-id="rv-1001">
        <strong class="author_name">김사장단골손님</strong>
        <span class="star on"></span><span class="star on"></span>
        <span class="star on"></span><span class="star on"></span>
        <p class="review_content">고기가 정말 맛있고 사장님이 친절해요. 재방문 의사 있습니다!</p>
        <time class="date">2024.1.15</time>
        <div class="owner_reply">
          <p>소중한 리뷰 감사합니다. 또 방문해주세요!</p>
        </div>
      </li>
      <li class="review_item">
        <strong class="author_name">뚜벅이</strong>
        <p class="review_content">주차가 조금 불편했지만 음식은 괜찮았어요.</p>
      </li>
    </ul></body></html>
    "#;

    #[test]
    fn parses_containers_and_fields() {
        let reviews = parse_reviews(FIXTURE, 30);
        assert_eq!(reviews.len(), 2);

        let first = &reviews[0];
        assert_eq!(first.id, "rv-1001");
        assert_eq!(first.author, "김사장단골손님");
        assert_eq!(first.rating, 4);
        assert!(first.content.starts_with("고기가 정말 맛있고"));
        assert_eq!(first.date, "2024.1.15");
        assert!(first.has_reply);
        assert!(first.reply_content.as_deref().unwrap().contains("감사합니다"));

        let second = &reviews[1];
        assert_eq!(second.rating, 5, "no stars -> default");
        assert!(!second.has_reply);
        assert!(second.reply_content.is_none());
    }

    #[test]
    fn missing_data_attribute_falls_back_to_content_hash() {
        let reviews = parse_reviews(FIXTURE, 30);
        let second = &reviews[1];
        assert_eq!(second.id.len(), 12);
        assert!(second.id.chars().all(|c| c.is_ascii_hexdigit()));

        // Hash ids are stable across identical snapshots.
        let again = parse_reviews(FIXTURE, 30);
        assert_eq!(second.id, again[1].id);
    }

    #[test]
    fn six_filled_stars_clamp_to_five() {
        let html = r#"<li class="review_item">
            <span class="star on"></span><span class="star on"></span>
            <span class="star on"></span><span class="star on"></span>
            <span class="star on"></span><span class="star on"></span>
            <p class="review_content">별이 여섯 개나 그려진 이상한 마크업</p>
        </li>"#;
        let reviews = parse_reviews(html, 30);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 5);
    }

    #[test]
    fn long_fields_are_truncated() {
        let long_author = "가".repeat(40);
        let long_content = "나".repeat(900);
        let html = format!(
            r#"<li class="review_item">
                <strong class="author_name">{long_author}</strong>
                <p class="review_content">{long_content}</p>
            </li>"#
        );
        let reviews = parse_reviews(&html, 30);
        assert_eq!(reviews[0].author.chars().count(), 20);
        assert_eq!(reviews[0].content.chars().count(), 500);
    }

    #[test]
    fn limit_bounds_the_result() {
        let many: String = (0..10)
            .map(|i| format!(r#"<li class="review_item"><p class="review_content">리뷰 내용 번호 {i}</p></li>"#))
            .collect();
        assert_eq!(parse_reviews(&many, 4).len(), 4);
    }

    #[test]
    fn unrecognizable_markup_yields_empty() {
        assert!(parse_reviews("<div><span>nothing here</span></div>", 30).is_empty());
        assert!(parse_reviews("", 30).is_empty());
    }
}
