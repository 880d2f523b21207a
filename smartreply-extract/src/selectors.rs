//! CSS cascades for the review listing surface.
//!
//! The markup here is generated, class-mangled, and changes without notice,
//! so every lookup carries several structural guesses ranked from most to
//! least specific. Update this file when the surface changes; capture an
//! HTML sample and extend the snapshot tests alongside.
use smartreply_common::cascade::CssCascade;

/// Repeating review containers on the live page.
pub const REVIEW_CONTAINERS: CssCascade = CssCascade::new(
    "review.container",
    &[
        "li[class*=\"review\"]",
        "[class*=\"review-item\"]",
        "[class*=\"ReviewItem\"]",
        "article[class*=\"review\"]",
        "[data-review-id]",
    ],
);

/// "Load more" expansion control.
pub const LOAD_MORE: CssCascade = CssCascade::new(
    "review.load_more",
    &[
        "button[class*=\"more\"]",
        "a[class*=\"more\"]",
        "[class*=\"더보기\"]",
    ],
);

/// Reviewer display name.
pub const AUTHOR: CssCascade = CssCascade::new(
    "review.author",
    &[
        ".author",
        ".nickname",
        "[class*=\"user\"]",
        "[class*=\"name\"]",
        "strong",
    ],
);

/// Numeric rating text.
pub const RATING_TEXT: CssCascade = CssCascade::new(
    "review.rating_text",
    &[".rating", "[class*=\"star\"]", "[class*=\"score\"]"],
);

/// Filled star indicators, counted when no numeric rating parses.
pub const RATING_STARS_FILLED: &str = "[class*=\"star\"][class*=\"on\"], [class*=\"fill\"]";

/// Review body text.
pub const CONTENT: CssCascade = CssCascade::new(
    "review.content",
    &[
        ".content",
        ".review-text",
        "[class*=\"txt\"]",
        "[class*=\"content\"]",
        "p",
    ],
);

/// Free-form review date.
pub const DATE: CssCascade = CssCascade::new(
    "review.date",
    &[".date", "time", "[class*=\"date\"]", "[class*=\"time\"]"],
);

/// Visit-count badge.
pub const VISIT_COUNT: CssCascade = CssCascade::new(
    "review.visit_count",
    &["[class*=\"visit\"]", "[class*=\"count\"]"],
);

/// Attached review photos.
pub const PHOTOS: &str = "img[src*=\"review\"], img[src*=\"photo\"]";

/// Owner reply block.
pub const REPLY: CssCascade = CssCascade::new(
    "review.reply",
    &[
        ".owner-reply",
        "[class*=\"reply\"]",
        "[class*=\"answer\"]",
        "[class*=\"response\"]",
    ],
);

/// Date inside an owner reply block.
pub const REPLY_DATE: CssCascade =
    CssCascade::new("review.reply_date", &["time", "[class*=\"date\"]"]);

/// Total-count element on the review overview surface.
pub const STATS_TOTAL: CssCascade = CssCascade::new(
    "review.stats_total",
    &["[class*=\"total\"]", "[class*=\"count\"]"],
);

/// Simplified container cascade for the static-snapshot fallback. The
/// snapshot parser sees serialized markup, so the broadest shapes win.
pub const SNAPSHOT_CONTAINERS: CssCascade = CssCascade::new(
    "snapshot.container",
    &["li[class*=\"review\"]", "[class*=\"review-item\"]", "article"],
);

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn all_candidates_are_valid_css() {
        let cascades = [
            REVIEW_CONTAINERS,
            LOAD_MORE,
            AUTHOR,
            RATING_TEXT,
            CONTENT,
            DATE,
            VISIT_COUNT,
            REPLY,
            REPLY_DATE,
            STATS_TOTAL,
            SNAPSHOT_CONTAINERS,
        ];
        for cascade in cascades {
            for candidate in cascade.candidates() {
                assert!(
                    Selector::parse(candidate).is_ok(),
                    "{}: bad selector {candidate}",
                    cascade.name()
                );
            }
        }
        assert!(Selector::parse(RATING_STARS_FILLED).is_ok());
        assert!(Selector::parse(PHOTOS).is_ok());
    }
}
