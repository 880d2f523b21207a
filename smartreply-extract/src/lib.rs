//! Structured review extraction from the listing surface.
//!
//! The listing markup is dynamically rendered, class-mangled, and changes
//! without notice. Extraction therefore never trusts any single structural
//! shape: containers and every field resolve through ranked cascades
//! ([`selectors`]), and when the live DOM yields nothing at all the captured
//! markup is re-parsed statically ([`snapshot`]). Failures degrade: a
//! malformed review is skipped, a missing field is defaulted, a dead page
//! is an empty result. This crate never raises across its boundary.
use smartreply_common::{ReviewFilter, ReviewStats};
use smartreply_config::SmartReplyConfig;
use smartreply_drivers::review_browser::page::BrowserPage;
use smartreply_session::Session;
use tracing::{debug, info, warn};

pub mod fields;
pub mod selectors;
pub mod snapshot;

pub use smartreply_common::Review;

/// Default cap on extracted reviews per call.
pub const DEFAULT_LIMIT: usize = 30;

/// Wait after activating a "load more" control, letting the new batch
/// attach.
const LOAD_MORE_SETTLE_MS: (u64, u64) = (800, 1400);

/// Produces normalized review records for one business.
pub struct ExtractionEngine {
    base_url: String,
    load_more_rounds: u32,
}

impl ExtractionEngine {
    pub fn new(base_url: impl Into<String>, load_more_rounds: u32) -> Self {
        Self {
            base_url: base_url.into(),
            load_more_rounds,
        }
    }

    pub fn from_config(config: &SmartReplyConfig) -> Self {
        Self::new(config.site.base_url.clone(), config.pacing.load_more_rounds)
    }

    /// URL of the visitor-review listing for a business.
    pub fn listing_url(&self, business_id: &str) -> String {
        format!("{}/biz/{}/review/visitor", self.base_url, business_id)
    }

    /// URL of the review overview surface (counters live here).
    pub fn overview_url(&self, business_id: &str) -> String {
        format!("{}/biz/{}/review", self.base_url, business_id)
    }

    /// Extract up to `limit` reviews for `business_id`, then apply `filter`
    /// locally.
    ///
    /// Total contract: every failure mode (navigation timeout, zero
    /// matching containers, malformed individual reviews) resolves to a
    /// shorter (possibly empty) result, never an error. Filtering is a pure
    /// post-extraction predicate; the remote surface is never asked to
    /// filter, so two calls against unchanged markup agree on the shared
    /// subset.
    pub async fn list_reviews(
        &self,
        session: &Session,
        business_id: &str,
        filter: ReviewFilter,
        limit: usize,
    ) -> Vec<Review> {
        let page = match session.browser().open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "extract.list", error = %e, "could not open page");
                return Vec::new();
            }
        };

        let url = self.listing_url(business_id);
        let mut reviews = match page.goto(&url).await {
            Ok(()) => {
                self.expand_listing(&page).await;
                self.collect_reviews(&page, limit).await
            }
            Err(e) => {
                warn!(target: "extract.list", %url, error = %e, "listing navigation failed");
                Vec::new()
            }
        };

        page.close().await;

        reviews.retain(|r| filter.accepts(r.has_reply));
        info!(
            target: "extract.list",
            business_id,
            count = reviews.len(),
            ?filter,
            "extraction finished"
        );
        reviews
    }

    /// Activate the "load more" control for up to the configured number of
    /// rounds, stopping early the first round no control is found or
    /// activation fails.
    async fn expand_listing(&self, page: &BrowserPage) {
        for round in 0..self.load_more_rounds {
            let control = selectors::LOAD_MORE
                .select(|sel| async move { page.find(sel).await })
                .await;

            let Some(control) = control else {
                debug!(target: "extract.list", round, "no expansion control; stopping");
                break;
            };

            if let Err(e) = control.click().await {
                debug!(target: "extract.list", round, error = %e, "expansion click failed; stopping");
                break;
            }
            page.pacer()
                .jitter(LOAD_MORE_SETTLE_MS.0, LOAD_MORE_SETTLE_MS.1)
                .await;
        }
    }

    async fn collect_reviews(&self, page: &BrowserPage, limit: usize) -> Vec<Review> {
        let containers = selectors::REVIEW_CONTAINERS
            .select(|sel| async move {
                let found = page.find_all(sel).await;
                (!found.is_empty()).then_some(found)
            })
            .await
            .unwrap_or_default();

        // No live containers at all: capture the markup once and fall back
        // to static parsing.
        if containers.is_empty() {
            return match page.source().await {
                Ok(html) => snapshot::parse_reviews(&html, limit),
                Err(e) => {
                    warn!(target: "extract.list", error = %e, "markup capture failed");
                    Vec::new()
                }
            };
        }

        let mut reviews = Vec::new();
        for container in containers.into_iter().take(limit) {
            match fields::extract_review(&container).await {
                Some(review) => reviews.push(review),
                None => {
                    debug!(target: "extract.list", "skipping malformed review element");
                }
            }
        }
        reviews
    }

    /// Best-effort counters from the review overview surface. Degrades to
    /// zeroed stats on any failure.
    pub async fn review_stats(&self, session: &Session, business_id: &str) -> ReviewStats {
        let mut stats = ReviewStats::default();

        let page = match session.browser().open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "extract.stats", error = %e, "could not open page");
                return stats;
            }
        };

        let url = self.overview_url(business_id);
        match page.goto(&url).await {
            Ok(()) => {
                let page = &page;
                let total = selectors::STATS_TOTAL
                    .select(|sel| async move {
                        let text = page.find(sel).await?.text().await?;
                        fields::parse_rating_text(&text)
                    })
                    .await;
                if let Some(total) = total {
                    stats.total = total;
                }
            }
            Err(e) => {
                warn!(target: "extract.stats", %url, error = %e, "overview navigation failed");
            }
        }

        page.close().await;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_embed_business_id() {
        let engine = ExtractionEngine::new("https://new.smartplace.naver.com", 3);
        assert_eq!(
            engine.listing_url("12345"),
            "https://new.smartplace.naver.com/biz/12345/review/visitor"
        );
        assert_eq!(
            engine.overview_url("12345"),
            "https://new.smartplace.naver.com/biz/12345/review"
        );
    }

    #[test]
    fn filter_partitions_extracted_set() {
        // The filter step operates on the fully extracted local set; verify
        // the subset relationship the engine relies on.
        let all: Vec<Review> = snapshot::parse_reviews(PARTITION_FIXTURE, DEFAULT_LIMIT);
        assert_eq!(all.len(), 3);

        let mut no_reply = all.clone();
        no_reply.retain(|r| ReviewFilter::NoReply.accepts(r.has_reply));
        let mut has_reply = all.clone();
        has_reply.retain(|r| ReviewFilter::HasReply.accepts(r.has_reply));

        assert_eq!(no_reply.len() + has_reply.len(), all.len());
        assert!(no_reply.iter().all(|r| !r.has_reply && r.reply_content.is_none()));
        assert!(has_reply.iter().all(|r| r.has_reply && r.reply_content.is_some()));
        // Shared subset identical to the unfiltered extraction.
        for r in &no_reply {
            assert!(all.contains(r));
        }
    }

    const PARTITION_FIXTURE: &str = r#"
    <ul>
      <li class="review_item"><p class="review_content">답글이 아직 없는 첫 번째 리뷰</p></li>
      <li class="review_item">
        <p class="review_content">답글이 달린 두 번째 리뷰입니다</p>
        <div class="owner_reply"><p>감사합니다, 또 오세요!</p></div>
      </li>
      <li class="review_item"><p class="review_content">답글이 아직 없는 세 번째 리뷰</p></li>
    </ul>
    "#;
}
