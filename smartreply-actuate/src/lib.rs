//! UI-driven reply submission.
//!
//! There is no write API: posting an owner reply means driving the same
//! listing page a human would use: find the review, open its composer,
//! type the text, press submit. None of those affordances carry stable
//! identifiers, so each stage resolves through a ranked cascade and each
//! missing stage produces its own distinct failure message.
//!
//! "Success" here means the submission was triggered. The site exposes no
//! read-back contract, so a successful outcome is a signal, not a
//! guarantee of persistence.
use smartreply_common::cascade::CssCascade;
use smartreply_common::{
    ActuateStage, BulkReplyItem, BulkReplyOutcome, ReplyOutcome, SmartReplyError,
};
use smartreply_config::SmartReplyConfig;
use smartreply_drivers::review_browser::page::{BrowserPage, PageElement};
use smartreply_extract::selectors::REVIEW_CONTAINERS;
use smartreply_session::Session;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controls that open the reply composer, searched inside the review
/// element first, then across the whole page.
const COMPOSER: CssCascade = CssCascade::new(
    "actuate.composer",
    &[
        "button[class*=\"reply\"]",
        "a[class*=\"reply\"]",
        "[class*=\"답글\"]",
        "[class*=\"write\"]",
    ],
);

/// Text-input surfaces for the composer.
const INPUT: CssCascade = CssCascade::new(
    "actuate.input",
    &[
        "textarea[class*=\"reply\"]",
        "textarea[class*=\"input\"]",
        "[class*=\"reply\"] textarea",
        "textarea",
        "[contenteditable=\"true\"]",
    ],
);

/// Submit controls, most specific first.
const SUBMIT: CssCascade = CssCascade::new(
    "actuate.submit",
    &[
        "button[type=\"submit\"]",
        "button[class*=\"submit\"]",
        "button[class*=\"register\"]",
        "[class*=\"submit\"]",
    ],
);

/// Visible-label fallbacks for when every class-based candidate misses.
/// Classes on this surface are mangled and rotated without notice; the
/// Korean label text is the most stable signal left on a control.
const COMPOSER_LABELS: &[&str] = &["답글"];
const SUBMIT_LABELS: &[&str] = &["등록", "완료"];

/// Elements scanned during a label fallback.
const LABELED_CONTROLS: &str = "button, a";

fn matches_label(text: &str, labels: &[&str]) -> bool {
    let text = text.trim();
    !text.is_empty() && labels.iter().any(|label| text.contains(label))
}

/// First candidate whose visible text carries one of `labels`.
async fn find_labeled(candidates: Vec<PageElement>, labels: &[&str]) -> Option<PageElement> {
    for candidate in candidates {
        if let Some(text) = candidate.text().await {
            if matches_label(&text, labels) {
                debug!(target: "actuate.reply", label = text.trim(), "matched control by label");
                return Some(candidate);
            }
        }
    }
    None
}

/// Selector locating a review by its identifier attribute.
fn review_target_selector(review_id: &str) -> String {
    format!("[data-review-id=\"{review_id}\"], [data-id=\"{review_id}\"]")
}

fn stage_failure(stage: ActuateStage) -> ReplyOutcome {
    ReplyOutcome::failure(SmartReplyError::ElementNotFound { stage }.to_string())
}

/// Drives the review page UI to submit owner replies.
pub struct AutomationActuator {
    base_url: String,
    /// When the identifier lookup misses, reply to the first listed review
    /// instead of failing. Off by default: the guess can silently hit the
    /// wrong review, so callers must opt in to the legacy behavior.
    first_review_fallback: bool,
}

impl AutomationActuator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            first_review_fallback: false,
        }
    }

    pub fn from_config(config: &SmartReplyConfig) -> Self {
        Self::new(config.site.base_url.clone())
    }

    /// Opt in to replying to the first listed review when the identifier
    /// lookup misses.
    pub fn with_first_review_fallback(mut self, enabled: bool) -> Self {
        self.first_review_fallback = enabled;
        self
    }

    /// Submit one reply. Total contract: every failure mode comes back as
    /// a `ReplyOutcome` with a stage-specific message, never an error.
    pub async fn post_reply(
        &self,
        session: &Session,
        business_id: &str,
        review_id: &str,
        reply_text: &str,
    ) -> ReplyOutcome {
        let page = match session.browser().open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "actuate.reply", error = %e, "could not open page");
                return ReplyOutcome::failure(format!("browser page could not be opened: {e}"));
            }
        };

        let outcome = self.drive_reply(&page, business_id, review_id, reply_text).await;
        page.close().await;

        info!(
            target: "actuate.reply",
            business_id,
            review_id,
            success = outcome.success,
            message = %outcome.message,
            "reply attempt finished"
        );
        outcome
    }

    async fn drive_reply(
        &self,
        page: &BrowserPage,
        business_id: &str,
        review_id: &str,
        reply_text: &str,
    ) -> ReplyOutcome {
        let url = format!("{}/biz/{}/review/visitor", self.base_url, business_id);
        if let Err(e) = page.goto(&url).await {
            return ReplyOutcome::failure(format!("listing navigation failed: {e}"));
        }

        // Stage 1: the target review.
        let (review, guessed) = match self.locate_review(page, review_id).await {
            Some(found) => found,
            None => return stage_failure(ActuateStage::Review),
        };

        // Stage 2: the composer control, scoped to the review first, the
        // whole page as fallback.
        let composer = match self.locate_composer(page, &review).await {
            Some(el) => el,
            None => return stage_failure(ActuateStage::Composer),
        };
        if let Err(e) = composer.click().await {
            return ReplyOutcome::failure(format!("reply composer could not be activated: {e}"));
        }
        page.pacer().jitter(800, 1400).await;

        // Stage 3: the text input.
        let input = INPUT.select(|sel| async move { page.find(sel).await }).await;
        let Some(input) = input else {
            return stage_failure(ActuateStage::Input);
        };
        if let Err(e) = input.fill(reply_text).await {
            return ReplyOutcome::failure(format!("reply input rejected text: {e}"));
        }
        page.pacer().jitter(400, 700).await;

        // Stage 4: submit.
        let Some(submit) = self.locate_submit(page).await else {
            return stage_failure(ActuateStage::Submit);
        };
        if let Err(e) = submit.click().await {
            return ReplyOutcome::failure(format!("submit control could not be activated: {e}"));
        }
        page.pacer().jitter(1500, 2500).await;

        if guessed {
            ReplyOutcome::success(
                "reply submitted to first listed review (identifier lookup missed); not verified",
            )
        } else {
            ReplyOutcome::success("reply submitted; no server acknowledgment available")
        }
    }

    /// Locate the target review by identifier attribute; optionally fall
    /// back to the first listed review. The bool reports whether the
    /// fallback guess was taken.
    async fn locate_review(
        &self,
        page: &BrowserPage,
        review_id: &str,
    ) -> Option<(PageElement, bool)> {
        if let Some(review) = page.find(&review_target_selector(review_id)).await {
            return Some((review, false));
        }

        if !self.first_review_fallback {
            return None;
        }

        warn!(
            target: "actuate.reply",
            review_id,
            "identifier lookup missed; falling back to first listed review"
        );
        let first = REVIEW_CONTAINERS
            .select(|sel| async move { page.find(sel).await })
            .await?;
        Some((first, true))
    }

    async fn locate_composer(&self, page: &BrowserPage, review: &PageElement) -> Option<PageElement> {
        let scoped = COMPOSER
            .select(|sel| async move { review.find(sel).await })
            .await;
        if scoped.is_some() {
            return scoped;
        }
        if let Some(found) = COMPOSER.select(|sel| async move { page.find(sel).await }).await {
            return Some(found);
        }
        // Class candidates exhausted; fall back to the visible label,
        // review-scoped first.
        if let Some(found) =
            find_labeled(review.find_all(LABELED_CONTROLS).await, COMPOSER_LABELS).await
        {
            return Some(found);
        }
        find_labeled(page.find_all(LABELED_CONTROLS).await, COMPOSER_LABELS).await
    }

    async fn locate_submit(&self, page: &BrowserPage) -> Option<PageElement> {
        if let Some(found) = SUBMIT.select(|sel| async move { page.find(sel).await }).await {
            return Some(found);
        }
        find_labeled(page.find_all("button").await, SUBMIT_LABELS).await
    }

    /// Submit replies sequentially, waiting `delay` between successive
    /// submissions. Individual failures do not stop the batch; the result
    /// has exactly one entry per input item, in input order, tagged with
    /// the originating review identifier. No rollback.
    ///
    /// Callers usually pass the configured `pacing.bulk_delay_ms`.
    pub async fn post_bulk(
        &self,
        session: &Session,
        business_id: &str,
        replies: &[BulkReplyItem],
        delay: Duration,
    ) -> Vec<BulkReplyOutcome> {
        let pacer = session.browser().pacer();
        collect_bulk(replies, |index, item| {
            let pacer = pacer.clone();
            async move {
                if index > 0 {
                    pacer.between_submissions(delay).await;
                }
                self.post_reply(session, business_id, &item.review_id, &item.reply_text)
                    .await
            }
        })
        .await
    }
}

/// Sequential bulk loop, separated from page driving so the
/// one-tagged-result-per-item contract holds independently of what `post`
/// does with each item.
async fn collect_bulk<F, Fut>(replies: &[BulkReplyItem], mut post: F) -> Vec<BulkReplyOutcome>
where
    F: FnMut(usize, BulkReplyItem) -> Fut,
    Fut: Future<Output = ReplyOutcome>,
{
    let mut results = Vec::with_capacity(replies.len());
    for (index, item) in replies.iter().enumerate() {
        let review_id = item.review_id.clone();
        let outcome = post(index, item.clone()).await;
        results.push(BulkReplyOutcome {
            review_id,
            success: outcome.success,
            message: outcome.message,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_selector_covers_both_id_attributes() {
        assert_eq!(
            review_target_selector("rv-42"),
            "[data-review-id=\"rv-42\"], [data-id=\"rv-42\"]"
        );
    }

    #[test]
    fn stage_failures_carry_distinct_messages() {
        let messages: Vec<String> = [
            ActuateStage::Review,
            ActuateStage::Composer,
            ActuateStage::Input,
            ActuateStage::Submit,
        ]
        .into_iter()
        .map(|stage| stage_failure(stage).message)
        .collect();

        assert_eq!(messages[3], "submit control not found");
        let unique: std::collections::HashSet<_> = messages.iter().collect();
        assert_eq!(unique.len(), messages.len());
        assert!(messages.iter().all(|m| {
            !stage_failure(ActuateStage::Review).success && m.ends_with("not found")
        }));
    }

    #[test]
    fn label_matching_targets_register_and_complete_controls() {
        assert!(matches_label("등록", SUBMIT_LABELS));
        assert!(matches_label("  완료하기  ", SUBMIT_LABELS));
        assert!(!matches_label("취소", SUBMIT_LABELS));
        assert!(matches_label("답글 쓰기", COMPOSER_LABELS));
        assert!(!matches_label("", COMPOSER_LABELS));
        assert!(!matches_label("   ", SUBMIT_LABELS));
    }

    #[tokio::test]
    async fn bulk_returns_one_tagged_result_per_item_in_order() {
        let items: Vec<BulkReplyItem> = (0..5)
            .map(|i| BulkReplyItem {
                review_id: format!("rv-{i}"),
                reply_text: format!("감사합니다 {i}"),
            })
            .collect();

        // Every other submission fails; the batch must keep going and
        // still report every item.
        let results = collect_bulk(&items, |index, item| async move {
            if index % 2 == 1 {
                ReplyOutcome::failure(format!("reply input not found ({})", item.review_id))
            } else {
                ReplyOutcome::success("submitted")
            }
        })
        .await;

        assert_eq!(results.len(), items.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.review_id, format!("rv-{i}"));
            assert_eq!(result.success, i % 2 == 0);
        }
    }

    #[tokio::test]
    async fn empty_bulk_yields_empty_result() {
        let results = collect_bulk(&[], |_, _| async { ReplyOutcome::success("unreachable") }).await;
        assert!(results.is_empty());
    }

    #[test]
    fn fallback_is_disabled_by_default() {
        let actuator = AutomationActuator::new("https://example.test");
        assert!(!actuator.first_review_fallback);
        let actuator = actuator.with_first_review_fallback(true);
        assert!(actuator.first_review_fallback);
    }
}
