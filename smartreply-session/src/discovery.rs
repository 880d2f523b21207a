//! Business discovery on the authenticated landing surface.
//!
//! Two independent strategies, tried in order: a cascade of live container
//! queries, then a raw-markup scan for identifier-shaped path segments. The
//! second exists because the landing page frequently renders the business
//! switcher through markup none of our container candidates recognize, while
//! the `/biz/{id}` links are still present in the document text.
use regex::Regex;
use smartreply_common::cascade::CssCascade;
use smartreply_common::BusinessRef;
use smartreply_drivers::review_browser::page::{BrowserPage, PageElement};
use std::sync::OnceLock;
use tracing::debug;

/// Repeating business-entry containers on the landing surface.
pub const BUSINESS_CONTAINERS: CssCascade = CssCascade::new(
    "business.container",
    &[
        "[class*=\"business\"] [class*=\"item\"]",
        "[class*=\"store\"] [class*=\"item\"]",
        "[class*=\"place\"] [class*=\"item\"]",
        "li[class*=\"item\"]",
        "[data-id]",
    ],
);

const BUSINESS_NAME: CssCascade = CssCascade::new(
    "business.name",
    &["[class*=\"name\"]", "[class*=\"title\"]", "h3", "h4", "strong"],
);

const BUSINESS_CATEGORY: CssCascade = CssCascade::new(
    "business.category",
    &["[class*=\"category\"]", "[class*=\"type\"]", "span"],
);

/// Placeholder display name when only an identifier is known.
const PLACEHOLDER_NAME: &str = "업체";

/// Cap on identifier-only fallback results.
const MARKUP_SCAN_LIMIT: usize = 5;

fn biz_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/biz/(\d+)").expect("static pattern"))
}

/// Scan the live landing page for business entries. Empty when no container
/// candidate matches anything.
pub async fn scan_live(page: &BrowserPage) -> Vec<BusinessRef> {
    let containers = BUSINESS_CONTAINERS
        .select(|sel| async move {
            let found = page.find_all(sel).await;
            (!found.is_empty()).then_some(found)
        })
        .await
        .unwrap_or_default();

    let mut businesses = Vec::new();
    for container in containers {
        if let Some(business) = extract_business(&container).await {
            businesses.push(business);
        }
    }
    businesses
}

async fn extract_business(container: &PageElement) -> Option<BusinessRef> {
    let id = match container.attr("data-id").await {
        Some(id) if !id.is_empty() => id,
        _ => {
            let href = container.attr("href").await?;
            biz_id_pattern()
                .captures(&href)
                .map(|c| c[1].to_string())?
        }
    };

    let name = BUSINESS_NAME
        .select(|sel| async move {
            let text = container.find(sel).await?.text().await?;
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .await
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let category = BUSINESS_CATEGORY
        .select(|sel| async move {
            let text = container.find(sel).await?.text().await?;
            let text = text.trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .await;

    Some(BusinessRef { id, name, category })
}

/// Fallback: pull identifier-shaped substrings straight out of the raw
/// markup, deduplicated in first-seen order and capped at
/// [`MARKUP_SCAN_LIMIT`], with placeholder names.
pub fn scan_markup(html: &str) -> Vec<BusinessRef> {
    let mut seen = Vec::new();
    for caps in biz_id_pattern().captures_iter(html) {
        let id = caps[1].to_string();
        if !seen.contains(&id) {
            seen.push(id);
            if seen.len() == MARKUP_SCAN_LIMIT {
                break;
            }
        }
    }

    if !seen.is_empty() {
        debug!(
            target: "session.discovery",
            count = seen.len(),
            "fell back to raw-markup identifier scan"
        );
    }

    seen.into_iter()
        .map(|id| BusinessRef {
            name: format!("{PLACEHOLDER_NAME} {id}"),
            id,
            category: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_scan_dedupes_and_caps() {
        let html: String = (1..=8)
            .flat_map(|i| {
                // Each id appears twice.
                [
                    format!("<a href=\"/biz/{i}00/review\">x</a>"),
                    format!("<a href=\"/biz/{i}00\">y</a>"),
                ]
            })
            .collect();

        let found = scan_markup(&html);
        assert_eq!(found.len(), 5);
        let ids: Vec<_> = found.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["100", "200", "300", "400", "500"]);
        assert_eq!(found[0].name, "업체 100");
        assert!(found[0].category.is_none());
    }

    #[test]
    fn markup_scan_ignores_non_numeric_segments() {
        let found = scan_markup("<a href=\"/biz/abc\">x</a> /biz/123 tail");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "123");
    }

    #[test]
    fn markup_scan_handles_empty_document() {
        assert!(scan_markup("").is_empty());
        assert!(scan_markup("<html><body>no links</body></html>").is_empty());
    }
}
