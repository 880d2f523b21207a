use crate::review_browser::driver::to_driver;
use crate::review_browser::{pacer::Pacer, unattended};
use fantoccini::elements::Element;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, Locator};
use smartreply_common::{Result, SmartReplyError};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// One short-lived tab, opened per operation and closed on every exit path.
///
/// Query helpers degrade to "not found" (`None` / empty vec) instead of
/// propagating driver faults; the markup being queried is unstable and a
/// missing element is an expected outcome, not an error. Navigation keeps a
/// `Result` because a timeout there means the whole operation failed.
pub struct BrowserPage {
    client: Client,
    handle: WindowHandle,
    home: WindowHandle,
    pacer: Pacer,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl BrowserPage {
    pub(crate) fn new(
        client: Client,
        handle: WindowHandle,
        home: WindowHandle,
        pacer: Pacer,
        navigation_timeout: Duration,
        settle_delay: Duration,
    ) -> Self {
        Self {
            client,
            handle,
            home,
            pacer,
            navigation_timeout,
            settle_delay,
        }
    }

    /// Navigate to `url`, apply automation evasions, and wait for the page
    /// to settle. Bounded by the configured navigation timeout; a timed-out
    /// navigation is surfaced as [`SmartReplyError::NavigationTimeout`] and
    /// never retried.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .switch_to_window(self.handle.clone())
            .await
            .map_err(to_driver)?;

        self.pacer.jitter(300, 1200).await;

        match timeout(self.navigation_timeout, self.client.goto(url)).await {
            Err(_) => {
                return Err(SmartReplyError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: self.navigation_timeout.as_secs(),
                })
            }
            Ok(res) => res.map_err(to_driver)?,
        }

        // Evasions are best-effort; a CSP block must not fail the operation.
        if let Err(e) = self
            .client
            .execute(unattended::webdriver_evasions(), vec![])
            .await
        {
            debug!(target: "driver.page", error = %e, "evasion script rejected");
        }

        self.pacer.settle(self.settle_delay).await;
        Ok(())
    }

    /// URL the navigation actually landed on, post-redirects.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(to_driver)
    }

    /// Full rendered page markup.
    pub async fn source(&self) -> Result<String> {
        self.client.source().await.map_err(to_driver)
    }

    /// First element matching the CSS selector, if any.
    pub async fn find(&self, selector: &str) -> Option<PageElement> {
        self.find_all(selector).await.into_iter().next()
    }

    /// Zero or more elements matching the CSS selector. Any query fault
    /// (bad selector, detached document) degrades to an empty result.
    pub async fn find_all(&self, selector: &str) -> Vec<PageElement> {
        match self.client.find_all(Locator::Css(selector)).await {
            Ok(elements) => elements
                .into_iter()
                .map(|e| PageElement::new(e, self.pacer.clone()))
                .collect(),
            Err(e) => {
                debug!(target: "driver.page", %selector, error = %e, "query degraded to empty");
                Vec::new()
            }
        }
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    /// Close this tab and return focus to the session's original window.
    /// Best-effort; closing an already-dead tab is fine.
    pub async fn close(self) {
        let _ = self.client.switch_to_window(self.handle.clone()).await;
        let _ = self.client.close_window().await;
        let _ = self.client.switch_to_window(self.home).await;
    }
}

#[derive(Clone)]
/// Wrapper for DOM elements with the same degrade-to-not-found contract as
/// [`BrowserPage`].
pub struct PageElement {
    element: Element,
    pacer: Pacer,
}

impl PageElement {
    pub(crate) fn new(element: Element, pacer: Pacer) -> Self {
        Self { element, pacer }
    }

    /// Read an attribute; `None` if absent or unreadable.
    pub async fn attr(&self, attribute: &str) -> Option<String> {
        self.element.attr(attribute).await.ok().flatten()
    }

    /// Visible text content; `None` if unreadable.
    pub async fn text(&self) -> Option<String> {
        self.element.text().await.ok()
    }

    /// First matching child element, if any.
    pub async fn find(&self, selector: &str) -> Option<PageElement> {
        self.find_all(selector).await.into_iter().next()
    }

    /// Zero or more matching child elements; faults degrade to empty.
    pub async fn find_all(&self, selector: &str) -> Vec<PageElement> {
        match self.element.find_all(Locator::Css(selector)).await {
            Ok(elements) => elements
                .into_iter()
                .map(|e| PageElement::new(e, self.pacer.clone()))
                .collect(),
            Err(e) => {
                debug!(target: "driver.page", %selector, error = %e, "child query degraded to empty");
                Vec::new()
            }
        }
    }

    /// Activate the element with a small leading jitter.
    pub async fn click(&self) -> Result<()> {
        self.pacer.jitter(100, 500).await;
        self.element.click().await.map_err(to_driver)
    }

    /// Clear the element and type `text` with human-like timings.
    pub async fn fill(&self, text: &str) -> Result<()> {
        self.element.clear().await.map_err(to_driver)?;
        self.pacer
            .type_text_human_like(&self.element, text)
            .await
            .map_err(SmartReplyError::Driver)?;
        Ok(())
    }
}
