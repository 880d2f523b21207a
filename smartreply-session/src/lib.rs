//! Session establishment and validation.
//!
//! There is no authentication API to call: a session is "logged in" when
//! injected cookies survive a navigation to the authenticated landing
//! surface without being bounced to a login page. This crate owns that
//! dance: browser launch, cookie parsing and injection, the validation
//! navigation, business discovery, and teardown.
//!
//! A [`Session`] is constructed once per login and then borrowed by the
//! extraction and actuation crates for every subsequent operation.
use smartreply_common::{BusinessRef, Result};
use smartreply_config::SmartReplyConfig;
use smartreply_drivers::review_browser::driver::{LaunchOptions, ReviewBrowser};
use smartreply_drivers::review_browser::page::BrowserPage;
use std::time::Duration;
use tracing::{info, warn};

pub mod cookies;
pub mod discovery;

use cookies::{parse_cookie_string, SessionCookie};

/// An authenticated browsing context plus its underlying browser process.
///
/// Owned exclusively by whoever constructed it; extraction and actuation
/// borrow it without taking ownership. Destroyed only through
/// [`SessionManager::teardown`].
pub struct Session {
    browser: ReviewBrowser,
    valid: bool,
    cookies: Vec<SessionCookie>,
}

impl Session {
    /// Whether the validation navigation succeeded.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The browser backing this session.
    pub fn browser(&self) -> &ReviewBrowser {
        &self.browser
    }

    /// Cookies injected at authentication time.
    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }
}

/// Creates, validates, and tears down [`Session`]s.
pub struct SessionManager {
    base_url: String,
    cookie_domain: String,
    launch: LaunchOptions,
}

impl SessionManager {
    pub fn new(base_url: impl Into<String>, cookie_domain: impl Into<String>, launch: LaunchOptions) -> Self {
        Self {
            base_url: base_url.into(),
            cookie_domain: cookie_domain.into(),
            launch,
        }
    }

    /// Wire a manager from loaded workspace configuration.
    pub fn from_config(config: &SmartReplyConfig) -> Self {
        Self::new(
            config.site.base_url.clone(),
            config.site.cookie_domain.clone(),
            LaunchOptions {
                webdriver_url: config.browser.webdriver_url.clone(),
                headless: config.browser.headless,
                navigation_timeout: Duration::from_secs(config.pacing.navigation_timeout_secs),
                settle_delay: Duration::from_millis(config.pacing.settle_delay_ms),
            },
        )
    }

    /// Start the browser process. The only genuinely fatal failure in the
    /// whole system lives here: without a browser nothing else can proceed.
    pub async fn initialize(&self) -> Result<Session> {
        let browser = ReviewBrowser::launch(self.launch.clone()).await?;
        Ok(Session {
            browser,
            valid: false,
            cookies: Vec::new(),
        })
    }

    /// Inject cookies parsed from `cookie_string` and validate them with a
    /// navigation to the landing surface.
    ///
    /// Returns `false` (never an error) when parsing yields zero cookies,
    /// when any navigation fails, or when the landing navigation redirects
    /// to a login surface. On `true` the session is marked valid.
    pub async fn authenticate(&self, session: &mut Session, cookie_string: &str) -> bool {
        let cookies = parse_cookie_string(cookie_string, &self.cookie_domain);
        if cookies.is_empty() {
            warn!(target: "session.auth", "cookie string yielded no cookies; failing closed");
            return false;
        }

        let page = match session.browser.open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "session.auth", error = %e, "could not open validation page");
                return false;
            }
        };

        let validated = self.inject_and_validate(session, &page, &cookies).await;
        page.close().await;

        match validated {
            Ok(final_url) => {
                if is_login_surface(&final_url) {
                    warn!(
                        target: "session.auth",
                        url = %final_url,
                        "redirected to login surface; cookies invalid"
                    );
                    return false;
                }
                info!(target: "session.auth", cookies = cookies.len(), "session validated");
                session.cookies = cookies;
                session.valid = true;
                true
            }
            Err(e) => {
                warn!(target: "session.auth", error = %e, "validation navigation failed");
                false
            }
        }
    }

    async fn inject_and_validate(
        &self,
        session: &Session,
        page: &BrowserPage,
        cookies: &[SessionCookie],
    ) -> Result<String> {
        // WebDriver scopes add_cookie to the current document, so land on
        // the site once before injecting.
        page.goto(&self.base_url).await?;

        for cookie in cookies {
            session
                .browser
                .add_cookie(&cookie.name, &cookie.value, &cookie.domain, &cookie.path)
                .await?;
        }

        // The validation navigation proper: where did we actually end up?
        page.goto(&self.base_url).await?;
        page.current_url().await
    }

    /// Scan the landing surface for managed businesses.
    ///
    /// Never fails: an invalid session, a dead navigation, or markup no
    /// candidate recognizes all degrade to an empty list. When live
    /// container queries find nothing, falls back to scanning the raw
    /// markup for identifier-shaped substrings.
    pub async fn discover_businesses(&self, session: &Session) -> Vec<BusinessRef> {
        if !session.valid {
            return Vec::new();
        }

        let page = match session.browser.open_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(target: "session.discovery", error = %e, "could not open page");
                return Vec::new();
            }
        };

        let businesses = match page.goto(&self.base_url).await {
            Ok(()) => {
                let live = discovery::scan_live(&page).await;
                if !live.is_empty() {
                    live
                } else {
                    match page.source().await {
                        Ok(html) => discovery::scan_markup(&html),
                        Err(e) => {
                            warn!(target: "session.discovery", error = %e, "markup capture failed");
                            Vec::new()
                        }
                    }
                }
            }
            Err(e) => {
                warn!(target: "session.discovery", error = %e, "landing navigation failed");
                Vec::new()
            }
        };

        page.close().await;
        info!(target: "session.discovery", count = businesses.len(), "business scan finished");
        businesses
    }

    /// Release the session's context and browser process. Idempotent in
    /// effect and best-effort: teardown faults are swallowed, this is
    /// cleanup, not a safety boundary.
    pub async fn teardown(&self, session: Session) {
        session.browser.close().await;
    }
}

/// URL shape that signals the cookies were rejected.
fn is_login_surface(url: &str) -> bool {
    url.contains("nidlogin") || url.to_lowercase().contains("login")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirects_are_detected() {
        assert!(is_login_surface(
            "https://nid.naver.com/nidlogin.login?mode=form"
        ));
        assert!(is_login_surface("https://example.com/Login?next=/"));
        assert!(!is_login_surface("https://new.smartplace.naver.com/"));
        assert!(!is_login_surface(
            "https://new.smartplace.naver.com/biz/123/review/visitor"
        ));
    }
}
