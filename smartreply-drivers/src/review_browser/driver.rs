use crate::review_browser::{pacer::Pacer, page::BrowserPage, unattended};
use fantoccini::cookies::Cookie;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use smartreply_common::{Result, SmartReplyError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

pub(crate) fn to_driver(e: CmdError) -> SmartReplyError {
    SmartReplyError::Driver(e.into())
}

/// How to reach and configure the browser process.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// WebDriver endpoint (chromedriver).
    pub webdriver_url: String,
    pub headless: bool,
    /// Upper bound on any single navigation.
    pub navigation_timeout: Duration,
    /// Fixed wait after navigation before queries run.
    pub settle_delay: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
        }
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client configured for
/// unattended review automation.
///
/// One `ReviewBrowser` backs one authenticated session; read and write
/// operations each open a short-lived [`BrowserPage`] tab against it and
/// close the tab when done.
pub struct ReviewBrowser {
    client: Client,
    pacer: Pacer,
    options: LaunchOptions,
}

impl ReviewBrowser {
    /// Start a browser session against a running WebDriver service.
    ///
    /// Failure here is fatal to the whole session; everything downstream
    /// needs the process this creates.
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert(
            "args".to_string(),
            json!(unattended::build_browser_arguments(options.headless)),
        );
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| SmartReplyError::BrowserLaunch(e.to_string()))?;

        info!(
            target: "driver.launch",
            webdriver_url = %options.webdriver_url,
            headless = options.headless,
            "browser session established"
        );

        Ok(Self {
            client,
            pacer: Pacer::new(),
            options,
        })
    }

    /// Open a fresh tab for one operation. The caller must hand the page
    /// back through [`BrowserPage::close`] on every exit path.
    pub async fn open_page(&self) -> Result<BrowserPage> {
        let home = self.client.window().await.map_err(to_driver)?;
        let opened = self.client.new_window(true).await.map_err(to_driver)?;
        self.client
            .switch_to_window(opened.handle.clone())
            .await
            .map_err(to_driver)?;

        Ok(BrowserPage::new(
            self.client.clone(),
            opened.handle,
            home,
            self.pacer.clone(),
            self.options.navigation_timeout,
            self.options.settle_delay,
        ))
    }

    /// Inject one cookie into the browsing context.
    ///
    /// WebDriver scopes `add_cookie` to the current document's origin, so
    /// callers must navigate somewhere on the target site first.
    pub async fn add_cookie(&self, name: &str, value: &str, domain: &str, path: &str) -> Result<()> {
        let mut cookie = Cookie::new(name.to_string(), value.to_string());
        cookie.set_domain(domain.to_string());
        cookie.set_path(path.to_string());
        self.client.add_cookie(cookie).await.map_err(to_driver)
    }

    /// Shared pacer for operations driven through this browser.
    pub fn pacer(&self) -> Pacer {
        self.pacer.clone()
    }

    /// Close the underlying browser session. Best-effort: teardown faults
    /// are logged and swallowed, and repeated calls on a dead session are
    /// harmless.
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            debug!(target: "driver.teardown", error = %e, "ignoring teardown failure");
        }
    }
}
