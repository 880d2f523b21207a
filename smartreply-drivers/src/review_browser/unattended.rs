//! Launch configuration for unattended operation.
//!
//! The browser must behave identically on headless CI hosts and desktops:
//! fixed viewport, explicit desktop user agent, no sandbox UI, and the
//! automation flags Chrome would otherwise advertise turned off.

/// User agent presented to the remote site. A desktop Chrome string; the
/// review surfaces serve a different (and differently structured) markup to
/// mobile agents.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed viewport so element geometry is stable across hosts.
pub const VIEWPORT: (u32, u32) = (1920, 1080);

/// Chrome command-line arguments for an isolated, unattended process.
pub fn build_browser_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-accelerated-2d-canvas".to_string(),
        "--no-first-run".to_string(),
        "--no-zygote".to_string(),
        "--disable-gpu".to_string(),
        "--disable-infobars".to_string(),
        "--disable-extensions".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        format!("--user-agent={DESKTOP_USER_AGENT}"),
        format!("--window-size={},{}", VIEWPORT.0, VIEWPORT.1),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// JavaScript applied after each navigation to reduce automation signals.
pub fn webdriver_evasions() -> &'static str {
    r#"
        Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
        Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
        Object.defineProperty(navigator, 'languages', {
            get: () => ['ko-KR', 'ko', 'en-US']
        });
        if (!window.chrome) window.chrome = { runtime: {} };
    "#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_flag_is_optional() {
        let headed = build_browser_arguments(false);
        assert!(!headed.iter().any(|a| a.starts_with("--headless")));

        let headless = build_browser_arguments(true);
        assert!(headless.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn arguments_pin_agent_and_viewport() {
        let args = build_browser_arguments(true);
        assert!(args
            .iter()
            .any(|a| a.starts_with("--user-agent=Mozilla/5.0 (Windows NT 10.0")));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
    }
}
