//! Headless-browser navigation, the last-resort strategy.
//!
//! Only compiled with the `browser` feature. Each fetch launches a fresh headless Chrome, waits for
//! the DOM to be parsed (the `<body>` element exists, without waiting for the full load event),
//! snapshots the rendered HTML and closes the browser. `headless_chrome` is blocking, so the
//! navigation runs on tokio's blocking pool.

use std::ffi::OsStr;
use std::time::Duration;

use futures::future::BoxFuture;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info};

use super::FetchStrategy;
use crate::config::HttpSettings;
use crate::models::StrategyKind;

#[derive(Debug, Clone)]
pub struct BrowserStrategy {
    timeout: Duration,
    user_agent: String,
}

impl BrowserStrategy {
    pub fn from_config(settings: &HttpSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            user_agent: settings.browser_user_agent.clone(),
        }
    }
}

fn render(url: &str, timeout: Duration, user_agent: &str) -> Result<String, String> {
    info!(%url, "Browser navigating");
    let user_agent_arg = format!("--user-agent={user_agent}");
    let args: Vec<&OsStr> = vec![
        OsStr::new("--disable-blink-features=AutomationControlled"),
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--no-sandbox"),
        OsStr::new(&user_agent_arg),
    ];

    let options = LaunchOptions::default_builder()
        .headless(true)
        .args(args)
        .build()
        .map_err(|e| format!("launch options: {e}"))?;
    let browser = Browser::new(options).map_err(|e| format!("launch: {e}"))?;
    let tab = browser.new_tab().map_err(|e| format!("new tab: {e}"))?;
    tab.set_default_timeout(timeout);

    tab.navigate_to(url).map_err(|e| format!("navigate: {e}"))?;
    tab.wait_for_element_with_custom_timeout("body", timeout)
        .map_err(|e| format!("dom not parsed: {e}"))?;

    let html = tab.get_content().map_err(|e| format!("snapshot: {e}"))?;
    debug!(%url, bytes = html.len(), "Browser snapshot taken");
    Ok(html)
}

impl FetchStrategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Browser
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, String>> {
        let url = url.to_string();
        let timeout = self.timeout;
        let user_agent = self.user_agent.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || render(&url, timeout, &user_agent))
                .await
                .map_err(|e| format!("browser task: {e}"))?
        })
    }
}
