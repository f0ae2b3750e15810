//! Chromium-backed browser session
//!
//! Drives a single tab over the DevTools protocol using chromiumoxide. The
//! browser is either launched locally or attached to through a remote
//! debugging URL.

use crate::browser::wait::{bounded, POLL_INTERVAL};
use crate::browser::{BrowserError, BrowserResult, BrowserSession, CheckboxState};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig as LaunchConfig, Page};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Timeout for individual DevTools requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long resource activity must be flat before the page counts as idle
const NETWORK_QUIET_MS: u64 = 1000;

/// A live Chromium tab
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    /// Launches (or connects to) a browser and opens a blank tab
    ///
    /// # Arguments
    ///
    /// * `config` - Browser settings; a remote debugging URL takes precedence
    ///   over launching a local binary
    pub async fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        let (browser, mut handler) = match &config.remote_debugging_url {
            Some(url) => {
                tracing::info!("Connecting to remote Chromium at {}", url);
                Browser::connect(url.as_str())
                    .await
                    .map_err(|e| BrowserError::Launch(e.to_string()))?
            }
            None => {
                let mut builder = LaunchConfig::builder()
                    .no_sandbox()
                    .request_timeout(REQUEST_TIMEOUT)
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage");

                if !config.headless {
                    builder = builder.with_head();
                }
                if let Some(path) = &config.executable {
                    builder = builder.chrome_executable(path);
                }

                let launch = builder.build().map_err(BrowserError::Launch)?;
                tracing::info!("Launching Chromium (headless: {})", config.headless);
                Browser::launch(launch)
                    .await
                    .map_err(|e| BrowserError::Launch(e.to_string()))?
            }
        };

        let handler = tokio::spawn(async move {
            let errors = drive_events(&mut handler).await;
            tracing::debug!("Browser handler finished ({} event error(s))", errors);
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    /// Closes the browser and stops the event handler
    pub async fn close(self) -> BrowserResult<()> {
        let mut browser = self.browser.into_inner();
        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Script(e.to_string()));
        self.handler.abort();
        result
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> BrowserResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn find(&self, selector: &str) -> BrowserResult<chromiumoxide::Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))
    }

    async fn click_element(&self, selector: &str) -> BrowserResult<()> {
        self.find(selector)
            .await?
            .click()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    /// Returns the time origin of the current document, which changes with
    /// every document load
    async fn document_origin(&self) -> BrowserResult<f64> {
        self.eval("performance.timeOrigin".to_string()).await
    }
}

/// Polls the DevTools event stream until it ends, returning how many events
/// failed
///
/// Per-event errors (such as events a newer Chromium emits that cannot be
/// decoded) are logged and skipped; the stream must keep being polled for
/// command responses to arrive.
async fn drive_events<S, E>(events: &mut S) -> usize
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: Display,
{
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            tracing::warn!("Browser handler event error: {}", e);
        }
    }
    errors
}

/// Encodes `value` as a JavaScript string literal
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> BrowserResult<()> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn current_url(&self) -> BrowserResult<Option<String>> {
        self.page
            .url()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn wait_for_network_idle(&self, bound: Duration) -> BrowserResult<()> {
        // Counts resource timing entries until the total stops growing
        let script = format!(
            r#"(async () => {{
                const timeoutMs = {timeout};
                const quietMs = {quiet};
                const interval = 250;
                const start = Date.now();
                let last = performance.getEntriesByType('resource').length;
                let stable = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const now = performance.getEntriesByType('resource').length;
                    if (document.readyState === 'complete' && now === last) {{
                        stable += interval;
                        if (stable >= quietMs) return true;
                    }} else {{
                        stable = 0;
                    }}
                    last = now;
                }}
                return false;
            }})()"#,
            timeout = bound.as_millis(),
            quiet = NETWORK_QUIET_MS,
        );

        let settled: bool = bounded(
            "network idle",
            bound + Duration::from_secs(1),
            self.eval(script),
        )
        .await?;

        if settled {
            Ok(())
        } else {
            Err(BrowserError::TimedOut {
                what: "network idle".to_string(),
                after: bound,
            })
        }
    }

    async fn count(&self, selector: &str) -> BrowserResult<usize> {
        self.eval(format!(
            "document.querySelectorAll({}).length",
            js_str(selector)
        ))
        .await
    }

    async fn content(&self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn checkboxes(&self, selector: &str) -> BrowserResult<Vec<CheckboxState>> {
        let pairs: Vec<(String, bool)> = self
            .eval(format!(
                "Array.from(document.querySelectorAll({})).filter(e => e.id).map(e => [e.id, !!e.checked])",
                js_str(selector)
            ))
            .await?;

        Ok(pairs
            .into_iter()
            .map(|(id, checked)| CheckboxState { id, checked })
            .collect())
    }

    async fn click(&self, selector: &str) -> BrowserResult<bool> {
        if self.count(selector).await? == 0 {
            return Ok(false);
        }
        self.click_element(selector).await?;
        Ok(true)
    }

    async fn click_enclosing(&self, selector: &str, ancestor: &str) -> BrowserResult<bool> {
        self.eval(format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const proxy = el.closest({anc});
                if (!proxy) return false;
                proxy.click();
                return true;
            }})()"#,
            sel = js_str(selector),
            anc = js_str(ancestor),
        ))
        .await
    }

    async fn click_and_wait_for_navigation(
        &self,
        selector: &str,
        bound: Duration,
    ) -> BrowserResult<()> {
        let what = format!("navigation after clicking {}", selector);
        bounded(&what, bound, async {
            let before = self.document_origin().await?;
            self.click_element(selector).await?;

            // The old document may answer (or fail) queries until it unloads
            loop {
                sleep(POLL_INTERVAL).await;
                let state: BrowserResult<(f64, bool)> = self
                    .eval("[performance.timeOrigin, document.readyState === 'complete']".to_string())
                    .await;
                match state {
                    Ok((origin, true)) if origin != before => break,
                    Ok(_) => {}
                    Err(e) => tracing::trace!("Document not ready after submit: {}", e),
                }
            }

            self.page
                .wait_for_navigation()
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::Navigation {
                    url: selector.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }

    async fn clear_input(&self, selector: &str) -> BrowserResult<()> {
        let element = self.find(selector).await?;
        // Focus only if the preceding click did not, so no picker reopens
        let selected: bool = self
            .eval(format!(
                r#"(() => {{
                    const el = document.querySelector({});
                    if (!el) return false;
                    if (document.activeElement !== el) el.focus();
                    el.select();
                    return true;
                }})()"#,
                js_str(selector)
            ))
            .await?;
        if !selected {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }

        element
            .press_key("Backspace")
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        key_delay: Duration,
    ) -> BrowserResult<()> {
        // Keystrokes go to the focused element
        let element = self.find(selector).await?;
        for ch in text.chars() {
            element
                .type_str(ch.to_string())
                .await
                .map_err(|e| BrowserError::Script(e.to_string()))?;
            sleep(key_delay).await;
        }
        Ok(())
    }

    async fn attribute_all(&self, selector: &str, attr: &str) -> BrowserResult<Vec<String>> {
        // Property access resolves href/src against the document base
        self.eval(format!(
            r#"Array.from(document.querySelectorAll({sel}))
                .filter(e => e.hasAttribute({attr}))
                .map(e => ({attr} === 'href' || {attr} === 'src') ? e[{attr}] : e.getAttribute({attr}))"#,
            sel = js_str(selector),
            attr = js_str(attr),
        ))
        .await
    }
}
