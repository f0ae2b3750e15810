//! In-memory browser session over static HTML pages
//!
//! `FixtureSession` serves pages registered by URL and follows scripted click
//! transitions, so the crawl handlers can be exercised without a browser.
//! Checkbox states and input values are tracked beside the static markup,
//! keyed by element id. Like a real tab, `clear_input` and `type_text` only
//! act on the input the last `click` focused.
//!
//! Available to unit tests and, through the `fixture` feature, to the
//! integration tests.

use crate::browser::{BrowserError, BrowserResult, BrowserSession, CheckboxState};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

/// Something the session was asked to do, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureEvent {
    Goto(String),
    Click(String),
    ClickEnclosing { selector: String, ancestor: String },
    Clear(String),
    Type { selector: String, text: String },
}

#[derive(Debug, Default)]
struct Inner {
    pages: HashMap<String, String>,
    transitions: HashMap<(String, String), String>,
    current: Option<String>,
    checked: HashMap<String, bool>,
    values: HashMap<String, String>,
    focused: Option<String>,
    failing_queries: usize,
    events: Vec<FixtureEvent>,
}

/// A scripted, in-memory [`BrowserSession`]
#[derive(Debug, Default)]
pub struct FixtureSession {
    inner: Mutex<Inner>,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the markup served for `url`
    pub fn add_page(&self, url: &str, html: &str) {
        self.lock().pages.insert(url.to_string(), html.to_string());
    }

    /// Makes a click on `selector` while on `from` navigate to `to`
    pub fn on_click(&self, from: &str, selector: &str, to: &str) {
        self.lock()
            .transitions
            .insert((from.to_string(), selector.to_string()), to.to_string());
    }

    /// Makes the next `n` element counts fail as if the document were being
    /// replaced
    pub fn fail_next_queries(&self, n: usize) {
        self.lock().failing_queries = n;
    }

    /// Every action performed so far
    pub fn events(&self) -> Vec<FixtureEvent> {
        self.lock().events.clone()
    }

    /// URLs loaded so far, through `goto` or a navigating click
    pub fn visits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FixtureEvent::Goto(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Live checked state of a checkbox on the current page
    pub fn is_checked(&self, id: &str) -> Option<bool> {
        self.lock().checked.get(id).copied()
    }

    /// Current value of an input, as typed through this session
    pub fn input_value(&self, selector: &str) -> Option<String> {
        self.lock().values.get(selector).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test thread panicked mid-call
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Loads `url` as the current page
    ///
    /// Controls on the new page start from their markup state; state of
    /// controls seen on earlier pages is kept for inspection.
    fn load(inner: &mut Inner, url: &str) -> BrowserResult<()> {
        let html = inner
            .pages
            .get(url)
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "no such page".to_string(),
            })?
            .clone();

        let document = Html::parse_document(&html);
        let checkbox = parse_selector("input[type='checkbox'][id]")?;
        let input = parse_selector("input[id][value]")?;

        let checked: Vec<(String, bool)> = document
            .select(&checkbox)
            .filter_map(|el| {
                let id = el.value().attr("id")?;
                Some((id.to_string(), el.value().attr("checked").is_some()))
            })
            .collect();
        inner.checked.extend(checked);

        let values: Vec<(String, String)> = document
            .select(&input)
            .filter_map(|el| {
                let id = el.value().attr("id")?;
                let value = el.value().attr("value")?;
                Some((format!("#{}", id), value.to_string()))
            })
            .collect();
        inner.values.extend(values);

        inner.current = Some(url.to_string());
        inner.focused = None;
        inner.events.push(FixtureEvent::Goto(url.to_string()));
        Ok(())
    }

    /// Runs `f` against the parsed current document
    ///
    /// The document never outlives this call, so no parsed tree is held
    /// across an await point.
    fn with_document<R>(&self, f: impl FnOnce(&Html, &mut Inner) -> BrowserResult<R>) -> BrowserResult<R> {
        let mut inner = self.lock();
        let url = inner.current.clone().ok_or(BrowserError::Closed)?;
        let html = inner.pages.get(&url).cloned().unwrap_or_default();
        let document = Html::parse_document(&html);
        f(&document, &mut inner)
    }

    async fn require_focus(&self, selector: &str) -> BrowserResult<()> {
        if self.count(selector).await? == 0 {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }
        if self.lock().focused.as_deref() != Some(selector) {
            return Err(BrowserError::Script(format!("{} does not have focus", selector)));
        }
        Ok(())
    }

    /// Follows a scripted transition for `selector` on the current page
    fn follow(inner: &mut Inner, selector: &str) -> BrowserResult<bool> {
        let Some(current) = inner.current.clone() else {
            return Ok(false);
        };

        match inner.transitions.get(&(current, selector.to_string())).cloned() {
            Some(target) => {
                Self::load(inner, &target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn parse_selector(selector: &str) -> BrowserResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::Script(format!("invalid selector '{}': {:?}", selector, e)))
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn goto(&self, url: &str) -> BrowserResult<()> {
        let mut inner = self.lock();
        Self::load(&mut inner, url)
    }

    async fn current_url(&self) -> BrowserResult<Option<String>> {
        Ok(self.lock().current.clone())
    }

    async fn wait_for_network_idle(&self, _bound: Duration) -> BrowserResult<()> {
        Ok(())
    }

    async fn count(&self, selector: &str) -> BrowserResult<usize> {
        let sel = parse_selector(selector)?;
        {
            let mut inner = self.lock();
            if inner.failing_queries > 0 {
                inner.failing_queries -= 1;
                return Err(BrowserError::Script(
                    "Execution context was destroyed".to_string(),
                ));
            }
        }
        self.with_document(|document, _| Ok(document.select(&sel).count()))
    }

    async fn content(&self) -> BrowserResult<String> {
        let inner = self.lock();
        let url = inner.current.as_ref().ok_or(BrowserError::Closed)?;
        Ok(inner.pages.get(url).cloned().unwrap_or_default())
    }

    async fn checkboxes(&self, selector: &str) -> BrowserResult<Vec<CheckboxState>> {
        let sel = parse_selector(selector)?;
        self.with_document(|document, inner| {
            Ok(document
                .select(&sel)
                .filter_map(|el| el.value().attr("id"))
                .map(|id| CheckboxState {
                    id: id.to_string(),
                    checked: inner.checked.get(id).copied().unwrap_or(false),
                })
                .collect())
        })
    }

    async fn click(&self, selector: &str) -> BrowserResult<bool> {
        let sel = parse_selector(selector)?;
        let found = self.with_document(|document, _| Ok(document.select(&sel).next().is_some()))?;
        if !found {
            return Ok(false);
        }

        let mut inner = self.lock();
        inner.events.push(FixtureEvent::Click(selector.to_string()));
        inner.focused = Some(selector.to_string());
        Self::follow(&mut inner, selector)?;
        Ok(true)
    }

    async fn click_enclosing(&self, selector: &str, ancestor: &str) -> BrowserResult<bool> {
        let target = parse_selector(selector)?;
        let enclosing = parse_selector(ancestor)?;
        let checkbox = parse_selector("input[type='checkbox'][id]")?;

        self.with_document(|document, inner| {
            let Some(element) = document.select(&target).next() else {
                return Ok(false);
            };

            let Some(proxy) = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|candidate| enclosing.matches(candidate))
            else {
                return Ok(false);
            };

            for id in proxy.select(&checkbox).filter_map(|el| el.value().attr("id")) {
                let state = inner.checked.entry(id.to_string()).or_insert(false);
                *state = !*state;
            }

            inner.events.push(FixtureEvent::ClickEnclosing {
                selector: selector.to_string(),
                ancestor: ancestor.to_string(),
            });
            Ok(true)
        })
    }

    async fn click_and_wait_for_navigation(
        &self,
        selector: &str,
        bound: Duration,
    ) -> BrowserResult<()> {
        let navigated = {
            let mut inner = self.lock();
            inner.events.push(FixtureEvent::Click(selector.to_string()));
            Self::follow(&mut inner, selector)?
        };

        if navigated {
            Ok(())
        } else {
            tokio::time::sleep(bound).await;
            Err(BrowserError::TimedOut {
                what: format!("navigation after clicking {}", selector),
                after: bound,
            })
        }
    }

    async fn clear_input(&self, selector: &str) -> BrowserResult<()> {
        self.require_focus(selector).await?;

        let mut inner = self.lock();
        inner.values.insert(selector.to_string(), String::new());
        inner.events.push(FixtureEvent::Clear(selector.to_string()));
        Ok(())
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        key_delay: Duration,
    ) -> BrowserResult<()> {
        self.require_focus(selector).await?;

        for ch in text.chars() {
            self.lock()
                .values
                .entry(selector.to_string())
                .or_default()
                .push(ch);
            tokio::time::sleep(key_delay).await;
        }

        self.lock().events.push(FixtureEvent::Type {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn attribute_all(&self, selector: &str, attr: &str) -> BrowserResult<Vec<String>> {
        let sel = parse_selector(selector)?;
        self.with_document(|document, inner| {
            let base = inner.current.as_deref().and_then(|url| Url::parse(url).ok());
            Ok(document
                .select(&sel)
                .filter_map(|el| el.value().attr(attr))
                .map(|value| match (&base, attr) {
                    (Some(base), "href" | "src") => base
                        .join(value)
                        .map(|url| url.to_string())
                        .unwrap_or_else(|_| value.to_string()),
                    _ => value.to_string(),
                })
                .collect())
        })
    }
}
