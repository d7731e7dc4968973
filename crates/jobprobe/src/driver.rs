//! Driver - abstract browser automation trait.
//!
//! Page objects and waits only talk to [`Driver`]. Two implementations ship
//! with the crate:
//!
//! - `ChromiumDriver` (feature `browser`): CDP via chromiumoxide
//! - [`MockDriver`]: scripted elements and call history for unit tests
//!
//! Every primitive is an `async fn` taking `&self`; a scenario awaits them
//! one after the other, so program order is the only ordering there is.

use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque reference to a DOM element.
///
/// A handle is only meaningful until the next navigation or re-render of the
/// node it points at; after that the driver reports it as stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: u64,
    selector: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: u64, selector: impl Into<String>) -> Self {
        Self {
            id,
            selector: selector.into(),
        }
    }

    /// Driver-assigned identifier
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Selector the handle was resolved from
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Resolve the first element matching `selector`, if any
    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Clear an input element
    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Read a property or attribute (`value` reads the live input value)
    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Rendered text of the element
    async fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Checked/selected state of a radio, checkbox or option
    async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element is rendered with a non-empty box
    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the node behind the handle has left the document
    async fn is_stale(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the browser
    async fn close(&self) -> ProbeResult<()>;
}

#[async_trait]
impl<D: Driver + ?Sized> Driver for Arc<D> {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        (**self).navigate(url).await
    }

    async fn current_url(&self) -> ProbeResult<String> {
        (**self).current_url().await
    }

    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        (**self).find_element(selector).await
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        (**self).click(element).await
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        (**self).send_keys(element, text).await
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        (**self).clear(element).await
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        (**self).attribute(element, name).await
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        (**self).text(element).await
    }

    async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        (**self).is_selected(element).await
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        (**self).is_displayed(element).await
    }

    async fn is_stale(&self, element: &ElementHandle) -> ProbeResult<bool> {
        (**self).is_stale(element).await
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        (**self).screenshot().await
    }

    async fn close(&self) -> ProbeResult<()> {
        (**self).close().await
    }
}

/// Scripted element for [`MockDriver`]
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Attributes and properties (`value` included)
    pub attributes: HashMap<String, String>,
    /// Checked state
    pub selected: bool,
    /// Visibility
    pub displayed: bool,
}

impl MockElement {
    /// Visible element with the given text
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            displayed: true,
            ..Self::default()
        }
    }

    /// Visible input with the given value
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        let mut el = Self::with_text("");
        let _ = el.attributes.insert("value".to_string(), value.into());
        el
    }

    /// Set checked state
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    // selector display string -> (handle id, element)
    elements: HashMap<String, (u64, MockElement)>,
    next_id: u64,
    call_history: Vec<String>,
    screenshot: Vec<u8>,
}

impl MockState {
    fn live(&mut self, handle: &ElementHandle, op: &str) -> ProbeResult<&mut MockElement> {
        match self.elements.get_mut(handle.selector()) {
            Some((id, el)) if *id == handle.id() => Ok(el),
            _ => Err(ProbeError::driver(op, "stale element reference")),
        }
    }
}

/// Mock driver for unit testing.
///
/// Elements are keyed by the rendered selector. Replacing an element gives it
/// a new handle id, which makes previously issued handles stale.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add (or re-render) an element for `selector`
    pub fn add_element(&self, selector: &Selector, element: MockElement) {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        let _ = state.elements.insert(selector.to_string(), (id, element));
    }

    /// Remove the element for `selector` from the document
    pub fn remove_element(&self, selector: &Selector) {
        let _ = self.state().elements.remove(&selector.to_string());
    }

    /// Set the current URL without recording a navigation
    pub fn set_url(&self, url: impl Into<String>) {
        self.state().current_url = url.into();
    }

    /// Set mock screenshot bytes
    pub fn set_screenshot(&self, data: Vec<u8>) {
        self.state().screenshot = data;
    }

    /// Snapshot of an element's current scripted state
    #[must_use]
    pub fn element(&self, selector: &Selector) -> Option<MockElement> {
        self.state()
            .elements
            .get(&selector.to_string())
            .map(|(_, el)| el.clone())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    fn record(&self, call: String) {
        self.state().call_history.push(call);
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        let key = selector.to_string();
        Ok(self
            .state()
            .elements
            .get(&key)
            .map(|(id, _)| ElementHandle::new(*id, key.clone())))
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.record(format!("click:{}", element.selector()));
        let mut state = self.state();
        let _ = state.live(element, "click")?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.record(format!("send_keys:{}:{text}", element.selector()));
        let mut state = self.state();
        let el = state.live(element, "send_keys")?;
        el.attributes
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.record(format!("clear:{}", element.selector()));
        let mut state = self.state();
        let el = state.live(element, "clear")?;
        let _ = el.attributes.insert("value".to_string(), String::new());
        Ok(())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        let mut state = self.state();
        Ok(state.live(element, "attribute")?.attributes.get(name).cloned())
    }

    async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        let mut state = self.state();
        Ok(state.live(element, "text")?.text.clone())
    }

    async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let mut state = self.state();
        Ok(state.live(element, "is_selected")?.selected)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let mut state = self.state();
        Ok(state.live(element, "is_displayed")?.displayed)
    }

    async fn is_stale(&self, element: &ElementHandle) -> ProbeResult<bool> {
        let state = self.state();
        Ok(!matches!(
            state.elements.get(element.selector()),
            Some((id, _)) if *id == element.id()
        ))
    }

    async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(self.state().screenshot.clone())
    }

    async fn close(&self) -> ProbeResult<()> {
        self.record("close".to_string());
        Ok(())
    }
}
