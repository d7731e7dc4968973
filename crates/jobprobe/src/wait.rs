//! Wait mechanisms for crossing asynchronous UI transitions.
//!
//! Explicit waits poll a [`Condition`] against the driver until it holds or
//! the bound runs out. A timeout is returned as [`ProbeError::Timeout`] and is
//! never retried here. [`settle`] is the one fixed delay in the crate; it is
//! reserved for transitions the application gives no observable signal for.

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// A named condition an explicit wait can block on
#[derive(Debug, Clone)]
pub enum Condition {
    /// Current URL contains the substring
    UrlContains(String),
    /// Current URL no longer contains the substring
    UrlLacks(String),
    /// The node behind the handle has left the document
    StalenessOf {
        /// Handle captured before the transition
        element: ElementHandle,
        /// Control name for diagnostics
        name: String,
    },
    /// At least one element matches the locator
    PresenceOf(Locator),
    /// An element matching the locator is displayed
    VisibilityOf(Locator),
}

impl Condition {
    /// URL contains `fragment`
    #[must_use]
    pub fn url_contains(fragment: impl Into<String>) -> Self {
        Self::UrlContains(fragment.into())
    }

    /// URL no longer contains `fragment`
    #[must_use]
    pub fn url_lacks(fragment: impl Into<String>) -> Self {
        Self::UrlLacks(fragment.into())
    }

    /// `element` becomes stale
    #[must_use]
    pub fn staleness_of(element: ElementHandle, name: impl Into<String>) -> Self {
        Self::StalenessOf {
            element,
            name: name.into(),
        }
    }

    /// `locator` resolves
    #[must_use]
    pub const fn presence_of(locator: Locator) -> Self {
        Self::PresenceOf(locator)
    }

    /// `locator` resolves to a displayed element
    #[must_use]
    pub const fn visibility_of(locator: Locator) -> Self {
        Self::VisibilityOf(locator)
    }

    /// Evaluate the condition once.
    ///
    /// Element conditions return the matching handle; the others return
    /// `Some` with no handle. A visibility check that fails because the node
    /// was replaced after lookup counts as "not yet". Any other driver error
    /// is returned.
    async fn check(&self, driver: &dyn Driver) -> ProbeResult<Option<Option<ElementHandle>>> {
        match self {
            Self::UrlContains(fragment) => {
                let url = driver.current_url().await?;
                Ok(url.contains(fragment.as_str()).then_some(None))
            }
            Self::UrlLacks(fragment) => {
                let url = driver.current_url().await?;
                Ok((!url.contains(fragment.as_str())).then_some(None))
            }
            Self::StalenessOf { element, .. } => {
                Ok(driver.is_stale(element).await?.then_some(None))
            }
            Self::PresenceOf(locator) => Ok(driver
                .find_element(locator.selector())
                .await?
                .map(Some)),
            Self::VisibilityOf(locator) => {
                let Some(handle) = driver.find_element(locator.selector()).await? else {
                    return Ok(None);
                };
                match driver.is_displayed(&handle).await {
                    Ok(true) => Ok(Some(Some(handle))),
                    Ok(false) => Ok(None),
                    Err(err) => {
                        if driver.is_stale(&handle).await? {
                            debug!(locator = %locator, "re-rendered during visibility check");
                            Ok(None)
                        } else {
                            Err(err)
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlContains(fragment) => write!(f, "url contains {fragment:?}"),
            Self::UrlLacks(fragment) => write!(f, "url leaves {fragment:?}"),
            Self::StalenessOf { name, .. } => write!(f, "staleness of {name}"),
            Self::PresenceOf(locator) => write!(f, "presence of {locator}"),
            Self::VisibilityOf(locator) => write!(f, "visibility of {locator}"),
        }
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Element resolved by presence/visibility conditions
    pub element: Option<ElementHandle>,
}

/// Block until `condition` holds or `options.timeout_ms` elapses.
///
/// The condition is checked at least once, even with a zero bound.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] naming the condition and the bound, or
/// any non-transient driver error raised while checking.
pub async fn wait_until(
    driver: &dyn Driver,
    condition: &Condition,
    options: &WaitOptions,
) -> ProbeResult<WaitResult> {
    let start = Instant::now();
    let timeout = options.timeout();

    loop {
        if let Some(element) = condition.check(driver).await? {
            let elapsed = start.elapsed();
            debug!(condition = %condition, elapsed_ms = elapsed.as_millis() as u64, "wait satisfied");
            return Ok(WaitResult {
                elapsed,
                waited_for: condition.to_string(),
                element,
            });
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!(condition = %condition, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(ProbeError::Timeout {
                condition: condition.to_string(),
                ms: options.timeout_ms,
            });
        }

        tokio::time::sleep(options.poll_interval().min(timeout - elapsed)).await;
    }
}

/// Wait for `locator` to resolve (and be displayed when `visible`), returning
/// the fresh handle.
///
/// # Errors
///
/// Returns [`ProbeError::Timeout`] if the element does not show up in time.
pub async fn wait_for_element(
    driver: &dyn Driver,
    locator: &Locator,
    visible: bool,
    options: &WaitOptions,
) -> ProbeResult<ElementHandle> {
    let condition = if visible {
        Condition::visibility_of(locator.clone())
    } else {
        Condition::presence_of(locator.clone())
    };
    let result = wait_until(driver, &condition, options).await?;
    result.element.ok_or_else(|| ProbeError::ElementNotFound {
        name: locator.name().to_string(),
        selector: locator.selector().to_string(),
    })
}

/// Fixed-duration suspension.
///
/// Only for transitions with no observable readiness marker; every call is
/// logged so the remaining uses stay visible.
pub async fn settle(duration_ms: u64, reason: &str) {
    warn!(duration_ms, reason, "fixed settle delay");
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::Arc;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(300).with_poll_interval(10)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_chained() {
            let opts = WaitOptions::new().with_timeout(95_000).with_poll_interval(250);
            assert_eq!(opts.timeout(), Duration::from_secs(95));
            assert_eq!(opts.poll_interval(), Duration::from_millis(250));
        }
    }

    mod condition_display_tests {
        use super::*;

        #[test]
        fn test_url_contains() {
            assert_eq!(
                Condition::url_contains("/job/show").to_string(),
                "url contains \"/job/show\""
            );
        }

        #[test]
        fn test_staleness() {
            let cond = Condition::staleness_of(ElementHandle::new(1, "css=x"), "step edit form");
            assert_eq!(cond.to_string(), "staleness of step edit form");
        }

        #[test]
        fn test_visibility() {
            let cond = Condition::visibility_of(Locator::css("step 0 view", "#wfivis_0"));
            assert_eq!(
                cond.to_string(),
                "visibility of step 0 view (css=#wfivis_0)"
            );
        }
    }

    mod wait_until_tests {
        use super::*;

        #[tokio::test]
        async fn test_url_already_matches() {
            let driver = MockDriver::new();
            driver.set_url("http://app/project/P/job/create");
            let result = wait_until(&driver, &Condition::url_contains("/job/create"), &fast())
                .await
                .unwrap();
            assert!(result.element.is_none());
            assert!(result.waited_for.contains("/job/create"));
        }

        #[tokio::test]
        async fn test_url_timeout_names_condition() {
            let driver = MockDriver::new();
            driver.set_url("http://app/project/P/job/edit/1");
            let err = wait_until(&driver, &Condition::url_contains("/job/show"), &fast())
                .await
                .unwrap_err();
            match err {
                ProbeError::Timeout { condition, ms } => {
                    assert_eq!(ms, 300);
                    assert!(condition.contains("/job/show"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_url_lacks_after_redirect() {
            let driver = MockDriver::new();
            driver.set_url("http://app/menu/home");
            assert!(wait_until(&driver, &Condition::url_lacks("/user/login"), &fast())
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_zero_timeout_still_checks_once() {
            let driver = MockDriver::new();
            driver.set_url("http://app/x");
            let opts = WaitOptions::new().with_timeout(0);
            assert!(wait_until(&driver, &Condition::url_contains("/x"), &opts)
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_staleness_after_concurrent_rerender() {
            let driver = Arc::new(MockDriver::new());
            let locator = Locator::css("step edit form", "#wfli_0 div.wfitemEditForm");
            driver.add_element(locator.selector(), MockElement::with_text(""));
            let handle = driver
                .find_element(locator.selector())
                .await
                .unwrap()
                .unwrap();

            let remover = Arc::clone(&driver);
            let selector = locator.selector().clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                remover.remove_element(&selector);
            });

            let cond = Condition::staleness_of(handle, locator.name());
            let result = wait_until(driver.as_ref(), &cond, &fast()).await.unwrap();
            assert!(result.elapsed >= Duration::from_millis(20));
            task.await.unwrap();
        }

        #[tokio::test]
        async fn test_staleness_times_out_when_node_survives() {
            let driver = MockDriver::new();
            let locator = Locator::css("step edit form", "#wfli_0 div.wfitemEditForm");
            driver.add_element(locator.selector(), MockElement::with_text(""));
            let handle = driver
                .find_element(locator.selector())
                .await
                .unwrap()
                .unwrap();
            let cond = Condition::staleness_of(handle, locator.name());
            assert!(wait_until(&driver, &cond, &fast())
                .await
                .unwrap_err()
                .is_timeout());
        }
    }

    mod wait_for_element_tests {
        use super::*;

        #[tokio::test]
        async fn test_hidden_element_is_present_but_not_visible() {
            let driver = MockDriver::new();
            let locator = Locator::id("step 0 view", "wfivis_0");
            driver.add_element(
                locator.selector(),
                MockElement::with_text("echo selenium test").displayed(false),
            );

            assert!(wait_for_element(&driver, &locator, false, &fast())
                .await
                .is_ok());
            assert!(wait_for_element(&driver, &locator, true, &fast())
                .await
                .unwrap_err()
                .is_timeout());
        }

        #[tokio::test]
        async fn test_element_appears_later() {
            let driver = Arc::new(MockDriver::new());
            let locator = Locator::id("remote command", "adhocRemoteStringField");

            let writer = Arc::clone(&driver);
            let selector = locator.selector().clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                writer.add_element(&selector, MockElement::with_value(""));
            });

            let handle = wait_for_element(driver.as_ref(), &locator, true, &fast())
                .await
                .unwrap();
            assert_eq!(handle.selector(), "id=adhocRemoteStringField");
            task.await.unwrap();
        }
    }

    mod visibility_error_tests {
        use super::*;
        use crate::locator::Selector;
        use std::sync::atomic::{AtomicBool, Ordering};

        /// Mock that either re-renders the element on the first visibility
        /// check or fails every visibility check outright.
        struct Flaky {
            inner: MockDriver,
            selector: Selector,
            rerender_once: AtomicBool,
            dead: bool,
        }

        impl Flaky {
            fn new(locator: &Locator, dead: bool) -> Self {
                let inner = MockDriver::new();
                inner.add_element(locator.selector(), MockElement::with_text("ready"));
                Self {
                    inner,
                    selector: locator.selector().clone(),
                    rerender_once: AtomicBool::new(!dead),
                    dead,
                }
            }
        }

        #[async_trait::async_trait]
        impl Driver for Flaky {
            async fn navigate(&self, url: &str) -> ProbeResult<()> {
                self.inner.navigate(url).await
            }
            async fn current_url(&self) -> ProbeResult<String> {
                self.inner.current_url().await
            }
            async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
                self.inner.find_element(selector).await
            }
            async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
                self.inner.click(element).await
            }
            async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
                self.inner.send_keys(element, text).await
            }
            async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
                self.inner.clear(element).await
            }
            async fn attribute(
                &self,
                element: &ElementHandle,
                name: &str,
            ) -> ProbeResult<Option<String>> {
                self.inner.attribute(element, name).await
            }
            async fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
                self.inner.text(element).await
            }
            async fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
                self.inner.is_selected(element).await
            }
            async fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
                if self.dead {
                    return Err(ProbeError::driver("is_displayed", "browser connection lost"));
                }
                if self.rerender_once.swap(false, Ordering::SeqCst) {
                    self.inner
                        .add_element(&self.selector, MockElement::with_text("ready"));
                }
                self.inner.is_displayed(element).await
            }
            async fn is_stale(&self, element: &ElementHandle) -> ProbeResult<bool> {
                self.inner.is_stale(element).await
            }
            async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
                self.inner.screenshot().await
            }
            async fn close(&self) -> ProbeResult<()> {
                self.inner.close().await
            }
        }

        #[tokio::test]
        async fn test_rerender_between_lookup_and_check_keeps_waiting() {
            let locator = Locator::css("step 0 view", "#wfivis_0");
            let driver = Flaky::new(&locator, false);
            let first = driver
                .inner
                .find_element(locator.selector())
                .await
                .unwrap()
                .unwrap();

            let handle = wait_for_element(&driver, &locator, true, &fast())
                .await
                .unwrap();
            assert_ne!(handle, first);
            assert!(driver.is_stale(&first).await.unwrap());
        }

        #[tokio::test]
        async fn test_driver_failure_is_not_a_timeout() {
            let locator = Locator::css("step 0 view", "#wfivis_0");
            let driver = Flaky::new(&locator, true);
            match wait_for_element(&driver, &locator, true, &fast())
                .await
                .unwrap_err()
            {
                ProbeError::Driver { operation, message } => {
                    assert_eq!(operation, "is_displayed");
                    assert_eq!(message, "browser connection lost");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_settle_sleeps_at_least_duration() {
        let start = Instant::now();
        settle(20, "test").await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
