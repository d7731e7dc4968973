//! Browser control over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumDriver`] implements [`Driver`] on top
//! of chromiumoxide. CDP element objects are kept in a registry and handed
//! out as opaque [`ElementHandle`]s; the registry is dropped on navigation so
//! handles from a previous page always read as stale.
//!
//! [`Driver`]: crate::driver::Driver
//! [`ElementHandle`]: crate::driver::ElementHandle

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{Driver, ElementHandle};
    use crate::locator::Selector;
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;

    const IS_DETACHED_JS: &str = "function() { return !this.isConnected; }";

    const IS_DISPLAYED_JS: &str = "function() { \
        if (!this.isConnected) { return false; } \
        const style = window.getComputedStyle(this); \
        if (style.display === 'none' || style.visibility === 'hidden') { return false; } \
        const rect = this.getBoundingClientRect(); \
        return rect.width > 0 && rect.height > 0; }";

    const IS_SELECTED_JS: &str = "function() { return !!(this.checked || this.selected); }";

    const CLEAR_JS: &str = "function() { \
        this.value = ''; \
        this.dispatchEvent(new Event('input', { bubbles: true })); \
        this.dispatchEvent(new Event('change', { bubbles: true })); }";

    /// Driver backed by a real Chromium over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Mutex<Option<CdpBrowser>>,
        page: CdpPage,
        elements: Mutex<HashMap<u64, Element>>,
        next_id: AtomicU64,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Launch a new browser instance and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: &BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            tracing::debug!(headless = config.headless, "chromium launched");

            Ok(Self {
                browser: Mutex::new(Some(browser)),
                page,
                elements: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                handle,
            })
        }

        async fn register(&self, element: Element, selector: &Selector) -> ElementHandle {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let _ = self.elements.lock().await.insert(id, element);
            ElementHandle::new(id, selector.to_string())
        }

        async fn call_bool(&self, handle: &ElementHandle, op: &str, js: &str) -> ProbeResult<bool> {
            let elements = self.elements.lock().await;
            let element = live(&elements, handle, op)?;
            let ret = element
                .call_js_fn(js, false)
                .await
                .map_err(|e| ProbeError::driver(op, e))?;
            Ok(ret
                .result
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false))
        }

        async fn candidates(&self, selector: &Selector) -> ProbeResult<Vec<Element>> {
            let found = if let Some(css) = selector.to_css() {
                self.page.find_elements(css).await
            } else if let Some(xpath) = selector.to_xpath() {
                self.page.find_xpaths(xpath).await
            } else {
                Ok(Vec::new())
            };
            // CDP reports an empty match set as an error on some versions
            Ok(found.unwrap_or_default())
        }
    }

    fn live<'a>(
        elements: &'a HashMap<u64, Element>,
        handle: &ElementHandle,
        op: &str,
    ) -> ProbeResult<&'a Element> {
        elements
            .get(&handle.id())
            .ok_or_else(|| ProbeError::driver(op, "stale element reference"))
    }

    #[async_trait]
    impl Driver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> ProbeResult<()> {
            self.elements.lock().await.clear();
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            self.page
                .url()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| ProbeError::driver("current_url", e))
        }

        async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
            let candidates = self.candidates(selector).await?;
            for element in candidates {
                let matches = match selector.text_filter() {
                    None => true,
                    Some(text) => element
                        .inner_text()
                        .await
                        .map_err(|e| ProbeError::driver("find_element", e))?
                        .is_some_and(|t| t.contains(text)),
                };
                if matches {
                    return Ok(Some(self.register(element, selector).await));
                }
            }
            Ok(None)
        }

        async fn click(&self, handle: &ElementHandle) -> ProbeResult<()> {
            let elements = self.elements.lock().await;
            let _ = live(&elements, handle, "click")?
                .click()
                .await
                .map_err(|e| ProbeError::driver("click", e))?;
            Ok(())
        }

        async fn send_keys(&self, handle: &ElementHandle, text: &str) -> ProbeResult<()> {
            let elements = self.elements.lock().await;
            let element = live(&elements, handle, "send_keys")?;
            let _ = element
                .focus()
                .await
                .map_err(|e| ProbeError::driver("send_keys", e))?;
            let _ = element
                .type_str(text)
                .await
                .map_err(|e| ProbeError::driver("send_keys", e))?;
            Ok(())
        }

        async fn clear(&self, handle: &ElementHandle) -> ProbeResult<()> {
            let elements = self.elements.lock().await;
            let _ = live(&elements, handle, "clear")?
                .call_js_fn(CLEAR_JS, false)
                .await
                .map_err(|e| ProbeError::driver("clear", e))?;
            Ok(())
        }

        async fn attribute(&self, handle: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
            let key = serde_json::to_string(name)?;
            let js = format!(
                "function() {{ const v = this[{key}]; \
                 if (v !== undefined && v !== null && typeof v !== 'object' && typeof v !== 'function') \
                 {{ return String(v); }} return this.getAttribute({key}); }}"
            );
            let elements = self.elements.lock().await;
            let ret = live(&elements, handle, "attribute")?
                .call_js_fn(js, false)
                .await
                .map_err(|e| ProbeError::driver("attribute", e))?;
            Ok(ret
                .result
                .value
                .and_then(|v| v.as_str().map(str::to_string)))
        }

        async fn text(&self, handle: &ElementHandle) -> ProbeResult<String> {
            let elements = self.elements.lock().await;
            live(&elements, handle, "text")?
                .inner_text()
                .await
                .map(Option::unwrap_or_default)
                .map_err(|e| ProbeError::driver("text", e))
        }

        async fn is_selected(&self, handle: &ElementHandle) -> ProbeResult<bool> {
            self.call_bool(handle, "is_selected", IS_SELECTED_JS).await
        }

        async fn is_displayed(&self, handle: &ElementHandle) -> ProbeResult<bool> {
            self.call_bool(handle, "is_displayed", IS_DISPLAYED_JS).await
        }

        async fn is_stale(&self, handle: &ElementHandle) -> ProbeResult<bool> {
            let elements = self.elements.lock().await;
            let Some(element) = elements.get(&handle.id()) else {
                return Ok(true);
            };
            // A released remote object fails the call outright
            match element.call_js_fn(IS_DETACHED_JS, false).await {
                Ok(ret) => Ok(ret.result.value.and_then(|v| v.as_bool()).unwrap_or(true)),
                Err(_) => Ok(true),
            }
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot = self
                .page
                .execute(params)
                .await
                .map_err(|e| ProbeError::driver("screenshot", e))?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::driver("screenshot", e))
        }

        async fn close(&self) -> ProbeResult<()> {
            self.elements.lock().await.clear();
            if let Some(mut browser) = self.browser.lock().await.take() {
                let _ = browser
                    .close()
                    .await
                    .map_err(|e| ProbeError::driver("close", e))?;
            }
            self.handle.abort();
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
