//! Locator abstraction for element selection.
//!
//! A [`Locator`] pairs a semantic control name ("thread count field") with a
//! [`Selector`] (strategy kind plus selector string). Locators are plain data:
//! resolving one always goes back to the driver, so a lookup after a DOM
//! mutation yields a fresh handle. Screen catalogs declare their locators as
//! `const` items.

use std::borrow::Cow;
use std::fmt;

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Element id (`id="..."`)
    Id(Cow<'static, str>),
    /// CSS selector (e.g. `"#wfli_0 div.wfitemEditForm"`)
    Css(Cow<'static, str>),
    /// XPath expression
    XPath(Cow<'static, str>),
    /// Anchor whose normalized text equals the given string
    LinkText(Cow<'static, str>),
    /// CSS selector narrowed to elements whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: Cow<'static, str>,
        /// Text content to match
        text: Cow<'static, str>,
    },
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<Cow<'static, str>>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<Cow<'static, str>>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a link-text selector
    #[must_use]
    pub fn link_text(text: impl Into<Cow<'static, str>>) -> Self {
        Self::LinkText(text.into())
    }

    /// Strategy name used in diagnostics
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link",
            Self::CssWithText { .. } => "css+text",
        }
    }

    /// CSS form of the selector, when the strategy has one
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("#{id}")),
            Self::Css(css) | Self::CssWithText { css, .. } => Some(css.to_string()),
            Self::XPath(_) | Self::LinkText(_) => None,
        }
    }

    /// XPath form of the selector, when the strategy has no CSS form
    #[must_use]
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Self::XPath(expr) => Some(expr.to_string()),
            Self::LinkText(text) => Some(format!("//a[normalize-space(.)={}]", xpath_literal(text))),
            Self::Id(_) | Self::Css(_) | Self::CssWithText { .. } => None,
        }
    }

    /// Text filter applied after the CSS lookup, if any
    #[must_use]
    pub fn text_filter(&self) -> Option<&str> {
        match self {
            Self::CssWithText { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(s) | Self::Css(s) | Self::XPath(s) | Self::LinkText(s) => {
                write!(f, "{}={s}", self.strategy())
            }
            Self::CssWithText { css, text } => write!(f, "css={css} text={text:?}"),
        }
    }
}

/// Quote a string for use inside an XPath expression.
///
/// XPath 1.0 has no escape sequences, so a value containing both quote
/// kinds is assembled with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// A named selector for one control on one screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    name: Cow<'static, str>,
    selector: Selector,
}

impl Locator {
    /// Declare a CSS locator in a `const` catalog
    #[must_use]
    pub const fn css(name: &'static str, css: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            selector: Selector::Css(Cow::Borrowed(css)),
        }
    }

    /// Declare an id locator in a `const` catalog
    #[must_use]
    pub const fn id(name: &'static str, id: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            selector: Selector::Id(Cow::Borrowed(id)),
        }
    }

    /// Declare a link-text locator in a `const` catalog
    #[must_use]
    pub const fn link_text(name: &'static str, text: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            selector: Selector::LinkText(Cow::Borrowed(text)),
        }
    }

    /// Create a locator computed at runtime
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }

    /// Semantic control name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}
