//! URL contract of the job screens.
//!
//! The application exposes `/project/<p>/job/create`, `/job/show/<id>` and
//! `/job/edit/<id>`. The only way the harness reaches the edit screen of a
//! job it just saved is [`edit_url_from_show`], a literal `show` -> `edit`
//! substitution on the current URL.

use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;

const SHOW_SEGMENT: &str = "/job/show";
const EDIT_SEGMENT: &str = "/job/edit";

/// Screens addressed by the harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Login form
    Login,
    /// New job form
    JobCreate {
        /// Project name
        project: String,
    },
    /// Job detail page
    JobShow {
        /// Project name
        project: String,
        /// Job id
        id: String,
    },
    /// Job edit form
    JobEdit {
        /// Project name
        project: String,
        /// Job id
        id: String,
    },
    /// Job list of a project
    JobsList {
        /// Project name
        project: String,
    },
}

impl Route {
    /// Path component of the route
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/user/login".to_string(),
            Self::JobCreate { project } => format!("/project/{project}/job/create"),
            Self::JobShow { project, id } => format!("/project/{project}/job/show/{id}"),
            Self::JobEdit { project, id } => format!("/project/{project}/job/edit/{id}"),
            Self::JobsList { project } => format!("/project/{project}/jobs"),
        }
    }

    /// Absolute URL under `base_url`
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Fragment the current URL contains once the screen is reached
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Login => "/user/login",
            Self::JobCreate { .. } => "/job/create",
            Self::JobShow { .. } => SHOW_SEGMENT,
            Self::JobEdit { .. } => EDIT_SEGMENT,
            Self::JobsList { .. } => "/jobs",
        }
    }
}

/// Derive the edit URL of a job from its show URL.
///
/// # Errors
///
/// Returns a navigation error if `show_url` is not a job show URL.
pub fn edit_url_from_show(show_url: &str) -> ProbeResult<String> {
    if !show_url.contains(SHOW_SEGMENT) {
        return Err(ProbeError::Navigation {
            url: show_url.to_string(),
            message: format!("expected a URL containing {SHOW_SEGMENT}"),
        });
    }
    Ok(show_url.replacen(SHOW_SEGMENT, EDIT_SEGMENT, 1))
}

/// Job id from a show or edit URL
#[must_use]
pub fn job_id_from_url(url: &str) -> Option<String> {
    ["/project/:project/job/show/:id", "/project/:project/job/edit/:id"]
        .iter()
        .map(|pattern| UrlMatcher::new(pattern))
        .find(|m| m.matches(url))
        .and_then(|m| m.extract_params(url).remove("id"))
}

/// URL pattern matcher
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/jobs`
    /// - Wildcards: `/project/*/jobs`
    /// - Named parameters: `/job/show/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL (absolute or path-only) matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments = path_segments(url);

        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract parameters from a URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let url_segments = path_segments(url);

        self.segments
            .iter()
            .zip(url_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

// Path segments with scheme, host, query and fragment removed
fn path_segments(url: &str) -> Vec<&str> {
    let path = match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => url,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}
