//! Node-dispatch configuration and its rendered definition text.
//!
//! The job under test never exists as an object inside the harness; it exists
//! as form input on the create screen and as rendered text / form values on
//! the show and edit screens. [`DispatchConfig`] is the scenario's plan for
//! the write side, [`DefinitionText`] is the exact rendering the show screen
//! must produce for it, and [`DispatchReadback`] is what the edit screen
//! re-populates.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter value set by the "All nodes" menu entry
pub const ALL_NODES_FILTER: &str = ".*";

/// Node-dispatch settings entered on the Nodes tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Dispatch to nodes enabled
    pub enabled: bool,
    /// Node filter string
    pub node_filter: String,
    /// Show excluded nodes
    pub show_excluded: bool,
    /// Filter editable at run time
    pub editable_filter: bool,
    /// Nodes run in parallel (at least 1)
    pub thread_count: u32,
    /// Rank attribute
    pub rank_attribute: String,
    /// Rank order descending
    pub rank_order_descending: bool,
    /// Keep going when a node fails
    pub keep_going: bool,
    /// Succeed when the filter matches no nodes
    pub success_on_empty_node_filter: bool,
    /// Matched nodes pre-selected at run time
    pub selected_by_default: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            node_filter: ALL_NODES_FILTER.to_string(),
            show_excluded: false,
            editable_filter: false,
            thread_count: 1,
            rank_attribute: String::new(),
            rank_order_descending: false,
            keep_going: false,
            success_on_empty_node_filter: false,
            selected_by_default: true,
        }
    }
}

impl DispatchConfig {
    /// Check the plan can be entered through the form
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a disabled dispatch, a zero thread
    /// count or an empty filter. The Nodes tab only offers the dispatch
    /// fields while dispatch is on.
    pub fn validate(&self) -> ProbeResult<()> {
        if !self.enabled {
            return Err(ProbeError::config(
                "enabled must be true: the dispatch fields are hidden when executing locally",
            ));
        }
        if self.thread_count == 0 {
            return Err(ProbeError::config("thread_count must be at least 1"));
        }
        if self.node_filter.trim().is_empty() {
            return Err(ProbeError::config("node_filter must not be empty"));
        }
        Ok(())
    }

    /// Whether the filter must be typed rather than picked from the menu
    #[must_use]
    pub fn uses_custom_filter(&self) -> bool {
        self.node_filter != ALL_NODES_FILTER
    }

    /// Read-back the edit screen must show for this plan
    #[must_use]
    pub fn expected_readback(&self) -> DispatchReadback {
        DispatchReadback {
            enabled: self.enabled,
            node_filter: self.node_filter.clone(),
            show_excluded: self.show_excluded,
            editable_filter: self.editable_filter,
            thread_count: self.thread_count.to_string(),
            rank_attribute: self.rank_attribute.clone(),
            rank_order_descending: self.rank_order_descending,
            keep_going: self.keep_going,
            success_on_empty_node_filter: self.success_on_empty_node_filter,
            selected_by_default: self.selected_by_default,
        }
    }
}

/// Node execution strategy offered by the orchestrator dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrchestratorKind {
    /// Run nodes tier by tier of rank
    RankTiered,
    /// Cap the share of nodes run at once
    MaxPercentage,
    /// Run on a random subset
    RandomSubset,
}

impl OrchestratorKind {
    /// All known kinds
    pub const ALL: [Self; 3] = [Self::RankTiered, Self::MaxPercentage, Self::RandomSubset];

    /// Value carried by the dropdown option (`data-value`)
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::RankTiered => "rankTiered",
            Self::MaxPercentage => "maxPercentage",
            Self::RandomSubset => "subset",
        }
    }

    /// Label rendered in the job definition
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RankTiered => "Rank Tiered",
            Self::MaxPercentage => "Max Percentage",
            Self::RandomSubset => "Random Subset",
        }
    }

    /// Look up a kind by its option value
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.value() == value)
    }
}

impl fmt::Display for OrchestratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Sentences the job definition modal renders for a dispatch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionText {
    /// Node filter sentence
    pub node_filter: String,
    /// Thread count sentence
    pub thread_count: String,
    /// Keep-going sentence
    pub keep_going: String,
    /// Rank ordering sentence
    pub rank_order: String,
    /// Default selection sentence
    pub selected_by_default: String,
}

impl DefinitionText {
    /// Render the definition sentences for `config`.
    ///
    /// A filter without an explicit `key:` is shown against the default
    /// `name` attribute. An empty rank attribute sorts by `nodename`.
    #[must_use]
    pub fn render(config: &DispatchConfig) -> Self {
        let filter = if config.node_filter.contains(':') {
            config.node_filter.clone()
        } else {
            format!("name: {}", config.node_filter)
        };
        let thread_count = if config.thread_count > 1 {
            format!("Execute on up to {} Nodes at a time.", config.thread_count)
        } else {
            "Execute on one Node at a time.".to_string()
        };
        let keep_going = if config.keep_going {
            "If a node fails: Continue running on any remaining nodes before failing the step."
        } else {
            "If a node fails: Stop at the failed node and fail the step."
        };
        let rank_attribute = if config.rank_attribute.is_empty() {
            "nodename"
        } else {
            config.rank_attribute.as_str()
        };
        let order = if config.rank_order_descending {
            "descending"
        } else {
            "ascending"
        };
        let selected_by_default = if config.selected_by_default {
            "Node selection: Target nodes are selected by default"
        } else {
            "Node selection: The user has to explicitly select target nodes"
        };

        Self {
            node_filter: format!("Include nodes matching: {filter}"),
            thread_count,
            keep_going: keep_going.to_string(),
            rank_order: format!("Sort nodes by {rank_attribute} in {order} order."),
            selected_by_default: selected_by_default.to_string(),
        }
    }

    /// Sentences labelled by field, in modal order
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("node filter", self.node_filter.clone()),
            ("thread count", self.thread_count.clone()),
            ("keep going", self.keep_going.clone()),
            ("rank order", self.rank_order.clone()),
            ("selected by default", self.selected_by_default.clone()),
        ]
    }
}

/// Values the edit screen re-populates, read through its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReadback {
    /// Dispatch radio selected
    pub enabled: bool,
    /// Filter input value
    pub node_filter: String,
    /// Show-excluded "yes" radio selected
    pub show_excluded: bool,
    /// Editable-filter "yes" radio selected
    pub editable_filter: bool,
    /// Thread count input value, as typed
    pub thread_count: String,
    /// Rank attribute input value
    pub rank_attribute: String,
    /// Descending radio selected
    pub rank_order_descending: bool,
    /// Keep-going "true" radio selected
    pub keep_going: bool,
    /// Success-on-empty "true" radio selected
    pub success_on_empty_node_filter: bool,
    /// Selected-by-default "true" radio selected
    pub selected_by_default: bool,
}

impl DispatchReadback {
    /// Field-by-field comparison, in form order
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dispatch enabled", self.enabled.to_string()),
            ("node filter", self.node_filter.clone()),
            ("show excluded", self.show_excluded.to_string()),
            ("editable filter", self.editable_filter.to_string()),
            ("thread count", self.thread_count.clone()),
            ("rank attribute", self.rank_attribute.clone()),
            ("rank order descending", self.rank_order_descending.to_string()),
            ("keep going", self.keep_going.to_string()),
            (
                "success on empty node filter",
                self.success_on_empty_node_filter.to_string(),
            ),
            ("selected by default", self.selected_by_default.to_string()),
        ]
    }
}

/// Text shown under the filter for a matched node count
#[must_use]
pub fn matched_nodes_text(count: u32) -> String {
    if count == 1 {
        "1 Node Matched".to_string()
    } else {
        format!("{count} Nodes Matched")
    }
}
