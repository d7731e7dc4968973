//! In-process stand-in for the job scheduler UI.
//!
//! Implements [`Driver`] over a tiny model of the login, job form, show and
//! list screens. Every navigation re-renders the document, so handles taken
//! before it go stale the same way they do in a browser. Builder methods
//! inject the faults the failure-path tests need.

#![allow(dead_code)]

use async_trait::async_trait;
use jobprobe::pages::{job_create, job_show, login};
use jobprobe::{
    Driver, ElementHandle, Locator, OrchestratorKind, ProbeError, ProbeResult, Selector,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use job_create::locators as form;
use job_show::locators as show;

/// A saved job as the application stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
    pub id: String,
    pub name: String,
    pub command: String,
    pub dispatch: bool,
    pub filter: String,
    pub show_excluded: bool,
    pub editable_filter: bool,
    pub thread_count: String,
    pub rank_attribute: String,
    pub descending: bool,
    pub keep_going: bool,
    pub success_on_empty: bool,
    pub selected_by_default: bool,
    pub orchestrator: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct El {
    text: String,
    value: String,
    selected: bool,
    displayed: bool,
}

impl El {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            displayed: true,
            ..Self::default()
        }
    }

    fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            displayed: true,
            ..Self::default()
        }
    }

    fn radio(selected: bool) -> Self {
        Self {
            selected,
            displayed: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    matched_nodes: u32,
    sticky_step_editor: bool,
    render_overrides: HashMap<String, String>,
    missing_orchestrators: Vec<String>,
    drop_thread_count: bool,
    drop_rename: bool,
    no_rename_redirect: bool,
}

#[derive(Debug, Default)]
struct State {
    url: String,
    base: String,
    project: String,
    logged_in: bool,
    elements: HashMap<String, (u64, El)>,
    next_id: u64,
    jobs: Vec<StoredJob>,
    orchestrator_choice: Option<String>,
    faults: Faults,
    log: Vec<String>,
}

/// Radio pairs; selecting one side clears the other
const RADIO_PAIRS: [(&Locator, &Locator); 7] = [
    (&form::DISPATCH_NODES_TRUE, &form::DISPATCH_NODES_FALSE),
    (&form::SHOW_EXCLUDED_YES, &form::SHOW_EXCLUDED_NO),
    (&form::EDITABLE_FILTER_YES, &form::EDITABLE_FILTER_NO),
    (&form::RANK_ORDER_DESCENDING, &form::RANK_ORDER_ASCENDING),
    (&form::KEEPGOING_TRUE, &form::KEEPGOING_FALSE),
    (&form::SUCCESS_ON_EMPTY_TRUE, &form::SUCCESS_ON_EMPTY_FALSE),
    (&form::SELECTED_BY_DEFAULT_TRUE, &form::SELECTED_BY_DEFAULT_FALSE),
];

fn key(locator: &Locator) -> String {
    locator.selector().to_string()
}

fn choice_selector(value: &str) -> Selector {
    Selector::css(format!(
        "#orchestrator-edit-type-dropdown > ul > li > a[data-value=\"{value}\"]"
    ))
}

impl State {
    fn put(&mut self, locator: &Locator, el: El) {
        self.put_key(key(locator), el);
    }

    fn put_key(&mut self, key: String, el: El) {
        self.next_id += 1;
        let id = self.next_id;
        let _ = self.elements.insert(key, (id, el));
    }

    fn drop_el(&mut self, locator: &Locator) {
        let _ = self.elements.remove(&key(locator));
    }

    fn get(&self, locator: &Locator) -> Option<&El> {
        self.elements.get(&key(locator)).map(|(_, el)| el)
    }

    fn value(&self, locator: &Locator) -> String {
        self.get(locator).map(|el| el.value.clone()).unwrap_or_default()
    }

    fn selected(&self, locator: &Locator) -> bool {
        self.get(locator).is_some_and(|el| el.selected)
    }

    fn live(&mut self, handle: &ElementHandle, op: &str) -> ProbeResult<&mut El> {
        match self.elements.get_mut(handle.selector()) {
            Some((id, el)) if *id == handle.id() => Ok(el),
            _ => Err(ProbeError::driver(op, "stale element reference")),
        }
    }

    fn go(&mut self, url: &str) {
        self.url = url.to_string();
        self.elements.clear();
        if let Some((base, rest)) = url.split_once("/project/") {
            self.base = base.to_string();
            self.project = rest.split('/').next().unwrap_or_default().to_string();
        } else if let Some(base) = url.split("/user/").next() {
            self.base = base.to_string();
        }

        if url.contains("/user/login") {
            self.put(&login::locators::USERNAME, El::input(""));
            self.put(&login::locators::PASSWORD, El::input(""));
            self.put(&login::locators::SUBMIT, El::text("Log In"));
        } else if !self.logged_in {
            let login = format!("{}/user/login", self.base);
            self.go(&login);
        } else if url.contains("/job/create") {
            self.orchestrator_choice = None;
            self.render_form(None);
        } else if let Some(id) = url.split("/job/edit/").nth(1) {
            let job = self.jobs.iter().find(|j| j.id == id).cloned();
            self.orchestrator_choice = job.as_ref().and_then(|j| j.orchestrator.clone());
            self.render_form(job.as_ref());
        } else if let Some(id) = url.split("/job/show/").nth(1) {
            let name = self
                .jobs
                .iter()
                .find(|j| j.id == id)
                .map(|j| j.name.clone())
                .unwrap_or_default();
            self.put(&show::JOB_NAME_TEXT, El::text(name));
            self.put(&show::JOB_DEFINITION, El::text("Definition"));
        } else if url.ends_with("/jobs") {
            let names: Vec<String> = self.jobs.iter().map(|j| j.name.clone()).collect();
            for name in names {
                self.put_key(Selector::link_text(name.clone()).to_string(), El::text(name));
            }
        }
    }

    fn render_form(&mut self, job: Option<&StoredJob>) {
        let name = job.map(|j| j.name.clone()).unwrap_or_default();
        self.put(&form::JOB_NAME, El::input(name));
        self.put(&form::TAB_WORKFLOW, El::text("Workflow"));
        self.put(&form::TAB_NODES, El::text("Nodes"));
        self.put(&form::SAVE, El::text("Create"));
        self.put(&form::EDIT_SAVE, El::text("Update"));
        if let Some(job) = job {
            self.put(&form::WF_STEP0_VIEW, El::text(job.command.clone()));
            self.render_dispatch(job);
        }
    }

    fn render_dispatch(&mut self, job: &StoredJob) {
        self.put(&form::DISPATCH_NODES_TRUE, El::radio(job.dispatch));
        self.put(&form::DISPATCH_NODES_FALSE, El::radio(!job.dispatch));
        if !job.dispatch {
            return;
        }
        self.put(&form::NODE_FILTER, El::input(job.filter.clone()));
        self.put(&form::NODE_FILTER_MENU, El::text("Filter"));
        let pairs = [
            (job.show_excluded, 1),
            (job.editable_filter, 2),
            (job.descending, 3),
            (job.keep_going, 4),
            (job.success_on_empty, 5),
            (job.selected_by_default, 6),
        ];
        for (on, idx) in pairs {
            let (yes, no) = RADIO_PAIRS[idx];
            self.put(yes, El::radio(on));
            self.put(no, El::radio(!on));
        }
        self.put(&form::THREADCOUNT, El::input(job.thread_count.clone()));
        self.put(&form::RANK_ATTRIBUTE, El::input(job.rank_attribute.clone()));
        self.put(&form::ORCHESTRATOR_DROPDOWN, El::text("Orchestrator"));
    }

    fn form_job(&self, id: String) -> StoredJob {
        let thread_count = if self.faults.drop_thread_count {
            "1".to_string()
        } else {
            self.value(&form::THREADCOUNT)
        };
        StoredJob {
            id,
            name: self.value(&form::JOB_NAME),
            command: self
                .get(&form::WF_STEP0_VIEW)
                .map(|el| el.text.clone())
                .unwrap_or_default(),
            dispatch: self.selected(&form::DISPATCH_NODES_TRUE),
            filter: self.value(&form::NODE_FILTER),
            show_excluded: self.selected(&form::SHOW_EXCLUDED_YES),
            editable_filter: self.selected(&form::EDITABLE_FILTER_YES),
            thread_count,
            rank_attribute: self.value(&form::RANK_ATTRIBUTE),
            descending: self.selected(&form::RANK_ORDER_DESCENDING),
            keep_going: self.selected(&form::KEEPGOING_TRUE),
            success_on_empty: self.selected(&form::SUCCESS_ON_EMPTY_TRUE),
            selected_by_default: self.selected(&form::SELECTED_BY_DEFAULT_TRUE),
            orchestrator: self.orchestrator_choice.clone(),
        }
    }

    fn show_url(&self, id: &str) -> String {
        format!("{}/project/{}/job/show/{id}", self.base, self.project)
    }

    fn rendered(&self, field: &str, text: String) -> El {
        El::text(
            self.faults
                .render_overrides
                .get(field)
                .cloned()
                .unwrap_or(text),
        )
    }

    fn open_definition(&mut self) {
        let Some(id) = self.url.split("/job/show/").nth(1).map(str::to_string) else {
            return;
        };
        let Some(job) = self.jobs.iter().find(|j| j.id == id).cloned() else {
            return;
        };

        let filter = if job.filter.contains(':') {
            job.filter.clone()
        } else {
            format!("name: {}", job.filter)
        };
        let threads: u32 = job.thread_count.parse().unwrap_or(1);
        let threads = if threads > 1 {
            format!("Execute on up to {threads} Nodes at a time.")
        } else {
            "Execute on one Node at a time.".to_string()
        };
        let keep_going = if job.keep_going {
            "If a node fails: Continue running on any remaining nodes before failing the step."
        } else {
            "If a node fails: Stop at the failed node and fail the step."
        };
        let rank = if job.rank_attribute.is_empty() {
            "nodename".to_string()
        } else {
            job.rank_attribute.clone()
        };
        let order = if job.descending { "descending" } else { "ascending" };
        let selection = if job.selected_by_default {
            "Node selection: Target nodes are selected by default"
        } else {
            "Node selection: The user has to explicitly select target nodes"
        };

        self.put(&show::DEFINITION_NODEFILTERS, El::text(""));
        let el = self.rendered("node filter", format!("Include nodes matching: {filter}"));
        self.put(&show::NODE_FILTER_TEXT, el);
        let el = self.rendered("thread count", threads);
        self.put(&show::THREADCOUNT_TEXT, el);
        let el = self.rendered("keep going", keep_going.to_string());
        self.put(&show::KEEPGOING_TEXT, el);
        let el = self.rendered("rank order", format!("Sort nodes by {rank} in {order} order."));
        self.put(&show::RANK_ORDER_TEXT, el);
        let el = self.rendered("selected by default", selection.to_string());
        self.put(&show::SELECTED_BY_DEFAULT_TEXT, el);
        if let Some(value) = &job.orchestrator {
            let label = OrchestratorKind::from_value(value)
                .map(|k| k.label().to_string())
                .unwrap_or_else(|| value.clone());
            let el = self.rendered("orchestrator", label);
            self.put(&show::ORCHESTRATOR_TEXT, el);
        }
        self.put(&show::CLOSE_MODAL, El::text("Close"));
    }

    fn close_definition(&mut self) {
        for locator in [
            &show::DEFINITION_NODEFILTERS,
            &show::NODE_FILTER_TEXT,
            &show::THREADCOUNT_TEXT,
            &show::KEEPGOING_TEXT,
            &show::RANK_ORDER_TEXT,
            &show::SELECTED_BY_DEFAULT_TEXT,
            &show::ORCHESTRATOR_TEXT,
            &show::CLOSE_MODAL,
        ] {
            self.drop_el(locator);
        }
    }

    fn on_click(&mut self, selector: &str) {
        let is = |locator: &Locator| key(locator) == selector;

        if is(&login::locators::SUBMIT) {
            let ok = self.value(&login::locators::USERNAME) == "admin"
                && self.value(&login::locators::PASSWORD) == "admin";
            if ok {
                self.logged_in = true;
                let home = format!("{}/menu/home", self.base);
                self.url = home;
                self.elements.clear();
            }
        } else if is(&form::TAB_WORKFLOW) {
            self.put(&form::ADD_WF_STEP_COMMAND, El::text("Command"));
        } else if is(&form::ADD_WF_STEP_COMMAND) {
            self.put(&form::WF_STEP0_EDIT_FORM, El::text(""));
            self.put(&form::WF_STEP_COMMAND_REMOTE_TEXT, El::input(""));
            self.put(&form::WF_STEP0_SAVE, El::text("Save"));
        } else if is(&form::WF_STEP0_SAVE) {
            let command = self.value(&form::WF_STEP_COMMAND_REMOTE_TEXT);
            if !self.faults.sticky_step_editor {
                self.drop_el(&form::WF_STEP0_EDIT_FORM);
                self.drop_el(&form::WF_STEP_COMMAND_REMOTE_TEXT);
                self.drop_el(&form::WF_STEP0_SAVE);
            }
            self.put(&form::WF_STEP0_VIEW, El::text(command));
        } else if is(&form::TAB_NODES) {
            if self.get(&form::DISPATCH_NODES_TRUE).is_none() {
                self.put(&form::DISPATCH_NODES_TRUE, El::radio(false));
                self.put(&form::DISPATCH_NODES_FALSE, El::radio(true));
            }
        } else if is(&form::DISPATCH_NODES_TRUE) {
            let job = StoredJob {
                dispatch: true,
                thread_count: "1".to_string(),
                selected_by_default: true,
                ..self.form_job(String::new())
            };
            self.render_dispatch(&job);
        } else if is(&form::NODE_FILTER_MENU) {
            self.put(&form::NODE_FILTER_SELECT_ALL, El::text("All Nodes"));
        } else if is(&form::NODE_FILTER_SELECT_ALL) {
            self.put(&form::NODE_FILTER, El::input(".*"));
            let n = self.faults.matched_nodes;
            let text = if n == 1 {
                "1 Node Matched".to_string()
            } else {
                format!("{n} Nodes Matched")
            };
            self.put(&form::MATCHED_NODES, El::text(text));
            self.drop_el(&form::NODE_FILTER_SELECT_ALL);
        } else if is(&form::ORCHESTRATOR_DROPDOWN) {
            for kind in OrchestratorKind::ALL {
                if self.faults.missing_orchestrators.iter().any(|m| m == kind.value()) {
                    continue;
                }
                self.put_key(choice_selector(kind.value()).to_string(), El::text(kind.label()));
            }
        } else if let Some(kind) = OrchestratorKind::ALL
            .into_iter()
            .find(|k| choice_selector(k.value()).to_string() == selector)
        {
            self.orchestrator_choice = Some(kind.value().to_string());
        } else if is(&form::SAVE) {
            let id = format!("job-{}", self.jobs.len() + 1);
            let job = self.form_job(id.clone());
            self.jobs.push(job);
            let url = self.show_url(&id);
            self.go(&url);
        } else if is(&form::EDIT_SAVE) {
            let Some(id) = self.url.split("/job/edit/").nth(1).map(str::to_string) else {
                return;
            };
            let name = self.value(&form::JOB_NAME);
            if !self.faults.drop_rename {
                if let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) {
                    job.name = name;
                }
            }
            if !self.faults.no_rename_redirect {
                let url = self.show_url(&id);
                self.go(&url);
            }
        } else if is(&show::JOB_DEFINITION) {
            self.open_definition();
        } else if is(&show::CLOSE_MODAL) {
            self.close_definition();
        } else {
            // radios
            for (yes, no) in RADIO_PAIRS {
                let (on, off) = if is(yes) {
                    (yes, no)
                } else if is(no) {
                    (no, yes)
                } else {
                    continue;
                };
                if let Some((_, el)) = self.elements.get_mut(&key(on)) {
                    el.selected = true;
                }
                if let Some((_, el)) = self.elements.get_mut(&key(off)) {
                    el.selected = false;
                }
            }
        }
    }
}

/// Simulated job scheduler behind the [`Driver`] interface
#[derive(Debug)]
pub struct SimulatedApp {
    state: Mutex<State>,
}

impl Default for SimulatedApp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedApp {
    /// Healthy application with one node in the fixture project
    pub fn new() -> Self {
        let state = State {
            faults: Faults {
                matched_nodes: 1,
                ..Faults::default()
            },
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fixture project with `n` matching nodes
    pub fn with_matched_nodes(self, n: u32) -> Self {
        self.state().faults.matched_nodes = n;
        self
    }

    /// Step save never removes the step edit form
    pub fn with_sticky_step_editor(self) -> Self {
        self.state().faults.sticky_step_editor = true;
        self
    }

    /// Render `text` for a definition `field` regardless of the job
    pub fn with_rendered(self, field: &str, text: &str) -> Self {
        let _ = self
            .state()
            .faults
            .render_overrides
            .insert(field.to_string(), text.to_string());
        self
    }

    /// Orchestrator dropdown lacks `value`
    pub fn without_orchestrator(self, value: &str) -> Self {
        self.state().faults.missing_orchestrators.push(value.to_string());
        self
    }

    /// Saving drops the thread count back to 1
    pub fn dropping_thread_count(self) -> Self {
        self.state().faults.drop_thread_count = true;
        self
    }

    /// Update keeps the old job name
    pub fn dropping_rename(self) -> Self {
        self.state().faults.drop_rename = true;
        self
    }

    /// Update stays on the edit screen
    pub fn without_rename_redirect(self) -> Self {
        self.state().faults.no_rename_redirect = true;
        self
    }

    /// Already authenticated
    pub fn logged_in(self) -> Self {
        self.state().logged_in = true;
        self
    }

    /// Saved jobs
    pub fn jobs(&self) -> Vec<StoredJob> {
        self.state().jobs.clone()
    }

    /// Navigations and clicks, in order
    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }
}

#[async_trait]
impl Driver for SimulatedApp {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.log.push(format!("navigate:{url}"));
        state.go(url);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.state().url.clone())
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
        let mut state = self.state();
        let _ = state.live(element, "click")?;
        state.log.push(format!("click:{}", element.selector()));
        state.on_click(element.selector());
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let mut state = self.state();
        state.live(element, "send_keys")?.value.push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.state();
        state.live(element, "clear")?.value.clear();
        Ok(())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        let mut state = self.state();
        let el = state.live(element, "attribute")?;
        Ok((name == "value").then(|| el.value.clone()))
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
        Ok(b"\x89PNG\r\n\x1a\nsimulated".to_vec())
    }

    async fn close(&self) -> ProbeResult<()> {
        self.state().log.push("close".to_string());
        Ok(())
    }
}
