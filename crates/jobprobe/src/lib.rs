//! jobprobe: browser-driven end-to-end checks for a job scheduler's job
//! create/show/edit screens.
//!
//! The harness proves that node-dispatch and orchestrator settings entered
//! on the create screen are rendered on the show screen and re-populated on
//! the edit screen.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Scenario   │───►│ Page       │───►│ Locator    │         │
//! │   │ (flow +    │    │ Objects    │    │ catalogs   │         │
//! │   │ asserts)   │    │            │    │            │         │
//! │   └─────┬──────┘    └─────┬──────┘    └─────┬──────┘         │
//! │         │                 │                 ▼                │
//! │         └──────► wait ◄───┘           ┌────────────┐         │
//! │                    │                  │ Driver     │         │
//! │                    └─────────────────►│ (CDP/mock) │         │
//! │                                       └────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One [`Session`] per run is shared by reference with every page object.

#![warn(missing_docs)]

mod assertion;
mod browser;
mod config;
mod driver;
mod locator;
mod page_object;
mod result;
mod session;

/// Node-dispatch model and its rendered definition text
pub mod dispatch;

/// Page objects for the job screens
#[allow(clippy::missing_errors_doc)]
pub mod pages;

/// URL contract of the job screens
pub mod routes;

/// Scenario runner and suite report
pub mod runner;

/// End-to-end scenarios
pub mod scenario;

/// Explicit waits and the isolated settle delay
pub mod wait;

pub use assertion::Assertion;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::BrowserConfig;
pub use config::{Credentials, FixtureExpectations, HarnessConfig, Timeouts};
pub use dispatch::{DefinitionText, DispatchConfig, DispatchReadback, OrchestratorKind};
pub use driver::{Driver, ElementHandle, MockDriver, MockElement};
pub use locator::{xpath_literal, Locator, Selector};
pub use page_object::PageObject;
pub use result::{ProbeError, ProbeResult};
pub use runner::{ScenarioOutcome, ScenarioRunner, Status, SuiteReport};
pub use scenario::Scenario;
pub use session::Session;
pub use wait::{Condition, WaitOptions, WaitResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::dispatch::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::routes::*;
    pub use super::runner::*;
    pub use super::scenario::*;
    pub use super::session::*;
    pub use super::wait::*;
}
