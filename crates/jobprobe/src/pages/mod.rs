//! Page objects for the job screens.
//!
//! One type per screen, one method per control. Locator catalogs live in a
//! `locators` module next to each page so selectors can be reviewed in one
//! place when the markup changes.

pub mod job_create;
pub mod job_show;
pub mod jobs_list;
pub mod login;

pub use job_create::{BasicJobState, JobCreatePage, BASIC_JOB_COMMAND};
pub use job_show::JobShowPage;
pub use jobs_list::JobsListPage;
pub use login::LoginPage;
