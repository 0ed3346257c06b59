//! Client for the skill viewer API: employees, their skills and assignments, tasks and the activity log.

pub mod activities;
pub mod api_client;
pub mod assignment_detail;
pub mod config;
pub mod employee_detail;
pub mod employee_list;
pub mod error;
pub mod load_state;
pub mod retry;
pub mod session;
pub mod status;
pub mod tasks;
pub mod types;
pub mod validate;

pub use api_client::{ApiClient, SkillApi};
pub use error::Error;
