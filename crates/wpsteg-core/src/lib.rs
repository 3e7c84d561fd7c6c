//! WP-Steg core: finds files exposed in a WordPress uploads directory
//! listing that the site's media API does not account for.

pub mod config;
pub mod logging;

pub mod api;
pub mod audit;
pub mod control;
pub mod crawler;
pub mod http;
pub mod inventory;
pub mod precheck;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod url_model;

pub use audit::{AuditOutcome, AuditReporter, AuditResult, Auditor};
pub use inventory::InventorySet;
pub use reconcile::reconcile;
pub use url_model::{canonicalize, comparison_key, ComparisonKey, MediaUrl};
