pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{CachedCatalog, HttpStorefrontClient};
pub use app::{Checkout, CheckoutChoices, SelectionSummary};
pub use config::StorefrontConfig;
pub use core::selection::Step;
pub use core::submission::SubmissionController;
pub use core::workflow::SubscriptionWorkflow;
pub use utils::error::{Result, StorefrontError, SubmissionError, WorkflowError};
