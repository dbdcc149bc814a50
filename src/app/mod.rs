// Application layer: what the surrounding pages need on top of the workflow core.

pub mod checkout;
pub mod navigation;
pub mod summary;

pub use checkout::{Checkout, CheckoutChoices};
pub use navigation::{DashboardTab, Destination};
pub use summary::SelectionSummary;
