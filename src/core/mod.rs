pub mod pricing;
pub mod selection;
pub mod submission;
pub mod workflow;

pub use crate::domain::model::{
    AddOn, AddOnId, AddOnLine, Pet, PetId, Plan, PlanId, Session, Subscription, SubscriptionId,
    SubscriptionRequest, SubscriptionStatus, UserId,
};
pub use crate::domain::ports::{
    CatalogProvider, ConfigProvider, EntitlementProvider, SubscriptionGateway,
};
pub use crate::utils::error::Result;
