use crate::domain::model::{AddOn, Pet, Plan, SubscriptionId, SubscriptionRequest, UserId};
use crate::utils::error::{Result, SubmissionError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn submission_timeout(&self) -> Duration;
    fn auth_token(&self) -> Option<&str>;
    fn extra_headers(&self) -> Option<&HashMap<String, String>>;
    fn currency(&self) -> &str;
}

/// Read-only source of plans and add-ons.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<Plan>>;
    async fn list_add_ons(&self) -> Result<Vec<AddOn>>;
}

/// Read-only source of the pets a user owns.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    async fn list_pets(&self, user_id: UserId) -> Result<Vec<Pet>>;
}

/// Backing service that creates subscriptions.
#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> std::result::Result<SubscriptionId, SubmissionError>;
}

#[async_trait]
impl<T: CatalogProvider + ?Sized> CatalogProvider for std::sync::Arc<T> {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        (**self).list_plans().await
    }

    async fn list_add_ons(&self) -> Result<Vec<AddOn>> {
        (**self).list_add_ons().await
    }
}

#[async_trait]
impl<T: EntitlementProvider + ?Sized> EntitlementProvider for std::sync::Arc<T> {
    async fn list_pets(&self, user_id: UserId) -> Result<Vec<Pet>> {
        (**self).list_pets(user_id).await
    }
}

#[async_trait]
impl<T: SubscriptionGateway + ?Sized> SubscriptionGateway for std::sync::Arc<T> {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> std::result::Result<SubscriptionId, SubmissionError> {
        (**self).create_subscription(request).await
    }
}
