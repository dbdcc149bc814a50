use crate::core::pricing::MAX_CATALOG_PRICE;
use crate::core::{
    AddOn, CatalogProvider, ConfigProvider, EntitlementProvider, Pet, Plan, Subscription,
    SubscriptionGateway, SubscriptionId, SubscriptionRequest, UserId,
};
use crate::utils::error::{Result, StorefrontError, SubmissionError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PETS_PATH: &str = "/api/pets";
const PLANS_PATH: &str = "/api/subscription-plans";
const ADD_ONS_PATH: &str = "/api/add-ons";
const SUBSCRIPTIONS_PATH: &str = "/api/subscriptions";

/// Storefront REST client. Implements every collaborator port the workflow needs.
#[derive(Debug, Clone)]
pub struct HttpStorefrontClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    headers: HashMap<String, String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct CreatedSubscription {
    id: Option<SubscriptionId>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpStorefrontClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client<C: ConfigProvider>(client: Client, config: &C) -> Self {
        Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            auth_token: config.auth_token().map(str::to_string),
            headers: config.extra_headers().cloned().unwrap_or_default(),
            timeout: config.request_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_subscriptions(&self, user_id: UserId) -> Result<Vec<Subscription>> {
        let request = self
            .request(self.client.get(self.url(SUBSCRIPTIONS_PATH)))
            .query(&[("userId", user_id.0)]);
        self.fetch_list("Subscriptions", request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        request.timeout(self.timeout)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        tracing::debug!("Fetching {}", resource);
        let response = request
            .send()
            .await
            .map_err(|e| StorefrontError::data_unavailable(resource, e.to_string()))?;

        let status = response.status();
        tracing::debug!("{} response status: {}", resource, status);
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(StorefrontError::data_unavailable(
                resource,
                format!("{}: {}", status, detail),
            ));
        }

        let items: Vec<T> = response
            .json()
            .await
            .map_err(|e| StorefrontError::data_unavailable(resource, e.to_string()))?;
        tracing::debug!("Fetched {} {}", items.len(), resource.to_lowercase());
        Ok(items)
    }
}

/// Rejects catalog entries priced beyond what totals can safely hold.
fn check_prices(resource: &str, prices: impl IntoIterator<Item = (String, u64)>) -> Result<()> {
    for (id, price) in prices {
        if price > MAX_CATALOG_PRICE {
            return Err(StorefrontError::data_unavailable(
                resource,
                format!("price {} of item {} is out of range", price, id),
            ));
        }
    }
    Ok(())
}

/// Best human-readable reason from an error response: JSON `message`/`error`, raw text, or the status.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
        if let Some(reason) = body.message.or(body.error).filter(|r| !r.trim().is_empty()) {
            return reason;
        }
    }
    if text.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text.trim().to_string()
    }
}

fn classify_failure(status: StatusCode, detail: String) -> SubmissionError {
    if status.is_client_error() {
        SubmissionError::Rejected { reason: detail }
    } else {
        SubmissionError::Transient {
            message: format!("{}: {}", status, detail),
        }
    }
}

#[async_trait]
impl CatalogProvider for HttpStorefrontClient {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let request = self.request(self.client.get(self.url(PLANS_PATH)));
        let plans: Vec<Plan> = self.fetch_list("Subscription plans", request).await?;
        check_prices(
            "Subscription plans",
            plans.iter().map(|plan| (plan.id.to_string(), plan.monthly_price)),
        )?;
        Ok(plans)
    }

    async fn list_add_ons(&self) -> Result<Vec<AddOn>> {
        let request = self.request(self.client.get(self.url(ADD_ONS_PATH)));
        let add_ons: Vec<AddOn> = self.fetch_list("Add-ons", request).await?;
        check_prices(
            "Add-ons",
            add_ons.iter().map(|add_on| (add_on.id.to_string(), add_on.price)),
        )?;
        Ok(add_ons)
    }
}

#[async_trait]
impl EntitlementProvider for HttpStorefrontClient {
    async fn list_pets(&self, user_id: UserId) -> Result<Vec<Pet>> {
        let request = self
            .request(self.client.get(self.url(PETS_PATH)))
            .query(&[("userId", user_id.0)]);
        self.fetch_list("Pets", request).await
    }
}

#[async_trait]
impl SubscriptionGateway for HttpStorefrontClient {
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> std::result::Result<SubscriptionId, SubmissionError> {
        let response = self
            .request(self.client.post(self.url(SUBSCRIPTIONS_PATH)))
            .json(request)
            .send()
            .await
            .map_err(|e| SubmissionError::transient(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Create subscription response status: {}", status);
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(classify_failure(status, detail));
        }

        // The server accepted the request; without an id we cannot tell what it created.
        let created: CreatedSubscription = response.json().await.map_err(|e| {
            SubmissionError::transient(format!("unreadable create response: {}", e))
        })?;
        created
            .id
            .ok_or_else(|| SubmissionError::transient("create response carried no subscription id"))
    }
}
