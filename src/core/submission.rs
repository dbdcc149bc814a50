use crate::domain::model::{SubscriptionId, SubscriptionRequest};
use crate::domain::ports::SubscriptionGateway;
use crate::utils::error::SubmissionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Sends subscription requests, at most one at a time.
pub struct SubmissionController<G: SubscriptionGateway> {
    gateway: G,
    timeout: Option<Duration>,
    in_flight: AtomicBool,
}

/// Releases the in-flight slot when the call finishes or its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G: SubscriptionGateway> SubmissionController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            timeout: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// A pending call that outlives `timeout` is reported as transient.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<SubscriptionId, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::warn!("Dropping duplicate submission for pet {}", request.pet_id());
            return Err(SubmissionError::Duplicate);
        };

        tracing::info!(
            "Creating subscription: user {}, pet {}, plan {}, {} add-on(s), total {}",
            request.user_id(),
            request.pet_id(),
            request.plan_id(),
            request.add_ons().len(),
            request.total_price()
        );

        let call = self.gateway.create_subscription(request);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SubmissionError::transient(format!(
                    "no response from the storefront within {:?}",
                    limit
                ))),
            },
            None => call.await,
        };

        match &outcome {
            Ok(id) => tracing::info!("Subscription {} created", id),
            Err(SubmissionError::Rejected { reason }) => {
                tracing::warn!("Subscription rejected: {}", reason)
            }
            Err(e) => tracing::warn!("Subscription request failed: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AddOn, AddOnId, Pet, PetId, Plan, PlanId, UserId};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    struct ScriptedGateway {
        calls: AtomicUsize,
        release: Option<Arc<Notify>>,
        delay: Option<Duration>,
        outcome: Result<SubscriptionId, SubmissionError>,
    }

    impl ScriptedGateway {
        fn answering(outcome: Result<SubscriptionId, SubmissionError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                release: None,
                delay: None,
                outcome,
            }
        }
    }

    #[async_trait]
    impl SubscriptionGateway for ScriptedGateway {
        async fn create_subscription(
            &self,
            _request: &SubscriptionRequest,
        ) -> Result<SubscriptionId, SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(release) = &self.release {
                release.notified().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    fn request() -> SubscriptionRequest {
        let pet = Pet {
            id: PetId(3),
            user_id: UserId(7),
            name: "Mishmish".to_string(),
            species: None,
            breed: None,
        };
        let plan = Plan {
            id: PlanId(2),
            name: "Basic".to_string(),
            monthly_price: 21000,
            features: vec![],
        };
        let treats = AddOn {
            id: AddOnId(1),
            name: "Treats".to_string(),
            price: 1500,
            description: None,
        };
        SubscriptionRequest::capture(UserId(7), &pet, &plan, &[treats], Utc::now())
    }

    #[tokio::test]
    async fn test_submit_returns_gateway_id() {
        let controller = SubmissionController::new(ScriptedGateway::answering(Ok(
            SubscriptionId::new("88").unwrap(),
        )));

        let id = controller.submit(&request()).await.unwrap();

        assert_eq!(id.as_str(), "88");
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_duplicate_and_not_sent() {
        let release = Arc::new(Notify::new());
        let mut gateway = ScriptedGateway::answering(Ok(SubscriptionId::new("1").unwrap()));
        gateway.release = Some(Arc::clone(&release));
        let controller = Arc::new(SubmissionController::new(gateway));
        let snapshot = request();

        let first = {
            let controller = Arc::clone(&controller);
            let snapshot = snapshot.clone();
            tokio::spawn(async move { controller.submit(&snapshot).await })
        };
        while !controller.is_pending() {
            tokio::task::yield_now().await;
        }

        let second = controller.submit(&snapshot).await;
        assert_eq!(second, Err(SubmissionError::Duplicate));

        release.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(controller.gateway().calls.load(Ordering::SeqCst), 1);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_timeout_is_transient_and_releases_slot() {
        let mut gateway = ScriptedGateway::answering(Ok(SubscriptionId::new("1").unwrap()));
        gateway.delay = Some(Duration::from_secs(5));
        let controller = SubmissionController::new(gateway).with_timeout(Duration::from_millis(50));

        let outcome = controller.submit(&request()).await;

        assert!(matches!(outcome, Err(SubmissionError::Transient { .. })));
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn test_rejection_passes_through() {
        let controller = SubmissionController::new(ScriptedGateway::answering(Err(
            SubmissionError::rejected("pet already subscribed"),
        )));

        let outcome = controller.submit(&request()).await;

        assert_eq!(outcome, Err(SubmissionError::rejected("pet already subscribed")));
    }
}
