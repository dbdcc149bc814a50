use crate::core::{AddOn, CatalogProvider, Plan};
use crate::utils::error::{Result, StorefrontError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Catalog wrapper that fetches plans and add-ons once and shares them across workflows.
///
/// Failed fetches are not cached; the next caller tries again.
pub struct CachedCatalog<C: CatalogProvider> {
    inner: C,
    plans: OnceCell<Arc<[Plan]>>,
    add_ons: OnceCell<Arc<[AddOn]>>,
}

impl<C: CatalogProvider> CachedCatalog<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            plans: OnceCell::new(),
            add_ons: OnceCell::new(),
        }
    }

    pub async fn plans(&self) -> Result<Arc<[Plan]>> {
        let plans = self
            .plans
            .get_or_try_init(|| async {
                let plans = self.inner.list_plans().await?;
                tracing::debug!("Cached {} subscription plans", plans.len());
                Ok::<_, StorefrontError>(Arc::from(plans))
            })
            .await?;
        Ok(Arc::clone(plans))
    }

    pub async fn add_ons(&self) -> Result<Arc<[AddOn]>> {
        let add_ons = self
            .add_ons
            .get_or_try_init(|| async {
                let add_ons = self.inner.list_add_ons().await?;
                tracing::debug!("Cached {} add-ons", add_ons.len());
                Ok::<_, StorefrontError>(Arc::from(add_ons))
            })
            .await?;
        Ok(Arc::clone(add_ons))
    }
}

#[async_trait]
impl<C: CatalogProvider> CatalogProvider for CachedCatalog<C> {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        Ok(self.plans().await?.to_vec())
    }

    async fn list_add_ons(&self) -> Result<Vec<AddOn>> {
        Ok(self.add_ons().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AddOnId, PlanId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        plan_calls: AtomicUsize,
        add_on_calls: AtomicUsize,
        fail_first_add_on_fetch: bool,
    }

    #[async_trait]
    impl CatalogProvider for CountingCatalog {
        async fn list_plans(&self) -> Result<Vec<Plan>> {
            self.plan_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Plan {
                id: PlanId(1),
                name: "Basic".to_string(),
                monthly_price: 21000,
                features: vec![],
            }])
        }

        async fn list_add_ons(&self) -> Result<Vec<AddOn>> {
            let call = self.add_on_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first_add_on_fetch && call == 0 {
                return Err(StorefrontError::data_unavailable("Add-ons", "503"));
            }
            Ok(vec![AddOn {
                id: AddOnId(1),
                name: "Treats".to_string(),
                price: 1500,
                description: None,
            }])
        }
    }

    fn catalog(fail_first_add_on_fetch: bool) -> CachedCatalog<CountingCatalog> {
        CachedCatalog::new(CountingCatalog {
            plan_calls: AtomicUsize::new(0),
            add_on_calls: AtomicUsize::new(0),
            fail_first_add_on_fetch,
        })
    }

    #[tokio::test]
    async fn test_plans_fetched_once() {
        let cache = catalog(false);

        let first = cache.list_plans().await.unwrap();
        let second = cache.list_plans().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner.plan_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = catalog(true);

        tokio_test::block_on(async {
            assert!(cache.add_ons().await.is_err());
            let add_ons = cache.add_ons().await.unwrap();
            assert_eq!(add_ons.len(), 1);
        });

        assert_eq!(cache.inner.add_on_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let cache = Arc::new(catalog(false));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.plans().await.map(|plans| plans.len()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }
        assert_eq!(cache.inner.plan_calls.load(Ordering::SeqCst), 1);
    }
}
