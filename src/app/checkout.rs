use crate::app::navigation::{self, Destination};
use crate::core::submission::SubmissionController;
use crate::core::workflow::SubscriptionWorkflow;
use crate::core::{
    AddOn, AddOnId, CatalogProvider, EntitlementProvider, PetId, PlanId, Session, SubscriptionGateway,
};
use crate::utils::error::{Result, StorefrontError};
use std::time::Duration;

/// Catalog ids a caller picked for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutChoices {
    pub pet_id: PetId,
    pub plan_id: PlanId,
    pub add_on_ids: Vec<AddOnId>,
}

/// Entry point for the subscription page: owns the collaborators and hands out workflows.
///
/// Catalog and pets are shared by every workflow. Each workflow gets its own
/// [`SubmissionController`] over a clone of the gateway.
pub struct Checkout<C, E, G>
where
    C: CatalogProvider,
    E: EntitlementProvider,
    G: SubscriptionGateway + Clone + 'static,
{
    catalog: C,
    pets: E,
    gateway: G,
    submission_timeout: Option<Duration>,
}

impl<C, E, G> Checkout<C, E, G>
where
    C: CatalogProvider,
    E: EntitlementProvider,
    G: SubscriptionGateway + Clone + 'static,
{
    pub fn new(catalog: C, pets: E, gateway: G) -> Self {
        Self {
            catalog,
            pets,
            gateway,
            submission_timeout: None,
        }
    }

    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = Some(timeout);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Where a signed-in user should land before configuring a subscription.
    pub async fn entry(&self, session: &Session) -> Result<Destination> {
        let pets = self.pets.list_pets(session.user_id).await?;
        Ok(navigation::entry_destination(&pets))
    }

    /// A fresh workflow with nothing selected.
    pub fn start(&self, session: Session) -> SubscriptionWorkflow<G> {
        let mut controller = SubmissionController::new(self.gateway.clone());
        if let Some(timeout) = self.submission_timeout {
            controller = controller.with_timeout(timeout);
        }
        SubscriptionWorkflow::new(session, controller)
    }

    /// Resolves `choices` against the catalog and the user's pets and returns a
    /// workflow positioned on the add-ons step, ready for review and submission.
    pub async fn configure(
        &self,
        session: Session,
        choices: &CheckoutChoices,
    ) -> Result<SubscriptionWorkflow<G>> {
        let pets = self.pets.list_pets(session.user_id).await?;
        let plans = self.catalog.list_plans().await?;
        let add_ons = self.catalog.list_add_ons().await?;

        let pet = pets
            .into_iter()
            .find(|pet| pet.id == choices.pet_id && pet.user_id == session.user_id)
            .ok_or_else(|| StorefrontError::UnknownSelection {
                kind: "pet",
                id: choices.pet_id.to_string(),
            })?;
        let plan = plans
            .into_iter()
            .find(|plan| plan.id == choices.plan_id)
            .ok_or_else(|| StorefrontError::UnknownSelection {
                kind: "plan",
                id: choices.plan_id.to_string(),
            })?;

        let mut picked: Vec<AddOn> = Vec::new();
        for id in &choices.add_on_ids {
            if picked.iter().any(|held| held.id == *id) {
                continue;
            }
            let add_on = add_ons
                .iter()
                .find(|add_on| add_on.id == *id)
                .cloned()
                .ok_or_else(|| StorefrontError::UnknownSelection {
                    kind: "add-on",
                    id: id.to_string(),
                })?;
            picked.push(add_on);
        }

        let mut workflow = self.start(session);
        workflow.select_pet(pet)?;
        workflow.select_plan(plan)?;
        workflow.advance()?;
        for add_on in picked {
            workflow.toggle_add_on(add_on)?;
        }
        Ok(workflow)
    }
}
