//! In-progress subscription configuration and the step machine that gates it.
//!
//! The machine is synchronous; the only suspension point (the network call) is
//! owned by [`crate::core::workflow::SubscriptionWorkflow`], which drives the
//! `Submitting` step through [`SelectionMachine::begin_submission`] and
//! [`SelectionMachine::resolve`].

use crate::core::pricing;
use crate::domain::model::{AddOn, AddOnId, Pet, Plan, SubscriptionId, SubscriptionRequest, UserId};
use crate::utils::error::{SubmissionError, WorkflowError};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Editing: choose the pet and the plan.
    PlanAndPet,
    /// Editing: choose add-ons and review the summary.
    AddOns,
    Submitting,
    Succeeded,
    Failed,
}

impl Step {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::PlanAndPet | Self::AddOns)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlanAndPet => write!(f, "choosing a pet and plan"),
            Self::AddOns => write!(f, "choosing add-ons"),
            Self::Submitting => write!(f, "submitting"),
            Self::Succeeded => write!(f, "subscribed"),
            Self::Failed => write!(f, "the last submission failed"),
        }
    }
}

/// The user's choices so far. Add-ons are unique by id and keep the order they were picked in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pet: Option<Pet>,
    plan: Option<Plan>,
    add_ons: Vec<AddOn>,
}

impl Selection {
    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn add_ons(&self) -> &[AddOn] {
        &self.add_ons
    }

    pub fn contains_add_on(&self, id: AddOnId) -> bool {
        self.add_ons.iter().any(|add_on| add_on.id == id)
    }

    pub fn total_price(&self) -> u64 {
        pricing::price(self.plan.as_ref(), &self.add_ons)
    }

    pub fn is_complete(&self) -> bool {
        self.pet.is_some() && self.plan.is_some()
    }

    /// Human-readable names of the choices still needed before add-ons.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.pet.is_none() {
            missing.push("a pet");
        }
        if self.plan.is_none() {
            missing.push("a subscription plan");
        }
        missing
    }

    /// Returns whether the add-on is selected after the toggle.
    fn toggle(&mut self, add_on: AddOn) -> bool {
        if let Some(index) = self.add_ons.iter().position(|held| held.id == add_on.id) {
            self.add_ons.remove(index);
            false
        } else {
            self.add_ons.push(add_on);
            true
        }
    }

    fn require_complete(&self) -> Result<(&Pet, &Plan), WorkflowError> {
        match (&self.pet, &self.plan) {
            (Some(pet), Some(plan)) => Ok((pet, plan)),
            _ => Err(WorkflowError::SelectionRequired {
                missing: self.missing(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionMachine {
    user_id: UserId,
    selection: Selection,
    step: Step,
    snapshot: Option<SubscriptionRequest>,
    last_outcome: Option<Result<SubscriptionId, SubmissionError>>,
}

impl SelectionMachine {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            selection: Selection::default(),
            step: Step::PlanAndPet,
            snapshot: None,
            last_outcome: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn total_price(&self) -> u64 {
        self.selection.total_price()
    }

    /// The request captured by the last submission, kept while it is pending or failed.
    pub fn snapshot(&self) -> Option<&SubscriptionRequest> {
        self.snapshot.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&Result<SubscriptionId, SubmissionError>> {
        self.last_outcome.as_ref()
    }

    pub fn can_advance(&self) -> bool {
        self.step == Step::PlanAndPet && self.selection.is_complete()
    }

    pub fn select_pet(&mut self, pet: Pet) -> Result<(), WorkflowError> {
        self.require_editing("change the pet")?;
        tracing::debug!("Selected pet {} ({})", pet.id, pet.name);
        self.selection.pet = Some(pet);
        Ok(())
    }

    pub fn select_plan(&mut self, plan: Plan) -> Result<(), WorkflowError> {
        self.require_editing("change the plan")?;
        tracing::debug!("Selected plan {} ({})", plan.id, plan.name);
        self.selection.plan = Some(plan);
        tracing::debug!("Total price is now {}", self.total_price());
        Ok(())
    }

    /// Adds the add-on if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle_add_on(&mut self, add_on: AddOn) -> Result<bool, WorkflowError> {
        if self.step != Step::AddOns {
            return Err(self.locked("change add-ons"));
        }
        let id = add_on.id;
        let selected = self.selection.toggle(add_on);
        tracing::debug!(
            "Add-on {} {}; total price is now {}",
            id,
            if selected { "added" } else { "removed" },
            self.total_price()
        );
        Ok(selected)
    }

    pub fn advance(&mut self) -> Result<(), WorkflowError> {
        match self.step {
            Step::PlanAndPet => {
                if let Err(guard) = self.selection.require_complete() {
                    tracing::warn!("Cannot continue to add-ons: {}", guard);
                    return Err(guard);
                }
                self.transition(Step::AddOns);
                Ok(())
            }
            Step::AddOns => Ok(()),
            Step::Submitting | Step::Succeeded | Step::Failed => Err(self.locked("continue")),
        }
    }

    /// Back to pet and plan. Prior choices are kept.
    pub fn retreat(&mut self) -> Result<(), WorkflowError> {
        match self.step {
            Step::AddOns => {
                self.transition(Step::PlanAndPet);
                Ok(())
            }
            Step::PlanAndPet => Ok(()),
            Step::Submitting | Step::Succeeded | Step::Failed => Err(self.locked("go back")),
        }
    }

    /// Captures the request snapshot and enters `Submitting`. This is the only way in.
    pub fn begin_submission(
        &mut self,
        start_date: DateTime<Utc>,
    ) -> Result<SubscriptionRequest, WorkflowError> {
        match self.step {
            Step::AddOns => {}
            Step::Submitting => return Err(SubmissionError::Duplicate.into()),
            Step::PlanAndPet | Step::Succeeded | Step::Failed => {
                return Err(self.locked("submit"))
            }
        }

        let (pet, plan) = self.selection.require_complete()?;
        let request = SubscriptionRequest::capture(
            self.user_id,
            pet,
            plan,
            &self.selection.add_ons,
            start_date,
        );
        self.snapshot = Some(request.clone());
        self.transition(Step::Submitting);
        Ok(request)
    }

    /// Re-enters `Submitting` from `Failed` with the exact snapshot that failed.
    pub fn retry_submission(&mut self) -> Result<SubscriptionRequest, WorkflowError> {
        match (self.step, &self.snapshot) {
            (Step::Failed, Some(snapshot)) => {
                let request = snapshot.clone();
                self.transition(Step::Submitting);
                Ok(request)
            }
            (Step::Submitting, _) => Err(SubmissionError::Duplicate.into()),
            _ => Err(self.locked("retry")),
        }
    }

    /// Applies the controller's verdict to a pending submission.
    pub fn resolve(&mut self, outcome: Result<SubscriptionId, SubmissionError>) {
        if self.step != Step::Submitting {
            tracing::warn!("Ignoring submission outcome while {}", self.step);
            return;
        }

        let next = match &outcome {
            Ok(_) => {
                self.snapshot = None;
                Step::Succeeded
            }
            Err(SubmissionError::Rejected { .. }) => {
                self.snapshot = None;
                Step::AddOns
            }
            Err(SubmissionError::Transient { .. } | SubmissionError::Duplicate) => Step::Failed,
        };
        self.last_outcome = Some(outcome);
        self.transition(next);
    }

    /// Leaves `Failed` for add-on editing with every prior choice intact.
    pub fn resume_editing(&mut self) -> Result<(), WorkflowError> {
        match self.step {
            Step::Failed => {
                self.snapshot = None;
                self.transition(Step::AddOns);
                Ok(())
            }
            Step::AddOns => Ok(()),
            _ => Err(self.locked("resume editing")),
        }
    }

    fn require_editing(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.step.is_editing() {
            Ok(())
        } else {
            Err(self.locked(action))
        }
    }

    fn locked(&self, action: &'static str) -> WorkflowError {
        WorkflowError::StepLocked {
            action,
            step: self.step.to_string(),
        }
    }

    fn transition(&mut self, next: Step) {
        tracing::debug!("Subscription step: {:?} -> {:?}", self.step, next);
        self.step = next;
    }
}
