//! One subscription configuration session for one signed-in user.
//!
//! Editing calls are synchronous. [`SubscriptionWorkflow::submit`] captures the
//! request snapshot and starts the network call on a Tokio task owned by the
//! workflow; [`SubscriptionWorkflow::settle`] waits for it and applies the result.
//! Dropping the workflow detaches a pending task: the call still completes on
//! the server side but its outcome is discarded.

use crate::core::selection::{Selection, SelectionMachine, Step};
use crate::core::submission::SubmissionController;
use crate::domain::model::{AddOn, Pet, Plan, Session, SubscriptionId, SubscriptionRequest};
use crate::domain::ports::SubscriptionGateway;
use crate::utils::error::{SubmissionError, WorkflowError};
use chrono::Utc;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Outcome = Result<SubscriptionId, SubmissionError>;

pub struct SubscriptionWorkflow<G: SubscriptionGateway + 'static> {
    session: Session,
    machine: SelectionMachine,
    controller: Arc<SubmissionController<G>>,
    in_flight: Option<JoinHandle<Outcome>>,
}

impl<G: SubscriptionGateway + 'static> SubscriptionWorkflow<G> {
    /// The workflow takes sole ownership of `controller`, so its in-flight guard
    /// covers this instance only.
    pub fn new(session: Session, controller: SubmissionController<G>) -> Self {
        tracing::debug!("Starting subscription workflow for user {}", session.user_id);
        Self {
            machine: SelectionMachine::new(session.user_id),
            session,
            controller: Arc::new(controller),
            in_flight: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.machine.step()
    }

    pub fn selection(&self) -> &Selection {
        self.machine.selection()
    }

    pub fn total_price(&self) -> u64 {
        self.machine.total_price()
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.machine.last_outcome()
    }

    pub fn snapshot(&self) -> Option<&SubscriptionRequest> {
        self.machine.snapshot()
    }

    pub fn can_advance(&self) -> bool {
        self.machine.can_advance()
    }

    /// True while a submission is pending; the confirm control should be disabled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn select_pet(&mut self, pet: Pet) -> Result<(), WorkflowError> {
        self.machine.select_pet(pet)
    }

    pub fn select_plan(&mut self, plan: Plan) -> Result<(), WorkflowError> {
        self.machine.select_plan(plan)
    }

    pub fn toggle_add_on(&mut self, add_on: AddOn) -> Result<bool, WorkflowError> {
        self.machine.toggle_add_on(add_on)
    }

    pub fn advance(&mut self) -> Result<(), WorkflowError> {
        self.machine.advance()
    }

    pub fn retreat(&mut self) -> Result<(), WorkflowError> {
        self.machine.retreat()
    }

    pub fn resume_editing(&mut self) -> Result<(), WorkflowError> {
        self.machine.resume_editing()
    }

    /// Starts the submission. A second call while one is pending fails with
    /// [`SubmissionError::Duplicate`] and sends nothing.
    pub fn submit(&mut self) -> Result<(), WorkflowError> {
        if self.in_flight.is_some() {
            tracing::warn!("Submit ignored: a subscription request is already pending");
            return Err(SubmissionError::Duplicate.into());
        }
        let runtime = Handle::try_current().map_err(|_| WorkflowError::NoRuntime)?;
        let request = self.machine.begin_submission(Utc::now())?;
        self.spawn(&runtime, request);
        Ok(())
    }

    /// Resubmits the snapshot that failed transiently.
    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        if self.in_flight.is_some() {
            return Err(SubmissionError::Duplicate.into());
        }
        let runtime = Handle::try_current().map_err(|_| WorkflowError::NoRuntime)?;
        let request = self.machine.retry_submission()?;
        self.spawn(&runtime, request);
        Ok(())
    }

    /// Waits for the pending submission and applies its outcome.
    pub async fn settle(&mut self) -> Result<SubscriptionId, WorkflowError> {
        let Some(task) = self.in_flight.take() else {
            return Err(WorkflowError::StepLocked {
                action: "wait for a submission",
                step: self.machine.step().to_string(),
            });
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(SubmissionError::transient(format!(
                "submission task ended unexpectedly: {}",
                e
            ))),
        };
        self.machine.resolve(outcome.clone());
        outcome.map_err(WorkflowError::from)
    }

    pub async fn submit_and_wait(&mut self) -> Result<SubscriptionId, WorkflowError> {
        self.submit()?;
        self.settle().await
    }

    /// Ends this workflow instance. A pending submission is left to finish on its own.
    pub fn abandon(self) {
        tracing::debug!(
            "Abandoning subscription workflow for user {} while {}",
            self.session.user_id,
            self.machine.step()
        );
    }

    fn spawn(&mut self, runtime: &Handle, request: SubscriptionRequest) {
        let controller = Arc::clone(&self.controller);
        self.in_flight = Some(runtime.spawn(async move { controller.submit(&request).await }));
    }
}

impl<G: SubscriptionGateway + 'static> Drop for SubscriptionWorkflow<G> {
    fn drop(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::debug!(
                "Detached pending submission for user {}; its outcome will be discarded",
                self.session.user_id
            );
        }
    }
}
