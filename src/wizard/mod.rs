//! Multi-step wizard state machine shared by the dashboard flows.
//!
//! A flow declares an ordered list of steps and the payload each step hands
//! over. [`StepController`] keeps the current step and the committed payloads;
//! step forms validate locally and commit; the last step builds one
//! submission from everything committed before it.

use std::collections::BTreeMap;
use std::fmt::Debug;

use thiserror::Error;

pub mod submit;
pub mod validation;

pub use submit::{submit, SubmissionTarget, SubmitOutcome};
pub use validation::{FieldError, StepForm, ValidationErrors};

#[cfg(test)]
mod tests;

pub type StepId = u8;

/// One screen of a flow. Fixed when the flow is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition<K> {
    pub id: StepId,
    pub label: &'static str,
    /// Tag the UI dispatches on to draw this step
    pub kind: K,
}

/// How a step is drawn in the indicator strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Completed,
    Active,
    Pending,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("step {0} has no committed payload")]
    MissingPayload(StepId),

    #[error("payload does not belong to step {0}")]
    WrongStep(StepId),

    #[error("step {step}: {message}")]
    Invalid { step: StepId, message: String },

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("submission is only possible from the final step")]
    NotOnFinalStep,
}

/// A concrete wizard: its steps, payload type and submission shape
pub trait WizardFlow {
    type StepKind: Copy + Eq + Debug;
    /// Validated data a step hands over when the user advances
    type Payload: Clone + Debug + Send;
    /// Request assembled from all committed payloads
    type Submission: Clone + Debug + Send + 'static;

    fn steps(&self) -> &[StepDefinition<Self::StepKind>];

    /// Which step kind produced this payload
    fn step_kind_of(payload: &Self::Payload) -> Self::StepKind;

    fn build_submission(
        &self,
        state: &WizardState<Self::Payload>,
    ) -> Result<Self::Submission, WizardError>;
}

/// Current step plus the payloads committed so far
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState<P> {
    current_step: StepId,
    payloads: BTreeMap<StepId, P>,
}

impl<P> WizardState<P> {
    fn new(current_step: StepId) -> Self {
        Self {
            current_step,
            payloads: BTreeMap::new(),
        }
    }

    pub fn current_step(&self) -> StepId {
        self.current_step
    }

    pub fn payload(&self, id: StepId) -> Option<&P> {
        self.payloads.get(&id)
    }

    /// Committed payload of step `id` or [`WizardError::MissingPayload`]
    pub fn require(&self, id: StepId) -> Result<&P, WizardError> {
        self.payloads.get(&id).ok_or(WizardError::MissingPayload(id))
    }

    pub fn committed_steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.payloads.keys().copied()
    }
}

/// What the controller should draw for the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveStep<'a, K> {
    Step(&'a StepDefinition<K>),
    /// No definition for the current id; drawn as the dashboard error placeholder
    Unknown(StepId),
}

/// Drives one wizard instance from mount to submission
pub struct StepController<F: WizardFlow> {
    flow: F,
    state: WizardState<F::Payload>,
    submitting: bool,
}

impl<F: WizardFlow> StepController<F> {
    /// Start on the first declared step
    pub fn new(flow: F) -> Self {
        let first = flow.steps().first().map(|s| s.id).unwrap_or(1);
        Self::with_initial_step(flow, first)
    }

    pub fn with_initial_step(flow: F, initial: StepId) -> Self {
        Self {
            flow,
            state: WizardState::new(initial.max(1)),
            submitting: false,
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn state(&self) -> &WizardState<F::Payload> {
        &self.state
    }

    pub fn steps(&self) -> &[StepDefinition<F::StepKind>] {
        self.flow.steps()
    }

    pub fn current_step(&self) -> StepId {
        self.state.current_step
    }

    pub fn last_step_id(&self) -> StepId {
        self.steps().iter().map(|s| s.id).max().unwrap_or(1)
    }

    pub fn active_step(&self) -> ActiveStep<'_, F::StepKind> {
        let current = self.state.current_step;
        match self.steps().iter().find(|s| s.id == current) {
            Some(def) => ActiveStep::Step(def),
            None => ActiveStep::Unknown(current),
        }
    }

    /// Jump to `id` from the step indicator.
    ///
    /// No validation of skipped steps happens here: forward jumps land on a
    /// step whose prerequisites may be uncommitted. Ids beyond
    /// `last_step_id() + 1` are ignored.
    pub fn go_to_step(&mut self, id: StepId) -> bool {
        if id == 0 || id > self.last_step_id().saturating_add(1) {
            tracing::warn!(step = id, "ignoring jump to undefined step");
            return false;
        }
        tracing::debug!(from = self.state.current_step, to = id, "wizard jump");
        self.state.current_step = id;
        true
    }

    /// Store the validated payload of the current step and move forward,
    /// staying on the last step.
    pub fn commit_and_advance(&mut self, payload: F::Payload) -> Result<(), WizardError> {
        let current = self.state.current_step;
        let kind = match self.active_step() {
            ActiveStep::Step(def) => def.kind,
            ActiveStep::Unknown(id) => return Err(WizardError::WrongStep(id)),
        };
        if F::step_kind_of(&payload) != kind {
            return Err(WizardError::WrongStep(current));
        }
        tracing::debug!(step = current, payload = ?payload, "step committed");
        self.state.payloads.insert(current, payload);
        self.state.current_step = current.saturating_add(1).min(self.last_step_id());
        Ok(())
    }

    pub fn payload(&self, id: StepId) -> Option<&F::Payload> {
        self.state.payload(id)
    }

    /// Committed payload for the step of the given kind
    pub fn payload_for(&self, kind: F::StepKind) -> Option<&F::Payload> {
        self.steps()
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| self.state.payload(s.id))
    }

    pub fn indicator(&self) -> Vec<(StepDefinition<F::StepKind>, IndicatorState)> {
        let current = self.state.current_step;
        self.steps()
            .iter()
            .map(|s| {
                let state = match s.id.cmp(&current) {
                    std::cmp::Ordering::Less => IndicatorState::Completed,
                    std::cmp::Ordering::Equal => IndicatorState::Active,
                    std::cmp::Ordering::Greater => IndicatorState::Pending,
                };
                (*s, state)
            })
            .collect()
    }

    pub fn is_final_step(&self) -> bool {
        self.state.current_step == self.last_step_id()
    }

    /// True while a submission request is outstanding
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Build the submission without changing any state
    pub fn submission(&self) -> Result<F::Submission, WizardError> {
        if !self.is_final_step() {
            return Err(WizardError::NotOnFinalStep);
        }
        self.flow.build_submission(&self.state)
    }

    /// Build the submission and close the single-flight gate.
    pub fn begin_submit(&mut self) -> Result<F::Submission, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        let submission = self.submission()?;
        self.submitting = true;
        tracing::info!(step = self.state.current_step, "submission started");
        Ok(submission)
    }

    /// Reopen the gate after the request finished, whatever its result
    pub(crate) fn end_submit(&mut self) {
        self.submitting = false;
    }
}
