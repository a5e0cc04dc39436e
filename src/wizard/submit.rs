//! Sending a finished wizard to the backend

use async_trait::async_trait;
use std::fmt::Debug;

use super::{StepController, WizardError, WizardFlow};
use crate::api::{ApiError, DashboardApi};
use crate::routes::Route;
use crate::toast::Toast;

/// A flow whose submission maps onto one backend call
#[async_trait]
pub trait SubmissionTarget: WizardFlow {
    type Response: Debug + Send + 'static;

    async fn send(
        api: &dyn DashboardApi,
        submission: Self::Submission,
    ) -> Result<Self::Response, ApiError>;

    /// Screen opened after a successful submission
    fn success_route() -> Route;

    fn success_message(response: &Self::Response) -> String;
}

/// Result of one submission, already translated for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Navigated { route: Route, path: String, toast: Toast },
    Failed { toast: Toast, payment_required: bool },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Navigated { .. })
    }

    pub fn toast(&self) -> &Toast {
        match self {
            SubmitOutcome::Navigated { toast, .. } | SubmitOutcome::Failed { toast, .. } => toast,
        }
    }
}

impl<F: SubmissionTarget> StepController<F> {
    /// Reopen the submit gate and translate the backend response.
    ///
    /// A failure leaves the current step and every committed payload as they
    /// were so the user can retry.
    pub fn finish_submit(
        &mut self,
        result: Result<F::Response, ApiError>,
        locale: &str,
    ) -> SubmitOutcome {
        self.end_submit();
        match result {
            Ok(response) => {
                let route = F::success_route();
                let path = route.path(locale);
                tracing::info!(path = %path, response = ?response, "submission accepted");
                SubmitOutcome::Navigated {
                    route,
                    path,
                    toast: Toast::info(F::success_message(&response)),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                SubmitOutcome::Failed {
                    payment_required: err.is_payment_required(),
                    toast: Toast::error(err.user_message()),
                }
            }
        }
    }
}

/// Run one submission end to end on the current task
pub async fn submit<F: SubmissionTarget>(
    controller: &mut StepController<F>,
    api: &dyn DashboardApi,
    locale: &str,
) -> Result<SubmitOutcome, WizardError> {
    let submission = controller.begin_submit()?;
    let result = F::send(api, submission).await;
    Ok(controller.finish_submit(result, locale))
}
