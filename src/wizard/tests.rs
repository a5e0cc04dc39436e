use super::*;
use crate::api::mock::MockApi;
use crate::api::{AddCardRequest, ApiError, DashboardApi};
use crate::routes::Route;
use crate::toast::ToastKind;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Name,
    Card,
    Review,
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Name(String),
    Card(String),
    Review,
}

struct CardFlow {
    steps: Vec<StepDefinition<Kind>>,
}

impl CardFlow {
    fn new() -> Self {
        Self {
            steps: vec![
                StepDefinition { id: 1, label: "Name", kind: Kind::Name },
                StepDefinition { id: 2, label: "Card", kind: Kind::Card },
                StepDefinition { id: 3, label: "Review", kind: Kind::Review },
            ],
        }
    }
}

impl WizardFlow for CardFlow {
    type StepKind = Kind;
    type Payload = Payload;
    type Submission = (String, String);

    fn steps(&self) -> &[StepDefinition<Kind>] {
        &self.steps
    }

    fn step_kind_of(payload: &Payload) -> Kind {
        match payload {
            Payload::Name(_) => Kind::Name,
            Payload::Card(_) => Kind::Card,
            Payload::Review => Kind::Review,
        }
    }

    fn build_submission(&self, state: &WizardState<Payload>) -> Result<(String, String), WizardError> {
        let name = match state.require(1)? {
            Payload::Name(n) => n.clone(),
            _ => return Err(WizardError::WrongStep(1)),
        };
        let card = match state.require(2)? {
            Payload::Card(c) => c.clone(),
            _ => return Err(WizardError::WrongStep(2)),
        };
        Ok((name, card))
    }
}

#[async_trait]
impl SubmissionTarget for CardFlow {
    type Response = ();

    async fn send(api: &dyn DashboardApi, submission: (String, String)) -> Result<(), ApiError> {
        api.add_stripe_card(&AddCardRequest {
            exp_month: "12".into(),
            exp_year: "30".into(),
            card_number: submission.1,
            cvc: "123".into(),
        })
        .await
    }

    fn success_route() -> Route {
        Route::Dashboard
    }

    fn success_message(_: &()) -> String {
        "Card saved".to_string()
    }
}

fn completed_controller() -> StepController<CardFlow> {
    let mut controller = StepController::new(CardFlow::new());
    controller.commit_and_advance(Payload::Name("Ada".into())).unwrap();
    controller
        .commit_and_advance(Payload::Card("4242424242424242".into()))
        .unwrap();
    controller
}

#[test]
fn test_starts_on_first_step() {
    let controller = StepController::new(CardFlow::new());
    assert_eq!(controller.current_step(), 1);
    assert!(!controller.is_final_step());
    assert!(!controller.is_submitting());
    assert!(matches!(
        controller.active_step(),
        ActiveStep::Step(StepDefinition { kind: Kind::Name, .. })
    ));
}

#[test]
fn test_commit_advances_and_clamps_at_last_step() {
    let mut controller = StepController::new(CardFlow::new());
    for expected in [2, 3, 3, 3] {
        let payload = match controller.current_step() {
            1 => Payload::Name("Ada".into()),
            2 => Payload::Card("4242".into()),
            _ => Payload::Review,
        };
        controller.commit_and_advance(payload).unwrap();
        assert_eq!(controller.current_step(), expected);
    }
    assert!(controller.is_final_step());
}

#[test]
fn test_commit_rejects_payload_of_another_step() {
    let mut controller = StepController::new(CardFlow::new());
    let err = controller
        .commit_and_advance(Payload::Card("4242".into()))
        .unwrap_err();
    assert_eq!(err, WizardError::WrongStep(1));
    assert_eq!(controller.current_step(), 1);
    assert!(controller.payload(1).is_none());
}

#[test]
fn test_going_back_keeps_committed_payload() {
    let mut controller = completed_controller();
    assert!(controller.go_to_step(1));
    assert_eq!(controller.payload(1), Some(&Payload::Name("Ada".into())));

    // recommitting overwrites only that step
    controller.commit_and_advance(Payload::Name("Grace".into())).unwrap();
    assert_eq!(controller.current_step(), 2);
    assert_eq!(controller.payload(1), Some(&Payload::Name("Grace".into())));
    assert_eq!(
        controller.payload_for(Kind::Card),
        Some(&Payload::Card("4242424242424242".into()))
    );
}

#[test]
fn test_go_to_step_allows_forward_skip() {
    let mut controller = StepController::new(CardFlow::new());
    assert!(controller.go_to_step(3));
    assert!(controller.is_final_step());
    assert_eq!(controller.submission(), Err(WizardError::MissingPayload(1)));
}

#[test]
fn test_go_to_step_past_end_shows_unknown_step() {
    let mut controller = StepController::new(CardFlow::new());
    assert!(controller.go_to_step(4));
    assert_eq!(controller.active_step(), ActiveStep::Unknown(4));
    assert!(!controller.go_to_step(9));
    assert!(!controller.go_to_step(0));
    assert_eq!(controller.current_step(), 4);
}

#[test]
fn test_indicator_marks_completed_active_pending() {
    let mut controller = StepController::new(CardFlow::new());
    controller.commit_and_advance(Payload::Name("Ada".into())).unwrap();
    let states: Vec<_> = controller.indicator().into_iter().map(|(_, s)| s).collect();
    assert_eq!(
        states,
        vec![
            IndicatorState::Completed,
            IndicatorState::Active,
            IndicatorState::Pending
        ]
    );
}

#[test]
fn test_begin_submit_requires_final_step() {
    let mut controller = StepController::new(CardFlow::new());
    assert_eq!(controller.begin_submit(), Err(WizardError::NotOnFinalStep));
    assert!(!controller.is_submitting());
}

#[test]
fn test_begin_submit_is_single_flight() {
    let mut controller = completed_controller();
    let submission = controller.begin_submit().unwrap();
    assert_eq!(submission, ("Ada".to_string(), "4242424242424242".to_string()));
    assert!(controller.is_submitting());
    assert_eq!(controller.begin_submit(), Err(WizardError::SubmissionInFlight));
}

#[tokio::test]
async fn test_successful_submit_navigates_with_toast() {
    let api = MockApi::new();
    let mut controller = completed_controller();

    let outcome = submit(&mut controller, &api, "en").await.unwrap();
    match outcome {
        SubmitOutcome::Navigated { route, path, toast } => {
            assert_eq!(route, Route::Dashboard);
            assert_eq!(path, "/en/dashboard");
            assert_eq!(toast.kind, ToastKind::Info);
            assert_eq!(toast.message, "Card saved");
        }
        other => panic!("expected navigation, got {other:?}"),
    }
    assert_eq!(api.calls(), vec!["add_stripe_card"]);
    assert!(!controller.is_submitting());
}

#[tokio::test]
async fn test_failed_submit_keeps_state_and_allows_retry() {
    let api = MockApi::failing(ApiError::Backend {
        status: 400,
        message: "Your card was declined.".into(),
    });
    let mut controller = completed_controller();
    let before = controller.state().clone();

    let outcome = submit(&mut controller, &api, "en").await.unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.toast().kind, ToastKind::Error);
    assert_eq!(outcome.toast().message, "Your card was declined.");
    assert_eq!(controller.state(), &before);
    assert!(!controller.is_submitting());

    api.recover();
    let retry = submit(&mut controller, &api, "en").await.unwrap();
    assert!(retry.is_success());
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn test_payment_required_is_flagged() {
    let api = MockApi::failing(ApiError::PaymentRequired {
        message: "Add a payment method".into(),
    });
    let mut controller = completed_controller();

    let outcome = submit(&mut controller, &api, "en").await.unwrap();
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed { payment_required: true, .. }
    ));
}
