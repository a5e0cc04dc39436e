//! End-to-end wizard submissions against an in-process fake backend
//!
//! Each test drives a wizard through its forms, submits it with the real
//! HTTP client and checks both the request the backend saw and the outcome
//! the UI would act on.

use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docdash::api::{AccessGroupRemoval, ApiError, DashboardApi, HttpDashboardClient};
use docdash::config::{ApiConfig, CreditsConfig, UploadsConfig};
use docdash::dashboard::{format_openai_amount, format_rating};
use docdash::flows::buy_credits::{AmountForm, PaymentForm};
use docdash::flows::custom_request::{ChosenFile, ChosenFiles, CustomizeForm};
use docdash::flows::{BuyCreditsFlow, BuyCreditsPayload, CustomRequestFlow, CustomRequestPayload};
use docdash::models::{ModelCatalog, ScanningMode};
use docdash::routes::Route;
use docdash::toast::ToastKind;
use docdash::wizard::{submit, StepController, StepForm, SubmitOutcome};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn client_for(server: &MockServer) -> HttpDashboardClient {
    HttpDashboardClient::new(&ApiConfig {
        base_url: server.uri(),
        session_cookie: Some("sid=abc123".to_string()),
        user_agent: "docdash-test".to_string(),
    })
    .unwrap()
}

/// Buy-credits wizard sitting on its review step: 500 credits, card 4242
fn buy_credits_at_review() -> StepController<BuyCreditsFlow> {
    let mut controller = StepController::new(BuyCreditsFlow::new());

    let mut amount = AmountForm::new(&CreditsConfig::default(), None);
    amount.select(1);
    controller
        .commit_and_advance(BuyCreditsPayload::Amount(amount.validate().unwrap()))
        .unwrap();

    let mut payment = PaymentForm::new(25, None);
    payment.card_number = "4242 4242 4242 4242".to_string();
    payment.name = "Ada Lovelace".to_string();
    payment.expiry = "12/30".to_string();
    payment.cvc = "123".to_string();
    controller
        .commit_and_advance(BuyCreditsPayload::Payment(payment.validate().unwrap()))
        .unwrap();

    assert!(controller.is_final_step());
    controller
}

fn write_pdf(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"%PDF-1.4 quarterly report").unwrap();
    path
}

// ─── Buy credits ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_buy_credits_posts_purchase_and_navigates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/account/buy-credits"))
        .and(header("cookie", "sid=abc123"))
        .and(body_json(json!({
            "credits": 500,
            "card_number": "4242424242424242",
            "name": "Ada Lovelace",
            "exp_month": "12",
            "exp_year": "30",
            "cvc": "123",
            "save_card": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"credits": 500, "usageCredits": 525})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut controller = buy_credits_at_review();
    let outcome = submit(&mut controller, &client, "en").await.unwrap();

    match outcome {
        SubmitOutcome::Navigated { route, path, toast } => {
            assert_eq!(route, Route::Dashboard);
            assert_eq!(path, "/en/dashboard");
            assert_eq!(toast.kind, ToastKind::Info);
            assert_eq!(toast.message, "Purchased 500 credits");
        }
        other => panic!("expected navigation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_backend_error_message_reaches_toast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/account/buy-credits"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "Card declined"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut controller = buy_credits_at_review();
    let outcome = submit(&mut controller, &client, "en").await.unwrap();

    match outcome {
        SubmitOutcome::Failed {
            toast,
            payment_required,
        } => {
            assert_eq!(toast.kind, ToastKind::Error);
            assert_eq!(toast.message, "Card declined");
            assert!(!payment_required);
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // Still on review with every payload kept; a retry is allowed
    assert!(controller.is_final_step());
    assert!(!controller.is_submitting());
    assert_eq!(controller.submission().unwrap().credits, 500);
}

#[tokio::test]
async fn test_payment_required_is_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/account/buy-credits"))
        .respond_with(
            ResponseTemplate::new(402).set_body_json(json!({"error": "Add a payment method"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut controller = buy_credits_at_review();
    let outcome = submit(&mut controller, &client, "en").await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            toast: docdash::toast::Toast::error("Add a payment method"),
            payment_required: true,
        }
    );
}

// ─── Custom request ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_custom_request_multipart_lands_on_queue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/custom-request"))
        .and(body_string_contains("FILE_OVERALL"))
        .and(body_string_contains("report.pdf"))
        .and(body_string_contains("Summarize the following data."))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uploads = UploadsConfig::default();
    let files = ChosenFiles(vec![
        ChosenFile::inspect(&write_pdf(&dir, "report.pdf"), &uploads).unwrap(),
    ]);

    let mut controller = StepController::new(CustomRequestFlow::new());
    controller
        .commit_and_advance(CustomRequestPayload::Files(files.clone()))
        .unwrap();

    let mut form = CustomizeForm::new(&ModelCatalog::default(), 0, Some(&files), None);
    form.mode = ScanningMode::FileOverall;
    form.apply_prompt(&docdash::models::PREBUILT_PROMPTS[0]);
    controller
        .commit_and_advance(CustomRequestPayload::Customize(form.validate().unwrap()))
        .unwrap();

    let client = client_for(&server);
    let outcome = submit(&mut controller, &client, "en").await.unwrap();

    match outcome {
        SubmitOutcome::Navigated { route, path, toast } => {
            assert_eq!(route, Route::Queue);
            assert_eq!(path, "/en/dashboard/queue");
            assert_eq!(toast.message, "Custom request is processing");
        }
        other => panic!("expected navigation, got {other:?}"),
    }
}

// ─── Other endpoints ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_access_group_removal_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/remove-custom-request-from-access-group"))
        .and(body_json(json!({"customRequestId": 7, "accessGroupId": 3})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .remove_custom_request_from_access_group(AccessGroupRemoval {
            custom_request_id: 7,
            access_group_id: 3,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_admin_stats_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalAccounts": 120,
            "paidAccountsCount": 30,
            "verifiedAccountsCount": 90,
            "totalSummaries": 400,
            "totalSummariesV1": 100,
            "totalSummariesV2": 300,
            "totalOpenAiCharges": {"_sum": {"amount": 1.5}},
            "monthlyActiveUsers": 44,
            "totalSearches": 12,
            "totalCustomRequests": 8,
            "averageRating": 0.875
        })))
        .mount(&server)
        .await;

    let stats = client_for(&server).admin_stats().await.unwrap();
    assert_eq!(stats.total_accounts, 120);
    assert_eq!(stats.total_summaries_v2, 300);
    assert_eq!(format_openai_amount(&stats), "1.50000");
    assert_eq!(format_rating(&stats), "87.50%");
}

#[tokio::test]
async fn test_unauthorized_account_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/account"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).account().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend/api/v1/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "email": "ada@example.com",
            "usageCredits": 40
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpDashboardClient::new(&ApiConfig {
        base_url: format!("{}/backend", server.uri()),
        session_cookie: None,
        user_agent: "docdash-test".to_string(),
    })
    .unwrap();

    let account = client.account().await.unwrap();
    assert_eq!(account.id, 9);
    assert_eq!(account.usage_credits, 40);
}
