//! Request and response bodies exchanged with the backend

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{LanguageModel, ScanningMode};

/// Account/profile of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub usage_credits: u64,
    #[serde(default)]
    pub has_payment_method: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub access_groups: Vec<AccessGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGroup {
    pub id: u64,
    pub name: String,
}

/// Body of `POST /api/v1/account/add-stripe-card`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCardRequest {
    pub exp_month: String,
    pub exp_year: String,
    pub card_number: String,
    pub cvc: String,
}

/// Body of `POST /api/v1/account/buy-credits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPurchaseRequest {
    pub credits: u32,
    pub card_number: String,
    pub name: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
    pub save_card: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPurchaseReceipt {
    pub credits: u32,
    #[serde(default)]
    pub usage_credits: u64,
}

/// Customizations sent alongside the files of a custom request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequestCustomizations {
    pub mode: ScanningMode,
    pub model: LanguageModel,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_prompt: Option<String>,
    #[serde(default)]
    pub include_final_prompt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
}

/// Everything `POST /api/v1/custom-request` needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRequestSubmission {
    pub customizations: CustomRequestCustomizations,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRequestCreated {
    pub id: u64,
}

/// Body of `DELETE /api/v1/remove-custom-request-from-access-group`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGroupRemoval {
    pub custom_request_id: u64,
    pub access_group_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeAmount {
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeSum {
    #[serde(rename = "_sum", default)]
    pub sum: ChargeAmount,
}

/// Aggregate statistics from `GET /api/v1/admin/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaasStats {
    pub total_accounts: u64,
    pub paid_accounts_count: u64,
    pub verified_accounts_count: u64,
    pub total_summaries: u64,
    #[serde(rename = "totalSummariesV1")]
    pub total_summaries_v1: u64,
    #[serde(rename = "totalSummariesV2")]
    pub total_summaries_v2: u64,
    #[serde(default)]
    pub total_open_ai_charges: ChargeSum,
    pub monthly_active_users: u64,
    pub total_searches: u64,
    pub total_custom_requests: u64,
    #[serde(default)]
    pub average_rating: f64,
}

/// One row of the summaries table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: u64,
    pub original_char_count: u64,
    pub condensed_char_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: u64,
    pub name: String,
}
