//! In-memory [`DashboardApi`] for unit tests

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use super::error::ApiError;
use super::types::*;
use super::DashboardApi;

/// Records every call; answers with canned data or the configured error
#[derive(Default)]
pub struct MockApi {
    pub account: Account,
    pub stats: SaasStats,
    pub summaries: Vec<Summary>,
    fail_with: Mutex<Option<ApiError>>,
    calls: Mutex<Vec<String>>,
    purchases: Mutex<Vec<CreditPurchaseRequest>>,
    custom_requests: Mutex<Vec<CustomRequestSubmission>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: ApiError) -> Self {
        let api = Self::default();
        api.fail_next(err);
        api
    }

    /// Every call fails with `err` until [`MockApi::recover`]
    pub fn fail_next(&self, err: ApiError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn purchases(&self) -> Vec<CreditPurchaseRequest> {
        self.purchases.lock().unwrap().clone()
    }

    pub fn custom_requests(&self) -> Vec<CustomRequestSubmission> {
        self.custom_requests.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.to_string());
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn account(&self) -> Result<Account, ApiError> {
        self.record("account")?;
        Ok(self.account.clone())
    }

    async fn add_stripe_card(&self, _card: &AddCardRequest) -> Result<(), ApiError> {
        self.record("add_stripe_card")
    }

    async fn buy_credits(
        &self,
        purchase: &CreditPurchaseRequest,
    ) -> Result<CreditPurchaseReceipt, ApiError> {
        self.record("buy_credits")?;
        self.purchases.lock().unwrap().push(purchase.clone());
        Ok(CreditPurchaseReceipt {
            credits: purchase.credits,
            usage_credits: self.account.usage_credits + u64::from(purchase.credits),
        })
    }

    async fn create_custom_request(
        &self,
        request: &CustomRequestSubmission,
    ) -> Result<CustomRequestCreated, ApiError> {
        self.record("create_custom_request")?;
        let mut requests = self.custom_requests.lock().unwrap();
        requests.push(request.clone());
        Ok(CustomRequestCreated {
            id: requests.len() as u64,
        })
    }

    async fn remove_custom_request_from_access_group(
        &self,
        _removal: AccessGroupRemoval,
    ) -> Result<(), ApiError> {
        self.record("remove_custom_request_from_access_group")
    }

    async fn admin_stats(&self) -> Result<SaasStats, ApiError> {
        self.record("admin_stats")?;
        Ok(self.stats.clone())
    }

    async fn summaries(&self) -> Result<Vec<Summary>, ApiError> {
        self.record("summaries")?;
        Ok(self.summaries.clone())
    }

    async fn upload_files(&self, files: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError> {
        self.record("upload_files")?;
        Ok(files
            .iter()
            .enumerate()
            .map(|(i, f)| UploadedFile {
                id: i as u64 + 1,
                name: f.display().to_string(),
            })
            .collect())
    }
}
