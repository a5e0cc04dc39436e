//! Backend API access
//!
//! This module provides:
//! - The `DashboardApi` trait, one method per backend endpoint
//! - `HttpDashboardClient`, the reqwest implementation with a cookie session
//! - Wire types and error mapping

pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use client::HttpDashboardClient;
pub use error::ApiError;
pub use types::*;

use async_trait::async_trait;
use std::path::PathBuf;

/// Endpoint paths relative to the configured base URL
pub mod paths {
    pub const ACCOUNT: &str = "/api/v1/account";
    pub const ADD_STRIPE_CARD: &str = "/api/v1/account/add-stripe-card";
    pub const BUY_CREDITS: &str = "/api/v1/account/buy-credits";
    pub const CUSTOM_REQUEST: &str = "/api/v1/custom-request";
    pub const REMOVE_FROM_ACCESS_GROUP: &str = "/api/v1/remove-custom-request-from-access-group";
    pub const ADMIN_DASHBOARD: &str = "/api/v1/admin/dashboard";
    pub const SUMMARIES: &str = "/api/v1/summaries";
    pub const UPLOAD_FILES: &str = "/api/v1/upload-files";
}

/// Operations the dashboard needs from the backend.
///
/// Every call is a single round trip; retries and timeouts are left to the
/// backend and transport.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn account(&self) -> Result<Account, ApiError>;

    async fn add_stripe_card(&self, card: &AddCardRequest) -> Result<(), ApiError>;

    async fn buy_credits(
        &self,
        purchase: &CreditPurchaseRequest,
    ) -> Result<CreditPurchaseReceipt, ApiError>;

    async fn create_custom_request(
        &self,
        request: &CustomRequestSubmission,
    ) -> Result<CustomRequestCreated, ApiError>;

    async fn remove_custom_request_from_access_group(
        &self,
        removal: AccessGroupRemoval,
    ) -> Result<(), ApiError>;

    async fn admin_stats(&self) -> Result<SaasStats, ApiError>;

    async fn summaries(&self) -> Result<Vec<Summary>, ApiError>;

    async fn upload_files(&self, files: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError>;
}
