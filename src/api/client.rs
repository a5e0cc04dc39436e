//! reqwest implementation of [`DashboardApi`]

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::ApiError;
use super::types::*;
use super::{paths, DashboardApi};
use crate::config::ApiConfig;

/// HTTP client for the dashboard backend.
///
/// All requests share one cookie jar so the session cookie set by the
/// backend (or seeded from config) is sent with every call.
pub struct HttpDashboardClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpDashboardClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::NotConfigured);
        }
        // Trailing slash so joined paths keep any prefix of the base
        let base = format!("{}/", config.base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&base)
            .map_err(|e| ApiError::Network(format!("invalid base url: {e}")))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = config.session_cookie.as_deref() {
            jar.add_cookie_str(cookie, &base_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_provider(jar)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Network(format!("invalid path {path}: {e}")))?;
        tracing::debug!(method = %method, path, "backend request");
        Ok(self.client.request(method, url))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), error = %err, "backend returned an error");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Content type sent for an attached file, by extension
pub fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::File {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    Part::bytes(bytes)
        .file_name(name)
        .mime_str(mime_for(path))
        .map_err(|e| ApiError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

async fn files_form(files: &[PathBuf]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for path in files {
        form = form.part("files", file_part(path).await?);
    }
    Ok(form)
}

#[async_trait]
impl DashboardApi for HttpDashboardClient {
    async fn account(&self) -> Result<Account, ApiError> {
        Self::send_json(self.request(Method::GET, paths::ACCOUNT)?).await
    }

    async fn add_stripe_card(&self, card: &AddCardRequest) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, paths::ADD_STRIPE_CARD)?.json(card);
        Self::send(builder).await?;
        Ok(())
    }

    async fn buy_credits(
        &self,
        purchase: &CreditPurchaseRequest,
    ) -> Result<CreditPurchaseReceipt, ApiError> {
        let builder = self.request(Method::POST, paths::BUY_CREDITS)?.json(purchase);
        Self::send_json(builder).await
    }

    async fn create_custom_request(
        &self,
        request: &CustomRequestSubmission,
    ) -> Result<CustomRequestCreated, ApiError> {
        let customizations = serde_json::to_string(&request.customizations)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let form = files_form(&request.files)
            .await?
            .text("customizations", customizations);
        let builder = self
            .request(Method::POST, paths::CUSTOM_REQUEST)?
            .multipart(form);
        Self::send_json(builder).await
    }

    async fn remove_custom_request_from_access_group(
        &self,
        removal: AccessGroupRemoval,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::DELETE, paths::REMOVE_FROM_ACCESS_GROUP)?
            .json(&removal);
        Self::send(builder).await?;
        Ok(())
    }

    async fn admin_stats(&self) -> Result<SaasStats, ApiError> {
        Self::send_json(self.request(Method::GET, paths::ADMIN_DASHBOARD)?).await
    }

    async fn summaries(&self) -> Result<Vec<Summary>, ApiError> {
        Self::send_json(self.request(Method::GET, paths::SUMMARIES)?).await
    }

    async fn upload_files(&self, files: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError> {
        let form = files_form(files).await?;
        let builder = self
            .request(Method::POST, paths::UPLOAD_FILES)?
            .multipart(form);
        Self::send_json(builder).await
    }
}
