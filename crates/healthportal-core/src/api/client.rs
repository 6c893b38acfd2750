//! API client for the portal REST backend.
//!
//! `ApiClient` holds a `SessionStore` handle rather than a token. Each
//! request reads the credential when it is built, so a sign-in or logout
//! anywhere is reflected by the very next call.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::models::{
    Article, ArticleInput, GoogleProfile, Medicine, MedicineInput, NewAccount, NewReview,
    NewTicket, Review, ReviewUpdate, Ticket, User, UserUpdate,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Identity provider endpoint that turns an access token into a profile
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) GET requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    success: Option<bool>,
}

/// Body returned by both OTP verification endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: usize,
    pub articles: usize,
    pub reviews: usize,
    pub open_tickets: usize,
}

/// Whether a request carries the session credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Session,
    Anonymous,
}

/// API client for the portal backend.
/// Clone is cheap - reqwest::Client and SessionStore are both shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    userinfo_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. "http://localhost:5000")
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            session,
        })
    }

    /// Point Google profile lookups somewhere else
    pub fn with_userinfo_url(mut self, url: &str) -> Self {
        self.userinfo_url = url.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Build a request against the backend, carrying the credential held
    /// by the session at this moment.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.build(method, path, self.session.credential())
    }

    fn build(&self, method: Method, path: &str, credential: Option<String>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match credential {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// The credential for a request. Sign-in endpoints never carry one, so
    /// a failed login cannot be mistaken for a dead session.
    fn credential_for(&self, auth: Auth) -> Option<String> {
        match auth {
            Auth::Session => self.session.credential(),
            Auth::Anonymous => None,
        }
    }

    /// Turn a non-2xx response into an `ApiError`. A 401 on a request that
    /// carried a credential means the credential is dead, so the session is
    /// cleared.
    async fn check_response(&self, response: Response, had_credential: bool) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        if err.is_unauthorized() && had_credential {
            self.session.invalidate();
        }
        Err(err.into())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<Response> {
        let credential = self.credential_for(auth);
        let had_credential = credential.is_some();
        let mut request = self.build(method.clone(), path, credential);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, path))?;
        self.check_response(response, had_credential).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let credential = self.session.credential();
            let had_credential = credential.is_some();
            let response = self
                .build(Method::GET, path, credential)
                .query(query)
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", path))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS
                && retries < MAX_RATE_LIMIT_RETRIES
            {
                retries += 1;
                warn!(path, retry = retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let response = self.check_response(response, had_credential).await?;
            debug!(path, "GET succeeded");
            return response
                .json()
                .await
                .with_context(|| format!("Failed to parse response from {}", path));
        }
    }

    /// GET a listing. Anything other than a JSON array is treated as an
    /// empty list.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        self.get_list_with_query(path, &[]).await
    }

    async fn get_list_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let value: Value = self.get_with_query(path, query).await?;
        if !value.is_array() {
            warn!(path, "Expected a list, treating response as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(value).with_context(|| format!("Failed to parse list from {}", path))
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to encode request body")?;
        let response = self.execute(method, path, Some(&body), auth).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", path))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::POST, path, body, Auth::Session).await
    }

    /// POST to a sign-in endpoint, without the session credential
    async fn post_anonymous<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::POST, path, body, Auth::Anonymous).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::PUT, path, body, Auth::Session).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None, Auth::Session).await?;
        Ok(())
    }

    fn message_or(response: MessageResponse, fallback: &str) -> String {
        response
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Register an account; the backend emails a verification code
    pub async fn signup(&self, account: &NewAccount) -> Result<String> {
        let response: MessageResponse = self.post_anonymous("/api/auth/signup", account).await?;
        Ok(Self::message_or(response, "Verification code sent"))
    }

    pub async fn verify_signup_otp(&self, email: &str, otp: &str) -> Result<VerifyOtpResponse> {
        self.post_anonymous("/api/auth/verify-otp", &json!({ "email": email, "otp": otp }))
            .await
    }

    /// Check email and password; on success the backend sends a login code
    /// and answers with a message about it.
    pub async fn login(&self, email: &str, password: &str, is_admin: bool) -> Result<String> {
        let response: MessageResponse = self
            .post_anonymous(
                "/api/auth/login",
                &json!({ "email": email, "password": password, "isAdmin": is_admin }),
            )
            .await?;
        Ok(response.message.unwrap_or_default())
    }

    pub async fn verify_login_otp(&self, email: &str, otp: &str) -> Result<VerifyOtpResponse> {
        self.post_anonymous("/api/auth/verify-login-otp", &json!({ "email": email, "otp": otp }))
            .await
    }

    /// Look up the provider profile for a Google access token. The provider
    /// token is sent instead of the session credential.
    pub async fn google_profile(&self, access_token: &str) -> Result<GoogleProfile> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to reach identity provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        response
            .json()
            .await
            .context("Failed to parse identity provider profile")
    }

    /// Hand a Google profile to the backend, which answers with an OTP
    /// challenge for that email.
    pub async fn google_exchange(&self, profile: &GoogleProfile) -> Result<String> {
        let response: MessageResponse = self
            .post_anonymous(
                "/api/auth/google",
                &json!({ "email": profile.email, "name": profile.name }),
            )
            .await?;
        if response.success != Some(true) {
            let message = Self::message_or(response, "Google login failed");
            return Err(ApiError::Rejected(message).into());
        }
        Ok(Self::message_or(response, "Verification code sent"))
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let response: MessageResponse = self
            .post("/api/auth/forgot-password", &json!({ "email": email }))
            .await?;
        Ok(Self::message_or(response, "Reset code sent"))
    }

    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> Result<String> {
        let response: MessageResponse = self
            .post_anonymous(
                "/api/auth/reset-password",
                &json!({ "email": email, "otp": otp, "newPassword": new_password }),
            )
            .await?;
        Ok(Self::message_or(response, "Password updated"))
    }

    /// The signed-in user's profile
    pub async fn me(&self) -> Result<User> {
        self.get("/api/auth/me").await
    }

    // ========================================================================
    // Articles
    // ========================================================================

    pub async fn list_articles(&self, category: Option<&str>, limit: Option<usize>) -> Result<Vec<Article>> {
        let mut query = Vec::new();
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_list_with_query("/api/articles", &query).await
    }

    pub async fn get_article(&self, id: &str) -> Result<Article> {
        self.get(&format!("/api/articles/{}", id)).await
    }

    pub async fn create_article(&self, article: &ArticleInput) -> Result<Article> {
        self.post("/api/articles", article).await
    }

    pub async fn update_article(&self, id: &str, article: &ArticleInput) -> Result<Article> {
        self.put(&format!("/api/articles/{}", id), article).await
    }

    pub async fn delete_article(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/articles/{}", id)).await
    }

    // ========================================================================
    // Medicines
    // ========================================================================

    pub async fn list_medicines(&self) -> Result<Vec<Medicine>> {
        self.get_list("/api/medicine").await
    }

    pub async fn create_medicine(&self, medicine: &MedicineInput) -> Result<Medicine> {
        self.post("/api/medicine", medicine).await
    }

    pub async fn update_medicine(&self, id: &str, medicine: &MedicineInput) -> Result<Medicine> {
        self.put(&format!("/api/medicine/{}", id), medicine).await
    }

    pub async fn delete_medicine(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/medicine/{}", id)).await
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    pub async fn list_reviews(&self) -> Result<Vec<Review>> {
        self.get_list("/api/reviews").await
    }

    pub async fn my_reviews(&self) -> Result<Vec<Review>> {
        self.get_list("/api/reviews/my-reviews").await
    }

    pub async fn create_review(&self, review: &NewReview) -> Result<Review> {
        self.post("/api/reviews", review).await
    }

    pub async fn update_review(&self, id: &str, update: &ReviewUpdate) -> Result<Review> {
        self.put(&format!("/api/reviews/{}", id), update).await
    }

    pub async fn delete_review(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/reviews/{}", id)).await
    }

    // ========================================================================
    // Support tickets
    // ========================================================================

    pub async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.get_list("/api/support").await
    }

    pub async fn my_tickets(&self) -> Result<Vec<Ticket>> {
        self.get_list("/api/support/my-tickets").await
    }

    pub async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        self.post("/api/support", ticket).await
    }

    /// Resolve a ticket and email `message` to its author
    pub async fn reply_to_ticket(&self, id: &str, message: &str) -> Result<()> {
        let _: Value = self
            .put(&format!("/api/support/{}", id), &json!({ "customMessage": message }))
            .await?;
        Ok(())
    }

    /// Resolve a ticket without a reply
    pub async fn resolve_ticket(&self, id: &str) -> Result<()> {
        let path = format!("/api/support/{}/resolve", id);
        self.execute(Method::PATCH, &path, None, Auth::Session).await?;
        Ok(())
    }

    // ========================================================================
    // Admin: users
    // ========================================================================

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.get_list("/api/admin/users").await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        self.put(&format!("/api/admin/users/{}", id), update).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/admin/users/{}", id)).await
    }

    /// Fetch the four admin listings concurrently and count them.
    /// A listing that fails counts as zero.
    pub async fn dashboard_stats(&self) -> DashboardStats {
        let (users, articles, reviews, tickets) = futures::join!(
            self.list_users(),
            self.list_articles(None, None),
            self.list_reviews(),
            self.list_tickets(),
        );

        fn count<T>(name: &str, result: Result<Vec<T>>) -> Vec<T> {
            result.unwrap_or_else(|e| {
                warn!(listing = name, error = %e, "Failed to load dashboard listing");
                Vec::new()
            })
        }

        DashboardStats {
            users: count("users", users).len(),
            articles: count("articles", articles).len(),
            reviews: count("reviews", reviews).len(),
            open_tickets: count("tickets", tickets)
                .iter()
                .filter(|t| t.is_open())
                .count(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, StorageSignal};
    use reqwest::header::AUTHORIZATION;
    use std::sync::Arc;

    fn client() -> ApiClient {
        let store = SessionStore::open(Arc::new(MemoryStorage::new()), StorageSignal::new());
        ApiClient::new("http://localhost:5000/", store).unwrap()
    }

    fn auth_header(client: &ApiClient) -> Option<String> {
        let request = client.request(Method::GET, "/api/auth/me").build().unwrap();
        request
            .headers()
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_request_reads_credential_at_build_time() {
        let client = client();
        assert_eq!(auth_header(&client), None);

        client.session().set_credential(Some("tok".to_string()));
        assert_eq!(auth_header(&client).as_deref(), Some("Bearer tok"));

        // A clone made earlier still sees the change
        let earlier = client.clone();
        client.session().set_credential(Some("rotated".to_string()));
        assert_eq!(auth_header(&earlier).as_deref(), Some("Bearer rotated"));

        client.session().logout();
        assert_eq!(auth_header(&client), None);
    }

    #[test]
    fn test_request_url_joins_base() {
        let client = client();
        let request = client.request(Method::GET, "/api/medicine").build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:5000/api/medicine");
    }
}
