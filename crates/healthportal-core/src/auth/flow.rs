//! Sign-in and sign-up flows.
//!
//! Both flows are two-step: credentials first, then a one-time code sent
//! by email. Only a verified code establishes a session, and it does so
//! through `SessionStore::complete_auth` so a logout that lands while the
//! code is being checked wins.

use anyhow::Result;
use tracing::{debug, info};

use super::FlowError;
use crate::api::{ApiClient, ApiError, VerifyOtpResponse};
use crate::models::{NewAccount, Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Credentials,
    Otp,
    Forgot,
    Reset,
}

/// Result of a verified login code
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: User,
    pub role: Role,
}

pub struct LoginFlow {
    api: ApiClient,
    step: LoginStep,
    email: String,
}

impl LoginFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            step: LoginStep::Credentials,
            email: String::new(),
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Submit email and password. The flow moves to the code step only when
    /// the backend confirms that a code was sent.
    pub async fn login(&mut self, email: &str, password: &str, is_admin: bool) -> Result<String> {
        let message = self.api.login(email, password, is_admin).await?;
        if !message.to_lowercase().contains("otp") {
            return Err(FlowError::Unexpected(message).into());
        }
        self.email = email.to_string();
        self.step = LoginStep::Otp;
        debug!(is_admin, "Login code requested");
        Ok(message)
    }

    /// Google sign-in: look up the provider profile, then ask the backend
    /// for a login code for that email.
    pub async fn google(&mut self, access_token: &str) -> Result<String> {
        let profile = self.api.google_profile(access_token).await?;
        let message = self.api.google_exchange(&profile).await?;
        self.email = profile.email;
        self.step = LoginStep::Otp;
        Ok(message)
    }

    /// Check the login code and sign in
    pub async fn verify_otp(&mut self, otp: &str) -> Result<SignedIn> {
        if self.step != LoginStep::Otp {
            return Err(FlowError::NotAwaitingOtp.into());
        }

        let session = self.api.session().clone();
        let ticket = session.begin_auth();
        let response = self.api.verify_login_otp(&self.email, otp).await?;
        let (user, token) = Self::credentials_from(response)?;

        session.complete_auth(ticket, user.clone(), token)?;
        self.step = LoginStep::Credentials;
        let role = user.role;
        info!(%role, "Login verified");
        Ok(SignedIn { user, role })
    }

    /// Switch to the forgotten-password form
    pub fn forgot_password(&mut self) {
        self.step = LoginStep::Forgot;
    }

    /// Ask for a password reset code
    pub async fn request_reset(&mut self, email: &str) -> Result<String> {
        let message = self.api.forgot_password(email).await?;
        self.email = email.to_string();
        self.step = LoginStep::Reset;
        Ok(message)
    }

    /// Set a new password using the reset code. The confirmation is checked
    /// before anything is sent.
    pub async fn reset_password(&mut self, otp: &str, new_password: &str, confirm: &str) -> Result<String> {
        if new_password != confirm {
            return Err(FlowError::PasswordMismatch.into());
        }
        if self.step != LoginStep::Reset {
            return Err(FlowError::NotAwaitingOtp.into());
        }
        let message = self.api.reset_password(&self.email, otp, new_password).await?;
        self.step = LoginStep::Credentials;
        Ok(message)
    }

    pub fn back_to_login(&mut self) {
        self.step = LoginStep::Credentials;
    }

    fn credentials_from(response: VerifyOtpResponse) -> Result<(User, String)> {
        match response.token.filter(|t| !t.is_empty()) {
            // The backend may omit the user; an empty identity is still cached
            Some(token) => Ok((response.user.unwrap_or_default(), token)),
            None => Err(match response.message {
                Some(message) => ApiError::Rejected(message).into(),
                None => FlowError::MissingToken.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    Details,
    Verify,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    /// The backend issued a session straight away
    SignedIn(User),
    /// Email verified; the user continues at the login screen
    Verified(String),
}

pub struct SignupFlow {
    api: ApiClient,
    step: SignupStep,
    email: String,
}

impl SignupFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            step: SignupStep::Details,
            email: String::new(),
        }
    }

    pub fn step(&self) -> SignupStep {
        self.step
    }

    /// Resume at the verification step for an account created earlier
    pub fn resume(api: ApiClient, email: &str) -> Self {
        Self {
            api,
            step: SignupStep::Verify,
            email: email.to_string(),
        }
    }

    pub async fn signup(&mut self, account: &NewAccount) -> Result<String> {
        let message = self.api.signup(account).await?;
        self.email = account.email.clone();
        self.step = SignupStep::Verify;
        Ok(message)
    }

    /// Google sign-up goes through the same code challenge
    pub async fn google(&mut self, access_token: &str) -> Result<String> {
        let profile = self.api.google_profile(access_token).await?;
        let message = self.api.google_exchange(&profile).await?;
        self.email = profile.email;
        self.step = SignupStep::Verify;
        Ok(message)
    }

    pub async fn verify(&mut self, otp: &str) -> Result<SignupOutcome> {
        if self.step != SignupStep::Verify {
            return Err(FlowError::NotAwaitingOtp.into());
        }

        let session = self.api.session().clone();
        let ticket = session.begin_auth();
        let response = self.api.verify_signup_otp(&self.email, otp).await?;

        let outcome = match response.token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let user = response.user.unwrap_or_default();
                session.complete_auth(ticket, user.clone(), token)?;
                SignupOutcome::SignedIn(user)
            }
            None => {
                info!("Email verified, continuing at login");
                SignupOutcome::Verified(
                    response
                        .message
                        .unwrap_or_else(|| "Email verified successfully!".to_string()),
                )
            }
        };
        self.step = SignupStep::Details;
        Ok(outcome)
    }
}
