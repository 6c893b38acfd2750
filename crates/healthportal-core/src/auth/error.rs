use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session was cleared after this sign-in started
    #[error("Session changed while sign-in was in progress - please sign in again")]
    Superseded,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("No verification code has been requested")]
    NotAwaitingOtp,

    #[error("Invalid OTP")]
    MissingToken,

    #[error("{0}")]
    Unexpected(String),
}
