use thiserror::Error;

/// Conditions callers are expected to branch on.
///
/// These travel inside `anyhow::Error`; recover them with
/// `err.downcast_ref::<FplError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FplError {
    /// A login-gated resource was requested on an unauthenticated session.
    #[error("not authorised to access {resource}, log in first")]
    Unauthorized { resource: String },

    #[error("login not successful, reason: {reason}")]
    LoginFailed { reason: String },

    #[error("email and password must be set (FPL_EMAIL / FPL_PASSWORD)")]
    MissingCredentials,

    #[error("http {status} for {url}")]
    Http { status: u16, url: String },

    #[error("gameweek with id {0} not found")]
    GameweekNotFound(u32),

    #[error("user id must be a positive number, got {0}")]
    InvalidUserId(i64),

    /// No explicit user id and the session has no current user.
    #[error("you must log in before requesting a user without an id")]
    NotLoggedIn,
}

impl FplError {
    pub fn unauthorized(resource: impl Into<String>) -> Self {
        Self::Unauthorized {
            resource: resource.into(),
        }
    }
}

/// Returns the domain error carried by `err`, if any.
pub fn fpl_error(err: &anyhow::Error) -> Option<&FplError> {
    err.downcast_ref::<FplError>()
}
