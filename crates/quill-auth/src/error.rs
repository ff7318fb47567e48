use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("auth API error: {0}")]
    Api(String),

    #[error("token store error: {0}")]
    TokenStore(String),
}
