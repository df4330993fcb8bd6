use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WooApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("The request timed out: {0}")]
    Timeout(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl WooApiError {
    /// True if the server answered, but the route does not exist (e.g. the Dokan plugin is not installed).
    pub fn is_not_found(&self) -> bool {
        matches!(self, WooApiError::QueryError { status: 404, .. })
    }
}

impl From<reqwest::Error> for WooApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WooApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            WooApiError::JsonError(e.to_string())
        } else {
            WooApiError::RestResponseError(e.to_string())
        }
    }
}
