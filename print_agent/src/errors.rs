use dpa_common::OrderId;
use thiserror::Error;
use woo_tools::WooApiError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid agent configuration. {0}")]
    ConfigurationError(String),
    #[error("Could not fetch vendor orders. {0}")]
    FetchError(String),
    #[error("Order {order_id} could not be dispatched. {reason}")]
    DispatchError { order_id: OrderId, reason: String },
    #[error("Could not persist local state. {0}")]
    PersistenceError(String),
    #[error("Store API error. {0}")]
    ApiError(#[from] WooApiError),
}

impl AgentError {
    /// Configuration and fetch failures need the operator's attention (missing credentials, unreachable store). The
    /// rest are audit concerns that should only be logged.
    pub fn is_actionable(&self) -> bool {
        matches!(self, AgentError::ConfigurationError(_) | AgentError::FetchError(_) | AgentError::ApiError(_))
    }
}

impl From<std::io::Error> for AgentError {
    fn from(e: std::io::Error) -> Self {
        AgentError::PersistenceError(e.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::PersistenceError(e.to_string())
    }
}
