//! # Dokan print agent
//! Watches a WooCommerce/Dokan marketplace for new orders that belong to one vendor and hands each of them, exactly
//! once, to a printer.
//!
//! * [`fetcher`] asks the store for the vendor's processing orders, escalating through several query strategies.
//! * [`ownership`] verifies that every order really belongs to the vendor before it can be printed.
//! * [`ledger`] remembers which orders have been handled, across restarts.
//! * [`listener`] runs the polling loop and calls the order handler.
//! * [`identity`] works out the vendor id from the credentials when none is configured.
//!
//! ## Configuration
//! The agent is configured via environment variables. See [config](config/index.html) for more information.

pub mod agent;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod fetcher;
pub mod history;
pub mod identity;
pub mod ledger;
pub mod listener;
pub mod ownership;
pub mod printer;
pub mod traits;

#[cfg(test)]
mod test_utils;

pub use config::AgentConfig;
pub use errors::AgentError;
pub use listener::{CycleReport, DispatchFuture, OrderHandler, OrderListener};
pub use traits::DokanApi;
