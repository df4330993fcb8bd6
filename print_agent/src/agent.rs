use std::sync::Arc;

use log::*;
use tokio::sync::Mutex;
use woo_tools::WooApi;

use crate::{
    config::AgentConfig,
    dispatch::print_dispatcher,
    errors::AgentError,
    history::OrderHistory,
    ledger::ProcessedOrderLedger,
    listener::OrderListener,
    printer::{Printer, SpoolPrinter},
};

/// Runs the agent until Ctrl-C is pressed.
pub async fn run_agent(config: AgentConfig) -> Result<(), AgentError> {
    config.validate_credentials()?;
    let api = WooApi::new(config.woo_config())?;
    if config.skip_preflight {
        warn!("🪛️ Skipping the connection check");
    } else {
        preflight_check(&api).await;
    }

    let mut history = OrderHistory::new(config.history_path(), config.history_size);
    history.load();
    let printer: Arc<dyn Printer> = Arc::new(SpoolPrinter::new(config.spool_dir(), &config.printer_id));
    let on_order = print_dispatcher(printer, Arc::new(Mutex::new(history)));

    let mut listener = OrderListener::new(Arc::new(api), ProcessedOrderLedger::new(config.ledger_path()));
    let vendor_id = listener.start(&config, on_order).await?;
    info!("🖨️ Printing orders for vendor {vendor_id} on '{}'. Press Ctrl-C to stop.", config.printer_id);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("🖨️ Could not listen for Ctrl-C. {e}");
    }
    info!("🖨️ Shutting down");
    listener.stop().await;
    Ok(())
}

async fn preflight_check(api: &WooApi) {
    match api.test_connection().await {
        Ok(()) => info!("🛒 Connected to the store"),
        Err(e) => {
            warn!("🛒 The connection check failed. {e}");
            warn!("🛒 The agent will keep trying on every poll. Check DPA_API_URL and the credentials.");
        },
    }
}
