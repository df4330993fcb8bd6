//! The order listener: polls the store for the vendor's new orders and hands each one to a dispatch handler exactly
//! once per ledger lifetime.
//!
//! Each cycle fetches the vendor's processing orders, filters them by ownership, skips the ones already in the
//! [`ProcessedOrderLedger`], re-checks ownership order by order, and calls the handler. Cycles run on a single timer
//! task, so they never overlap, and the ledger lock is held for the whole cycle so the check-and-add on an id is
//! atomic.
use std::{fmt::Display, future::Future, pin::Pin, sync::Arc, time::Duration};

use dpa_common::{OrderId, VendorId};
use log::*;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use woo_tools::Order;

use crate::{
    config::AgentConfig,
    errors::AgentError,
    fetcher::fetch_vendor_orders,
    identity::resolve_vendor_id,
    ledger::ProcessedOrderLedger,
    ownership::{belongs_to_vendor, filter_by_vendor},
    traits::DokanApi,
};

pub type DispatchFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
/// Receives each new order. Printing, notifications and retries are the handler's business.
pub type OrderHandler = Arc<dyn Fn(Order) -> DispatchFuture + Send + Sync>;

/// What a single polling cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub foreign: usize,
    pub already_processed: usize,
    pub dispatched: usize,
    pub failed: usize,
}

impl Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} fetched, {} foreign, {} already processed, {} dispatched, {} failed",
            self.fetched, self.foreign, self.already_processed, self.dispatched, self.failed
        )
    }
}

struct RunningListener {
    vendor_id: VendorId,
    on_order: OrderHandler,
    timer: JoinHandle<()>,
}

enum ListenerState {
    Stopped,
    Running(RunningListener),
}

pub struct OrderListener<A: DokanApi + 'static> {
    api: Arc<A>,
    ledger: Arc<Mutex<ProcessedOrderLedger>>,
    state: ListenerState,
}

impl<A: DokanApi + 'static> OrderListener<A> {
    pub fn new(api: Arc<A>, ledger: ProcessedOrderLedger) -> Self {
        Self { api, ledger: Arc::new(Mutex::new(ledger)), state: ListenerState::Stopped }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ListenerState::Running(_))
    }

    /// The vendor being polled for, while running.
    pub fn vendor_id(&self) -> Option<&VendorId> {
        match &self.state {
            ListenerState::Running(r) => Some(&r.vendor_id),
            ListenerState::Stopped => None,
        }
    }

    pub fn ledger(&self) -> Arc<Mutex<ProcessedOrderLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Starts polling. A running listener is stopped first, so there is never more than one timer.
    ///
    /// If no vendor id is configured, one detection attempt is made; if that fails the listener stays stopped and a
    /// [`AgentError::ConfigurationError`] is returned. Otherwise the ledger is loaded, one cycle runs immediately and
    /// the timer is armed. Returns the vendor id in use.
    pub async fn start(&mut self, config: &AgentConfig, on_order: OrderHandler) -> Result<VendorId, AgentError> {
        if self.is_running() {
            info!("🕰️ Listener already running. Restarting it.");
            self.stop().await;
        }
        config.validate_credentials()?;
        let vendor_id = if config.vendor_id.is_empty() {
            let detected = resolve_vendor_id(self.api.as_ref(), &config.username).await;
            if detected.is_empty() {
                return Err(AgentError::ConfigurationError(
                    "No vendor id is configured and none could be detected. Set DPA_VENDOR_ID.".to_string(),
                ));
            }
            detected
        } else {
            config.vendor_id.clone()
        };
        self.ledger.lock().await.load();
        match run_cycle(self.api.as_ref(), &self.ledger, &vendor_id, &on_order).await {
            Ok(report) => info!("🕰️ Initial order check for vendor {vendor_id}: {report}"),
            Err(e) => error!("🕰️ Initial order check for vendor {vendor_id} failed. {e}"),
        }
        let period = config.poll_interval();
        let timer = spawn_poller(
            Arc::clone(&self.api),
            Arc::clone(&self.ledger),
            vendor_id.clone(),
            Arc::clone(&on_order),
            period,
        );
        self.state = ListenerState::Running(RunningListener { vendor_id: vendor_id.clone(), on_order, timer });
        info!("🕰️ Listening for vendor {vendor_id} orders every {}s", period.as_secs());
        Ok(vendor_id)
    }

    /// Cancels the timer and persists the ledger. Stopping a stopped listener does nothing.
    pub async fn stop(&mut self) {
        match std::mem::replace(&mut self.state, ListenerState::Stopped) {
            ListenerState::Stopped => debug!("🕰️ Listener is not running"),
            ListenerState::Running(running) => {
                running.timer.abort();
                if let Err(e) = self.ledger.lock().await.save() {
                    error!("📒 Could not save the processed-order ledger on stop. {e}");
                }
                info!("🕰️ Stopped listening for vendor {} orders", running.vendor_id);
            },
        }
    }

    /// Forgets every processed order. Everything the store still reports will be dispatched again.
    pub async fn reset_processed_orders(&self) -> Result<(), AgentError> {
        self.ledger.lock().await.clear()
    }

    /// Fetches a single order and dispatches it again, whether or not it was processed before. Used to recover orders
    /// that were missed or need a second copy. Returns `Ok(false)` if the order does not belong to the vendor.
    pub async fn reprint_order(&self, order_id: &OrderId) -> Result<bool, AgentError> {
        let ListenerState::Running(running) = &self.state else {
            return Err(AgentError::ConfigurationError("The listener is not running".to_string()));
        };
        let order = self.api.get_order(order_id).await?;
        if !belongs_to_vendor(&order, &running.vendor_id) {
            warn!("🔐 Refusing to reprint order {order_id}: it does not belong to vendor {}", running.vendor_id);
            return Ok(false);
        }
        let mut ledger = self.ledger.lock().await;
        ledger.add(order_id.clone());
        if let Err(e) = ledger.save() {
            error!("📒 Could not save the processed-order ledger. {e}");
        }
        drop(ledger);
        dispatch(&running.on_order, order).await.map(|()| true)
    }
}

impl<A: DokanApi + 'static> Drop for OrderListener<A> {
    fn drop(&mut self) {
        if let ListenerState::Running(running) = &self.state {
            running.timer.abort();
        }
    }
}

fn spawn_poller<A: DokanApi + 'static>(
    api: Arc<A>,
    ledger: Arc<Mutex<ProcessedOrderLedger>>,
    vendor_id: VendorId,
    on_order: OrderHandler,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            debug!("🕰️ Checking for new orders for vendor {vendor_id}");
            match run_cycle(api.as_ref(), &ledger, &vendor_id, &on_order).await {
                Ok(report) if report.dispatched + report.failed > 0 => info!("🕰️ Order check complete: {report}"),
                Ok(report) => debug!("🕰️ Order check complete: {report}"),
                Err(e) => error!("🕰️ Order check for vendor {vendor_id} failed. {e}"),
            }
        }
    })
}

/// Runs one fetch-filter-dispatch cycle.
///
/// Errors from fetching end the cycle. Each order is recorded as processed before its handler runs, so a failing
/// handler only fails its own order and a cancelled cycle never leaves an order to be delivered twice.
pub async fn run_cycle<A: DokanApi + ?Sized>(
    api: &A,
    ledger: &Mutex<ProcessedOrderLedger>,
    vendor_id: &VendorId,
    on_order: &OrderHandler,
) -> Result<CycleReport, AgentError> {
    let orders = fetch_vendor_orders(api, vendor_id).await?;
    let mut report = CycleReport { fetched: orders.len(), ..Default::default() };
    let owned = filter_by_vendor(orders, vendor_id);
    report.foreign = report.fetched - owned.len();
    let mut ledger = ledger.lock().await;
    for order in owned {
        if ledger.has(&order.id) {
            trace!("📒 Order {} was already processed", order.id);
            report.already_processed += 1;
            continue;
        }
        if !belongs_to_vendor(&order, vendor_id) {
            warn!("🔐 Ownership violation: order {} is not owned by vendor {vendor_id}. Dropping it.", order.id);
            report.foreign += 1;
            continue;
        }
        let order_id = order.id.clone();
        // Recorded before the handler runs, so a cycle cancelled mid-dispatch cannot deliver the order again
        ledger.add(order_id.clone());
        match dispatch(on_order, order).await {
            Ok(()) => {
                info!("🖨️ Order {order_id} dispatched");
                report.dispatched += 1;
            },
            Err(e) => {
                error!("🖨️ {e}");
                report.failed += 1;
            },
        }
    }
    if report.dispatched + report.failed > 0 {
        if let Err(e) = ledger.save() {
            error!("📒 Could not save the processed-order ledger. {e}");
        }
    }
    Ok(report)
}

/// Runs the handler on its own task, so a panicking handler is contained like one that returns an error.
async fn dispatch(on_order: &OrderHandler, order: Order) -> Result<(), AgentError> {
    let order_id = order.id.clone();
    match tokio::spawn(on_order(order)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AgentError::DispatchError { order_id, reason: e.to_string() }),
        Err(e) => Err(AgentError::DispatchError { order_id, reason: format!("The order handler panicked. {e}") }),
    }
}
