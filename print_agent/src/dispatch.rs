use std::sync::Arc;

use log::*;
use tokio::sync::Mutex;
use woo_tools::Order;

use crate::{
    history::{OrderHistory, PrintStatus},
    listener::{DispatchFuture, OrderHandler},
    printer::Printer,
};

/// Builds the listener's order handler: print the order, then record the outcome in the history.
///
/// A print failure is still recorded (as [`PrintStatus::Failed`]) and returned, so the listener logs it.
pub fn print_dispatcher(printer: Arc<dyn Printer>, history: Arc<Mutex<OrderHistory>>) -> OrderHandler {
    Arc::new(move |order: Order| -> DispatchFuture {
        let printer = Arc::clone(&printer);
        let history = Arc::clone(&history);
        Box::pin(async move {
            let result = printer.print(&order).await;
            let status = match &result {
                Ok(()) => {
                    info!("🖨️ Order {} sent to printer '{}'", order.id, printer.name());
                    PrintStatus::Printed
                },
                Err(e) => {
                    error!("🖨️ Order {} could not be printed on '{}'. {e}", order.id, printer.name());
                    PrintStatus::Failed
                },
            };
            let mut history = history.lock().await;
            history.record(order, status);
            if let Err(e) = history.save() {
                error!("🖨️ Could not save the order history. {e}");
            }
            result.map_err(anyhow::Error::from)
        })
    })
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use dpa_common::OrderId;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        printer::{PrinterError, SpoolPrinter},
        test_utils::bare_order,
    };

    struct JammedPrinter;

    #[async_trait]
    impl Printer for JammedPrinter {
        fn name(&self) -> &str {
            "jammed"
        }

        async fn print(&self, _order: &Order) -> Result<(), PrinterError> {
            Err(PrinterError::Rejected("paper jam".to_string()))
        }
    }

    #[tokio::test]
    async fn successful_prints_are_recorded() {
        let dir = tempdir().unwrap();
        let history = Arc::new(Mutex::new(OrderHistory::new(dir.path().join("history.json"), 10)));
        let printer = Arc::new(SpoolPrinter::new(dir.path().join("spool"), "front"));
        let handler = print_dispatcher(printer, Arc::clone(&history));
        handler(bare_order("1")).await.unwrap();
        let history = history.lock().await;
        assert_eq!(history.find(&OrderId::from("1")).unwrap().print_status, PrintStatus::Printed);
        assert!(dir.path().join("spool").join("front").join("order-1.txt").exists());
        assert!(dir.path().join("history.json").exists());
    }

    #[tokio::test]
    async fn failed_prints_are_recorded_and_reported() {
        let dir = tempdir().unwrap();
        let history = Arc::new(Mutex::new(OrderHistory::new(dir.path().join("history.json"), 10)));
        let handler = print_dispatcher(Arc::new(JammedPrinter), Arc::clone(&history));
        let err = handler(bare_order("2")).await.unwrap_err();
        assert!(err.to_string().contains("paper jam"));
        let history = history.lock().await;
        assert_eq!(history.find(&OrderId::from("2")).unwrap().print_status, PrintStatus::Failed);
    }
}
