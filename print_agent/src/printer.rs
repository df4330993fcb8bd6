use std::{fs, path::PathBuf};

use async_trait::async_trait;
use log::*;
use thiserror::Error;
use woo_tools::Order;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Could not write the print job. {0}")]
    Io(#[from] std::io::Error),
    #[error("The printer rejected the job. {0}")]
    Rejected(String),
}

/// A print destination. OS print queues live behind this trait; the agent only hands it orders.
#[async_trait]
pub trait Printer: Send + Sync {
    fn name(&self) -> &str;

    async fn print(&self, order: &Order) -> Result<(), PrinterError>;
}

/// Writes each order as a plain-text ticket into `<spool>/<printer_id>/order-<id>.txt`, where a print service (or a
/// person) can pick it up.
pub struct SpoolPrinter {
    printer_id: String,
    dir: PathBuf,
}

impl SpoolPrinter {
    pub fn new<P: Into<PathBuf>>(spool_dir: P, printer_id: &str) -> Self {
        let printer_id = printer_id.trim().to_string();
        let dir = spool_dir.into().join(&printer_id);
        Self { printer_id, dir }
    }

    pub fn ticket_path(&self, order: &Order) -> PathBuf {
        self.dir.join(format!("order-{}.txt", order.id.as_str()))
    }
}

#[async_trait]
impl Printer for SpoolPrinter {
    fn name(&self) -> &str {
        &self.printer_id
    }

    async fn print(&self, order: &Order) -> Result<(), PrinterError> {
        if self.printer_id.is_empty() {
            return Err(PrinterError::Rejected("No printer configured".to_string()));
        }
        let path = self.ticket_path(order);
        let ticket = render_ticket(order);
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            fs::create_dir_all(&dir)?;
            fs::write(&path, ticket)
        })
        .await
        .map_err(|e| PrinterError::Rejected(e.to_string()))??;
        debug!("🖨️ Spooled order {} to printer '{}'", order.id, self.printer_id);
        Ok(())
    }
}

/// A minimal plain-text rendering of an order ticket.
pub fn render_ticket(order: &Order) -> String {
    const RULE: &str = "----------------------------------------";
    let mut lines = vec![format!("ORDER #{}", order.display_number())];
    if let Some(date) = &order.date_created {
        lines.push(date.to_string());
    }
    let customer = order.billing.full_name();
    if !customer.is_empty() {
        lines.push(format!("Customer: {customer}"));
    }
    if !order.billing.phone.is_empty() {
        lines.push(format!("Phone: {}", order.billing.phone));
    }
    lines.push(RULE.to_string());
    lines.extend(
        order.line_items.iter().map(|item| format!("{:>3} x {:<26} {:>8}", item.quantity, item.name, item.total)),
    );
    lines.push(RULE.to_string());
    lines.push(format!("TOTAL {} {}", order.total, order.currency));
    if let Some(method) = order.payment_method_title.as_deref().filter(|m| !m.is_empty()) {
        lines.push(format!("Paid with: {method}"));
    }
    if let Some(note) = order.customer_note.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Note: {note}"));
    }
    let mut ticket = lines.join("\n");
    ticket.push('\n');
    ticket
}
