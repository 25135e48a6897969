//! # Console Front End
//!
//! Line-oriented cashier interface on stdin/stdout.
//!
//! ```text
//! counter> code 8901030865278
//! [success] Product found: Paracetamol 500mg
//!   Paracetamol 500mg  (8901030865278)
//!   qty 1 × 25.00 = 25.00   stock 40
//! counter> +
//! counter> submit
//! ```
//!
//! Logs go to stderr so they never interleave with this output.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use pharma_core::{Alert, ChatReply, Notification, SalesStats};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::controller::SaleController;
use crate::sink::{NotificationSink, PresentationSink, SaleView};
use crate::state::TransactionLogEntry;

pub const HELP: &str = "\
Commands:
  scan <image path>   decode a barcode photo and look it up
  code <barcode>      look up a typed barcode
  +  /  -             change quantity by one
  qty <n>             set quantity
  submit              record the sale
  reset               clear the current sale
  stats               refresh sales statistics
  alerts              show expiry and stock alerts
  chat <question>     ask the pharmacy assistant
  help                show this list
  quit                exit";

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(PathBuf),
    Code(String),
    Increase,
    Decrease,
    Quantity(i64),
    Submit,
    Reset,
    Stats,
    Alerts,
    Chat(String),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "scan" => Command::Scan(PathBuf::from(required(rest, "scan <image path>")?)),
            "code" => Command::Code(required(rest, "code <barcode>")?.to_string()),
            "+" => Command::Increase,
            "-" => Command::Decrease,
            "qty" => {
                let value = required(rest, "qty <n>")?;
                let quantity = value
                    .parse()
                    .map_err(|_| format!("Not a whole number: {}", value))?;
                Command::Quantity(quantity)
            }
            "submit" => Command::Submit,
            "reset" => Command::Reset,
            "stats" => Command::Stats,
            "alerts" => Command::Alerts,
            "chat" => Command::Chat(required(rest, "chat <question>")?.to_string()),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: {} (try 'help')", other)),
        };

        Ok(Some(command))
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(arg)
    }
}

// =============================================================================
// Terminal Sink
// =============================================================================

/// Prints notifications and panels to stdout.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        println!("[{}] {}", notification.level, notification.message);
    }
}

impl PresentationSink for TerminalSink {
    fn render_sale(&self, view: &SaleView) {
        println!("{}", format_sale(view));
    }

    fn render_transactions(&self, entries: &[TransactionLogEntry]) {
        println!("Recent sales:");
        for entry in entries.iter().take(5) {
            let id = entry
                .transaction_id
                .map(|id| format!("#{}", id))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>6}  {}  {} × {}  {}",
                id,
                entry.recorded_at.format("%H:%M:%S"),
                entry.quantity,
                entry.product_name,
                entry.amount
            );
        }
    }

    fn render_stats(&self, stats: &SalesStats) {
        println!(
            "Stats: {} sale(s), {} unit(s), revenue {}",
            stats.total_transactions, stats.total_units, stats.total_revenue
        );
    }

    fn render_alerts(&self, alerts: &[Alert]) {
        for alert in alerts {
            println!("  [{:?}] {}: {}", alert.severity, alert.product, alert.message);
        }
    }

    fn render_chat(&self, question: &str, reply: &ChatReply) {
        println!("You: {}", question);
        println!("Assistant: {}", reply.response);
    }
}

/// Text block for the sale panel.
pub fn format_sale(view: &SaleView) -> String {
    let (Some(product), Some(totals)) = (&view.product, &view.totals) else {
        return "  (no product selected)".to_string();
    };

    let mut out = String::new();
    let barcode = view.barcode.as_deref().unwrap_or(&product.barcode);
    let _ = writeln!(out, "  {}  ({})", product.name, barcode);
    if let Some(expiry) = &product.expiry_date {
        let _ = writeln!(out, "  expires {}", expiry);
    }
    let _ = write!(
        out,
        "  qty {} × {} = {}   stock {}",
        totals.quantity, totals.unit_price, totals.total, product.stock_quantity
    );
    if let Some(warning) = &view.over_stock_warning {
        let _ = write!(out, "\n  ! {}", warning);
    }
    out
}

// =============================================================================
// Input Loop
// =============================================================================

/// Reads commands until `quit` or end of input.
pub async fn run(controller: Arc<SaleController>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("{}", HELP);

    loop {
        stdout.write_all(b"counter> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        debug!(?command, "Console command");
        if command == Command::Quit {
            break;
        }
        dispatch(&controller, command).await;
    }

    Ok(())
}

/// Runs one command. Outcomes reach the user through the sinks.
async fn dispatch(controller: &SaleController, command: Command) {
    match command {
        Command::Scan(path) => {
            let _ = controller.scan_file(path).await;
        }
        Command::Code(barcode) => {
            let _ = controller.scan_barcode(&barcode).await;
        }
        Command::Increase => {
            controller.increase_quantity();
        }
        Command::Decrease => {
            controller.decrease_quantity();
        }
        Command::Quantity(quantity) => {
            let _ = controller.set_quantity(quantity);
        }
        Command::Submit => {
            let _ = controller.submit_sale().await;
        }
        Command::Reset => controller.reset(),
        Command::Stats => {
            if controller.refresh_stats().await.is_none() {
                println!("Sales stats unavailable");
            }
        }
        Command::Alerts => {
            let _ = controller.load_alerts().await;
        }
        Command::Chat(text) => {
            let _ = controller.send_chat(&text).await;
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_core::{Money, Product, SaleSession};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(
            Command::parse("code  8901030865278 "),
            Ok(Some(Command::Code("8901030865278".into())))
        );
        assert_eq!(
            Command::parse("scan /tmp/strip one.png"),
            Ok(Some(Command::Scan(PathBuf::from("/tmp/strip one.png"))))
        );
        assert_eq!(Command::parse("+"), Ok(Some(Command::Increase)));
        assert_eq!(Command::parse("-"), Ok(Some(Command::Decrease)));
        assert_eq!(Command::parse("QTY 4"), Ok(Some(Command::Quantity(4))));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(
            Command::parse("chat is ORS in stock?"),
            Ok(Some(Command::Chat("is ORS in stock?".into())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("code"), Err("Usage: code <barcode>".into()));
        assert_eq!(Command::parse("qty two"), Err("Not a whole number: two".into()));
        assert!(Command::parse("refund").unwrap_err().starts_with("Unknown command"));
    }

    #[test]
    fn test_format_sale() {
        assert_eq!(format_sale(&SaleView::default()), "  (no product selected)");

        let mut session = SaleSession::new();
        session
            .select_product(
                Product {
                    id: 1,
                    name: "ORS".into(),
                    barcode: "890".into(),
                    category: None,
                    price: Money::from_cents(1250),
                    stock_quantity: 1,
                    expiry_date: None,
                    mfg_date: None,
                    packaging_type: None,
                    eco_score: None,
                },
                "890",
            )
            .unwrap();
        session.set_quantity(2).unwrap();

        let text = format_sale(&SaleView::from_session(&session));
        assert!(text.contains("ORS  (890)"));
        assert!(text.contains("stock 1"));
        assert!(text.contains("Quantity exceeds stock by 1 unit(s)"));
    }
}
