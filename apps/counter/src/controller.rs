//! # Sale Controller
//!
//! Connects the sale session to the pharmacy server and to the screen.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Sale, End to End                              │
//! │                                                                         │
//! │  scan_image(photo)                                                     │
//! │     ├── info "Scanning barcode..."                                     │
//! │     ├── decode ──► no barcode ──► reset, warning "No barcode detected" │
//! │     └── lookup ──► not found  ──► reset, warning                       │
//! │                └─► found      ──► select, success "Product found: …"   │
//! │                                   (+ warning if expiring / no stock)   │
//! │                                                                         │
//! │  increase_quantity() / decrease_quantity() / set_quantity(n)           │
//! │     └── render SaleView after every change                             │
//! │                                                                         │
//! │  submit_sale()                                                         │
//! │     ├── qty > stock ──► warning, nothing sent, session kept            │
//! │     ├── rejected / network ──► danger, session kept for retry          │
//! │     └── accepted ──► success ──► log row ──► render log                │
//! │                      ──► re-fetch stats ──► reset ──► render           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Methods take `&self` so the controller can be shared behind an `Arc`.
//! At most one lookup and one commit run at a time; a second request of
//! the same kind is refused with a warning and sends nothing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use pharma_client::{
    BarcodeDecoder, CommitClient, CommittedSale, CounterSettings, ImageUpload, LookupClient,
    LookupHit, PharmacyApi,
};
use pharma_core::validation::validate_chat_message;
use pharma_core::{
    sort_alerts, Alert, ChatReply, Notification, Product, QuantityChange, SaleSession, SalesStats,
};
use tracing::{debug, info, warn};

use crate::error::{CounterError, CounterResult, ErrorCode};
use crate::sink::{NotificationSink, PresentationSink, SaleView};
use crate::state::{SessionState, TransactionLog, TransactionLogEntry};

// =============================================================================
// Busy Flag
// =============================================================================

/// At-most-one-in-flight guard for one kind of request.
#[derive(Debug, Default)]
struct BusyFlag(AtomicBool);

impl BusyFlag {
    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Sale Controller
// =============================================================================

/// Owns the sale session and drives it from user intents.
pub struct SaleController {
    session: SessionState,
    log: Mutex<TransactionLog>,
    api: Arc<dyn PharmacyApi>,
    lookup: LookupClient,
    commit: CommitClient,
    decoder: Arc<dyn BarcodeDecoder>,
    notifier: Arc<dyn NotificationSink>,
    presenter: Arc<dyn PresentationSink>,
    lookup_busy: BusyFlag,
    commit_busy: BusyFlag,
    expiry_warning_days: i64,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl SaleController {
    pub fn new(
        api: Arc<dyn PharmacyApi>,
        decoder: Arc<dyn BarcodeDecoder>,
        notifier: Arc<dyn NotificationSink>,
        presenter: Arc<dyn PresentationSink>,
        settings: &CounterSettings,
    ) -> Self {
        Self {
            session: SessionState::new(),
            log: Mutex::new(TransactionLog::new(settings.transaction_log_capacity)),
            lookup: LookupClient::new(api.clone()),
            commit: CommitClient::new(api.clone()),
            api,
            decoder,
            notifier,
            presenter,
            lookup_busy: BusyFlag::default(),
            commit_busy: BusyFlag::default(),
            expiry_warning_days: settings.expiry_warning_days,
            today: utc_today,
        }
    }

    /// Replaces the clock used for expiry warnings.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Shared handle to the session.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Current sale panel contents.
    pub fn view(&self) -> SaleView {
        self.session.with_session(SaleView::from_session)
    }

    pub fn transactions(&self) -> Vec<TransactionLogEntry> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).entries()
    }

    pub fn is_lookup_in_flight(&self) -> bool {
        self.lookup_busy.is_set()
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.commit_busy.is_set()
    }

    fn notify(&self, notification: Notification) {
        debug!(level = %notification.level, message = %notification.message, "Notify");
        self.notifier.notify(notification);
    }

    fn report(&self, err: &CounterError) {
        self.notify(err.to_notification());
    }

    fn render(&self) {
        self.presenter.render_sale(&self.view());
    }

    fn clear_session(&self) {
        self.session.reset();
        self.render();
    }

    // =========================================================================
    // Scan & Lookup
    // =========================================================================

    /// Reads an image file and scans it.
    ///
    /// An unreadable or unsupported file counts as a failed scan and
    /// leaves the session empty.
    pub async fn scan_file(&self, path: impl AsRef<Path>) -> CounterResult<LookupHit> {
        let Some(_busy) = self.lookup_busy.try_acquire() else {
            return self.refuse_busy("Barcode lookup");
        };

        self.notify(Notification::info("Scanning barcode..."));

        match ImageUpload::from_path(path).await {
            Ok(image) => self.decode_and_select(&image).await,
            Err(e) => Err(self.fail_scan(e.into())),
        }
    }

    /// Decodes an image and looks up the product it shows.
    ///
    /// Any failure leaves the session empty.
    pub async fn scan_image(&self, image: ImageUpload) -> CounterResult<LookupHit> {
        let Some(_busy) = self.lookup_busy.try_acquire() else {
            return self.refuse_busy("Barcode lookup");
        };

        self.notify(Notification::info("Scanning barcode..."));
        self.decode_and_select(&image).await
    }

    async fn decode_and_select(&self, image: &ImageUpload) -> CounterResult<LookupHit> {
        let symbol = match self.decoder.decode(image).await {
            Ok(Some(symbol)) => symbol,
            Ok(None) => {
                return Err(self.fail_scan(CounterError::new(
                    ErrorCode::NotFound,
                    "No barcode detected",
                )));
            }
            Err(e) => {
                let retryable = e.is_retryable();
                let err = CounterError::from(e);
                return Err(self.fail_scan(if retryable {
                    err.with_hint("scan again to retry")
                } else {
                    err
                }));
            }
        };

        info!(value = %symbol.value, format = ?symbol.format, "Barcode scanned");
        self.lookup_and_select(&symbol.value).await
    }

    /// Looks up a typed or hardware-scanned barcode (no image decoding).
    pub async fn scan_barcode(&self, barcode: &str) -> CounterResult<LookupHit> {
        let Some(_busy) = self.lookup_busy.try_acquire() else {
            return self.refuse_busy("Barcode lookup");
        };

        self.notify(Notification::info(format!(
            "Looking up barcode {}...",
            barcode.trim()
        )));
        self.lookup_and_select(barcode).await
    }

    /// Clears the session and reports a scan that produced no product.
    fn fail_scan(&self, err: CounterError) -> CounterError {
        self.clear_session();
        self.report(&err);
        err
    }

    async fn lookup_and_select(&self, barcode: &str) -> CounterResult<LookupHit> {
        let hit = match self.lookup.lookup(barcode).await {
            Ok(hit) => hit,
            Err(e) => {
                let retryable = e.is_retryable();
                let err = CounterError::from(e);
                return Err(self.fail_scan(if retryable {
                    err.with_hint("scan again to retry")
                } else {
                    err
                }));
            }
        };

        let selected = self
            .session
            .with_session_mut(|s| s.select_product(hit.product.clone(), &hit.barcode));
        if let Err(e) = selected {
            warn!(barcode = %hit.barcode, error = %e, "Catalog returned an unusable product");
            return Err(self.fail_scan(e.into()));
        }

        self.render();
        self.notify(Notification::success(format!(
            "Product found: {}",
            hit.product.name
        )));
        self.warn_about(&hit.product);

        Ok(hit)
    }

    /// Expiry and stock warnings for a freshly selected product.
    fn warn_about(&self, product: &Product) {
        let today = (self.today)();

        if let Some(expiry) = product.expiry_date {
            if product.is_expired(today) {
                self.notify(Notification::warning(format!(
                    "{} expired on {}",
                    product.name, expiry
                )));
            } else if product.expires_within(today, self.expiry_warning_days) {
                let days = product.days_until_expiry(today).unwrap_or_default();
                self.notify(Notification::warning(format!(
                    "{} expires in {} day(s) ({})",
                    product.name, days, expiry
                )));
            }
        }

        if product.stock_quantity == 0 {
            self.notify(Notification::warning(format!(
                "{} is out of stock",
                product.name
            )));
        }
    }

    fn refuse_busy<T>(&self, operation: &str) -> CounterResult<T> {
        let err = CounterError::busy(operation);
        self.report(&err);
        Err(err)
    }

    // =========================================================================
    // Quantity
    // =========================================================================

    /// Adds one unit, up to the product's stock.
    pub fn increase_quantity(&self) -> QuantityChange {
        let change = self.session.with_session_mut(SaleSession::increase_quantity);
        self.after_quantity_change(change);
        change
    }

    /// Removes one unit, down to 1.
    pub fn decrease_quantity(&self) -> QuantityChange {
        let change = self.session.with_session_mut(SaleSession::decrease_quantity);
        self.after_quantity_change(change);
        change
    }

    fn after_quantity_change(&self, change: QuantityChange) {
        match change {
            QuantityChange::Changed { quantity } => {
                debug!(quantity, "Quantity changed");
                self.render();
            }
            QuantityChange::StockLimitReached { stock } => {
                self.notify(Notification::warning(format!(
                    "Cannot exceed available stock ({})",
                    stock
                )));
            }
            QuantityChange::AtMinimum => debug!("Quantity already at minimum"),
            QuantityChange::NoProductSelected => {
                self.notify(Notification::warning("Please scan a product first"));
            }
        }
    }

    /// Manual quantity entry. Values above stock are kept but flagged.
    pub fn set_quantity(&self, quantity: i64) -> CounterResult<()> {
        let result = self
            .session
            .with_session_mut(|s| s.set_quantity(quantity));
        if let Err(e) = result {
            let err = CounterError::from(e);
            self.report(&err);
            return Err(err);
        }

        let view = self.view();
        self.presenter.render_sale(&view);
        if let Some(warning) = view.over_stock_warning {
            self.notify(Notification::warning(warning));
        }
        Ok(())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Submits the current sale.
    ///
    /// On failure the session is kept so the cashier can retry without
    /// scanning again.
    pub async fn submit_sale(&self) -> CounterResult<CommittedSale> {
        let Some(_busy) = self.commit_busy.try_acquire() else {
            return self.refuse_busy("Sale submission");
        };

        let snapshot = self.session.snapshot();
        let committed = match self.commit.commit(&snapshot).await {
            Ok(committed) => committed,
            Err(e) => {
                let retryable = e.is_retryable();
                let mut err = CounterError::from(e);
                if retryable {
                    err = err.with_hint("sale kept, submit again to retry");
                }
                self.report(&err);
                return Err(err);
            }
        };

        self.notify(Notification::success(format!(
            "Sale recorded: {} × {} = {}",
            committed.record.quantity, committed.product_name, committed.record.amount
        )));

        let entries = {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            log.push(TransactionLogEntry::from_committed(&committed, Utc::now()));
            log.entries()
        };
        self.presenter.render_transactions(&entries);

        self.refresh_stats().await;

        // a lookup may have selected another product while this was in flight
        if self.session.reset_if_unchanged(&snapshot) {
            self.render();
        } else {
            debug!(barcode = %committed.record.barcode, "Session changed during commit; kept");
        }

        Ok(committed)
    }

    /// Abandons the current sale.
    pub fn reset(&self) {
        debug!("Sale session reset");
        self.clear_session();
    }

    // =========================================================================
    // Side Panels
    // =========================================================================

    /// Re-fetches sales statistics. Failures are logged only.
    pub async fn refresh_stats(&self) -> Option<SalesStats> {
        match self.api.sales_stats().await {
            Ok(stats) => {
                self.presenter.render_stats(&stats);
                Some(stats)
            }
            Err(e) => {
                warn!(error = %e, "Sales stats refresh failed");
                None
            }
        }
    }

    /// Loads and shows alerts, most urgent first.
    pub async fn load_alerts(&self) -> CounterResult<Vec<Alert>> {
        match self.api.alerts().await {
            Ok(mut alerts) => {
                sort_alerts(&mut alerts);
                self.presenter.render_alerts(&alerts);
                if alerts.is_empty() {
                    self.notify(Notification::info("No active alerts"));
                }
                Ok(alerts)
            }
            Err(e) => {
                let err = CounterError::from(e);
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Sends a question to the pharmacy assistant.
    pub async fn send_chat(&self, message: &str) -> CounterResult<ChatReply> {
        let message = match validate_chat_message(message) {
            Ok(message) => message,
            Err(e) => {
                let err = CounterError::from(e);
                self.report(&err);
                return Err(err);
            }
        };

        match self.api.chat(&message).await {
            Ok(reply) => {
                self.presenter.render_chat(&message, &reply);
                Ok(reply)
            }
            Err(e) => {
                let err = CounterError::from(e);
                self.report(&err);
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, SinkEvent};
    use pharma_client::testing::{sample_product, FakeApi, FakeDecoder};
    use pharma_core::{AlertSeverity, Money, NotificationLevel};

    const BARCODE: &str = "8901030865278";

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    struct Harness {
        api: Arc<FakeApi>,
        decoder: Arc<FakeDecoder>,
        sink: Arc<RecordingSink>,
        controller: Arc<SaleController>,
    }

    fn harness(api: FakeApi, decoder: FakeDecoder) -> Harness {
        let api = Arc::new(api);
        let decoder = Arc::new(decoder);
        let sink = Arc::new(RecordingSink::default());
        let controller = SaleController::new(
            api.clone(),
            decoder.clone(),
            sink.clone(),
            sink.clone(),
            &CounterSettings::default(),
        )
        .with_today(fixed_today);

        Harness {
            api,
            decoder,
            sink,
            controller: Arc::new(controller),
        }
    }

    fn stocked(stock: i64) -> Harness {
        harness(FakeApi::with_product(BARCODE, 500, stock), FakeDecoder::returning(BARCODE))
    }

    fn png() -> ImageUpload {
        ImageUpload::from_bytes(
            "strip.png",
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_scan_selects_product() {
        let h = stocked(10);

        let hit = h.controller.scan_image(png()).await.unwrap();
        assert_eq!(hit.barcode, BARCODE);

        let view = h.controller.view();
        let totals = view.totals.unwrap();
        assert_eq!(totals.quantity, 1);
        assert_eq!(totals.total, Money::from_cents(500));

        let notes = h.sink.notifications();
        assert_eq!(notes[0], Notification::info("Scanning barcode..."));
        assert_eq!(notes[1].level, NotificationLevel::Success);
        assert_eq!(notes.len(), 2);
        assert_eq!(h.decoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_stock_ten_scenario() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();

        for _ in 0..9 {
            assert!(h.controller.increase_quantity().is_changed());
        }
        let totals = h.controller.view().totals.unwrap();
        assert_eq!(totals.quantity, 10);
        assert_eq!(totals.total, Money::from_cents(5000));

        assert_eq!(
            h.controller.increase_quantity(),
            QuantityChange::StockLimitReached { stock: 10 }
        );
        assert_eq!(h.controller.view().totals.unwrap().quantity, 10);
        assert_eq!(
            h.sink.last_notification().unwrap(),
            Notification::warning("Cannot exceed available stock (10)")
        );
    }

    #[tokio::test]
    async fn test_not_found_clears_session() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.controller.increase_quantity();

        let err = h.controller.scan_barcode("0000000").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(h.controller.session().snapshot().is_empty());
        assert!(h.sink.last_sale_view().unwrap().is_empty());

        // one pending + one terminal notification for the failed lookup
        let notes = h.sink.notifications();
        let tail = &notes[notes.len() - 2..];
        assert_eq!(tail[0].level, NotificationLevel::Info);
        assert_eq!(tail[1].message, "Product not found for barcode 0000000");

        h.controller.reset();
        assert!(h.controller.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_no_barcode_in_image_clears_session() {
        let h = harness(FakeApi::with_product(BARCODE, 500, 10), FakeDecoder::empty());

        let err = h.controller.scan_image(png()).await.unwrap_err();
        assert_eq!(err.message, "No barcode detected");
        assert!(h.controller.session().snapshot().is_empty());
        assert_eq!(h.api.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_on_lookup_clears_session() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.api.set_offline(true);

        let err = h.controller.scan_barcode(BARCODE).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Transport);
        assert!(h.controller.session().snapshot().is_empty());
        assert_eq!(h.sink.last_notification().unwrap().level, NotificationLevel::Danger);
    }

    #[tokio::test]
    async fn test_commit_success_sequence() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.controller.increase_quantity();
        h.controller.increase_quantity();
        h.sink.clear();

        let committed = h.controller.submit_sale().await.unwrap();
        assert_eq!(committed.record.quantity, 3);
        assert_eq!(committed.record.amount, Money::from_cents(1500));

        // success → log → stats → reset
        let events = h.sink.events();
        assert!(matches!(&events[0], SinkEvent::Notified(n) if n.level == NotificationLevel::Success));
        assert!(matches!(&events[1], SinkEvent::Transactions(rows) if rows.len() == 1));
        assert!(matches!(&events[2], SinkEvent::Stats(s) if s.total_transactions == 1));
        assert!(matches!(&events[3], SinkEvent::Sale(v) if v.is_empty()));

        let log = h.controller.transactions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].amount, Money::from_cents(1500));
        assert_eq!(log[0].transaction_id, Some(1));

        assert!(h.controller.session().snapshot().is_empty());
        assert_eq!(h.api.stats_calls(), 1);
        assert_eq!(h.api.stock_of(BARCODE), Some(7));
    }

    #[tokio::test]
    async fn test_over_stock_commit_sends_nothing() {
        let h = stocked(2);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.controller.set_quantity(3).unwrap();
        assert_eq!(
            h.sink.last_notification().unwrap(),
            Notification::warning("Quantity exceeds stock by 1 unit(s)")
        );

        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(h.api.sale_calls(), 0);
        assert_eq!(h.controller.session().snapshot().quantity(), Some(3));
    }

    #[tokio::test]
    async fn test_rejected_commit_keeps_session() {
        let h = stocked(10);
        h.api.reject_sales("Insufficient stock");
        h.controller.scan_barcode(BARCODE).await.unwrap();

        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RemoteRejected);
        assert_eq!(err.message, "Insufficient stock");
        assert_eq!(h.controller.session().snapshot().barcode(), Some(BARCODE));
        assert!(h.controller.transactions().is_empty());
        assert_eq!(h.api.stats_calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_on_empty_session() {
        let h = stocked(10);
        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NoProductSelected);
        assert_eq!(h.api.sale_calls(), 0);
    }

    #[tokio::test]
    async fn test_quantity_on_empty_session_warns() {
        let h = stocked(10);
        assert_eq!(h.controller.increase_quantity(), QuantityChange::NoProductSelected);
        assert_eq!(
            h.sink.last_notification().unwrap(),
            Notification::warning("Please scan a product first")
        );
        assert!(h.controller.set_quantity(2).is_err());
        assert!(h.controller.set_quantity(0).is_err());
    }

    #[tokio::test]
    async fn test_expiry_and_stock_warnings() {
        let api = FakeApi::default();
        let mut expiring = sample_product("111", 250, 0);
        expiring.name = "Insulin".into();
        expiring.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 18);
        api.add_product(expiring);
        let h = harness(api, FakeDecoder::empty());

        h.controller.scan_barcode("111").await.unwrap();
        let notes = h.sink.notifications();
        assert_eq!(notes[1], Notification::success("Product found: Insulin"));
        assert_eq!(notes[2], Notification::warning("Insulin expires in 2 day(s) (2026-10-18)"));
        assert_eq!(notes[3], Notification::warning("Insulin is out of stock"));

        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_second_lookup_refused_while_first_in_flight() {
        let h = stocked(10);
        h.api.hold_requests();

        let controller = h.controller.clone();
        let first = tokio::spawn(async move { controller.scan_barcode(BARCODE).await });
        while h.api.lookup_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(h.controller.is_lookup_in_flight());

        let err = h.controller.scan_barcode(BARCODE).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);
        assert_eq!(err.message, "Barcode lookup already in progress");
        assert_eq!(h.api.lookup_calls(), 1);

        h.api.release();
        first.await.unwrap().unwrap();
        assert!(!h.controller.is_lookup_in_flight());
    }

    #[tokio::test]
    async fn test_second_commit_refused_while_first_in_flight() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.api.hold_requests();

        let controller = h.controller.clone();
        let first = tokio::spawn(async move { controller.submit_sale().await });
        while h.api.sale_calls() == 0 {
            tokio::task::yield_now().await;
        }

        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Busy);
        assert_eq!(h.api.sale_calls(), 1);

        h.api.release();
        first.await.unwrap().unwrap();
        assert_eq!(h.api.recorded_sales().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_failure_is_silent() {
        let h = stocked(10);
        h.api.set_stats_offline(true);

        assert!(h.controller.refresh_stats().await.is_none());
        assert!(h.sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_alerts_sorted() {
        let h = stocked(10);
        h.api.set_alerts(vec![
            Alert {
                alert_id: Some(1),
                alert_type: Some("stock".into()),
                severity: AlertSeverity::Warning,
                product: "ORS".into(),
                product_id: None,
                message: "Low stock: 12 units".into(),
            },
            Alert {
                alert_id: Some(2),
                alert_type: Some("expiry".into()),
                severity: AlertSeverity::Critical,
                product: "Insulin".into(),
                product_id: None,
                message: "Expires in 1 days".into(),
            },
        ]);

        let alerts = h.controller.load_alerts().await.unwrap();
        assert_eq!(alerts[0].product, "Insulin");
        assert!(matches!(h.sink.events().last(), Some(SinkEvent::Alerts(a)) if a.len() == 2));
    }

    #[tokio::test]
    async fn test_chat() {
        let h = stocked(10);

        let reply = h.controller.send_chat("  is ORS in stock? ").await.unwrap();
        assert_eq!(reply.response, "You asked: is ORS in stock?");

        assert!(h.controller.send_chat("   ").await.is_err());
        assert_eq!(h.api.chat_calls(), 1);
    }

    #[tokio::test]
    async fn test_scan_unreadable_file() {
        let h = stocked(10);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.sink.clear();

        let err = h.controller.scan_file(&path).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageError);
        assert_eq!(h.decoder.calls(), 0);

        assert!(h.controller.session().snapshot().is_empty());
        assert!(h.sink.last_sale_view().unwrap().is_empty());
        let notes = h.sink.notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0], Notification::info("Scanning barcode..."));
        assert_eq!(notes[1].level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_commit_keeps_selection_made_while_in_flight() {
        let h = stocked(10);
        h.api.add_product(sample_product("222", 300, 5));
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.api.hold_requests();

        let controller = h.controller.clone();
        let commit = tokio::spawn(async move { controller.submit_sale().await });
        while h.api.sale_calls() == 0 {
            tokio::task::yield_now().await;
        }

        h.api.release();
        h.controller.scan_barcode("222").await.unwrap();
        let committed = commit.await.unwrap().unwrap();

        assert_eq!(committed.record.barcode, BARCODE);
        assert_eq!(h.controller.transactions().len(), 1);
        assert_eq!(h.controller.session().snapshot().barcode(), Some("222"));
        assert_eq!(h.controller.view().barcode.as_deref(), Some("222"));
    }

    #[tokio::test]
    async fn test_oversized_manual_quantity_is_rejected() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();

        let err = h.controller.set_quantity(i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(h.controller.session().snapshot().quantity(), Some(1));
        assert_eq!(h.controller.view().totals.unwrap().total, Money::from_cents(500));
    }

    #[tokio::test]
    async fn test_network_failure_on_commit_suggests_retry() {
        let h = stocked(10);
        h.controller.scan_barcode(BARCODE).await.unwrap();
        h.api.set_offline(true);

        let err = h.controller.submit_sale().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Transport);
        assert_eq!(
            err.message,
            "Network error: connection refused (sale kept, submit again to retry)"
        );
        assert_eq!(h.controller.session().snapshot().barcode(), Some(BARCODE));

        h.api.set_offline(false);
        h.controller.submit_sale().await.unwrap();
        assert!(h.controller.session().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_expired_product_warning() {
        let api = FakeApi::default();
        let mut expired = sample_product("333", 100, 4);
        expired.name = "Eye drops".into();
        expired.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 1);
        api.add_product(expired);
        let h = harness(api, FakeDecoder::empty());

        h.controller.scan_barcode("333").await.unwrap();
        assert_eq!(
            h.sink.last_notification().unwrap(),
            Notification::warning("Eye drops expired on 2026-10-01")
        );
    }

    mod over_http {
        use super::*;
        use axum::extract::Query;
        use axum::routing::get;
        use axum::{Json, Router};
        use pharma_client::{ApiSettings, HttpPharmacyApi};
        use serde_json::{json, Value};
        use std::collections::HashMap;

        async fn product(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
            Json(match query.get("barcode").map(String::as_str) {
                Some("111") => json!({
                    "status": "success",
                    "data": {"id": 1, "name": "ORS", "barcode": "111", "price": 2.5, "stock_quantity": 10}
                }),
                Some("refused") => json!({"status": "error", "message": "catalog offline"}),
                _ => json!({"status": "success"}),
            })
        }

        async fn controller_over_http() -> (Arc<RecordingSink>, SaleController) {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let app = Router::new().route("/api/product-by-barcode", get(product));
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let api: Arc<dyn PharmacyApi> = Arc::new(
                HttpPharmacyApi::new(&ApiSettings {
                    base_url: format!("http://{}", addr),
                    request_timeout_secs: 5,
                })
                .unwrap(),
            );
            let sink = Arc::new(RecordingSink::default());
            let controller = SaleController::new(
                api,
                Arc::new(FakeDecoder::empty()),
                sink.clone(),
                sink.clone(),
                &CounterSettings::default(),
            );
            (sink, controller)
        }

        #[tokio::test]
        async fn test_error_body_with_ok_status_clears_session() {
            let (sink, controller) = controller_over_http().await;
            controller.scan_barcode("111").await.unwrap();

            let err = controller.scan_barcode("refused").await.unwrap_err();
            assert_eq!(err.code, ErrorCode::Transport);
            assert!(err.message.contains("catalog offline"));
            assert!(controller.session().snapshot().is_empty());
            assert!(sink.last_sale_view().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_success_without_data_clears_session() {
            let (_sink, controller) = controller_over_http().await;
            controller.scan_barcode("111").await.unwrap();

            let err = controller.scan_barcode("hollow").await.unwrap_err();
            assert_eq!(err.code, ErrorCode::Transport);
            assert!(err.message.contains("Server returned no product data"));
            assert!(controller.session().snapshot().is_empty());
        }
    }
}
