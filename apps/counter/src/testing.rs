//! Recording sinks for controller and refresher tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use pharma_core::{Alert, ChatReply, Notification, SalesStats};

use crate::sink::{NotificationSink, PresentationSink, SaleView};
use crate::state::TransactionLogEntry;

/// Everything a sink was asked to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Notified(Notification),
    Sale(SaleView),
    Transactions(Vec<TransactionLogEntry>),
    Stats(SalesStats),
    Alerts(Vec<Alert>),
    Chat { question: String, reply: ChatReply },
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    fn events_mut(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: SinkEvent) {
        self.events_mut().push(event);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events_mut().clone()
    }

    pub fn clear(&self) {
        self.events_mut().clear();
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events_mut()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Notified(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    pub fn last_sale_view(&self) -> Option<SaleView> {
        self.events_mut().iter().rev().find_map(|event| match event {
            SinkEvent::Sale(view) => Some(view.clone()),
            _ => None,
        })
    }

    pub fn stats_renders(&self) -> usize {
        self.events_mut()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Stats(_)))
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.record(SinkEvent::Notified(notification));
    }
}

impl PresentationSink for RecordingSink {
    fn render_sale(&self, view: &SaleView) {
        self.record(SinkEvent::Sale(view.clone()));
    }

    fn render_transactions(&self, entries: &[TransactionLogEntry]) {
        self.record(SinkEvent::Transactions(entries.to_vec()));
    }

    fn render_stats(&self, stats: &SalesStats) {
        self.record(SinkEvent::Stats(stats.clone()));
    }

    fn render_alerts(&self, alerts: &[Alert]) {
        self.record(SinkEvent::Alerts(alerts.to_vec()));
    }

    fn render_chat(&self, question: &str, reply: &ChatReply) {
        self.record(SinkEvent::Chat {
            question: question.to_string(),
            reply: reply.clone(),
        });
    }
}
