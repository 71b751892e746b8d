use chrono::{DateTime, Duration, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LedgerConfig;
use crate::quantity::Quantity;
use crate::types::{Payment, PaymentId, Roster};

/// "new payment arrived" banner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub payment_id: PaymentId,
    pub observed_at: DateTime<Utc>,
    pub member_nickname: String,
    pub amount: Quantity,
    pub days_covered: Decimal,
}

impl NotificationEvent {
    /// banner text, e.g. "amy: 1.5sx (3 days)"
    pub fn message(&self) -> String {
        format!(
            "{}: {} ({} days)",
            self.member_nickname,
            self.amount,
            self.days_covered.normalize()
        )
    }
}

/// per-session notifier state; owned by the caller's session, never shared
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierState {
    pub last_count: usize,
    pub active: Vec<NotificationEvent>,
}

impl NotifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// state that treats the current ledger as already seen
    pub fn primed(row_count: usize) -> Self {
        Self {
            last_count: row_count,
            active: Vec::new(),
        }
    }
}

/// turns ledger growth into short-lived notifications
#[derive(Debug, Clone)]
pub struct ArrivalNotifier {
    window: Duration,
}

impl ArrivalNotifier {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            window: config.notification_window(),
        }
    }

    pub fn with_window(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// record rows at positions `[last_count, len)` of the date-sorted ledger as new.
    ///
    /// A shrinking ledger only lowers `last_count`; already displayed
    /// events are left alone.
    pub fn observe(
        &self,
        mut state: NotifierState,
        ledger: &[Payment],
        roster: &Roster,
        time_provider: &SafeTimeProvider,
    ) -> (NotifierState, Vec<NotificationEvent>) {
        let current = ledger.len();
        let mut created = Vec::new();

        if current > state.last_count {
            let now = time_provider.now();
            let mut sorted: Vec<&Payment> = ledger.iter().collect();
            sorted.sort_by_key(|p| p.date);

            for payment in &sorted[state.last_count..current] {
                created.push(NotificationEvent {
                    payment_id: payment.id,
                    observed_at: now,
                    member_nickname: roster.nickname_or_id(&payment.member_id).to_string(),
                    amount: payment.amount,
                    days_covered: payment.days_covered,
                });
            }
            debug!(previous = state.last_count, current, new = created.len(), "arrivals observed");
            state.active.extend(created.iter().cloned());
        }

        state.last_count = current;
        (state, created)
    }

    /// drop expired events and return the ones still on screen
    pub fn tick(
        &self,
        mut state: NotifierState,
        time_provider: &SafeTimeProvider,
    ) -> (NotifierState, Vec<NotificationEvent>) {
        let now = time_provider.now();
        state.active.retain(|event| now - event.observed_at < self.window);
        let active = state.active.clone();
        (state, active)
    }

    /// remove an event before its window ends
    pub fn dismiss(&self, mut state: NotifierState, payment_id: PaymentId) -> NotifierState {
        state.active.retain(|event| event.payment_id != payment_id);
        state
    }
}
