use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;
use crate::types::{AttachmentRef, MemberId, PaymentId};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // submission events
    PaymentAppended {
        payment_id: PaymentId,
        member_id: MemberId,
        date: NaiveDate,
        amount: Quantity,
        days_covered: Decimal,
        timestamp: DateTime<Utc>,
    },
    SubmissionRejected {
        member_id: MemberId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // reconciliation events
    PaymentUpdated {
        payment_id: PaymentId,
        timestamp: DateTime<Utc>,
    },
    PaymentRemoved {
        payment_id: PaymentId,
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    LedgerReplaced {
        rows_before: usize,
        rows_after: usize,
        transactional: bool,
        timestamp: DateTime<Utc>,
    },

    // attachment events
    AttachmentStored {
        reference: AttachmentRef,
        timestamp: DateTime<Utc>,
    },
    AttachmentReleased {
        reference: AttachmentRef,
        timestamp: DateTime<Utc>,
    },
    AttachmentCleanupFailed {
        reference: AttachmentRef,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// append-only log of what the ledger did, in emission order
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    log: Vec<Event>,
}

impl EventStore {
    pub fn emit(&mut self, event: Event) {
        self.log.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.log
    }

    pub fn last(&self) -> Option<&Event> {
        self.log.last()
    }
}
