use rust_decimal::Decimal;
use thiserror::Error;

use crate::quantity::Quantity;
use crate::types::{MemberId, PaymentId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid quantity {input:?}: {reason}")]
    Parse {
        input: String,
        reason: String,
    },

    #[error("quantity must not be negative: {input:?}")]
    NegativeQuantity {
        input: String,
    },

    #[error("insufficient coverage: {amount} pays for {days} day(s), at least 1 required")]
    InsufficientCoverage {
        amount: Quantity,
        days: Decimal,
    },

    #[error("invalid rate per day: {rate}")]
    InvalidRate {
        rate: Quantity,
    },

    #[error("invalid payment {id:?}: field {field} {reason}")]
    InvalidPayment {
        id: Option<PaymentId>,
        field: &'static str,
        reason: String,
    },

    #[error("payment {id} appears more than once in the edited rows")]
    DuplicatePaymentId {
        id: PaymentId,
    },

    #[error("payment {id} is not part of the edited subset")]
    UnknownPaymentId {
        id: PaymentId,
    },

    #[error("stale view: payments {missing:?} no longer exist in the ledger")]
    StaleView {
        missing: Vec<PaymentId>,
    },

    #[error("reconciliation failed during {stage}: {message} ({rows_lost} row(s) may be missing)")]
    ReconciliationFailure {
        stage: &'static str,
        message: String,
        rows_lost: usize,
    },

    #[error("attachment cleanup failed for {reference}: {message}")]
    AttachmentCleanup {
        reference: String,
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },

    #[error("unknown member: {id}")]
    UnknownMember {
        id: MemberId,
    },

    #[error("date overflow while adding {days} day(s)")]
    DateOverflow {
        days: Decimal,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("operation not supported by this store")]
    OperationNotSupported,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
