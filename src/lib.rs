pub mod config;
pub mod coverage;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod notifications;
pub mod quantity;
pub mod serialization;
pub mod submission;
pub mod types;

// re-export key types
pub use config::LedgerConfig;
pub use coverage::{
    compute_expiry, derive_status, status_board, CoverageCalculator, CoverageStatus, MemberStatus,
};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{
    AttachmentStore, AttachmentUpload, HistoryFilter, InMemoryAttachmentStore,
    InMemoryPaymentStore, LedgerChanges, LedgerReconciler, PaymentStore, ReconciliationPlan,
    ReconciliationReport,
};
pub use notifications::{ArrivalNotifier, NotificationEvent, NotifierState};
pub use quantity::{Denomination, Quantity};
pub use submission::{estimate, CoverageEstimate, Submission, SubmissionProcessor};
pub use types::{AttachmentRef, Member, MemberId, NewPayment, Payment, PaymentId, Roster};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
