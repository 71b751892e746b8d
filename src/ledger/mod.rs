pub mod attachments;
pub mod history;
pub mod memory;
pub mod reconciler;

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::{AttachmentRef, NewPayment, Payment, PaymentId};

pub use attachments::{attachment_name, AttachmentUpload};
pub use history::{default_range, gallery, gallery_page, HistoryFilter};
pub use memory::{InMemoryAttachmentStore, InMemoryPaymentStore};
pub use reconciler::{LedgerReconciler, ReconciliationPlan, ReconciliationReport};

/// targeted changes applied in one storage transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerChanges {
    /// full replacement rows, matched by id
    pub updated: Vec<Payment>,
    pub removed: Vec<PaymentId>,
}

impl LedgerChanges {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.removed.is_empty()
    }
}

/// persistence collaborator for the payment ledger.
///
/// Reads must observe every write previously made through the same store.
pub trait PaymentStore {
    /// every row, in the order the backend returns them
    fn fetch_all(&self) -> Result<Vec<Payment>>;

    /// persist a new row and return it with its assigned id
    fn append(&mut self, payment: NewPayment) -> Result<Payment>;

    /// replace the whole ledger with `rows`
    fn replace_all(&mut self, rows: Vec<Payment>) -> Result<()>;

    /// whether `apply_changes` is available and atomic
    fn supports_transactions(&self) -> bool {
        false
    }

    /// apply updates and removals atomically; nothing is applied on error
    fn apply_changes(&mut self, _changes: &LedgerChanges) -> Result<()> {
        Err(LedgerError::OperationNotSupported)
    }
}

/// storage collaborator for screenshots and other proof objects
pub trait AttachmentStore {
    fn store(&mut self, bytes: &[u8], suggested_name: &str) -> Result<AttachmentRef>;

    fn delete(&mut self, reference: &AttachmentRef) -> Result<()>;

    /// retrievable url or path for display
    fn resolve(&self, reference: &AttachmentRef) -> Result<String>;
}
