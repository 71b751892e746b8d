use std::collections::{BTreeMap, HashSet};

use crate::errors::{LedgerError, Result};
use crate::types::{AttachmentRef, NewPayment, Payment, PaymentId};

use super::{AttachmentStore, LedgerChanges, PaymentStore};

/// in-memory ledger with monotonic ids
#[derive(Debug, Clone)]
pub struct InMemoryPaymentStore {
    rows: Vec<Payment>,
    next_id: u64,
    transactional: bool,
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPaymentStore {
    /// empty store supporting targeted changes
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            transactional: true,
        }
    }

    /// empty store that only offers full rewrites
    pub fn full_replace_only() -> Self {
        Self {
            transactional: false,
            ..Self::new()
        }
    }

    /// seed with existing rows; the next id follows the largest one present
    pub fn with_rows(mut self, rows: Vec<Payment>) -> Self {
        self.next_id = rows.iter().map(|p| p.id.0 + 1).max().unwrap_or(1).max(self.next_id);
        self.rows = rows;
        self
    }

    pub fn rows(&self) -> &[Payment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn fetch_all(&self) -> Result<Vec<Payment>> {
        Ok(self.rows.clone())
    }

    fn append(&mut self, payment: NewPayment) -> Result<Payment> {
        let id = PaymentId(self.next_id);
        self.next_id += 1;
        let row = payment.into_payment(id);
        self.rows.push(row.clone());
        Ok(row)
    }

    fn replace_all(&mut self, rows: Vec<Payment>) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(dup) = rows.iter().find(|p| !seen.insert(p.id)) {
            return Err(LedgerError::DuplicatePaymentId { id: dup.id });
        }
        if let Some(max) = rows.iter().map(|p| p.id.0).max() {
            self.next_id = self.next_id.max(max + 1);
        }
        self.rows = rows;
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    fn apply_changes(&mut self, changes: &LedgerChanges) -> Result<()> {
        if !self.transactional {
            return Err(LedgerError::OperationNotSupported);
        }

        // check everything before touching any row
        let present: HashSet<PaymentId> = self.rows.iter().map(|p| p.id).collect();
        for id in changes.updated.iter().map(|p| p.id).chain(changes.removed.iter().copied()) {
            if !present.contains(&id) {
                return Err(LedgerError::StaleView { missing: vec![id] });
            }
        }

        let removed: HashSet<PaymentId> = changes.removed.iter().copied().collect();
        self.rows.retain(|p| !removed.contains(&p.id));
        for update in &changes.updated {
            if let Some(row) = self.rows.iter_mut().find(|p| p.id == update.id) {
                *row = update.clone();
            }
        }
        Ok(())
    }
}

/// in-memory attachment storage keyed by name
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachmentStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, reference: &AttachmentRef) -> bool {
        self.objects.contains_key(reference.as_str())
    }

    pub fn get(&self, reference: &AttachmentRef) -> Option<&[u8]> {
        self.objects.get(reference.as_str()).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl AttachmentStore for InMemoryAttachmentStore {
    fn store(&mut self, bytes: &[u8], suggested_name: &str) -> Result<AttachmentRef> {
        if self.objects.contains_key(suggested_name) {
            return Err(LedgerError::Storage {
                message: format!("attachment {} already exists", suggested_name),
            });
        }
        self.objects.insert(suggested_name.to_string(), bytes.to_vec());
        Ok(AttachmentRef(suggested_name.to_string()))
    }

    fn delete(&mut self, reference: &AttachmentRef) -> Result<()> {
        self.objects
            .remove(reference.as_str())
            .map(|_| ())
            .ok_or_else(|| LedgerError::Storage {
                message: format!("attachment {} not found", reference),
            })
    }

    fn resolve(&self, reference: &AttachmentRef) -> Result<String> {
        if self.contains(reference) {
            Ok(format!("memory://{}", reference))
        } else {
            Err(LedgerError::Storage {
                message: format!("attachment {} not found", reference),
            })
        }
    }
}
