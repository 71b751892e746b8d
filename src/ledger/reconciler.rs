use std::collections::{HashMap, HashSet};

use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{AttachmentRef, NewPayment, Payment, PaymentId};

use super::{AttachmentStore, LedgerChanges, PaymentStore};

/// what an edit against a subset of the ledger means for the full ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// rows never shown to the editor, preserved verbatim
    pub outside: Vec<Payment>,
    /// surviving rows with their edits applied
    pub kept: Vec<Payment>,
    /// kept rows whose content differs from the stored row
    pub changed: Vec<Payment>,
    /// subset rows the editor dropped
    pub removed: Vec<Payment>,
    /// attachments no surviving row refers to any more
    pub release: Vec<AttachmentRef>,
}

impl ReconciliationPlan {
    /// plan an edit of `original_subset_ids` against the full current ledger
    pub fn build(
        all_rows: &[Payment],
        original_subset_ids: &[PaymentId],
        surviving_rows: &[Payment],
    ) -> Result<Self> {
        let present: HashSet<PaymentId> = all_rows.iter().map(|p| p.id).collect();
        let subset: HashSet<PaymentId> = original_subset_ids.iter().copied().collect();

        let mut missing: Vec<PaymentId> = subset.difference(&present).copied().collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(LedgerError::StaleView { missing });
        }

        let mut edits: HashMap<PaymentId, &Payment> = HashMap::new();
        for row in surviving_rows {
            if !subset.contains(&row.id) {
                return Err(LedgerError::UnknownPaymentId { id: row.id });
            }
            if edits.insert(row.id, row).is_some() {
                return Err(LedgerError::DuplicatePaymentId { id: row.id });
            }
            row.validate()?;
        }

        let mut outside = Vec::new();
        let mut kept = Vec::new();
        let mut changed = Vec::new();
        let mut removed = Vec::new();

        for row in all_rows {
            if !subset.contains(&row.id) {
                outside.push(row.clone());
            } else if let Some(edited) = edits.get(&row.id) {
                if *edited != row {
                    changed.push((*edited).clone());
                }
                kept.push((*edited).clone());
            } else {
                removed.push(row.clone());
            }
        }

        let in_use: HashSet<&AttachmentRef> = outside
            .iter()
            .chain(kept.iter())
            .filter_map(|p| p.attachment())
            .collect();

        let originals: HashMap<PaymentId, &Payment> = all_rows.iter().map(|p| (p.id, p)).collect();
        let replaced = changed
            .iter()
            .filter_map(|p| originals.get(&p.id).and_then(|o| o.attachment()));

        let mut release: Vec<AttachmentRef> = Vec::new();
        for reference in removed.iter().filter_map(|p| p.attachment()).chain(replaced) {
            if !in_use.contains(reference) && !release.contains(reference) {
                release.push(reference.clone());
            }
        }

        Ok(Self {
            outside,
            kept,
            changed,
            removed,
            release,
        })
    }

    /// full ledger after the edit, in the original row order
    pub fn new_ledger(&self, all_rows: &[Payment]) -> Vec<Payment> {
        let kept: HashMap<PaymentId, &Payment> = self.kept.iter().map(|p| (p.id, p)).collect();
        let outside: HashSet<PaymentId> = self.outside.iter().map(|p| p.id).collect();

        all_rows
            .iter()
            .filter_map(|row| {
                if outside.contains(&row.id) {
                    Some(row.clone())
                } else {
                    kept.get(&row.id).map(|p| (*p).clone())
                }
            })
            .collect()
    }

    /// targeted form of the plan
    pub fn changes(&self) -> LedgerChanges {
        LedgerChanges {
            updated: self.changed.clone(),
            removed: self.removed.iter().map(|p| p.id).collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// outcome of a successful reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationReport {
    pub removed: Vec<PaymentId>,
    pub updated: Vec<PaymentId>,
    pub preserved: usize,
    pub transactional: bool,
    pub released: Vec<AttachmentRef>,
    /// attachment releases that failed; the ledger change still stands
    pub cleanup_failures: Vec<LedgerError>,
}

/// applies appends and edits to the ledger while keeping attachments consistent
pub struct LedgerReconciler<P, A> {
    store: P,
    attachments: A,
    config: LedgerConfig,
    pub events: EventStore,
}

impl<P: PaymentStore, A: AttachmentStore> LedgerReconciler<P, A> {
    pub fn new(store: P, attachments: A, config: LedgerConfig) -> Self {
        Self {
            store,
            attachments,
            config,
            events: EventStore::default(),
        }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn attachments(&self) -> &A {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut A {
        &mut self.attachments
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_parts(self) -> (P, A) {
        (self.store, self.attachments)
    }

    /// full current ledger, read fresh from the store
    pub fn fetch_all(&self) -> Result<Vec<Payment>> {
        self.store.fetch_all()
    }

    /// append with system time
    pub fn append_now(&mut self, payment: NewPayment) -> Result<Payment> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.append(payment, &time)
    }

    /// append one row; day-count policy is the caller's concern
    pub fn append(&mut self, payment: NewPayment, time_provider: &SafeTimeProvider) -> Result<Payment> {
        if payment.days_covered <= Decimal::ZERO {
            return Err(LedgerError::InvalidPayment {
                id: None,
                field: "days_covered",
                reason: format!("must be positive, got {}", payment.days_covered),
            });
        }

        let stored = self.store.append(payment)?;
        info!(
            payment_id = %stored.id,
            member_id = %stored.member_id,
            amount = %stored.amount,
            days = %stored.days_covered,
            "payment appended"
        );

        self.events.emit(Event::PaymentAppended {
            payment_id: stored.id,
            member_id: stored.member_id.clone(),
            date: stored.date,
            amount: stored.amount,
            days_covered: stored.days_covered,
            timestamp: time_provider.now(),
        });

        Ok(stored)
    }

    /// replace subset with system time
    pub fn replace_subset_now(
        &mut self,
        original_subset_ids: &[PaymentId],
        surviving_rows: &[Payment],
    ) -> Result<ReconciliationReport> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.replace_subset(original_subset_ids, surviving_rows, &time)
    }

    /// apply the edits made to a previously fetched subset of rows.
    ///
    /// Rows outside `original_subset_ids` are recomputed against the full
    /// current ledger and always survive. Subset rows missing from
    /// `surviving_rows` are deleted and their attachments released after
    /// the ledger change has committed.
    pub fn replace_subset(
        &mut self,
        original_subset_ids: &[PaymentId],
        surviving_rows: &[Payment],
        time_provider: &SafeTimeProvider,
    ) -> Result<ReconciliationReport> {
        let all_rows = self.store.fetch_all()?;
        let plan = ReconciliationPlan::build(&all_rows, original_subset_ids, surviving_rows)?;

        debug!(
            outside = plan.outside.len(),
            kept = plan.kept.len(),
            changed = plan.changed.len(),
            removed = plan.removed.len(),
            "reconciliation planned"
        );

        let transactional = self.config.prefer_transactional_replace && self.store.supports_transactions();

        if plan.is_noop() {
            return Ok(ReconciliationReport {
                removed: Vec::new(),
                updated: Vec::new(),
                preserved: plan.outside.len(),
                transactional,
                released: Vec::new(),
                cleanup_failures: Vec::new(),
            });
        }

        if transactional {
            self.store.apply_changes(&plan.changes())?;
        } else {
            let new_ledger = plan.new_ledger(&all_rows);
            let expected = new_ledger.len();
            if let Err(e) = self.store.replace_all(new_ledger) {
                return Err(self.replace_failure(e, expected));
            }
        }

        let now = time_provider.now();
        self.events.emit(Event::LedgerReplaced {
            rows_before: all_rows.len(),
            rows_after: plan.outside.len() + plan.kept.len(),
            transactional,
            timestamp: now,
        });
        for row in &plan.changed {
            self.events.emit(Event::PaymentUpdated {
                payment_id: row.id,
                timestamp: now,
            });
        }
        for row in &plan.removed {
            self.events.emit(Event::PaymentRemoved {
                payment_id: row.id,
                member_id: row.member_id.clone(),
                timestamp: now,
            });
        }

        info!(
            removed = plan.removed.len(),
            updated = plan.changed.len(),
            preserved = plan.outside.len(),
            transactional,
            "ledger reconciled"
        );

        let mut released = Vec::new();
        let mut cleanup_failures = Vec::new();
        for reference in &plan.release {
            match self.release_attachment(reference, time_provider) {
                Ok(()) => released.push(reference.clone()),
                Err(e) => cleanup_failures.push(e),
            }
        }

        Ok(ReconciliationReport {
            removed: plan.removed.iter().map(|p| p.id).collect(),
            updated: plan.changed.iter().map(|p| p.id).collect(),
            preserved: plan.outside.len(),
            transactional,
            released,
            cleanup_failures,
        })
    }

    /// best-effort delete; failures are logged and returned, never propagated
    pub(crate) fn release_attachment(
        &mut self,
        reference: &AttachmentRef,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        match self.attachments.delete(reference) {
            Ok(()) => {
                self.events.emit(Event::AttachmentReleased {
                    reference: reference.clone(),
                    timestamp: time_provider.now(),
                });
                Ok(())
            }
            Err(e) => {
                warn!(reference = %reference, error = %e, "attachment cleanup failed");
                self.events.emit(Event::AttachmentCleanupFailed {
                    reference: reference.clone(),
                    message: e.to_string(),
                    timestamp: time_provider.now(),
                });
                Err(LedgerError::AttachmentCleanup {
                    reference: reference.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn replace_failure(&self, cause: LedgerError, expected: usize) -> LedgerError {
        let rows_lost = match self.store.fetch_all() {
            Ok(rows) => expected.saturating_sub(rows.len()),
            Err(_) => expected,
        };
        error!(
            error = %cause,
            expected_rows = expected,
            rows_lost,
            "full ledger rewrite failed, ledger may be incomplete"
        );
        LedgerError::ReconciliationFailure {
            stage: "replace_all",
            message: cause.to_string(),
            rows_lost,
        }
    }
}
