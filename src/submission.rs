use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::ledger::{attachment_name, AttachmentStore, AttachmentUpload, LedgerReconciler, PaymentStore};
use crate::quantity::Quantity;
use crate::types::{MemberId, NewPayment, Payment, Roster};

/// a member's donation as entered in the form
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub member_id: MemberId,
    pub date: NaiveDate,
    /// amount paid, tiered notation
    pub amount_text: String,
    /// price of one day of coverage, tiered notation; config default when `None`
    pub rate_per_day_text: Option<String>,
    pub attachment: Option<AttachmentUpload>,
}

/// days of coverage bought by an amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageEstimate {
    pub amount: Quantity,
    pub rate_per_day: Quantity,
    pub days: Decimal,
}

impl CoverageEstimate {
    /// days as shown to the member: whole numbers bare, otherwise two decimals
    pub fn days_display(&self) -> String {
        if self.days.fract().is_zero() {
            self.days.trunc().normalize().to_string()
        } else {
            format!("{:.2}", self.days)
        }
    }

    /// preview line, e.g. "1.5sx = 1.50 day(s)"
    pub fn preview(&self) -> String {
        format!("{} = {} day(s)", self.amount, self.days_display())
    }

    pub fn covers_a_day(&self) -> bool {
        self.days >= Decimal::ONE
    }
}

/// divide an amount by the per-day rate
pub fn estimate(amount: Quantity, rate_per_day: Quantity) -> Result<CoverageEstimate> {
    let days = amount
        .ratio(rate_per_day)
        .ok_or(LedgerError::InvalidRate { rate: rate_per_day })?;
    Ok(CoverageEstimate {
        amount,
        rate_per_day,
        days,
    })
}

/// validates submissions and hands them to the ledger
pub struct SubmissionProcessor {
    default_rate_per_day: Quantity,
    attachment_name_max_len: usize,
}

impl SubmissionProcessor {
    pub fn new(default_rate_per_day: Quantity, attachment_name_max_len: usize) -> Self {
        Self {
            default_rate_per_day,
            attachment_name_max_len,
        }
    }

    pub fn from_config(config: &crate::config::LedgerConfig) -> Self {
        Self::new(config.default_rate_per_day, config.attachment_name_max_len)
    }

    /// parse both quantities and estimate coverage without touching storage
    pub fn preview(&self, submission: &Submission) -> Result<CoverageEstimate> {
        let amount = Quantity::parse(&submission.amount_text)?;
        let rate = match &submission.rate_per_day_text {
            Some(text) => Quantity::parse(text)?,
            None => self.default_rate_per_day,
        };
        estimate(amount, rate)
    }

    /// validate, store the screenshot, then append the payment
    pub fn process<P: PaymentStore, A: AttachmentStore>(
        &self,
        submission: Submission,
        roster: &Roster,
        ledger: &mut LedgerReconciler<P, A>,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        let checked = self.validate(&submission, roster);
        let estimate = match checked {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(member_id = %submission.member_id, error = %e, "submission rejected");
                ledger.events.emit(Event::SubmissionRejected {
                    member_id: submission.member_id.clone(),
                    reason: e.to_string(),
                    timestamp: time_provider.now(),
                });
                return Err(e);
            }
        };

        let attachment_ref = match &submission.attachment {
            Some(upload) => {
                let name = attachment_name(
                    submission.date,
                    &submission.member_id,
                    upload,
                    self.attachment_name_max_len,
                );
                let reference = ledger.attachments_mut().store(&upload.bytes, &name)?;
                ledger.events.emit(Event::AttachmentStored {
                    reference: reference.clone(),
                    timestamp: time_provider.now(),
                });
                Some(reference)
            }
            None => None,
        };

        let payment = NewPayment {
            member_id: submission.member_id,
            date: submission.date,
            days_covered: estimate.days,
            amount: estimate.amount,
            attachment_ref: attachment_ref.clone(),
        };

        match ledger.append(payment, time_provider) {
            Ok(stored) => {
                info!(payment_id = %stored.id, preview = %estimate.preview(), "submission accepted");
                Ok(stored)
            }
            Err(e) => {
                // the row never landed, so the screenshot is orphaned
                if let Some(reference) = attachment_ref {
                    match ledger.release_attachment(&reference, time_provider) {
                        Ok(()) => debug!(reference = %reference, "orphaned attachment released"),
                        Err(cleanup) => debug!(reference = %reference, error = %cleanup, "orphaned attachment kept"),
                    }
                }
                Err(e)
            }
        }
    }

    /// process with system time
    pub fn process_now<P: PaymentStore, A: AttachmentStore>(
        &self,
        submission: Submission,
        roster: &Roster,
        ledger: &mut LedgerReconciler<P, A>,
    ) -> Result<Payment> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.process(submission, roster, ledger, &time)
    }

    fn validate(&self, submission: &Submission, roster: &Roster) -> Result<CoverageEstimate> {
        if !roster.contains(&submission.member_id) {
            return Err(LedgerError::UnknownMember {
                id: submission.member_id.clone(),
            });
        }
        let estimate = self.preview(submission)?;
        if !estimate.covers_a_day() {
            return Err(LedgerError::InsufficientCoverage {
                amount: estimate.amount,
                days: estimate.days,
            });
        }
        Ok(estimate)
    }
}
