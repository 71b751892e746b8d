//! serializable views of ledger rows and status boards
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coverage::{CoverageStatus, MemberStatus};
use crate::quantity::Quantity;
use crate::types::{Payment, PaymentId, Roster};

/// history row as displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub date: NaiveDate,
    pub member: String,
    pub days_covered: Decimal,
    pub amount: Quantity,
    pub amount_display: String,
    pub attachment: Option<String>,
}

impl PaymentView {
    pub fn from_payment(payment: &Payment, roster: &Roster) -> Self {
        PaymentView {
            id: payment.id,
            date: payment.date,
            member: roster.nickname_or_id(&payment.member_id).to_string(),
            days_covered: payment.days_covered,
            amount: payment.amount,
            amount_display: payment.amount.format(),
            attachment: payment.attachment().map(|r| r.to_string()),
        }
    }
}

/// one status board line; `None` days mean the member never paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatusView {
    pub member: String,
    pub expiry: Option<NaiveDateTime>,
    pub days_remaining: Option<i64>,
    pub days_overdue: Option<i64>,
    pub label: String,
}

impl MemberStatusView {
    pub fn from_status(status: &MemberStatus) -> Self {
        let (expiry, label) = match status.status {
            CoverageStatus::NoHistory => (None, "no payments".to_string()),
            CoverageStatus::Covered { expiry, days_remaining, days_overdue } => {
                let label = if days_overdue > 0 {
                    format!("{} day(s) overdue", days_overdue)
                } else {
                    format!("{} day(s) remaining", days_remaining)
                };
                (Some(expiry), label)
            }
        };
        MemberStatusView {
            member: status.nickname.clone(),
            expiry,
            days_remaining: status.status.days_remaining(),
            days_overdue: status.status.days_overdue(),
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBoardView {
    pub today: NaiveDate,
    pub members: Vec<MemberStatusView>,
}

impl StatusBoardView {
    pub fn new(today: NaiveDate, board: &[MemberStatus]) -> Self {
        StatusBoardView {
            today,
            members: board.iter().map(MemberStatusView::from_status).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// history rows as pretty-printed json
pub fn history_json(rows: &[&Payment], roster: &Roster) -> Result<String, serde_json::Error> {
    let views: Vec<PaymentView> = rows.iter().map(|p| PaymentView::from_payment(p, roster)).collect();
    serde_json::to_string_pretty(&views)
}
