use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::{MemberId, Payment, Roster};

use super::expiry::{compute_expiry, payments_for_member};

/// coverage state of a single member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    /// member has never paid
    NoHistory,
    /// member has paid at least once
    Covered {
        expiry: NaiveDateTime,
        days_remaining: i64,
        days_overdue: i64,
    },
}

impl CoverageStatus {
    pub fn days_remaining(&self) -> Option<i64> {
        match self {
            CoverageStatus::NoHistory => None,
            CoverageStatus::Covered { days_remaining, .. } => Some(*days_remaining),
        }
    }

    pub fn days_overdue(&self) -> Option<i64> {
        match self {
            CoverageStatus::NoHistory => None,
            CoverageStatus::Covered { days_overdue, .. } => Some(*days_overdue),
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.days_overdue().map(|d| d > 0).unwrap_or(false)
    }
}

/// whole-day distance between `today` and the expiry date, clamped on each side
pub fn derive_status(expiry: Option<NaiveDateTime>, today: NaiveDate) -> CoverageStatus {
    match expiry {
        None => CoverageStatus::NoHistory,
        Some(expiry) => {
            let delta = (expiry.date() - today).num_days();
            CoverageStatus::Covered {
                expiry,
                days_remaining: delta.max(0),
                days_overdue: (-delta).max(0),
            }
        }
    }
}

/// one line of the roster status board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub member_id: MemberId,
    pub nickname: String,
    pub status: CoverageStatus,
}

/// status of every roster member, in roster order
pub fn status_board(roster: &Roster, payments: &[Payment], today: NaiveDate) -> Result<Vec<MemberStatus>> {
    roster
        .members()
        .iter()
        .map(|member| {
            let own = payments_for_member(payments, &member.id);
            let expiry = compute_expiry(own.into_iter())?;
            Ok(MemberStatus {
                member_id: member.id.clone(),
                nickname: member.nickname.clone(),
                status: derive_status(expiry, today),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::{Member, PaymentId};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_no_history_is_distinct() {
        let status = derive_status(None, date(2024, 1, 1));
        assert_eq!(status, CoverageStatus::NoHistory);
        assert_eq!(status.days_remaining(), None);
        assert_eq!(status.days_overdue(), None);
    }

    #[test]
    fn test_remaining_and_overdue() {
        let expiry = midnight(date(2024, 1, 10));

        let before = derive_status(Some(expiry), date(2024, 1, 7));
        assert_eq!(before.days_remaining(), Some(3));
        assert_eq!(before.days_overdue(), Some(0));

        let after = derive_status(Some(expiry), date(2024, 1, 12));
        assert_eq!(after.days_remaining(), Some(0));
        assert_eq!(after.days_overdue(), Some(2));
        assert!(after.is_overdue());

        let on_day = derive_status(Some(expiry), date(2024, 1, 10));
        assert_eq!(on_day.days_remaining(), Some(0));
        assert_eq!(on_day.days_overdue(), Some(0));
        assert_ne!(on_day, CoverageStatus::NoHistory);
    }

    #[test]
    fn test_fractional_expiry_uses_calendar_date() {
        let expiry = midnight(date(2024, 1, 10)) + Duration::hours(18);
        let status = derive_status(Some(expiry), date(2024, 1, 9));
        assert_eq!(status.days_remaining(), Some(1));
    }

    #[test]
    fn test_status_board() {
        let roster = Roster::new(vec![Member::new("u1", "amy"), Member::new("u2", "bob")]);
        let payments = vec![
            Payment {
                id: PaymentId(1),
                member_id: "u1".to_string(),
                date: date(2024, 1, 1),
                days_covered: dec!(5),
                amount: Quantity::from_qi(5_000),
                attachment_ref: None,
            },
            Payment {
                id: PaymentId(2),
                member_id: "stranger".to_string(),
                date: date(2024, 1, 1),
                days_covered: dec!(50),
                amount: Quantity::from_qi(50_000),
                attachment_ref: None,
            },
        ];

        let board = status_board(&roster, &payments, date(2024, 1, 3)).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].nickname, "amy");
        assert_eq!(board[0].status.days_remaining(), Some(2));
        assert_eq!(board[1].nickname, "bob");
        assert_eq!(board[1].status, CoverageStatus::NoHistory);
    }
}
