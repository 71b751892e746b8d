use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::errors::{LedgerError, Result};
use crate::types::Payment;

const MILLIS_PER_DAY: Decimal = dec!(86400000);

/// convert a possibly fractional day count into a duration (millisecond precision)
pub fn days_to_duration(days: Decimal) -> Result<Duration> {
    let overflow = || LedgerError::DateOverflow { days };
    let millis = days
        .checked_mul(MILLIS_PER_DAY)
        .ok_or_else(overflow)?
        .round()
        .to_i64()
        .ok_or_else(overflow)?;
    Duration::try_milliseconds(millis).ok_or_else(overflow)
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn shift(at: NaiveDateTime, days: Decimal) -> Result<NaiveDateTime> {
    at.checked_add_signed(days_to_duration(days)?)
        .ok_or(LedgerError::DateOverflow { days })
}

/// instant through which the given payments provide coverage.
///
/// Payments are ordered by date with a stable sort, so rows sharing a date
/// keep the order the data source returned them in. A payment dated
/// strictly after the running expiry opens a new block ending at
/// `date + (days - 1)`; any other payment extends the running expiry by
/// its full `days`. Returns `None` when there are no payments.
pub fn compute_expiry<'a, I>(payments: I) -> Result<Option<NaiveDateTime>>
where
    I: IntoIterator<Item = &'a Payment>,
{
    let mut ordered: Vec<&Payment> = payments.into_iter().collect();
    ordered.sort_by_key(|p| p.date);

    let mut expiry: Option<NaiveDateTime> = None;
    for payment in ordered {
        let paid_on = start_of(payment.date);
        expiry = Some(match expiry {
            Some(current) if paid_on <= current => shift(current, payment.days_covered)?,
            _ => shift(paid_on, payment.days_covered - Decimal::ONE)?,
        });
    }

    Ok(expiry)
}

/// payments of one member, in ledger order
pub fn payments_for_member<'a>(payments: &'a [Payment], member_id: &str) -> Vec<&'a Payment> {
    payments.iter().filter(|p| p.member_id == member_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::PaymentId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pay(id: u64, on: NaiveDate, days: Decimal) -> Payment {
        Payment {
            id: PaymentId(id),
            member_id: "u1".to_string(),
            date: on,
            days_covered: days,
            amount: Quantity::from_qi(1_000),
            attachment_ref: None,
        }
    }

    #[test]
    fn test_no_payments() {
        assert_eq!(compute_expiry(&Vec::<Payment>::new()).unwrap(), None);
    }

    #[test]
    fn test_overlapping_payment_extends() {
        let payments = vec![
            pay(1, date(2024, 1, 1), dec!(5)),
            pay(2, date(2024, 1, 3), dec!(3)),
        ];
        let expiry = compute_expiry(&payments).unwrap().unwrap();
        assert_eq!(expiry, start_of(date(2024, 1, 8)));
    }

    #[test]
    fn test_gap_starts_new_block() {
        let payments = vec![
            pay(1, date(2024, 1, 1), dec!(5)),
            pay(2, date(2024, 1, 10), dec!(3)),
        ];
        let expiry = compute_expiry(&payments).unwrap().unwrap();
        assert_eq!(expiry, start_of(date(2024, 1, 12)));
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_date() {
        let payments = vec![
            pay(2, date(2024, 1, 3), dec!(3)),
            pay(1, date(2024, 1, 1), dec!(5)),
        ];
        let expiry = compute_expiry(&payments).unwrap().unwrap();
        assert_eq!(expiry, start_of(date(2024, 1, 8)));
    }

    #[test]
    fn test_payment_on_expiry_day_extends() {
        // expiry is 2024-01-05; a payment on that day extends without the -1
        let on_boundary = vec![
            pay(1, date(2024, 1, 1), dec!(5)),
            pay(2, date(2024, 1, 5), dec!(2)),
        ];
        assert_eq!(
            compute_expiry(&on_boundary).unwrap().unwrap(),
            start_of(date(2024, 1, 7))
        );

        // the day after opens a new block with the -1
        let after = vec![
            pay(1, date(2024, 1, 1), dec!(5)),
            pay(2, date(2024, 1, 6), dec!(2)),
        ];
        assert_eq!(
            compute_expiry(&after).unwrap().unwrap(),
            start_of(date(2024, 1, 7))
        );
    }

    #[test]
    fn test_fractional_days() {
        let payments = vec![pay(1, date(2024, 1, 1), dec!(1.5))];
        let expiry = compute_expiry(&payments).unwrap().unwrap();
        assert_eq!(expiry, start_of(date(2024, 1, 1)) + Duration::hours(12));

        // 2024-01-02 00:00 is strictly after 2024-01-01 12:00
        let payments = vec![
            pay(1, date(2024, 1, 1), dec!(1.5)),
            pay(2, date(2024, 1, 2), dec!(1)),
        ];
        assert_eq!(
            compute_expiry(&payments).unwrap().unwrap(),
            start_of(date(2024, 1, 2))
        );
    }

    #[test]
    fn test_same_date_keeps_source_order() {
        let short = pay(1, date(2024, 1, 1), dec!(0.5));
        let long = pay(2, date(2024, 1, 1), dec!(3));

        let short_first = vec![short.clone(), long.clone()];
        assert_eq!(
            compute_expiry(&short_first).unwrap().unwrap(),
            start_of(date(2024, 1, 3))
        );

        let long_first = vec![long, short];
        assert_eq!(
            compute_expiry(&long_first).unwrap().unwrap(),
            start_of(date(2024, 1, 3)) + Duration::hours(12)
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        let payments = vec![pay(1, date(2024, 1, 1), Decimal::MAX)];
        assert!(matches!(
            compute_expiry(&payments),
            Err(LedgerError::DateOverflow { .. })
        ));
    }

    #[test]
    fn test_payments_for_member() {
        let mut other = pay(3, date(2024, 1, 2), dec!(1));
        other.member_id = "u2".to_string();
        let payments = vec![pay(1, date(2024, 1, 1), dec!(1)), other];
        let mine = payments_for_member(&payments, "u1");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, PaymentId(1));
    }
}
