use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::types::{Payment, Roster};

/// filter for the payment history page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// nickname to show, or everyone
    pub member: Option<String>,
    /// inclusive lower bound
    pub from: Option<NaiveDate>,
    /// inclusive upper bound
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, payment: &Payment, roster: &Roster) -> bool {
        if self.from.map(|from| payment.date < from).unwrap_or(false) {
            return false;
        }
        if self.to.map(|to| payment.date > to).unwrap_or(false) {
            return false;
        }
        match &self.member {
            Some(nickname) => roster.nickname_or_id(&payment.member_id) == nickname,
            None => true,
        }
    }

    /// rows shown to the editor, in ledger order; their ids form the edited subset
    pub fn select<'a>(&self, payments: &'a [Payment], roster: &Roster) -> Vec<&'a Payment> {
        payments.iter().filter(|p| self.matches(p, roster)).collect()
    }
}

/// earliest and latest payment dates, or `today` twice for an empty ledger
pub fn default_range(payments: &[Payment], today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let lo = payments.iter().map(|p| p.date).min();
    let hi = payments.iter().map(|p| p.date).max();
    match (lo, hi) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => (today, today),
    }
}

/// rows with a screenshot, newest first, optionally for one nickname.
/// `limit` caps the result unless it is `None` ("show all").
pub fn gallery<'a>(
    payments: &'a [Payment],
    roster: &Roster,
    member: Option<&str>,
    limit: Option<usize>,
) -> Vec<&'a Payment> {
    let mut rows: Vec<&Payment> = payments
        .iter()
        .filter(|p| member.map(|m| roster.nickname_or_id(&p.member_id) == m).unwrap_or(true))
        .collect();
    // stable, so same-day rows keep ledger order
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    rows.into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .filter(|p| p.attachment().is_some())
        .collect()
}

/// gallery page sized by the configuration, or everything when `show_all`
pub fn gallery_page<'a>(
    payments: &'a [Payment],
    roster: &Roster,
    member: Option<&str>,
    show_all: bool,
    config: &LedgerConfig,
) -> Vec<&'a Payment> {
    let limit = if show_all { None } else { Some(config.gallery_page_size) };
    gallery(payments, roster, member, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::{AttachmentRef, Member, PaymentId};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(id: u64, member: &str, day: u32, shot: Option<&str>) -> Payment {
        Payment {
            id: PaymentId(id),
            member_id: member.to_string(),
            date: date(day),
            days_covered: dec!(1),
            amount: Quantity::from_qi(1_000),
            attachment_ref: shot.map(|s| AttachmentRef(s.to_string())),
        }
    }

    fn roster() -> Roster {
        Roster::new(vec![Member::new("u1", "amy"), Member::new("u2", "bob")])
    }

    #[test]
    fn test_filter_by_member_and_range() {
        let rows = vec![
            row(1, "u1", 1, None),
            row(2, "u2", 2, None),
            row(3, "u1", 5, None),
            row(4, "ghost", 3, None),
        ];
        let filter = HistoryFilter {
            member: Some("amy".into()),
            from: Some(date(1)),
            to: Some(date(4)),
        };
        let ids: Vec<u64> = filter.select(&rows, &roster()).iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1]);

        // members missing from the roster are matched by their raw id
        let ghost = HistoryFilter {
            member: Some("ghost".into()),
            ..Default::default()
        };
        assert_eq!(ghost.select(&rows, &roster()).len(), 1);

        assert_eq!(HistoryFilter::default().select(&rows, &roster()).len(), 4);
    }

    #[test]
    fn test_default_range() {
        let rows = vec![row(1, "u1", 4, None), row(2, "u1", 2, None), row(3, "u1", 9, None)];
        assert_eq!(default_range(&rows, date(20)), (date(2), date(9)));
        assert_eq!(default_range(&[], date(20)), (date(20), date(20)));
    }

    #[test]
    fn test_gallery() {
        let rows = vec![
            row(1, "u1", 1, Some("a.png")),
            row(2, "u2", 3, Some("b.png")),
            row(3, "u1", 2, None),
            row(4, "u1", 4, Some("")),
            row(5, "u1", 5, Some("c.png")),
        ];

        let all: Vec<u64> = gallery(&rows, &roster(), None, None).iter().map(|p| p.id.0).collect();
        assert_eq!(all, vec![5, 2, 1]);

        let amy: Vec<u64> = gallery(&rows, &roster(), Some("amy"), None).iter().map(|p| p.id.0).collect();
        assert_eq!(amy, vec![5, 1]);

        // the page is taken before rows without screenshots are skipped
        let page: Vec<u64> = gallery(&rows, &roster(), None, Some(3)).iter().map(|p| p.id.0).collect();
        assert_eq!(page, vec![5, 2]);

        let config = LedgerConfig {
            gallery_page_size: 1,
            ..Default::default()
        };
        assert_eq!(gallery_page(&rows, &roster(), None, false, &config).len(), 1);
        assert_eq!(gallery_page(&rows, &roster(), None, true, &config).len(), 3);
    }
}
