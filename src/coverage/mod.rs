pub mod expiry;
pub mod status;

use chrono::{NaiveDate, NaiveDateTime};
use hourglass_rs::SafeTimeProvider;

use crate::config::LedgerConfig;
use crate::errors::Result;
use crate::types::{Payment, Roster};

pub use expiry::{compute_expiry, days_to_duration, payments_for_member};
pub use status::{derive_status, status_board, CoverageStatus, MemberStatus};

/// stateless coverage engine; every answer is recomputed from the ledger snapshot it is given
pub struct CoverageCalculator {
    config: LedgerConfig,
}

impl CoverageCalculator {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// expiry of one member
    pub fn member_expiry(&self, payments: &[Payment], member_id: &str) -> Result<Option<NaiveDateTime>> {
        compute_expiry(payments_for_member(payments, member_id))
    }

    /// status of one member as of `today`
    pub fn member_status(&self, payments: &[Payment], member_id: &str, today: NaiveDate) -> Result<CoverageStatus> {
        Ok(derive_status(self.member_expiry(payments, member_id)?, today))
    }

    /// status of one member using the provider's current date in the display timezone
    pub fn member_status_with_time(
        &self,
        payments: &[Payment],
        member_id: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<CoverageStatus> {
        let today = self.config.local_date(time_provider.now());
        self.member_status(payments, member_id, today)
    }

    /// roster status board using the provider's current date
    pub fn status_board_with_time(
        &self,
        roster: &Roster,
        payments: &[Payment],
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<MemberStatus>> {
        let today = self.config.local_date(time_provider.now());
        status_board(roster, payments, today)
    }

    /// roster status board using system time
    pub fn status_board_now(&self, roster: &Roster, payments: &[Payment]) -> Result<Vec<MemberStatus>> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.status_board_with_time(roster, payments, &time)
    }
}
