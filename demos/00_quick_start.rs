/// quick start - submit a donation and print the status board
use dues_ledger_rs::chrono::{NaiveDate, Utc};
use dues_ledger_rs::serialization::StatusBoardView;
use dues_ledger_rs::{
    CoverageCalculator, InMemoryAttachmentStore, InMemoryPaymentStore, LedgerConfig,
    LedgerReconciler, Member, Roster, Submission, SubmissionProcessor,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = LedgerConfig::default();
    let roster = Roster::new(vec![Member::new("1001", "amy"), Member::new("1002", "bob")]);
    let mut ledger = LedgerReconciler::new(
        InMemoryPaymentStore::new(),
        InMemoryAttachmentStore::new(),
        config.clone(),
    );
    let processor = SubmissionProcessor::from_config(&config);

    // amy pays 7sx at the default 1sx per day
    let payment = processor.process_now(
        Submission {
            member_id: "1001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount_text: "7sx".to_string(),
            rate_per_day_text: None,
            attachment: None,
        },
        &roster,
        &mut ledger,
    )?;
    println!("stored payment {} for {} day(s)", payment.id, payment.days_covered);

    let payments = ledger.fetch_all()?;
    let today = config.local_date(Utc::now());
    let calculator = CoverageCalculator::new(config);
    let board = calculator.status_board_now(&roster, &payments)?;
    println!("{}", StatusBoardView::new(today, &board).to_json_pretty()?);

    Ok(())
}
