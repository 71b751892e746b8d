/// time control - deterministic coverage and notifications with controlled time
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use dues_ledger_rs::{
    ArrivalNotifier, CoverageCalculator, InMemoryAttachmentStore, InMemoryPaymentStore,
    LedgerConfig, LedgerReconciler, Member, NotifierState, Roster, SafeTimeProvider, Submission,
    SubmissionProcessor, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // create controlled time for testing
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let config = LedgerConfig::default();
    let roster = Roster::new(vec![Member::new("1001", "amy")]);
    let processor = SubmissionProcessor::from_config(&config);
    let calculator = CoverageCalculator::new(config.clone());
    let notifier = ArrivalNotifier::new(&config);
    let mut ledger = LedgerReconciler::new(
        InMemoryPaymentStore::new(),
        InMemoryAttachmentStore::new(),
        config,
    );
    let mut session = NotifierState::new();

    println!("starting date: {}", time.now().format("%Y-%m-%d"));

    // 5 days paid on 2024-01-01, 3 more on 2024-01-03
    for (day, amount) in [(1, "5sx"), (3, "3sx")] {
        processor.process(
            Submission {
                member_id: "1001".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                amount_text: amount.to_string(),
                rate_per_day_text: Some("1sx".to_string()),
                attachment: None,
            },
            &roster,
            &mut ledger,
            &time,
        )?;
    }

    let payments = ledger.fetch_all()?;
    let (next, created) = notifier.observe(session, &payments, &roster, &time);
    session = next;
    for event in &created {
        println!("notification: {}", event.message());
    }

    let expiry = calculator.member_expiry(&payments, "1001")?;
    println!("covered through: {:?}", expiry);

    // advance past the notification window
    controller.advance(Duration::seconds(31));
    let (_, active) = notifier.tick(session, &time);
    println!("active notifications after 31s: {}", active.len());

    // advance 10 days
    controller.advance(Duration::days(10));
    let status = calculator.member_status_with_time(&payments, "1001", &time)?;
    println!(
        "on {}: remaining {:?}, overdue {:?}",
        time.now().format("%Y-%m-%d"),
        status.days_remaining(),
        status.days_overdue()
    );

    Ok(())
}
