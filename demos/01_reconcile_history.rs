/// reconcile - delete and edit rows from a filtered history page
use dues_ledger_rs::chrono::NaiveDate;
use dues_ledger_rs::ledger::history::HistoryFilter;
use dues_ledger_rs::serialization::history_json;
use dues_ledger_rs::{
    AttachmentStore, Decimal, InMemoryAttachmentStore, InMemoryPaymentStore, LedgerConfig,
    LedgerReconciler, Member, NewPayment, PaymentId, Quantity, Roster,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let roster = Roster::new(vec![Member::new("1001", "amy"), Member::new("1002", "bob")]);
    let mut ledger = LedgerReconciler::new(
        InMemoryPaymentStore::full_replace_only(),
        InMemoryAttachmentStore::new(),
        LedgerConfig::default(),
    );

    for (day, member) in [(1, "1001"), (2, "1002"), (3, "1001"), (4, "1002")] {
        let shot = ledger
            .attachments_mut()
            .store(b"screenshot", &format!("shot-{}.png", day))?;
        ledger.append_now(NewPayment {
            member_id: member.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            days_covered: Decimal::from(3),
            amount: Quantity::parse("3sx")?,
            attachment_ref: Some(shot),
        })?;
    }

    // the editor only sees amy's rows
    let all = ledger.fetch_all()?;
    let filter = HistoryFilter {
        member: Some("amy".to_string()),
        ..Default::default()
    };
    let page = filter.select(&all, &roster);
    println!("editing page:\n{}", history_json(&page, &roster)?);

    let page_ids: Vec<PaymentId> = page.iter().map(|p| p.id).collect();
    let mut survivor = page[1].clone();
    survivor.amount = Quantity::parse("4.5sx")?;

    let report = ledger.replace_subset_now(&page_ids, &[survivor])?;
    println!(
        "removed {:?}, updated {:?}, preserved {}, released {:?}",
        report.removed, report.updated, report.preserved, report.released
    );

    let after = ledger.fetch_all()?;
    let rows: Vec<_> = after.iter().collect();
    println!("ledger now:\n{}", history_json(&rows, &roster)?);

    Ok(())
}
