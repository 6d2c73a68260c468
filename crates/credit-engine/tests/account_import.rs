use chrono::NaiveDate;
use credit_engine::accounts::{
    account_mix, average_age_months, revolving_lines, tally, AccountCsvImporter, MixCategory,
};
use credit_engine::scoring::utilization::{self, aggregate_paydown, worst_line};

const EXPORT: &str = "\
Account ID,Name,Type,Subtype,Balance,Credit Limit,Status,Opened At,Closed At\n\
CHK-001,Everyday Checking,depository,checking,1850,,open,2021-04-10,\n\
SAV-002,Rainy Day Savings,depository,savings,7200,,open,2020-11-02,\n\
CRD-003,Freedom,credit,credit card,2600,6000,open,2019-07-15,\n\
CRD-004,Travel Mastercard,credit,credit card,900,8000,open,2022-03-05,\n\
CRD-008,Store Card,credit,store card,0,3000,closed,2018-01-10,2023-02-18\n\
INV-005,Brokerage,investment,brokerage,15430,,open,2017-05-30,\n\
LOA-007,Student Loan,loan,student,12800,,open,2014-09-01,\n\
LOA-012,Mortgage,loan,mortgage,245000,,open,2019-12-11,\n";

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid as-of date")
}

#[test]
fn imported_accounts_feed_overview_calculations() {
    let accounts = AccountCsvImporter::from_reader(EXPORT.as_bytes()).expect("import succeeds");
    assert_eq!(accounts.len(), 8);

    let counts = tally(&accounts);
    assert_eq!(counts.open, 7);
    assert_eq!(counts.closed, 1);

    let lines = revolving_lines(&accounts);
    assert_eq!(lines.len(), 3);

    let summary = utilization::utilization(&lines, as_of());
    assert_eq!(summary.open_lines, 2);
    assert_eq!(summary.total_balance, 3500.0);
    assert_eq!(summary.total_limit, 14000.0);
    assert_eq!(summary.percent, 25.0);
    assert_eq!(aggregate_paydown(&lines, as_of(), 20.0), 700.0);

    let worst = worst_line(&lines, as_of()).expect("worst line present");
    assert_eq!(worst.name, "Freedom");
    assert_eq!(worst.percent, 43);
}

#[test]
fn imported_mix_splits_deposits_and_loans() {
    let accounts = AccountCsvImporter::from_reader(EXPORT.as_bytes()).expect("import succeeds");
    let mix = account_mix(&accounts);

    let category = |wanted: MixCategory| {
        mix.entries
            .iter()
            .find(|entry| entry.category == wanted)
            .expect("category present")
    };

    assert_eq!(category(MixCategory::DepositSavings).exposure, 7200.0);
    assert_eq!(category(MixCategory::DepositChecking).exposure, 1850.0);
    assert_eq!(category(MixCategory::LoanMortgage).accounts, 1);
    assert_eq!(category(MixCategory::Credit).accounts, 2);
    assert!(mix.entries.iter().all(|entry| entry.category != MixCategory::LoanOther));

    let shares: f64 = mix.entries.iter().map(|entry| entry.exposure_share).sum();
    assert!((shares - 1.0).abs() < 1e-9);
}

#[test]
fn average_age_covers_open_dated_accounts() {
    let accounts = AccountCsvImporter::from_reader(EXPORT.as_bytes()).expect("import succeeds");
    // 54 + 59 + 75 + 43 + 101 + 133 + 70 = 535 over 7 accounts
    assert_eq!(average_age_months(&accounts, as_of()), Some(76));
}
