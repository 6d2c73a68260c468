use chrono::{Local, Months, NaiveDate};
use clap::Args;
use credit_engine::accounts::{
    account_mix, credit_age, revolving_lines, tally, Account, AccountCsvImporter,
    AccountImportError,
};
use credit_engine::config::AppConfig;
use credit_engine::error::AppError;
use credit_engine::scoring::aggregate::blend_weights;
use credit_engine::scoring::highlights::{corridor_highlights, origin_highlights};
use credit_engine::scoring::history::{
    inquiry_summary, on_time_rate, Inquiry, InquiryKind, PaymentMonth, PaymentStatus,
};
use credit_engine::scoring::lender_fit::{evaluate_corridor, evaluate_origin, LenderFit};
use credit_engine::scoring::normalize::{
    passport_summary, AnchorMapping, ConsentState, ReliabilityGrade,
};
use credit_engine::scoring::utilization::{rank_lines, worst_line, LineOrder};
use credit_engine::scoring::{
    aggregate, corridor_score, percent_of_max, utilization, BandScale, CountryProfile,
    OriginMetrics, RevokedConsentPolicy, ScoreComponents, WeightMap,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional account export CSV replacing the built-in sample accounts.
    #[arg(long)]
    pub(crate) accounts_csv: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Utilization target for paydown figures. Defaults to CREDIT_UTILIZATION_TARGET.
    #[arg(long, value_parser = crate::infra::parse_percent)]
    pub(crate) target_percent: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Origin-country score on the 0-1000 scale
    #[arg(long)]
    pub(crate) origin: f64,
    /// Destination-country score on the 0-1000 scale
    #[arg(long)]
    pub(crate) destination: f64,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let corridor = corridor_score(args.origin, args.destination);

    println!(
        "Corridor score: {} ({}, {}% of max)",
        corridor.global, corridor.band, corridor.percent_of_max
    );
    println!(
        "Origin {} / destination {} (gap {})",
        corridor.origin, corridor.destination, corridor.gap
    );
    render_fit(&evaluate_corridor(&corridor));
    render_highlights(&corridor_highlights(&corridor));

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        accounts_csv,
        as_of,
        target_percent,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let target_percent = match target_percent {
        Some(target) => target,
        None => AppConfig::load()?.engine.utilization_target,
    };

    println!("Credit engine demo (as of {})", as_of);

    println!("\nBand scale");
    for band in BandScale::standard().bands() {
        println!("- {} from {}", band.name, band.min);
    }

    let components = ScoreComponents {
        payment: 290.0,
        utilization: 230.0,
        age: 95.0,
        inquiries: 45.0,
        mix: 20.0,
    };
    let weights = WeightMap::default();
    let score = aggregate(&components, &weights);
    println!(
        "\nOrigin score: {} ({}, {}% of max)",
        score.score,
        BandScale::standard().classify(score.score),
        percent_of_max(score.score)
    );
    for share in &score.weight_shares {
        println!("- {}: {}%", share.label, share.percent);
    }

    let (accounts, source) = match accounts_csv {
        Some(path) => (AccountCsvImporter::from_path(&path)?, "account CSV import"),
        None => (sample_accounts()?, "built-in sample accounts"),
    };
    println!("\nAccounts ({})", source);

    let counts = tally(&accounts);
    println!("- {} open, {} closed", counts.open, counts.closed);
    let age = credit_age(&accounts, as_of);
    match age {
        Some(age) => println!(
            "- Open-account age: average {} months, oldest {}, newest {}",
            age.average_months, age.oldest_months, age.newest_months
        ),
        None => println!("- Open-account age: n/a"),
    }

    let mix = account_mix(&accounts);
    println!("\nAccount mix (total exposure {:.2})", mix.total_exposure);
    for entry in &mix.entries {
        println!(
            "- {}: {} account(s), {:.2} ({:.0}%)",
            entry.category.label(),
            entry.accounts,
            entry.exposure,
            entry.exposure_share * 100.0
        );
    }

    let lines = revolving_lines(&accounts);
    let summary = utilization(&lines, as_of);
    println!(
        "\nUtilization: {:.2}% of {:.2} across {} open line(s)",
        summary.percent, summary.total_limit, summary.open_lines
    );
    println!(
        "- Paydown to reach {}% overall: {:.2}",
        target_percent,
        summary.paydown_to(target_percent)
    );
    if let Some(worst) = worst_line(&lines, as_of) {
        println!("- Highest line: {} at {}%", worst.name, worst.percent);
    }
    for line in rank_lines(&lines, as_of, LineOrder::UtilizationDescending) {
        println!(
            "  {} {}% (pay {:.2} to reach {}%)",
            line.name,
            line.percent,
            line.paydown_to(target_percent),
            target_percent
        );
    }

    let payments = sample_payment_history(as_of);
    let on_time = on_time_rate(&payments).unwrap_or_default();
    let inquiries = inquiry_summary(&sample_inquiries(as_of), as_of);
    println!(
        "\nPayment history: {}% on time over {} months",
        on_time,
        payments.len()
    );
    println!(
        "Inquiries (12m): {} hard, {} soft, {} impact",
        inquiries.hard_12m, inquiries.soft_12m, inquiries.impact
    );

    let metrics = OriginMetrics {
        utilization_pct: summary.percent,
        on_time_rate: on_time,
        avg_age_months: f64::from(age.map_or(0, |age| age.average_months)),
        inquiries_12m: inquiries.hard_12m,
        active_accounts: counts.open as u32,
    };
    println!("\nOrigin lender fit");
    render_fit(&evaluate_origin(&metrics));
    render_highlights(&origin_highlights(&metrics));

    let passport = sample_passport();
    println!("\nCredit passport ({} countries)", passport.len());
    for policy in [RevokedConsentPolicy::Include, RevokedConsentPolicy::Exclude] {
        let blended = passport_summary(&passport, policy);
        println!(
            "- {:?} revoked consent: global {} over {} profile(s), weight {:.2}",
            policy, blended.global_score, blended.included, blended.total_weight
        );
    }

    let corridor = corridor_score(680.0, 720.0);
    println!(
        "\nCorridor IN -> US: {} ({}, gap {})",
        corridor.global, corridor.band, corridor.gap
    );
    render_fit(&evaluate_corridor(&corridor));
    render_highlights(&corridor_highlights(&corridor));

    let destination_weights = WeightMap {
        payment: 35.0,
        utilization: 30.0,
        age: 20.0,
        inquiries: 10.0,
        mix: 5.0,
    };
    let blended = blend_weights(&weights, &destination_weights);
    println!(
        "- Blended weights: payment {}, utilization {}, age {}, inquiries {}, mix {}",
        blended.payment, blended.utilization, blended.age, blended.inquiries, blended.mix
    );

    let mapping = AnchorMapping::new(vec![(600.0, 620.0), (670.0, 690.0), (740.0, 770.0)]);
    let shifts = mapping.band_shifts(&BandScale::standard());
    println!("\nScale mapping");
    for score in [580.0, 680.0, 760.0] {
        println!("- {} maps to {}", score, mapping.map(score));
    }
    println!(
        "- Band shifts: Good {:+}, Very Good {:+}, average {:+}",
        shifts.good, shifts.very_good, shifts.average
    );

    Ok(())
}

fn render_fit(fit: &LenderFit) {
    println!("Lender fit: {}", fit.summary());
    for criterion in &fit.criteria {
        let mark = if criterion.pass { "pass" } else { "miss" };
        println!("- [{}] {}", mark, criterion.label);
    }
}

fn render_highlights(highlights: &[String]) {
    println!("Highlights");
    for highlight in highlights {
        println!("- {}", highlight);
    }
}

const SAMPLE_ACCOUNTS: &str = "\
Account ID,Name,Type,Subtype,Balance,Credit Limit,Status,Opened At,Closed At
CHK-001,Everyday Checking,depository,checking,1850,,open,2021-04-10,
SAV-002,Rainy Day Savings,depository,savings,7200,,open,2020-11-02,
CRD-003,Freedom,credit,credit card,2600,6000,open,2019-07-15,
CRD-004,Travel Mastercard,credit,credit card,900,4500,open,2022-03-05,
CRD-005,Cashback Amex,credit,credit card,400,3500,open,2021-09-22,
CRD-006,Citi Double,credit,credit card,1800,8000,open,2020-02-14,
CRD-008,Store Card,credit,store card,0,3000,closed,2018-01-10,2023-02-18
INV-005,Brokerage,investment,brokerage,15430,,open,2017-05-30,
LOA-007,Student Loan,loan,student,12800,,open,2014-09-01,
LOA-012,Mortgage,loan,mortgage,245000,,open,2019-12-11,
";

fn sample_accounts() -> Result<Vec<Account>, AccountImportError> {
    AccountCsvImporter::from_reader(SAMPLE_ACCOUNTS.as_bytes())
}

/// Two years of monthly statuses ending at `as_of`, with one 30-day late.
fn sample_payment_history(as_of: NaiveDate) -> Vec<PaymentMonth> {
    (0..24u32)
        .rev()
        .filter_map(|back| as_of.checked_sub_months(Months::new(back)))
        .enumerate()
        .map(|(index, month)| PaymentMonth {
            month: month.format("%Y-%m").to_string(),
            status: if index == 7 {
                PaymentStatus::Late30
            } else {
                PaymentStatus::OnTime
            },
        })
        .collect()
}

fn sample_inquiries(as_of: NaiveDate) -> Vec<Inquiry> {
    [
        (2, InquiryKind::Hard, "Chase"),
        (5, InquiryKind::Soft, "Credit Karma"),
        (16, InquiryKind::Hard, "Wells Fargo"),
    ]
    .into_iter()
    .filter_map(|(months_ago, kind, requester)| {
        Some(Inquiry {
            date: as_of.checked_sub_months(Months::new(months_ago))?,
            kind,
            bureau: Some("EXPERIAN".to_string()),
            requester: Some(requester.to_string()),
        })
    })
    .collect()
}

fn profile(
    code: &str,
    name: &str,
    (local_score, normalized_score): (f64, f64),
    reliability: ReliabilityGrade,
    consent: ConsentState,
    weight: f64,
    freshness_days: u32,
) -> CountryProfile {
    CountryProfile {
        code: code.to_string(),
        name: Some(name.to_string()),
        local_score: Some(local_score),
        normalized_score,
        reliability,
        consent,
        weight,
        freshness_days,
    }
}

fn sample_passport() -> Vec<CountryProfile> {
    use ConsentState::*;
    use ReliabilityGrade::*;

    vec![
        profile("IN", "India", (820.0, 840.0), A, Granted, 0.12, 22),
        profile("AE", "UAE", (780.0, 810.0), B, Granted, 0.10, 10),
        profile("SG", "Singapore", (760.0, 790.0), B, Pending, 0.07, 45),
        profile("US", "USA", (700.0, 760.0), C, Revoked, 0.05, 300),
        profile("GB", "United Kingdom", (790.0, 820.0), B, Granted, 0.06, 60),
    ]
}
