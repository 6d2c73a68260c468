pub mod import;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scoring::{round_half_up, RevolvingLine};

pub use import::{AccountCsvImporter, AccountImportError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Open,
    Closed,
}

impl AccountStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "open" | "active" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Depository,
    Credit,
    Loan,
    Investment,
}

impl AccountType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "depository" => Some(Self::Depository),
            "credit" => Some(Self::Credit),
            "loan" => Some(Self::Loan),
            "investment" => Some(Self::Investment),
            _ => None,
        }
    }
}

/// A financial account as reported by an aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub subtype: Option<String>,
    pub balance: f64,
    /// Only meaningful for credit accounts.
    #[serde(default)]
    pub credit_limit: Option<f64>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub opened_at: Option<NaiveDate>,
    #[serde(default)]
    pub closed_at: Option<NaiveDate>,
}

impl Account {
    pub fn is_open(&self) -> bool {
        self.status == AccountStatus::Open
    }

    pub fn mix_category(&self) -> MixCategory {
        let subtype = self
            .subtype
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match self.account_type {
            AccountType::Credit => MixCategory::Credit,
            AccountType::Investment => MixCategory::Investment,
            AccountType::Depository if subtype.contains("savings") => MixCategory::DepositSavings,
            AccountType::Depository => MixCategory::DepositChecking,
            AccountType::Loan if subtype.contains("student") => MixCategory::LoanStudent,
            AccountType::Loan if subtype.contains("mortgage") => MixCategory::LoanMortgage,
            AccountType::Loan => MixCategory::LoanOther,
        }
    }
}

/// Credit accounts with a positive limit, as revolving lines.
pub fn revolving_lines(accounts: &[Account]) -> Vec<RevolvingLine> {
    accounts
        .iter()
        .filter(|account| account.account_type == AccountType::Credit)
        .filter_map(|account| {
            let limit = account.credit_limit.filter(|limit| *limit > 0.0)?;
            Some(RevolvingLine {
                id: account.id.clone(),
                name: Some(account.name.clone()),
                balance: account.balance,
                limit,
                status: account.status,
                closed_at: account.closed_at,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MixCategory {
    Credit,
    Investment,
    DepositSavings,
    DepositChecking,
    LoanStudent,
    LoanMortgage,
    LoanOther,
}

impl MixCategory {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Credit,
            Self::Investment,
            Self::DepositSavings,
            Self::DepositChecking,
            Self::LoanStudent,
            Self::LoanMortgage,
            Self::LoanOther,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Investment => "Investment",
            Self::DepositSavings => "Savings",
            Self::DepositChecking => "Checking",
            Self::LoanStudent => "Student Loan",
            Self::LoanMortgage => "Mortgage",
            Self::LoanOther => "Other Loan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    pub category: MixCategory,
    pub accounts: usize,
    pub exposure: f64,
    pub exposure_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMix {
    pub entries: Vec<MixEntry>,
    pub total_exposure: f64,
}

/// Exposure by category over open accounts. Categories without an open
/// account are omitted; shares are zero when nothing is exposed.
pub fn account_mix(accounts: &[Account]) -> AccountMix {
    let mut entries: Vec<MixEntry> = MixCategory::ordered()
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&Account> = accounts
                .iter()
                .filter(|account| account.is_open() && account.mix_category() == category)
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(MixEntry {
                category,
                accounts: members.len(),
                exposure: members.iter().map(|account| account.balance).sum(),
                exposure_share: 0.0,
            })
        })
        .collect();

    let total_exposure: f64 = entries.iter().map(|entry| entry.exposure).sum();
    if total_exposure > 0.0 {
        for entry in &mut entries {
            entry.exposure_share = entry.exposure / total_exposure;
        }
    }

    AccountMix {
        entries,
        total_exposure,
    }
}

/// Whole calendar months from `opened` to `as_of`, ignoring the day of month.
pub fn months_between(opened: NaiveDate, as_of: NaiveDate) -> u32 {
    let months = (as_of.year() - opened.year()) * 12 + as_of.month() as i32 - opened.month() as i32;
    months.max(0) as u32
}

/// Oldest, newest and rounded mean age in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditAge {
    pub oldest_months: u32,
    pub newest_months: u32,
    pub average_months: u32,
}

/// Age profile of open accounts that carry an opening date.
pub fn credit_age(accounts: &[Account], as_of: NaiveDate) -> Option<CreditAge> {
    let ages: Vec<u32> = accounts
        .iter()
        .filter(|account| account.is_open())
        .filter_map(|account| account.opened_at)
        .map(|opened| months_between(opened, as_of))
        .collect();

    let oldest_months = *ages.iter().max()?;
    let newest_months = *ages.iter().min()?;
    let total: u32 = ages.iter().sum();

    Some(CreditAge {
        oldest_months,
        newest_months,
        average_months: round_half_up(f64::from(total) / ages.len() as f64) as u32,
    })
}

pub fn average_age_months(accounts: &[Account], as_of: NaiveDate) -> Option<u32> {
    credit_age(accounts, as_of).map(|age| age.average_months)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTally {
    pub open: usize,
    pub closed: usize,
}

pub fn tally(accounts: &[Account]) -> AccountTally {
    let open = accounts.iter().filter(|account| account.is_open()).count();
    AccountTally {
        open,
        closed: accounts.len() - open,
    }
}
