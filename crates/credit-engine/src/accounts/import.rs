use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::{Account, AccountStatus, AccountType};

#[derive(Debug)]
pub enum AccountImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { row: usize, reason: String },
}

impl std::fmt::Display for AccountImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountImportError::Io(err) => write!(f, "failed to read account export: {}", err),
            AccountImportError::Csv(err) => write!(f, "invalid account CSV data: {}", err),
            AccountImportError::InvalidRow { row, reason } => {
                write!(f, "invalid account on row {}: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for AccountImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccountImportError::Io(err) => Some(err),
            AccountImportError::Csv(err) => Some(err),
            AccountImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for AccountImportError {
    fn from(value: std::io::Error) -> Self {
        AccountImportError::Io(value)
    }
}

impl From<csv::Error> for AccountImportError {
    fn from(value: csv::Error) -> Self {
        AccountImportError::Csv(value)
    }
}

/// Reads account exports with the columns `Account ID, Name, Type, Subtype,
/// Balance, Credit Limit, Status, Opened At, Closed At`.
pub struct AccountCsvImporter;

impl AccountCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Account>, AccountImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Account>, AccountImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut accounts = Vec::new();

        for (index, record) in csv_reader.deserialize::<AccountRow>().enumerate() {
            let row = record?;
            // header is row 1
            accounts.push(row.into_account(index + 2)?);
        }

        Ok(accounts)
    }
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    #[serde(rename = "Account ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    account_type: String,
    #[serde(rename = "Subtype", default, deserialize_with = "empty_string_as_none")]
    subtype: Option<String>,
    #[serde(rename = "Balance")]
    balance: f64,
    #[serde(
        rename = "Credit Limit",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    credit_limit: Option<String>,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "Opened At", default, deserialize_with = "empty_string_as_none")]
    opened_at: Option<String>,
    #[serde(rename = "Closed At", default, deserialize_with = "empty_string_as_none")]
    closed_at: Option<String>,
}

impl AccountRow {
    fn into_account(self, row: usize) -> Result<Account, AccountImportError> {
        let invalid = |reason: String| AccountImportError::InvalidRow { row, reason };

        let account_type = AccountType::parse(&self.account_type)
            .ok_or_else(|| invalid(format!("unknown account type `{}`", self.account_type)))?;
        let status = AccountStatus::parse(&self.status)
            .ok_or_else(|| invalid(format!("unknown status `{}`", self.status)))?;
        let credit_limit = self
            .credit_limit
            .as_deref()
            .map(|value| {
                value
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("credit limit `{}` is not a number", value)))
            })
            .transpose()?;
        if !is_amount(self.balance) {
            return Err(invalid(bad_amount("balance", self.balance)));
        }
        if let Some(limit) = credit_limit.filter(|limit| !is_amount(*limit)) {
            return Err(invalid(bad_amount("credit limit", limit)));
        }
        let opened_at = self
            .opened_at
            .as_deref()
            .map(|value| parse_date(value).ok_or_else(|| invalid(bad_date("opened", value))))
            .transpose()?;
        let closed_at = self
            .closed_at
            .as_deref()
            .map(|value| parse_date(value).ok_or_else(|| invalid(bad_date("closed", value))))
            .transpose()?;

        Ok(Account {
            id: self.id,
            name: self.name,
            account_type,
            subtype: self.subtype,
            balance: self.balance,
            credit_limit,
            status,
            opened_at,
            closed_at,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn bad_amount(field: &str, value: f64) -> String {
    format!("{} `{}` must be a non-negative amount", field, value)
}

fn bad_date(field: &str, value: &str) -> String {
    format!("{} date `{}` is not YYYY-MM-DD", field, value)
}
