//! Request checks for the engine endpoints.
//!
//! The scoring core is total and never rejects input, so anything a caller
//! should be told about is caught here. Every violation is reported at once.

use crate::accounts::Account;
use crate::corridor::CorridorSelection;
use crate::error::EngineError;
use crate::scoring::{CountryProfile, RevolvingLine, ScoreComponents, WeightMap, SCORE_MAX};
use crate::scoring::aggregate::ScoreFactor;
use crate::scoring::lender_fit::OriginMetrics;

#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn finite(&mut self, field: &str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.push(format!("{}: must be a finite number", field));
            false
        }
    }

    pub fn non_negative(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && value < 0.0 {
            self.push(format!("{}: must be non-negative, got {}", field, value));
        }
    }

    pub fn within(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if self.finite(field, value) && !(min..=max).contains(&value) {
            self.push(format!(
                "{}: must be between {} and {}, got {}",
                field, min, max, value
            ));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), EngineError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self.errors))
        }
    }
}

pub fn score(violations: &mut Violations, field: &str, value: f64) {
    violations.finite(field, value);
}

pub fn target_percent(violations: &mut Violations, value: f64) {
    violations.within("target_percent", value, 0.0, 100.0);
}

pub fn components(violations: &mut Violations, components: &ScoreComponents) {
    for factor in ScoreFactor::ordered() {
        let field = format!("components.{}", factor_key(factor));
        violations.finite(&field, components.get(factor));
    }
}

pub fn weights(violations: &mut Violations, prefix: &str, weights: &WeightMap) {
    for factor in ScoreFactor::ordered() {
        let field = format!("{}.{}", prefix, factor_key(factor));
        violations.non_negative(&field, weights.get(factor));
    }
}

pub fn lines(violations: &mut Violations, lines: &[RevolvingLine]) {
    for (index, line) in lines.iter().enumerate() {
        if line.id.trim().is_empty() {
            violations.push(format!("lines[{}].id: must not be empty", index));
        }
        violations.non_negative(&format!("lines[{}].balance", index), line.balance);
        violations.non_negative(&format!("lines[{}].limit", index), line.limit);
    }
}

pub fn accounts(violations: &mut Violations, accounts: &[Account]) {
    for (index, account) in accounts.iter().enumerate() {
        if account.id.trim().is_empty() {
            violations.push(format!("accounts[{}].id: must not be empty", index));
        }
        violations.non_negative(&format!("accounts[{}].balance", index), account.balance);
        if let Some(limit) = account.credit_limit {
            violations.non_negative(&format!("accounts[{}].credit_limit", index), limit);
        }
        if let (Some(opened), Some(closed)) = (account.opened_at, account.closed_at) {
            if closed < opened {
                violations.push(format!(
                    "accounts[{}].closed_at: {} is before opened_at {}",
                    index, closed, opened
                ));
            }
        }
    }
}

pub fn profiles(violations: &mut Violations, profiles: &[CountryProfile]) {
    for (index, profile) in profiles.iter().enumerate() {
        if profile.code.trim().is_empty() {
            violations.push(format!("profiles[{}].code: must not be empty", index));
        }
        violations.within(
            &format!("profiles[{}].normalized_score", index),
            profile.normalized_score,
            0.0,
            SCORE_MAX,
        );
        violations.within(&format!("profiles[{}].weight", index), profile.weight, 0.0, 1.0);
        if let Some(local) = profile.local_score {
            violations.non_negative(&format!("profiles[{}].local_score", index), local);
        }
    }
}

pub fn origin_metrics(violations: &mut Violations, metrics: &OriginMetrics) {
    violations.non_negative("utilization_pct", metrics.utilization_pct);
    violations.within("on_time_rate", metrics.on_time_rate, 0.0, 100.0);
    violations.non_negative("avg_age_months", metrics.avg_age_months);
}

pub fn anchors(violations: &mut Violations, anchors: &[(f64, f64)]) {
    for (index, (from, to)) in anchors.iter().enumerate() {
        violations.within(&format!("anchors[{}].from", index), *from, 0.0, SCORE_MAX);
        violations.within(&format!("anchors[{}].to", index), *to, 0.0, SCORE_MAX);
    }
}

pub fn selection(violations: &mut Violations, selection: &CorridorSelection) {
    for (field, code) in [
        ("origin", &selection.origin),
        ("destination", &selection.destination),
    ] {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            violations.push(format!(
                "{}: expected a two-letter country code, got '{}'",
                field, code
            ));
        }
    }
}

fn factor_key(factor: ScoreFactor) -> &'static str {
    match factor {
        ScoreFactor::Payment => "payment",
        ScoreFactor::Utilization => "utilization",
        ScoreFactor::Age => "age",
        ScoreFactor::Inquiries => "inquiries",
        ScoreFactor::Mix => "mix",
    }
}
