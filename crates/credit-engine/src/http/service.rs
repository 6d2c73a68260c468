use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::validation::{self, Violations};
use crate::accounts::{self, Account, AccountMix, AccountTally, CreditAge};
use crate::config::EngineConfig;
use crate::corridor::{CorridorSelection, CorridorState};
use crate::error::EngineError;
use crate::scoring::aggregate::{self, blend_weights, weight_shares, WeightShare};
use crate::scoring::band::{percent_of_max, BandName, BandScale};
use crate::scoring::highlights::{corridor_highlights, origin_highlights};
use crate::scoring::history::{inquiry_summary, on_time_rate, Inquiry, InquirySummary, PaymentMonth};
use crate::scoring::lender_fit::{evaluate_corridor, evaluate_origin, LenderFit, OriginMetrics};
use crate::scoring::normalize::{
    corridor_score, passport_summary, AnchorMapping, BandShifts, CorridorScore, CountryProfile,
    PassportSummary, RevokedConsentPolicy,
};
use crate::scoring::utilization::{
    self, progress_to_target, rank_lines, worst_line, LineOrder, LineUtilization, RevolvingLine,
    UtilizationSummary,
};
use crate::scoring::{AggregateScore, ScoreComponents, WeightMap};

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub score: f64,
    pub band: BandName,
    pub percent_of_max: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateRequest {
    pub components: ScoreComponents,
    #[serde(default)]
    pub weights: Option<WeightMap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    #[serde(flatten)]
    pub aggregate: AggregateScore,
    pub band: BandName,
    pub percent_of_max: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UtilizationRequest {
    pub lines: Vec<RevolvingLine>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub target_percent: Option<f64>,
    #[serde(default)]
    pub order: LineOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedLine {
    #[serde(flatten)]
    pub line: LineUtilization,
    pub paydown: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UtilizationResponse {
    pub as_of: NaiveDate,
    pub target_percent: f64,
    pub summary: UtilizationSummary,
    pub aggregate_paydown: f64,
    pub points_over_target: f64,
    pub worst_line: Option<LineUtilization>,
    pub lines: Vec<RankedLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsOverviewRequest {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountsOverviewResponse {
    pub as_of: NaiveDate,
    pub tally: AccountTally,
    pub mix: AccountMix,
    pub average_age_months: Option<u32>,
    pub credit_age: Option<CreditAge>,
    pub utilization: UtilizationSummary,
    pub worst_line: Option<LineUtilization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlendRequest {
    pub profiles: Vec<CountryProfile>,
    #[serde(default)]
    pub policy: Option<RevokedConsentPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorridorRequest {
    pub origin: f64,
    pub destination: f64,
    #[serde(default)]
    pub origin_weights: Option<WeightMap>,
    #[serde(default)]
    pub destination_weights: Option<WeightMap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorridorResponse {
    pub selection: CorridorSelection,
    pub corridor: CorridorScore,
    pub fit: LenderFit,
    pub highlights: Vec<String>,
    pub weights: WeightMap,
    pub weight_shares: Vec<WeightShare>,
}

/// Origin metrics, either supplied directly or derived from raw history.
/// An explicit `on_time_rate` or `inquiries_12m` wins over the records.
#[derive(Debug, Clone, Deserialize)]
pub struct OriginFitRequest {
    pub utilization_pct: f64,
    pub avg_age_months: f64,
    #[serde(default)]
    pub active_accounts: u32,
    #[serde(default)]
    pub on_time_rate: Option<f64>,
    #[serde(default)]
    pub inquiries_12m: Option<u32>,
    #[serde(default)]
    pub payment_history: Vec<PaymentMonth>,
    #[serde(default)]
    pub inquiries: Vec<Inquiry>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginFitResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<BandName>,
    pub metrics: OriginMetrics,
    pub inquiries: InquirySummary,
    pub fit: LenderFit,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingRequest {
    pub anchors: Vec<(f64, f64)>,
    #[serde(default)]
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MappedPoint {
    pub from: f64,
    pub to: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingResponse {
    pub mapping: AnchorMapping,
    pub points: Vec<MappedPoint>,
    pub shifts: BandShifts,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub selection: CorridorSelection,
    pub last_score: Option<CorridorScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionUpdate {
    pub selection: CorridorSelection,
    pub changed: bool,
}

/// Stateless scoring operations plus the shared corridor selection.
pub struct EngineService {
    config: EngineConfig,
    corridor: Arc<CorridorState>,
}

impl EngineService {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_corridor(config, Arc::new(CorridorState::default()))
    }

    pub fn with_corridor(config: EngineConfig, corridor: Arc<CorridorState>) -> Self {
        Self { config, corridor }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn corridor(&self) -> &Arc<CorridorState> {
        &self.corridor
    }

    pub fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, EngineError> {
        let mut violations = Violations::new();
        validation::score(&mut violations, "score", request.score);
        violations.finish()?;

        let band = BandScale::standard().classify(request.score);
        debug!(score = request.score, band = %band, "classified score");

        Ok(ClassifyResponse {
            score: request.score,
            band,
            percent_of_max: percent_of_max(request.score),
        })
    }

    pub fn aggregate(&self, request: AggregateRequest) -> Result<AggregateResponse, EngineError> {
        let weights = request.weights.unwrap_or_default();

        let mut violations = Violations::new();
        validation::components(&mut violations, &request.components);
        validation::weights(&mut violations, "weights", &weights);
        violations.finish()?;

        let result = aggregate::aggregate(&request.components, &weights);
        let band = BandScale::standard().classify(result.score);
        debug!(raw = result.raw, score = result.score, band = %band, "aggregated score");

        Ok(AggregateResponse {
            band,
            percent_of_max: percent_of_max(result.score),
            aggregate: result,
        })
    }

    pub fn utilization(
        &self,
        request: UtilizationRequest,
    ) -> Result<UtilizationResponse, EngineError> {
        let target = request
            .target_percent
            .unwrap_or(self.config.utilization_target);

        let mut violations = Violations::new();
        validation::lines(&mut violations, &request.lines);
        validation::target_percent(&mut violations, target);
        violations.finish()?;

        let as_of = request.as_of.unwrap_or_else(today);
        let summary = utilization::utilization(&request.lines, as_of);
        let lines = rank_lines(&request.lines, as_of, request.order)
            .into_iter()
            .map(|line| RankedLine {
                paydown: line.paydown_to(target),
                line,
            })
            .collect();

        debug!(
            open_lines = summary.open_lines,
            percent = summary.percent,
            target,
            "computed utilization"
        );

        Ok(UtilizationResponse {
            as_of,
            target_percent: target,
            aggregate_paydown: summary.paydown_to(target),
            points_over_target: progress_to_target(summary.percent, target),
            worst_line: worst_line(&request.lines, as_of),
            summary,
            lines,
        })
    }

    pub fn accounts_overview(
        &self,
        request: AccountsOverviewRequest,
    ) -> Result<AccountsOverviewResponse, EngineError> {
        let mut violations = Violations::new();
        validation::accounts(&mut violations, &request.accounts);
        violations.finish()?;

        let as_of = request.as_of.unwrap_or_else(today);
        let lines = accounts::revolving_lines(&request.accounts);
        let credit_age = accounts::credit_age(&request.accounts, as_of);

        Ok(AccountsOverviewResponse {
            as_of,
            tally: accounts::tally(&request.accounts),
            mix: accounts::account_mix(&request.accounts),
            average_age_months: credit_age.map(|age| age.average_months),
            credit_age,
            utilization: utilization::utilization(&lines, as_of),
            worst_line: worst_line(&lines, as_of),
        })
    }

    pub fn blend(&self, request: BlendRequest) -> Result<PassportSummary, EngineError> {
        let mut violations = Violations::new();
        validation::profiles(&mut violations, &request.profiles);
        violations.finish()?;

        let policy = request.policy.unwrap_or(self.config.revoked_consent);
        let summary = passport_summary(&request.profiles, policy);
        info!(
            global_score = summary.global_score,
            included = summary.included,
            excluded_revoked = summary.excluded_revoked,
            "blended passport"
        );

        Ok(summary)
    }

    /// Scores the pair and records the result against the current selection.
    pub fn corridor_score(
        &self,
        request: CorridorRequest,
    ) -> Result<CorridorResponse, EngineError> {
        let origin_weights = request.origin_weights.unwrap_or_default();
        let destination_weights = request.destination_weights.unwrap_or_default();

        let mut violations = Violations::new();
        validation::score(&mut violations, "origin", request.origin);
        validation::score(&mut violations, "destination", request.destination);
        validation::weights(&mut violations, "origin_weights", &origin_weights);
        validation::weights(&mut violations, "destination_weights", &destination_weights);
        violations.finish()?;

        let corridor = corridor_score(request.origin, request.destination);
        let fit = evaluate_corridor(&corridor);
        let weights = blend_weights(&origin_weights, &destination_weights);

        let selection = self.corridor.record_score(corridor);
        info!(
            global = corridor.global,
            gap = corridor.gap,
            fit = %fit.tag,
            "scored corridor"
        );

        Ok(CorridorResponse {
            selection,
            highlights: corridor_highlights(&corridor),
            weight_shares: weight_shares(&weights),
            corridor,
            fit,
            weights,
        })
    }

    pub fn origin_fit(&self, request: OriginFitRequest) -> Result<OriginFitResponse, EngineError> {
        let as_of = request.as_of.unwrap_or_else(today);
        let inquiries = inquiry_summary(&request.inquiries, as_of);
        let on_time = request
            .on_time_rate
            .or_else(|| on_time_rate(&request.payment_history));

        let mut violations = Violations::new();
        if on_time.is_none() {
            violations.push("on_time_rate or payment_history is required");
        }
        let metrics = OriginMetrics {
            utilization_pct: request.utilization_pct,
            on_time_rate: on_time.unwrap_or_default(),
            avg_age_months: request.avg_age_months,
            inquiries_12m: request.inquiries_12m.unwrap_or(inquiries.hard_12m),
            active_accounts: request.active_accounts,
        };
        validation::origin_metrics(&mut violations, &metrics);
        if let Some(score) = request.score {
            validation::score(&mut violations, "score", score);
        }
        violations.finish()?;

        let fit = evaluate_origin(&metrics);
        debug!(
            fit = %fit.tag,
            passed = fit.pass_count,
            on_time_rate = metrics.on_time_rate,
            inquiries_12m = metrics.inquiries_12m,
            "evaluated origin fit"
        );

        Ok(OriginFitResponse {
            band: request
                .score
                .map(|score| BandScale::standard().classify(score)),
            highlights: origin_highlights(&metrics),
            metrics,
            inquiries,
            fit,
        })
    }

    pub fn map_scores(&self, request: MappingRequest) -> Result<MappingResponse, EngineError> {
        let mut violations = Violations::new();
        validation::anchors(&mut violations, &request.anchors);
        for (index, score) in request.scores.iter().enumerate() {
            validation::score(&mut violations, &format!("scores[{}]", index), *score);
        }
        violations.finish()?;

        let mapping = AnchorMapping::new(request.anchors);
        let points = request
            .scores
            .iter()
            .map(|score| MappedPoint {
                from: *score,
                to: mapping.map(*score),
            })
            .collect();

        Ok(MappingResponse {
            shifts: mapping.band_shifts(&BandScale::standard()),
            mapping,
            points,
        })
    }

    pub fn selection(&self) -> SelectionView {
        SelectionView {
            selection: self.corridor.selection(),
            last_score: self.corridor.last_score(),
        }
    }

    pub fn select(&self, selection: CorridorSelection) -> Result<SelectionUpdate, EngineError> {
        let mut violations = Violations::new();
        validation::selection(&mut violations, &selection);
        violations.finish()?;

        let selection = CorridorSelection {
            origin: selection.origin.trim().to_ascii_uppercase(),
            destination: selection.destination.trim().to_ascii_uppercase(),
        };
        let changed = self.corridor.select(selection.clone());
        if changed {
            info!(
                origin = %selection.origin,
                destination = %selection.destination,
                "corridor selection changed"
            );
        }

        Ok(SelectionUpdate { selection, changed })
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
