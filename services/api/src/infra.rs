use chrono::NaiveDate;
use credit_engine::corridor::{CorridorEvent, CorridorObserver};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Writes corridor changes to the service log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingObserver;

impl CorridorObserver for LoggingObserver {
    fn notify(&self, event: &CorridorEvent) {
        match event {
            CorridorEvent::SelectionChanged { previous, current } => info!(
                from = %format!("{}->{}", previous.origin, previous.destination),
                to = %format!("{}->{}", current.origin, current.destination),
                "corridor selection updated"
            ),
            CorridorEvent::ScoreRecorded { selection, score } => info!(
                origin = %selection.origin,
                destination = %selection.destination,
                global = score.global,
                band = %score.band,
                "corridor score recorded"
            ),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_percent(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| (0.0..=100.0).contains(value))
        .ok_or_else(|| format!("'{raw}' is not a percentage between 0 and 100"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-10-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date"))
        );
        assert!(parse_date("15/10/2025")
            .expect_err("rejects other formats")
            .contains("YYYY-MM-DD"));
    }

    #[test]
    fn parse_percent_bounds() {
        assert_eq!(parse_percent("20"), Ok(20.0));
        assert_eq!(parse_percent("100"), Ok(100.0));
        assert!(parse_percent("120").is_err());
        assert!(parse_percent("-1").is_err());
        assert!(parse_percent("thirty").is_err());
    }
}
