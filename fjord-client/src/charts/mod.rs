// Dashboard charts: facet bar lists and the time-series histogram.

pub mod bars;
pub mod histogram;
pub mod series;
pub mod tooltip;
pub mod weekends;

use anyhow::{Context, Result};
use bars::Facet;
use histogram::{Histogram, HistogramConfig};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use series::Series;
use std::path::Path;

use crate::utils::querystring::QueryFragment;

/// Dashboard snapshot as exported by the server views.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub title: String,
    /// Histogram preset: `dashboard`, `hourly`, `product_totals` or `product_breakdown`.
    pub preset: Option<String>,
    pub histogram: Vec<Series>,
    pub facets: Vec<Facet>,
    pub date_start: String,
    pub date_end: String,
}

impl DashboardData {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard data {:?}", path))?;
        let data: DashboardData = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dashboard data {:?}", path))?;
        info!(
            "[PHASE: dashboard] [STEP: load] {} series, {} facet(s) from {:?}",
            data.histogram.len(),
            data.facets.len(),
            path
        );
        Ok(data)
    }

    pub fn histogram_config(&self) -> HistogramConfig {
        match self.preset.as_deref() {
            None => HistogramConfig::dashboard(),
            Some(name) => HistogramConfig::by_name(name).unwrap_or_else(|| {
                warn!(
                    "[PHASE: dashboard] [STEP: load] Unknown preset {:?}, using dashboard",
                    name
                );
                HistogramConfig::dashboard()
            }),
        }
    }

    pub fn histogram(&self) -> Histogram {
        Histogram::new(self.histogram_config(), self.histogram.clone())
    }
}

/// Query fragment for the date filter. Blank dates drop the key.
pub fn date_range_params(date_start: &str, date_end: &str) -> QueryFragment {
    let keep = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    vec![
        ("date_start".to_string(), keep(date_start)),
        ("date_end".to_string(), keep(date_end)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_dashboard_json() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("dash.json");
        std::fs::write(
            &path,
            r#"{
                "title": "Firefox OS",
                "preset": "hourly",
                "histogram": [{"name": "hourly", "data": [[1411344000000, 2]]}],
                "facets": [{"name": "locale", "total": 3,
                            "items": [{"label": "en-US", "count": 2}, {"label": "de", "count": 1}]}]
            }"#,
        )
        .expect("write");

        let data = DashboardData::load(&path).expect("load");
        assert_eq!(data.facets[0].rows()[0].percent, "67%");
        assert_eq!(data.histogram_config(), HistogramConfig::hourly());
        assert_eq!(
            data.histogram().series()[0].color.as_deref(),
            Some("#723EBF")
        );
    }

    #[test]
    fn unknown_preset_falls_back() {
        let data = DashboardData {
            preset: Some("sparkline".to_string()),
            ..DashboardData::default()
        };
        assert_eq!(data.histogram_config(), HistogramConfig::dashboard());
    }

    #[test]
    fn date_range_drops_blank_dates() {
        assert_eq!(
            date_range_params("2014-09-01", " "),
            vec![
                ("date_start".to_string(), Some("2014-09-01".to_string())),
                ("date_end".to_string(), None),
            ]
        );
    }
}
