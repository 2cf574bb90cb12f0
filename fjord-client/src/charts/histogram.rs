// Time-series line chart ("histogram" on the dashboards)
//
// One component covers every dashboard variant; they differ only in `HistogramConfig`.

use super::series::{parse_hex, ColorScheme, Series};
use super::tooltip::{HoverItem, HoverTracker, Tooltip, TooltipChange, TooltipFormat};
use super::weekends::{weekend_markings, Marking, DAY_MS};
use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramConfig {
    /// strftime pattern for x-axis labels.
    pub time_format: String,
    pub legend_columns: usize,
    pub weekend_shading: bool,
    pub hoverable: bool,
    pub tooltip: TooltipFormat,
    pub y_min: f64,
    /// Fixed range for series plotted on the secondary axis.
    pub y_range: Option<(f64, f64)>,
    pub value_decimals: usize,
    pub colors: ColorScheme,
}

impl HistogramConfig {
    /// Happy/sad over time on the main dashboard.
    pub fn dashboard() -> Self {
        Self {
            time_format: "%b %d".to_string(),
            legend_columns: 2,
            weekend_shading: true,
            hoverable: false,
            tooltip: TooltipFormat::Date,
            y_min: 0.0,
            y_range: None,
            value_decimals: 0,
            colors: ColorScheme::sentiment(),
        }
    }

    pub fn hourly() -> Self {
        Self {
            time_format: "%b %d %H:%M".to_string(),
            legend_columns: 1,
            weekend_shading: false,
            hoverable: true,
            tooltip: TooltipFormat::DateTime,
            value_decimals: 2,
            colors: ColorScheme::hourly(),
            ..Self::dashboard()
        }
    }

    /// Product totals with a secondary -30..30 axis for the sentiment delta.
    pub fn product_totals() -> Self {
        Self {
            legend_columns: 3,
            hoverable: true,
            y_range: Some((-30.0, 30.0)),
            colors: ColorScheme::default(),
            ..Self::dashboard()
        }
    }

    /// Per-version and per-platform breakdowns.
    pub fn product_breakdown() -> Self {
        Self {
            legend_columns: 4,
            hoverable: true,
            colors: ColorScheme::default(),
            ..Self::dashboard()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Some(Self::dashboard()),
            "hourly" => Some(Self::hourly()),
            "product_totals" | "totals" => Some(Self::product_totals()),
            "product_breakdown" | "breakdown" => Some(Self::product_breakdown()),
            _ => None,
        }
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self::dashboard()
    }
}

#[derive(Debug, Clone)]
pub struct Histogram {
    config: HistogramConfig,
    series: Vec<Series>,
    tracker: HoverTracker,
}

impl Histogram {
    pub fn new(config: HistogramConfig, mut series: Vec<Series>) -> Self {
        config.colors.apply(&mut series);
        let tracker = HoverTracker::new(config.tooltip, config.value_decimals);
        Self {
            config,
            series,
            tracker,
        }
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.data.is_empty())
    }

    pub fn x_bounds(&self) -> Option<(i64, i64)> {
        let xs = self.series.iter().flat_map(|s| s.data.iter().map(|(x, _)| *x));
        let (lo, hi) = xs.fold(None, |acc: Option<(i64, i64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })?;
        Some(if lo == hi { (lo, lo + DAY_MS) } else { (lo, hi) })
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        let lo = self.config.y_min;
        let hi = self
            .series
            .iter()
            .filter(|s| !(s.on_secondary_axis() && self.config.y_range.is_some()))
            .flat_map(|s| s.data.iter().map(|(_, y)| *y))
            .fold(lo, f64::max);
        if hi > lo {
            (lo, hi)
        } else {
            (lo, lo + 1.0)
        }
    }

    fn plotted(&self, series: &Series, y: f64, bounds: (f64, f64)) -> f64 {
        match self.config.y_range {
            Some((a, b)) if series.on_secondary_axis() && b > a => {
                bounds.0 + (y - a) / (b - a) * (bounds.1 - bounds.0)
            }
            _ => y,
        }
    }

    /// Chart coordinates per series, secondary-axis values rescaled onto the primary range.
    pub fn points(&self) -> Vec<Vec<(f64, f64)>> {
        let bounds = self.y_bounds();
        self.series
            .iter()
            .map(|s| {
                s.data
                    .iter()
                    .map(|(x, y)| (*x as f64, self.plotted(s, *y, bounds)))
                    .collect()
            })
            .collect()
    }

    pub fn markings(&self) -> Vec<Marking> {
        match (self.config.weekend_shading, self.x_bounds()) {
            (true, Some((lo, hi))) => weekend_markings(lo, hi),
            _ => Vec::new(),
        }
    }

    pub fn x_labels(&self) -> Vec<String> {
        let Some((lo, hi)) = self.x_bounds() else {
            return Vec::new();
        };
        [lo, lo + (hi - lo) / 2, hi]
            .iter()
            .map(|ms| {
                DateTime::<Utc>::from_timestamp_millis(*ms)
                    .map(|t| t.format(&self.config.time_format).to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Series names with colours, `legend_columns` per row.
    pub fn legend_rows(&self) -> Vec<Vec<(String, Color)>> {
        let entries: Vec<(String, Color)> = self
            .series
            .iter()
            .map(|s| (s.name.clone(), series_color(s)))
            .collect();
        entries
            .chunks(self.config.legend_columns.max(1))
            .map(|c| c.to_vec())
            .collect()
    }

    /// Closest data point to `x_ms` across all series.
    pub fn nearest(&self, x_ms: f64) -> Option<HoverItem> {
        let mut best: Option<(f64, HoverItem)> = None;
        for (si, s) in self.series.iter().enumerate() {
            for (di, (x, y)) in s.data.iter().enumerate() {
                let dist = (*x as f64 - x_ms).abs();
                if best.as_ref().map_or(true, |(d, _)| dist < *d) {
                    best = Some((
                        dist,
                        HoverItem {
                            series: si,
                            data_index: di,
                            x: *x as f64,
                            y: *y,
                        },
                    ));
                }
            }
        }
        best.map(|(_, item)| item)
    }

    /// Move the hover cursor (or take it off the chart). Ignored unless hoverable.
    pub fn hover_at(&mut self, x_ms: Option<f64>) -> TooltipChange {
        if !self.config.hoverable {
            return TooltipChange::Keep;
        }
        let item = x_ms.and_then(|x| self.nearest(x));
        self.tracker.hover(item)
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tracker.current()
    }

    pub fn render(&self, f: &mut ratatui::Frame<'_>, area: Rect, title: &str) {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let Some((x_lo, x_hi)) = self.x_bounds() else {
            f.render_widget(Paragraph::new("No data.").block(block), area);
            return;
        };

        let legend = self.legend_rows();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(legend.len() as u16),
                Constraint::Length(u16::from(self.config.hoverable)),
            ])
            .split(area);

        let (y_lo, y_hi) = self.y_bounds();
        let points = self.points();
        let shading: Vec<Vec<(f64, f64)>> = self
            .markings()
            .iter()
            .map(|m| {
                vec![
                    (m.from.max(x_lo) as f64, y_lo),
                    (m.to.min(x_hi) as f64, y_lo),
                ]
            })
            .collect();

        let mut datasets: Vec<Dataset> = shading
            .iter()
            .map(|pts| {
                Dataset::default()
                    .marker(symbols::Marker::Block)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::DarkGray))
                    .data(pts)
            })
            .collect();
        for (s, pts) in self.series.iter().zip(points.iter()) {
            datasets.push(
                Dataset::default()
                    .name(s.name.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(series_color(s)))
                    .data(pts),
            );
        }

        let x_labels: Vec<Span> = self.x_labels().into_iter().map(Span::raw).collect();
        let decimals = self.config.value_decimals;
        let y_labels = vec![
            Span::raw(format!("{:.*}", decimals, y_lo)),
            Span::raw(format!("{:.*}", decimals, y_hi)),
        ];
        let chart = Chart::new(datasets)
            .block(block)
            .hidden_legend_constraints((Constraint::Ratio(0, 1), Constraint::Ratio(0, 1)))
            .x_axis(
                Axis::default()
                    .bounds([x_lo as f64, x_hi as f64])
                    .labels(x_labels),
            )
            .y_axis(Axis::default().bounds([y_lo, y_hi]).labels(y_labels));
        f.render_widget(chart, chunks[0]);

        let legend_lines: Vec<Line> = legend
            .iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .flat_map(|(name, color)| {
                            [
                                Span::styled("■ ", Style::default().fg(*color)),
                                Span::raw(format!("{}   ", name)),
                            ]
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        f.render_widget(Paragraph::new(legend_lines), chunks[1]);

        if self.config.hoverable {
            let text = self
                .tooltip()
                .map(|t| t.text.clone())
                .unwrap_or_default();
            f.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::Gray)),
                chunks[2],
            );
        }
    }
}

fn series_color(series: &Series) -> Color {
    series
        .color
        .as_deref()
        .and_then(parse_hex)
        .unwrap_or(Color::Reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const MON: i64 = 1_411_344_000_000; // 2014-09-22

    fn sentiment() -> Vec<Series> {
        vec![
            Series::new(
                "happy",
                (0..14).map(|d| (MON + d * DAY_MS, (d * 2) as f64)).collect(),
            ),
            Series::new("sad", (0..14).map(|d| (MON + d * DAY_MS, 3.0)).collect()),
        ]
    }

    #[test]
    fn presets_differ_only_in_configuration() {
        assert_eq!(HistogramConfig::dashboard().legend_columns, 2);
        assert_eq!(HistogramConfig::hourly().legend_columns, 1);
        assert!(!HistogramConfig::hourly().weekend_shading);
        assert_eq!(HistogramConfig::product_totals().y_range, Some((-30.0, 30.0)));
        assert_eq!(HistogramConfig::product_breakdown().legend_columns, 4);
        assert!(HistogramConfig::by_name("nope").is_none());
    }

    #[test]
    fn bounds_and_markings() {
        let h = Histogram::new(HistogramConfig::dashboard(), sentiment());
        assert_eq!(h.x_bounds(), Some((MON, MON + 13 * DAY_MS)));
        assert_eq!(h.y_bounds(), (0.0, 26.0));
        assert_eq!(h.markings().len(), 2);
        assert_eq!(h.series()[0].color.as_deref(), Some("#72BF3E"));
        assert_eq!(h.x_labels()[0], "Sep 22");
    }

    #[test]
    fn secondary_axis_is_rescaled() {
        let mut delta = Series::new("delta", vec![(MON, -30.0), (MON + DAY_MS, 30.0)]);
        delta.yaxis = Some(2);
        let total = Series::new("total", vec![(MON, 100.0), (MON + DAY_MS, 50.0)]);
        let h = Histogram::new(HistogramConfig::product_totals(), vec![total, delta]);

        assert_eq!(h.y_bounds(), (0.0, 100.0));
        let pts = h.points();
        assert_eq!(pts[1], vec![(MON as f64, 0.0), ((MON + DAY_MS) as f64, 100.0)]);
    }

    #[test]
    fn hover_picks_nearest_point_when_enabled() {
        let mut static_chart = Histogram::new(HistogramConfig::dashboard(), sentiment());
        assert_eq!(static_chart.hover_at(Some(MON as f64)), TooltipChange::Keep);
        assert!(static_chart.tooltip().is_none());

        let mut h = Histogram::new(HistogramConfig::product_breakdown(), sentiment());
        let near_day_3 = (MON + 3 * DAY_MS + 1000) as f64;
        match h.hover_at(Some(near_day_3)) {
            TooltipChange::Show(t) => assert_eq!(t.text, "2014-09-25 = 6"),
            other => panic!("expected Show, got {:?}", other),
        }
        assert_eq!(h.hover_at(Some(near_day_3)), TooltipChange::Keep);
        assert_eq!(h.hover_at(None), TooltipChange::Hide);
    }

    #[test]
    fn legend_wraps_by_columns() {
        let series = (0..5)
            .map(|i| Series::new(format!("v{}", i), vec![(MON, 1.0)]))
            .collect();
        let h = Histogram::new(HistogramConfig::product_breakdown(), series);
        let rows = h.legend_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 4);
    }

    #[test]
    fn renders_to_test_backend() {
        let h = Histogram::new(HistogramConfig::dashboard(), sentiment());
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        terminal
            .draw(|f| {
                let area = f.size();
                h.render(f, area, "Feedback")
            })
            .expect("draw");

        let empty = Histogram::new(HistogramConfig::hourly(), Vec::new());
        assert!(empty.is_empty());
        terminal
            .draw(|f| {
                let area = f.size();
                empty.render(f, area, "Hourly")
            })
            .expect("draw");
    }
}
