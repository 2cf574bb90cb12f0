// Time series and per-name colours.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

const FALLBACK_COLOR: &str = "#000000";

/// One named line: `(epoch millis, value)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    /// `2` plots against the secondary y range.
    #[serde(default)]
    pub yaxis: Option<u8>,
    pub data: Vec<(i64, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, data: Vec<(i64, f64)>) -> Self {
        Self {
            name: name.into(),
            color: None,
            yaxis: None,
            data,
        }
    }

    pub fn on_secondary_axis(&self) -> bool {
        self.yaxis == Some(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorScheme {
    colors: Vec<(String, String)>,
}

impl ColorScheme {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            colors: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn sentiment() -> Self {
        Self::new([("happy", "#72BF3E"), ("sad", "#AA4643")])
    }

    pub fn hourly() -> Self {
        Self::new([("hourly", "#723EBF")])
    }

    pub fn color_for(&self, name: &str) -> &str {
        self.colors
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Assign a colour to every series that doesn't carry one.
    pub fn apply(&self, series: &mut [Series]) {
        for s in series.iter_mut() {
            if s.color.is_none() {
                s.color = Some(self.color_for(&s.name).to_string());
            }
        }
    }
}

/// `#rrggbb` to a terminal colour.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_get_fixed_colors() {
        let scheme = ColorScheme::sentiment();
        assert_eq!(scheme.color_for("happy"), "#72BF3E");
        assert_eq!(scheme.color_for("sad"), "#AA4643");
        assert_eq!(scheme.color_for("meh"), "#000000");
        assert_eq!(ColorScheme::hourly().color_for("hourly"), "#723EBF");
    }

    #[test]
    fn apply_keeps_explicit_colors() {
        let mut series = vec![Series::new("happy", vec![]), Series::new("v32", vec![])];
        series[1].color = Some("#123456".to_string());
        ColorScheme::sentiment().apply(&mut series);
        assert_eq!(series[0].color.as_deref(), Some("#72BF3E"));
        assert_eq!(series[1].color.as_deref(), Some("#123456"));
    }

    #[test]
    fn series_parses_flot_json() {
        let s: Series =
            serde_json::from_str(r#"{"name":"sad","data":[[1411344000000, 3],[1411430400000, 4.5]]}"#)
                .expect("parse");
        assert_eq!(s.data, vec![(1411344000000, 3.0), (1411430400000, 4.5)]);
        assert!(!s.on_secondary_axis());
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex("#72BF3E"), Some(Color::Rgb(0x72, 0xBF, 0x3E)));
        assert_eq!(parse_hex("72BF3E"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }
}
