// Horizontal bar lists for the dashboard facets.

use crate::utils::querystring::{as_fragment, build_query, QueryFragment, QueryMap, QueryNavigator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarItem {
    pub label: String,
    /// Query value sent when the bar is checked. Defaults to the label.
    #[serde(default)]
    pub value: Option<String>,
    pub count: f64,
    #[serde(default)]
    pub checked: bool,
}

impl BarItem {
    pub fn query_value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: String,
    pub count: f64,
    /// Share of the largest bar, 0..=100.
    pub width_pct: f64,
    /// Share of the facet total, e.g. `"42%"`.
    pub percent: String,
    pub checked: bool,
}

/// Width is relative to the largest value; the percent label is relative to `total`.
pub fn layout_bars(items: &[BarItem], total: f64) -> Vec<BarRow> {
    let max = items.iter().map(|i| i.count).fold(0.0_f64, f64::max);
    let ratio = |v: f64, of: f64| if of > 0.0 { v / of * 100.0 } else { 0.0 };

    items
        .iter()
        .map(|item| BarRow {
            label: item.label.clone(),
            count: item.count,
            width_pct: ratio(item.count, max),
            percent: format!("{}%", ratio(item.count, total).round() as i64),
            checked: item.checked,
        })
        .collect()
}

/// Query fragment for toggling a facet: set when checked, dropped otherwise.
pub fn facet_params(name: &str, value: &str, checked: bool) -> QueryFragment {
    vec![(name.to_string(), checked.then(|| value.to_string()))]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub total: f64,
    pub items: Vec<BarItem>,
}

impl Facet {
    pub fn rows(&self) -> Vec<BarRow> {
        layout_bars(&self.items, self.total)
    }

    /// Flip one bar and navigate to the resulting query string.
    pub fn toggle(
        &mut self,
        index: usize,
        current: &QueryMap,
        navigator: &mut dyn QueryNavigator,
    ) -> Option<String> {
        let item = self.items.get_mut(index)?;
        item.checked = !item.checked;
        let params = facet_params(&self.name, item.query_value(), item.checked);
        let search = build_query(&[as_fragment(current), params]);
        navigator.navigate(&search);
        Some(search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::querystring::parse_query;

    fn item(label: &str, count: f64) -> BarItem {
        BarItem {
            label: label.to_string(),
            value: None,
            count,
            checked: false,
        }
    }

    #[test]
    fn widths_follow_max_and_percent_follows_total() {
        let rows = layout_bars(&[item("en-US", 50.0), item("de", 25.0)], 200.0);
        assert_eq!(rows[0].width_pct, 100.0);
        assert_eq!(rows[1].width_pct, 50.0);
        assert_eq!(rows[0].percent, "25%");
        assert_eq!(rows[1].percent, "13%");
    }

    #[test]
    fn zero_max_and_total_yield_zero() {
        let rows = layout_bars(&[item("none", 0.0)], 0.0);
        assert_eq!(rows[0].width_pct, 0.0);
        assert_eq!(rows[0].percent, "0%");
        assert!(layout_bars(&[], 10.0).is_empty());
    }

    #[test]
    fn facet_params_set_or_drop() {
        assert_eq!(
            facet_params("locale", "de", true),
            vec![("locale".to_string(), Some("de".to_string()))]
        );
        assert_eq!(facet_params("locale", "de", false), vec![("locale".to_string(), None)]);
    }

    struct Recorder(Vec<String>);

    impl QueryNavigator for Recorder {
        fn navigate(&mut self, search: &str) {
            self.0.push(search.to_string());
        }
    }

    #[test]
    fn toggle_merges_into_current_query() {
        let mut facet = Facet {
            name: "product".to_string(),
            total: 10.0,
            items: vec![item("Firefox", 10.0)],
        };
        let current = parse_query("?happy=1&product=Other");
        let mut nav = Recorder(Vec::new());

        let search = facet.toggle(0, &current, &mut nav).expect("toggled");
        assert_eq!(search, "?happy=1&product=Firefox");
        assert!(facet.items[0].checked);

        let search = facet.toggle(0, &current, &mut nav).expect("toggled");
        assert_eq!(search, "?happy=1");
        assert_eq!(nav.0.len(), 2);
        assert!(facet.toggle(5, &current, &mut nav).is_none());
    }
}
