// Hover tooltip for time-series charts. At most one tooltip exists at a time.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipFormat {
    /// `2014-09-22 13:00:00`
    DateTime,
    /// `2014-09-22`
    #[default]
    Date,
}

/// The data point under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverItem {
    pub series: usize,
    pub data_index: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub series: usize,
    pub data_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipChange {
    /// Replace whatever was shown with this tooltip.
    Show(Tooltip),
    Keep,
    Hide,
}

pub fn tooltip_text(format: TooltipFormat, decimals: usize, x_ms: f64, y: f64) -> String {
    let time = DateTime::<Utc>::from_timestamp_millis(x_ms.floor() as i64)
        .map(|t| match format {
            TooltipFormat::DateTime => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            TooltipFormat::Date => t.format("%Y-%m-%d").to_string(),
        })
        .unwrap_or_else(|| "?".to_string());
    format!("{} = {:.*}", time, decimals, y)
}

#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    format: TooltipFormat,
    decimals: usize,
    current: Option<Tooltip>,
}

impl HoverTracker {
    pub fn new(format: TooltipFormat, decimals: usize) -> Self {
        Self {
            format,
            decimals,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    /// Feed the item under the cursor (or none). Same data index keeps the current tooltip.
    pub fn hover(&mut self, item: Option<HoverItem>) -> TooltipChange {
        match item {
            Some(item) => {
                if self
                    .current
                    .as_ref()
                    .is_some_and(|t| t.data_index == item.data_index)
                {
                    return TooltipChange::Keep;
                }
                let tooltip = Tooltip {
                    series: item.series,
                    data_index: item.data_index,
                    text: tooltip_text(self.format, self.decimals, item.x, item.y),
                };
                self.current = Some(tooltip.clone());
                TooltipChange::Show(tooltip)
            }
            None => match self.current.take() {
                Some(_) => TooltipChange::Hide,
                None => TooltipChange::Keep,
            },
        }
    }
}
