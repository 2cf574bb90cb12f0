// Character-limit counter for bounded text fields.

use super::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    /// Count every character.
    #[default]
    Raw,
    /// Ignore all whitespace when counting.
    StripWhitespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterState {
    pub remaining: i64,
    pub warning: bool,
    pub error: bool,
}

/// Compute the remaining-character state for `text` against `max`.
///
/// `warning` and `error` are mutually exclusive.
pub fn count_remaining(text: &str, max: u32, mode: CountMode) -> CounterState {
    let length = match mode {
        CountMode::Raw => text.chars().count(),
        CountMode::StripWhitespace => text.chars().filter(|c| !c.is_whitespace()).count(),
    } as i64;
    let max = i64::from(max);
    let remaining = max - length;
    let threshold = (max as f64 * 0.2).round() as i64;

    CounterState {
        remaining,
        warning: (0..=threshold).contains(&remaining),
        error: remaining < 0,
    }
}

/// Id of the counter element bound to a field.
pub fn counter_id(field_id: &str) -> String {
    format!("{}-counter", field_id)
}

/// Recompute and display the counter for `field_id`, reading the field's current value.
pub fn update_counter(
    surface: &mut dyn Surface,
    field_id: &str,
    max: u32,
    mode: CountMode,
) -> CounterState {
    let text = surface.value(field_id).unwrap_or_default();
    let state = count_remaining(&text, max, mode);
    let counter = counter_id(field_id);

    surface.toggle_class(field_id, "error", state.error);
    surface.set_text(&counter, &state.remaining.to_string());
    surface.toggle_class(&counter, "error", state.error);
    surface.toggle_class(&counter, "warning", state.warning);
    state
}
