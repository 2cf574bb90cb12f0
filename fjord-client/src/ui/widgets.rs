// Small page widgets: expandos, popups, placeholders, review links.

use super::surface::Surface;
use std::collections::HashMap;

/// An expander control bound to a collapsible target element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expando {
    pub expander_id: String,
    pub target_id: String,
}

impl Expando {
    pub fn new(expander_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            expander_id: expander_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Collapse the target on page setup.
    pub fn init(&self, surface: &mut dyn Surface) {
        surface.set_visible(&self.target_id, false);
        surface.toggle_class(&self.expander_id, "selected", false);
    }

    /// Open without toggling (used when a filter is already active).
    pub fn open(&self, surface: &mut dyn Surface) {
        surface.set_visible(&self.target_id, true);
        surface.toggle_class(&self.expander_id, "selected", true);
    }

    /// Flip the target's visibility; the expander's `selected` class follows it.
    pub fn toggle(&self, surface: &mut dyn Surface) -> bool {
        let now_visible = !surface.is_visible(&self.target_id);
        surface.set_visible(&self.target_id, now_visible);
        surface.toggle_class(&self.expander_id, "selected", now_visible);
        now_visible
    }
}

pub const POPUP_WIDTH: u32 = 550;
pub const POPUP_HEIGHT: u32 = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Centre a share popup on the screen, clamped to the top-left corner.
pub fn popup_geometry(screen_width: u32, screen_height: u32) -> PopupGeometry {
    PopupGeometry {
        left: screen_width.saturating_sub(POPUP_WIDTH) / 2,
        top: screen_height.saturating_sub(POPUP_HEIGHT) / 2,
        width: POPUP_WIDTH,
        height: POPUP_HEIGHT,
    }
}

/// Placeholder text shown in an empty, unfocused field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub field_id: String,
    pub text: String,
}

impl Placeholder {
    pub fn new(field_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            text: text.into(),
        }
    }

    pub fn on_focus(&self, surface: &mut dyn Surface) {
        if surface.has_class(&self.field_id, "placeholder") {
            surface.set_value(&self.field_id, "");
            surface.toggle_class(&self.field_id, "placeholder", false);
        }
    }

    pub fn on_blur(&self, surface: &mut dyn Surface) {
        if surface.value(&self.field_id).unwrap_or_default().is_empty() {
            surface.set_value(&self.field_id, &self.text);
            surface.toggle_class(&self.field_id, "placeholder", true);
        }
    }

    /// Strip placeholder text before the form value is read for submission.
    pub fn before_submit(&self, surface: &mut dyn Surface) {
        if surface.has_class(&self.field_id, "placeholder") {
            surface.set_value(&self.field_id, "");
        }
    }
}

const BROWSER_REVIEW_URL: &str =
    "https://play.google.com/store/apps/details?id=org.mozilla.CHANNEL#details-reviews";
const DEVICE_REVIEW_URL: &str = "market://details?id=org.mozilla.CHANNEL";

/// Play Store review link for a happy Android user.
///
/// Only beta/release builds are on the store; anything else hides the call to action (`None`).
pub fn android_review_url(channel: &str, prompted_by_device: bool) -> Option<String> {
    let channel = channel.trim();
    if !(channel.starts_with("beta") || channel.starts_with("release")) {
        return None;
    }

    let app = if channel == "beta" {
        "firefox_beta"
    } else {
        "firefox"
    };
    let template = if prompted_by_device {
        DEVICE_REVIEW_URL
    } else {
        BROWSER_REVIEW_URL
    };
    Some(template.replace("CHANNEL", app))
}

/// `{key}` interpolation. Unknown keys render as empty strings.
pub fn format_template(s: &str, args: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close > 0 => {
                let key = &after[..close];
                if let Some(v) = args.get(key) {
                    out.push_str(v);
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
