//! User identity and profile models.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest display name accepted at registration.
pub const MAX_DISPLAY_NAME_CHARS: usize = 30;

/// Placeholder shown in the profile preview before a name is typed.
const PLACEHOLDER_DISPLAY_NAME: &str = "Your Name";

/// Opaque unique user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's chosen display name and visual styling.
///
/// One per principal, created once through `register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[validate(custom(function = "validate_display_name"))]
    pub display_name: String,
    #[validate(length(min = 1, message = "Please choose an emoji"))]
    pub emoji: String,
    #[validate(length(min = 1, message = "Please choose a color"))]
    pub color: String,
    #[validate(length(min = 1, message = "Please choose a background"))]
    pub background: String,
}

impl Profile {
    /// Preview profile using the first option of every palette.
    pub fn placeholder(display_name: &str) -> Self {
        let name = display_name.trim();
        Self {
            display_name: if name.is_empty() {
                PLACEHOLDER_DISPLAY_NAME.to_string()
            } else {
                name.to_string()
            },
            emoji: EMOJI_OPTIONS[0].to_string(),
            color: COLOR_OPTIONS[0].to_string(),
            background: BACKGROUND_OPTIONS[0].to_string(),
        }
    }

    /// Copy with the display name trimmed, as it is sent to the backend.
    pub fn normalized(mut self) -> Self {
        self.display_name = self.display_name.trim().to_string();
        self
    }
}

fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("display_name_blank")
            .with_message(Cow::Borrowed("Please enter a display name")));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(ValidationError::new("display_name_length").with_message(Cow::Owned(
            format!(
                "Display name must be at most {} characters",
                MAX_DISPLAY_NAME_CHARS
            ),
        )));
    }
    Ok(())
}

// ─── Palettes ────────────────────────────────────────────────

pub const EMOJI_OPTIONS: &[&str] = &[
    "💩", "🚽", "🧻", "😎", "🤓", "😂", "🤪", "🥳", "🤠", "👑", "🦄", "🐶", "🐱", "🐷", "🐸",
    "🦊", "🐻", "🐼", "🐨", "🦁", "🐯", "🐮", "🐵", "🦉", "🦆", "🐙", "🦀", "🍕", "🍔", "🌮",
    "🍩", "🎮", "🎸", "🎨", "⚽", "🏀", "🎯", "🚀", "⭐", "🔥",
];

pub const COLOR_OPTIONS: &[&str] = &[
    "#ef4444", // red
    "#f97316", // orange
    "#f59e0b", // amber
    "#eab308", // yellow
    "#84cc16", // lime
    "#22c55e", // green
    "#10b981", // emerald
    "#14b8a6", // teal
    "#06b6d4", // cyan
    "#0ea5e9", // sky
    "#3b82f6", // blue
    "#6366f1", // indigo
    "#8b5cf6", // violet
    "#a855f7", // purple
    "#d946ef", // fuchsia
    "#ec4899", // pink
    "#f43f5e", // rose
    "#64748b", // slate
    "#78716c", // stone
    "#a8a29e", // warm gray
];

pub const BACKGROUND_OPTIONS: &[&str] = &[
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
    "linear-gradient(135deg, #30cfd0 0%, #330867 100%)",
    "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    "linear-gradient(135deg, #ff9a9e 0%, #fecfef 100%)",
    "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
    "linear-gradient(135deg, #ff6e7f 0%, #bfe9ff 100%)",
    "linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)",
    "linear-gradient(135deg, #f77062 0%, #fe5196 100%)",
];
