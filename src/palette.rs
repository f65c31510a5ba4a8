use serde::Serialize;

/// A chart color in `#rrggbb` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Color(&'static str);

impl Color {
    pub fn hex(&self) -> &'static str {
        self.0
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.hex();
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

pub const DEFAULT_CATEGORY_COLOR: Color = Color("#6b7280");

const CATEGORY_COLORS: &[(&str, Color)] = &[
    ("food", Color("#8b5cf6")),
    ("travel", Color("#f59e0b")),
    ("entertainment", Color("#ec4899")),
    ("utilities", Color("#10b981")),
];

const VENDOR_COLORS: [Color; 10] = [
    Color("#3b82f6"), // blue
    Color("#ef4444"), // red
    Color("#10b981"), // green
    Color("#f59e0b"), // amber
    Color("#8b5cf6"), // purple
    Color("#ec4899"), // pink
    Color("#06b6d4"), // cyan
    Color("#84cc16"), // lime
    Color("#f97316"), // orange
    Color("#d946ef"), // fuchsia
];

pub fn color_for(category: &str) -> Color {
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
}

/// Vendors are colored by the position they were first seen in, cycling
/// through the palette.
pub fn vendor_color(first_seen: usize) -> Color {
    VENDOR_COLORS[first_seen % VENDOR_COLORS.len()]
}
