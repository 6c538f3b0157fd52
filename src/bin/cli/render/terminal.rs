use lexis_lib::vocabulary::WordStatus;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn status_color(status: WordStatus) -> &'static str {
    match status {
        WordStatus::Ignored => Color::GRAY,
        WordStatus::Known | WordStatus::Mastered => Color::GREEN,
        WordStatus::New => Color::BLUE,
        WordStatus::Learning1 | WordStatus::Learning2 | WordStatus::Learning3 => Color::YELLOW,
    }
}

/// Status label, colored by how far along the word is
pub fn status_label(status: WordStatus, use_color: bool) -> String {
    paint(status.label(), status_color(status), use_color)
}

/// Horizontal rule under table headers
pub fn rule(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Truncate to `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}\u{2026}", kept)
}
