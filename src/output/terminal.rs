//! ANSI colour helpers for terminal output

pub mod colors {
    pub const GREY: u8 = 102;
    pub const AQUA: u8 = 109;
    pub const ORANGE: u8 = 208;
    pub const RED: u8 = 167;
    pub const BLUE: u8 = 68;
    pub const PINK: u8 = 176;
    pub const GREEN: u8 = 71;
    pub const YELLOW: u8 = 185;
}

pub const RESET: &str = "\x1b[0m";

/// 256-colour foreground escape
#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Bold 256-colour foreground escape
#[inline]
pub fn bold_fg(color: u8) -> String {
    format!("\x1b[1;38;5;{}m", color)
}

#[inline]
pub fn colorize(text: &str, color: u8) -> String {
    format!("{}{}{}", fg(color), text, RESET)
}

#[inline]
pub fn bold(text: &str, color: u8) -> String {
    format!("{}{}{}", bold_fg(color), text, RESET)
}

#[inline]
pub fn error(text: &str) -> String {
    bold(text, colors::RED)
}

#[inline]
pub fn warning(text: &str) -> String {
    bold(text, colors::ORANGE)
}

/// Header names
#[inline]
pub fn key(text: &str) -> String {
    colorize(text, colors::PINK)
}

/// Section labels such as `Iteration #2`
#[inline]
pub fn label(text: &str) -> String {
    bold(text, colors::BLUE)
}

#[inline]
pub fn muted(text: &str) -> String {
    colorize(text, colors::GREY)
}

/// Colour for an HTTP status class
pub fn status_color(code: u16) -> u8 {
    match code / 100 {
        1 => colors::AQUA,
        2 => colors::GREEN,
        3 => colors::YELLOW,
        4 => colors::ORANGE,
        5 => colors::RED,
        _ => colors::GREY,
    }
}
