use std::io;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ColorSetting {
    #[default]
    Automatic,
    Always,
    Never,
}

impl ColorSetting {
    /// Resolve the setting for a target that does or does not support color.
    pub fn use_color(&self, supported: bool) -> bool {
        match self {
            ColorSetting::Automatic => supported,
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

impl From<bool> for ColorSetting {
    fn from(value: bool) -> Self {
        match value {
            true => ColorSetting::Always,
            false => ColorSetting::Never,
        }
    }
}

pub(crate) mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const NO_BOLD: &str = "\x1b[22m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

pub trait SupportsColor {
    fn supports_color(&self) -> bool;
}

impl<T: io::IsTerminal> SupportsColor for T {
    fn supports_color(&self) -> bool {
        self.is_terminal()
    }
}

/// Wraps `text` in `color` and a reset, or returns it untouched.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Paint<'s> {
    pub on: bool,
    pub color: &'static str,
    pub reset: &'static str,
    pub text: &'s str,
}

impl<'s> Paint<'s> {
    pub fn new(on: bool, color: &'static str, text: &'s str) -> Self {
        Self {
            on,
            color,
            reset: colors::RESET,
            text,
        }
    }

    pub fn bold(on: bool, text: &'s str) -> Self {
        Self {
            on,
            color: colors::BOLD,
            reset: colors::NO_BOLD,
            text,
        }
    }
}

impl std::fmt::Display for Paint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.on {
            true => write!(f, "{}{}{}", self.color, self.text, self.reset),
            false => f.write_str(self.text),
        }
    }
}
