//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait provides a set of convenience methods for applying
//! ANSI styling via the `colored` crate. Implementations for `&str` and
//! `String` are provided so string literals can be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn heading_style(&self) -> ColoredString;
    fn subheading_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn battle_style(&self) -> ColoredString;
    fn enemy_style(&self) -> ColoredString;
    fn item_style(&self) -> ColoredString;
    fn quest_style(&self) -> ColoredString;
    fn gold_style(&self) -> ColoredString;
    fn success_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn heading_style(&self) -> ColoredString {
        self.bright_yellow().bold()
    }
    fn subheading_style(&self) -> ColoredString {
        self.underline()
    }
    fn prompt_style(&self) -> ColoredString {
        self.bright_green()
    }
    fn battle_style(&self) -> ColoredString {
        self.bright_red()
    }
    fn enemy_style(&self) -> ColoredString {
        self.truecolor(200, 60, 60).bold()
    }
    fn item_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn quest_style(&self) -> ColoredString {
        self.truecolor(120, 120, 255)
    }
    fn gold_style(&self) -> ColoredString {
        self.yellow()
    }
    fn success_style(&self) -> ColoredString {
        self.bright_green().bold()
    }
    fn error_style(&self) -> ColoredString {
        self.red()
    }
}

impl GameStyle for String {
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn subheading_style(&self) -> ColoredString {
        self.as_str().subheading_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn battle_style(&self) -> ColoredString {
        self.as_str().battle_style()
    }
    fn enemy_style(&self) -> ColoredString {
        self.as_str().enemy_style()
    }
    fn item_style(&self) -> ColoredString {
        self.as_str().item_style()
    }
    fn quest_style(&self) -> ColoredString {
        self.as_str().quest_style()
    }
    fn gold_style(&self) -> ColoredString {
        self.as_str().gold_style()
    }
    fn success_style(&self) -> ColoredString {
        self.as_str().success_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
