//! Terminal colors for the `doubao` output.
//!
//! Padding is applied before coloring so columns stay aligned once the
//! escape codes are added.

use owo_colors::OwoColorize;
use std::fmt::Display;

const KEY_WIDTH: usize = 18;
const LANG_WIDTH: usize = 7;

pub struct Theme;

impl Theme {
    pub fn heading<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    /// A configuration key, padded to the key column.
    pub fn key(name: &str) -> String {
        format!("{}", format!("{name:width$}", width = KEY_WIDTH).dimmed())
    }

    pub fn value<T: Display>(text: T) -> String {
        format!("{}", text.cyan())
    }

    pub fn muted<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    pub fn ok<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    pub fn failure<T: Display>(text: T) -> String {
        format!("{}", text.red().bold())
    }

    pub fn caution<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    /// A language code, padded to the language column.
    pub fn lang(code: &str) -> String {
        format!("{}", format!("{code:width$}", width = LANG_WIDTH).yellow())
    }

    /// A detection confidence, green when sure and red when guessing.
    pub fn confidence(confidence: f32) -> String {
        let text = format!("{confidence:.2}");
        if confidence >= 0.8 {
            Self::ok(text)
        } else if confidence >= 0.5 {
            Self::caution(text)
        } else {
            Self::failure(text)
        }
    }
}
