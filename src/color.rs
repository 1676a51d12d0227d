//! Foreground colors offered in the color menu.

use std::fmt;

/// An RGB triple handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor(pub u8, pub u8, pub u8);

/// The closed set of foreground colors a user can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorChoice {
    #[default]
    Black,
    Blue,
    Red,
    Green,
    Purple,
    Orange,
}

impl ColorChoice {
    /// Menu order
    pub const ALL: [ColorChoice; 6] = [
        ColorChoice::Black,
        ColorChoice::Blue,
        ColorChoice::Red,
        ColorChoice::Green,
        ColorChoice::Purple,
        ColorChoice::Orange,
    ];

    /// Parse a selection token. Anything outside the closed set is black.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "black" => ColorChoice::Black,
            "blue" => ColorChoice::Blue,
            "red" => ColorChoice::Red,
            "green" => ColorChoice::Green,
            "purple" => ColorChoice::Purple,
            "orange" => ColorChoice::Orange,
            _ => ColorChoice::default(),
        }
    }

    /// Lowercase token used in callback data and file names
    pub fn token(self) -> &'static str {
        match self {
            ColorChoice::Black => "black",
            ColorChoice::Blue => "blue",
            ColorChoice::Red => "red",
            ColorChoice::Green => "green",
            ColorChoice::Purple => "purple",
            ColorChoice::Orange => "orange",
        }
    }

    /// Capitalised name shown in captions
    pub fn display_name(self) -> &'static str {
        match self {
            ColorChoice::Black => "Black",
            ColorChoice::Blue => "Blue",
            ColorChoice::Red => "Red",
            ColorChoice::Green => "Green",
            ColorChoice::Purple => "Purple",
            ColorChoice::Orange => "Orange",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ColorChoice::Black => "⚫",
            ColorChoice::Blue => "🔵",
            ColorChoice::Red => "🔴",
            ColorChoice::Green => "🟢",
            ColorChoice::Purple => "🟣",
            ColorChoice::Orange => "🟠",
        }
    }

    pub fn rgb(self) -> RgbColor {
        match self {
            ColorChoice::Black => RgbColor(0, 0, 0),
            ColorChoice::Blue => RgbColor(0, 0, 255),
            ColorChoice::Red => RgbColor(255, 0, 0),
            ColorChoice::Green => RgbColor(0, 128, 0),
            ColorChoice::Purple => RgbColor(128, 0, 128),
            ColorChoice::Orange => RgbColor(255, 165, 0),
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
