// THEORY:
// Theme colors arrive as text: `#a1b2c3`, `A1B2C3`, occasionally something that is
// not a color at all. This module turns that text into a `PerceptualColor` (three
// gamma-encoded bytes) or says precisely why it could not.
//
// Accepted shape: one optional leading `#`, then exactly six hex digits, upper or
// lower case. Nothing is trimmed.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// A gamma-encoded 8-bit color, as written in `#rrggbb` literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PerceptualColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[derive(Debug, Error)]
pub enum InvalidColorLiteral {
    #[error("want #RRGGBB, got {len} characters after the optional '#'")]
    WrongLength { len: usize },
    #[error("want #RRGGBB, found non-ASCII text")]
    NonAscii,
    #[error("invalid hex channel {pair:?}")]
    NotHex {
        pair: String,
        #[source]
        source: Option<ParseIntError>,
    },
}

impl PerceptualColor {
    pub const BLACK: PerceptualColor = PerceptualColor::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Renders lowercase, zero-padded `#rrggbb`.
impl fmt::Display for PerceptualColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for PerceptualColor {
    type Err = InvalidColorLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color_literal(s)
    }
}

/// Parses `#RRGGBB` or `RRGGBB` into its three channels.
pub fn parse_color_literal(text: &str) -> Result<PerceptualColor, InvalidColorLiteral> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.len() != 6 {
        return Err(InvalidColorLiteral::WrongLength { len: digits.len() });
    }
    Ok(PerceptualColor {
        red: parse_channel(digits, 0)?,
        green: parse_channel(digits, 2)?,
        blue: parse_channel(digits, 4)?,
    })
}

fn parse_channel(digits: &str, start: usize) -> Result<u8, InvalidColorLiteral> {
    let pair = digits
        .get(start..start + 2)
        .ok_or(InvalidColorLiteral::NonAscii)?;
    // `from_str_radix` tolerates a leading '+', a literal does not.
    if pair.starts_with('+') {
        return Err(InvalidColorLiteral::NotHex {
            pair: pair.to_owned(),
            source: None,
        });
    }
    u8::from_str_radix(pair, 16).map_err(|source| InvalidColorLiteral::NotHex {
        pair: pair.to_owned(),
        source: Some(source),
    })
}
