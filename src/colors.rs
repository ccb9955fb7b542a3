//! # Display Colors
//!
//! Maps drivers, compounds and gears to hex colors. Team colors come from a known table;
//! anything missing from it gets a palette color picked by its position in the chart, so
//! the same entity at the same position always gets the same color.

use crate::{Compound, DashError, Entity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A CSS hex color such as `#FF8000`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Color(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entry of the known-color table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownColor {
    pub color: Color,
    /// White liveries are unreadable on a light background and get [`LIGHT_GRAY`]
    #[serde(default)]
    pub visually_white: bool,
}

/// Substitute for visually-white entities.
pub const LIGHT_GRAY: &str = "#CCCCCC";

/// Fill of the trailing "did not finish" strategy segment.
pub const DNF_COLOR: &str = "#999999";

/// Opacity of the trailing "did not finish" strategy segment.
pub const DNF_OPACITY: f64 = 0.4;

/// Color for compounds missing from the compound table.
pub const UNKNOWN_COMPOUND_COLOR: &str = "#CCCCCC";

/// Color for gears outside 1..=8.
pub const UNKNOWN_GEAR_COLOR: &str = "#000000";

/// Resolve the display color of `entity` drawn at position `index`.
///
/// Known entities get their table color (or [`LIGHT_GRAY`] if flagged white). Unknown
/// entities get `fallback[index % fallback.len()]`.
///
/// # Errors
/// [`DashError::InvalidInput`] when the entity is unknown and `fallback` is empty.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use race_dash_lib::colors::{resolve, Color};
///
/// let palette = [Color::new("#1e40af"), Color::new("#dc2626")];
/// let color = resolve("XYZ", 3, &HashMap::new(), &palette).unwrap();
/// assert_eq!(color.as_str(), "#dc2626");
/// ```
pub fn resolve(
    entity: &str,
    index: usize,
    known: &HashMap<Entity, KnownColor>,
    fallback: &[Color],
) -> Result<Color, DashError> {
    if let Some(entry) = known.get(entity) {
        if entry.visually_white {
            return Ok(Color::new(LIGHT_GRAY));
        }
        return Ok(entry.color.clone());
    }
    if fallback.is_empty() {
        return Err(DashError::invalid(format!(
            "no known color for {entity} and the fallback palette is empty"
        )));
    }
    Ok(fallback[index % fallback.len()].clone())
}

/// Team colors for the current grid, keyed by driver code.
pub fn driver_colors() -> HashMap<Entity, KnownColor> {
    const TABLE: &[(&str, &str, bool)] = &[
        // Red Bull
        ("VER", "#3671C6", false),
        ("PER", "#3671C6", false),
        // Mercedes
        ("HAM", "#27F4D2", false),
        ("RUS", "#27F4D2", false),
        // Ferrari
        ("LEC", "#E8002D", false),
        ("SAI", "#E8002D", false),
        ("BEA", "#E8002D", false),
        // McLaren
        ("NOR", "#FF8000", false),
        ("PIA", "#FF8000", false),
        // Aston Martin
        ("ALO", "#229971", false),
        ("STR", "#229971", false),
        // Alpine
        ("GAS", "#0093CC", false),
        ("OCO", "#0093CC", false),
        ("DOO", "#0093CC", false),
        // Williams
        ("ALB", "#64C4FF", false),
        ("SAR", "#64C4FF", false),
        ("COL", "#64C4FF", false),
        // RB
        ("TSU", "#6692FF", false),
        ("RIC", "#6692FF", false),
        ("LAW", "#6692FF", false),
        // Sauber
        ("BOT", "#52E252", false),
        ("ZHO", "#52E252", false),
        // Haas
        ("HUL", "#FFFFFF", true),
        ("MAG", "#FFFFFF", true),
    ];

    TABLE
        .iter()
        .map(|&(code, hex, visually_white)| {
            (
                code.to_string(),
                KnownColor {
                    color: Color::new(hex),
                    visually_white,
                },
            )
        })
        .collect()
}

pub fn compound_color(compound: Compound) -> Color {
    Color::new(match compound {
        Compound::Soft => "#ea4c4c",
        Compound::Medium => "#f6c12b",
        Compound::Hard => "#e5e5e5",
        Compound::Intermediate => "#4ce371",
        Compound::Wet => "#2b65ec",
        Compound::Unknown => UNKNOWN_COMPOUND_COLOR,
    })
}

pub fn gear_color(gear: i32) -> Color {
    Color::new(match gear {
        1 => "#cfe2f3",
        2 => "#9fc5e8",
        3 => "#6fa8dc",
        4 => "#4d8b31",
        5 => "#ff9900",
        6 => "#e06666",
        7 => "#f6b26b",
        8 => "#ff7300",
        _ => UNKNOWN_GEAR_COLOR,
    })
}
