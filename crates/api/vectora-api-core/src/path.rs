//! Path data (`d` attribute) segments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "UPPERCASE")]
pub enum PathCommand {
    M { p: Vec2 },
    L { p: Vec2 },
    Q { c: Vec2, p: Vec2 },
    C { c1: Vec2, c2: Vec2, p: Vec2 },
    Z,
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::M { p } => write!(f, "M{},{}", p.x, p.y),
            PathCommand::L { p } => write!(f, "L{},{}", p.x, p.y),
            PathCommand::Q { c, p } => write!(f, "Q{},{} {},{}", c.x, c.y, p.x, p.y),
            PathCommand::C { c1, c2, p } => {
                write!(f, "C{},{} {},{} {},{}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
            }
            PathCommand::Z => f.write_str("Z"),
        }
    }
}

/// Render segments as an SVG `d` attribute string.
pub fn to_svg_d(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
