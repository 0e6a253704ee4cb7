//! Visual encoding for node and connection tags.
//!
//! Every mapping here is an exhaustive `match`: adding a tag to `NodeType`,
//! `ConnectionType` or `Strength` fails to compile until it is given a style.

use crate::tree::model::{ConnectionType, NodeType, Strength};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStyle {
    pub color: Rgb,
    pub background: Rgb,
    pub border: Rgb,
    pub icon: &'static str,
    pub legend: &'static str,
}

pub fn node_style(node_type: NodeType) -> NodeStyle {
    match node_type {
        NodeType::Problem => NodeStyle {
            color: Rgb(0xDC, 0x26, 0x26),
            background: Rgb(0xFE, 0xE2, 0xE2),
            border: Rgb(0xEF, 0x44, 0x44),
            icon: "🔴",
            legend: "Problem",
        },
        NodeType::Solution => NodeStyle {
            color: Rgb(0x05, 0x96, 0x69),
            background: Rgb(0xD1, 0xFA, 0xE5),
            border: Rgb(0x10, 0xB9, 0x81),
            icon: "🟢",
            legend: "How (Solution)",
        },
        NodeType::Mechanism => NodeStyle {
            color: Rgb(0x25, 0x63, 0xEB),
            background: Rgb(0xDB, 0xEA, 0xFE),
            border: Rgb(0x3B, 0x82, 0xF6),
            icon: "🔵",
            legend: "Why (Mechanism)",
        },
        NodeType::Gap => NodeStyle {
            color: Rgb(0xDC, 0x26, 0x26),
            background: Rgb(0xFE, 0xE2, 0xE2),
            border: Rgb(0xEF, 0x44, 0x44),
            icon: "🔴",
            legend: "Gap/Unsolved",
        },
    }
}

pub const FOUNDATIONAL_ICON: &str = "⭐";

/// Stroke width in canvas units.
pub fn stroke_width(strength: Strength) -> f32 {
    match strength {
        Strength::Weak => 2.0,
        Strength::Moderate => 3.0,
        Strength::Strong => 4.0,
    }
}

pub const PARENT_STROKE_WIDTH: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dashed,
}

impl Dash {
    pub const DASHED_PATTERN: [f32; 2] = [8.0, 4.0];

    /// Alternating on/off lengths; empty means solid.
    pub fn pattern(self) -> &'static [f32] {
        match self {
            Self::Solid => &[],
            Self::Dashed => &Self::DASHED_PATTERN,
        }
    }
}

pub fn dash_for(connection_type: ConnectionType) -> Dash {
    match connection_type {
        ConnectionType::Alternative | ConnectionType::Contradictory => Dash::Dashed,
        ConnectionType::Supporting | ConnectionType::Extends => Dash::Solid,
    }
}
