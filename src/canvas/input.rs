// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Input model: tools, keys, modifiers and the in-progress gesture.
//!
//! These types are independent of any windowing toolkit; the UI layer
//! translates its native events into them.

use crate::models::annotation::Point;

/// Which drawing tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Drag an axis-aligned box.
    #[default]
    BBox,
    /// Click vertices, close with Enter or double click.
    Polygon,
    /// Single click.
    Point,
    /// Drag a segment.
    Line,
    /// Single click places the current label as text.
    Text,
}

impl Tool {
    pub const ALL: [Tool; 5] = [Tool::BBox, Tool::Polygon, Tool::Point, Tool::Line, Tool::Text];

    /// Shortcut key selecting this tool.
    pub fn shortcut(self) -> char {
        match self {
            Self::BBox => 'b',
            Self::Polygon => 'p',
            Self::Point => 'o',
            Self::Line => 'l',
            Self::Text => 't',
        }
    }

    pub fn from_shortcut(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.shortcut() == c)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BBox => "Bounding Box",
            Self::Polygon => "Polygon",
            Self::Point => "Point",
            Self::Line => "Line",
            Self::Text => "Text",
        }
    }

    /// One-line usage hint.
    pub fn hint(self) -> &'static str {
        match self {
            Self::BBox => "Drag to draw a box",
            Self::Polygon => "Click to add vertices, Enter or double-click to close",
            Self::Point => "Click to place a point",
            Self::Line => "Drag to draw a line",
            Self::Text => "Click to place the current label as text",
        }
    }
}

/// A key relevant to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Delete,
    Escape,
    Enter,
    Space,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    /// Command on macOS; treated like ctrl.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        meta: false,
    };

    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Gesture tracked between pointer events. Points are media-local.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging out a box or line.
    Dragging {
        tool: Tool,
        start: Point,
        current: Point,
    },
    /// Collecting polygon vertices; `hover` is the last pointer position.
    Polygon {
        vertices: Vec<Point>,
        hover: Option<Point>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_shortcuts() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_shortcut(tool.shortcut()), Some(tool));
        }
        assert_eq!(Tool::from_shortcut('B'), Some(Tool::BBox));
        assert_eq!(Tool::from_shortcut('O'), Some(Tool::Point));
        assert_eq!(Tool::from_shortcut('x'), None);
    }

    #[test]
    fn test_command_modifier() {
        assert!(!Modifiers::NONE.command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(Modifiers { ctrl: true, ..Modifiers::NONE }.command());
    }
}
