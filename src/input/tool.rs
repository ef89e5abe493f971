//! Tool selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Active tool.
///
/// The tool decides how a single contact is interpreted: with [`Tool::Pan`] it
/// drags the viewport, with a drawing tool it lays down stroke segments after
/// the commit delay. Two or more contacts always pan or pinch, whatever the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Single-finger drags move the viewport (default)
    #[default]
    Pan,
    /// Freehand pen; strokes grow the drawing bounds
    Pen,
    /// Eraser; segments are emitted but never grow bounds
    Eraser,
}

impl Tool {
    /// Returns true for tools that lay down segments.
    pub fn is_drawing(self) -> bool {
        matches!(self, Tool::Pen | Tool::Eraser)
    }

    /// Returns true if segments drawn with this tool count towards the drawing bounds.
    pub fn tracks_bounds(self) -> bool {
        self == Tool::Pen
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Pan => "pan",
            Tool::Pen => "pen",
            Tool::Eraser => "eraser",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
