//! Drawing tool selection
//!
//! The active tool decides how pointer input inside a confirmed region is
//! interpreted: None moves the selection, Text opens inline entry, every
//! other tool drags out an annotation.

/// The annotation tool currently active in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// No tool: pointer input manipulates the selection itself
    #[default]
    None,
    Freehand,
    Line,
    Arrow,
    Rectangle,
    Highlighter,
    Text,
}

impl Tool {
    /// All tools in palette order
    pub fn all() -> &'static [Tool] {
        &[
            Tool::None,
            Tool::Freehand,
            Tool::Line,
            Tool::Arrow,
            Tool::Rectangle,
            Tool::Highlighter,
            Tool::Text,
        ]
    }

    /// Tools that construct an annotation through a pointer drag
    pub fn is_drawing_tool(&self) -> bool {
        matches!(
            self,
            Tool::Freehand | Tool::Line | Tool::Arrow | Tool::Rectangle | Tool::Highlighter
        )
    }

    /// Default stroke width when the session has no explicit override
    pub fn default_stroke_width(&self) -> f64 {
        match self {
            Tool::Highlighter => 20.0,
            _ => 3.0,
        }
    }

    /// Human-readable tool name
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::None => "None",
            Tool::Freehand => "Freehand",
            Tool::Line => "Line",
            Tool::Arrow => "Arrow",
            Tool::Rectangle => "Rectangle",
            Tool::Highlighter => "Highlighter",
            Tool::Text => "Text",
        }
    }
}
