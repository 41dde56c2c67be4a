//! Gesture label enumeration
//!
//! The closed set of classifier outputs. `Rest` is a valid output and is
//! distinct from "no result yet", which the shared state models with
//! `Option<GestureLabel>`.

use serde::{Deserialize, Serialize};

/// Discrete hand-gesture classes the pipeline can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureLabel {
    /// No intentional gesture (class 0)
    Rest,
    /// Hand open (class 1)
    Open,
    /// Hand close (class 2)
    Close,
    /// Wrist rotation left (class 3)
    RotateLeft,
    /// Wrist rotation right (class 4)
    RotateRight,
}

impl GestureLabel {
    /// All labels in class-index order
    pub const ALL: [GestureLabel; 5] = [
        GestureLabel::Rest,
        GestureLabel::Open,
        GestureLabel::Close,
        GestureLabel::RotateLeft,
        GestureLabel::RotateRight,
    ];

    /// Map a model class index to a label
    pub fn from_class_index(index: usize) -> Option<GestureLabel> {
        Self::ALL.get(index).copied()
    }

    /// The model class index this label encodes
    pub fn class_index(&self) -> usize {
        match self {
            GestureLabel::Rest => 0,
            GestureLabel::Open => 1,
            GestureLabel::Close => 2,
            GestureLabel::RotateLeft => 3,
            GestureLabel::RotateRight => 4,
        }
    }

    /// True for every label except `Rest`
    pub fn is_movement(&self) -> bool {
        !matches!(self, GestureLabel::Rest)
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureLabel::Rest => write!(f, "rest"),
            GestureLabel::Open => write!(f, "open"),
            GestureLabel::Close => write!(f, "close"),
            GestureLabel::RotateLeft => write!(f, "rotate_left"),
            GestureLabel::RotateRight => write!(f, "rotate_right"),
        }
    }
}
