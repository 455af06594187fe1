//! Layout model and the spatial checks that run over it
//!
//! This module holds the element/layout data types, the rectangle
//! primitives, the constraint validator with its scorer, and the
//! identity-keyed merge used to fold partial corrections back in.

pub mod geometry;
pub mod ids;
pub mod merge;
pub mod score;
pub mod types;
pub mod validate;

pub use geometry::{Point, Rect, Side};
pub use ids::IdGenerator;
pub use merge::{merge, ElementPatch};
pub use score::score;
pub use types::{Element, Layout};
pub use validate::{validate, Violation, ViolationKind};
