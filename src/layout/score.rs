//! Weighted defect score: zero means the layout is clean

use super::validate::{Violation, ViolationKind};

impl ViolationKind {
    /// Contribution of one violation of this kind to the score
    pub fn weight(&self) -> u32 {
        match self {
            ViolationKind::Overlap => 5,
            ViolationKind::ConnectivityError => 10,
            ViolationKind::OutOfBounds => 8,
            ViolationKind::InvalidDimension | ViolationKind::PlacementError => 2,
        }
    }
}

/// Sum of violation weights.
pub fn score(violations: &[Violation]) -> u32 {
    violations.iter().map(|v| v.kind.weight()).sum()
}
