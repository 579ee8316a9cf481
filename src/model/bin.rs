//! Bin addressing
//!
//! A model has `n_bins` regular bins plus two overflow bins that park the
//! entries outside the current window.

use std::fmt;

/// Address of a bin in a [`TraceHistogram`](crate::model::TraceHistogram)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bin {
    /// Regular bin, `0..n_bins`
    Regular(usize),
    /// Entries after the window (`ts > max`)
    UpperOverflow,
    /// Entries before the window (`ts < min`)
    LowerOverflow,
}

impl Bin {
    /// Storage slot of this bin for a model with `n_bins` bins
    ///
    /// Regular bins out of range resolve to `None`.
    pub(crate) fn slot(self, n_bins: usize) -> Option<usize> {
        match self {
            Bin::Regular(b) if b < n_bins => Some(b),
            Bin::Regular(_) => None,
            Bin::UpperOverflow if n_bins > 0 => Some(n_bins),
            Bin::LowerOverflow if n_bins > 0 => Some(n_bins + 1),
            _ => None,
        }
    }

    pub fn is_overflow(self) -> bool {
        !matches!(self, Bin::Regular(_))
    }
}

impl From<usize> for Bin {
    fn from(b: usize) -> Self {
        Bin::Regular(b)
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bin::Regular(b) => write!(f, "{}", b),
            Bin::UpperOverflow => write!(f, "upper"),
            Bin::LowerOverflow => write!(f, "lower"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots() {
        assert_eq!(Bin::Regular(0).slot(10), Some(0));
        assert_eq!(Bin::Regular(9).slot(10), Some(9));
        assert_eq!(Bin::Regular(10).slot(10), None);
        assert_eq!(Bin::UpperOverflow.slot(10), Some(10));
        assert_eq!(Bin::LowerOverflow.slot(10), Some(11));
    }

    #[test]
    fn test_empty_model_has_no_slots() {
        assert_eq!(Bin::Regular(0).slot(0), None);
        assert_eq!(Bin::UpperOverflow.slot(0), None);
        assert_eq!(Bin::LowerOverflow.slot(0), None);
    }

    #[test]
    fn test_from_and_display() {
        assert_eq!(Bin::from(3), Bin::Regular(3));
        assert!(Bin::UpperOverflow.is_overflow());
        assert!(!Bin::Regular(1).is_overflow());
        assert_eq!(Bin::LowerOverflow.to_string(), "lower");
    }
}
