//! Enrichment sections computed alongside commit activity.
//!
//! Each section degrades internally where the data allows it (a missing
//! README, one unreadable repository) and reports a [`SectionError`] only
//! when it cannot produce anything meaningful.
//!
//! [`SectionError`]: crate::error::SectionError

pub mod extended;
pub mod patterns;
pub mod portfolio;
pub mod quality;
pub mod social;

/// `numerator / denominator`, 0 for an empty denominator.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert!(ratio(3, 0).abs() < f64::EPSILON);
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
    }
}
