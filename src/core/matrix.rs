//! Risk matrix - rating scales, category bands, and score lookup
//!
//! Risk is scored as likelihood x severity, both on a 1-5 scale, giving a
//! score in 1..25. The backend's matrix configuration partitions that range
//! into labelled bands (e.g. LOW / MEDIUM / HIGH). The partition is checked
//! once when the catalog loads; lookup itself tolerates gaps and reports
//! "unevaluated" rather than failing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A likelihood or severity rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(5);

    pub fn new(value: u8) -> Result<Self, MatrixError> {
        if (1..=5).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(MatrixError::RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All five rating values, low to high. Used to render the matrix grid.
    pub fn all() -> impl Iterator<Item = Rating> {
        (1..=5).map(Rating)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating(1)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = MatrixError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl FromStr for Rating {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| MatrixError::RatingNotANumber(s.to_string()))?;
        Rating::new(value)
    }
}

/// Multiply likelihood and severity into a matrix score (1..25).
pub fn score(likelihood: Rating, severity: Rating) -> u8 {
    likelihood.0 * severity.0
}

/// One band of the risk matrix, covering an inclusive score range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub label: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    pub min_score: u8,
    pub max_score: u8,
}

impl RiskBand {
    pub fn contains(&self, score: u8) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// The full set of bands, ordered by `min_score`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrix {
    bands: Vec<RiskBand>,
}

impl RiskMatrix {
    /// Build a matrix after checking that the bands partition 1..25 with
    /// no gaps and no overlaps. Catalog load calls this; a bad matrix
    /// configuration fails the whole load.
    pub fn validated(mut bands: Vec<RiskBand>) -> Result<Self, MatrixError> {
        if bands.is_empty() {
            return Err(MatrixError::NoBands);
        }
        bands.sort_by_key(|band| band.min_score);
        for band in &bands {
            if band.min_score < 1 || band.max_score > 25 || band.min_score > band.max_score {
                return Err(MatrixError::BadBandRange {
                    label: band.label.clone(),
                    min: band.min_score,
                    max: band.max_score,
                });
            }
        }
        for score in 1..=25u8 {
            let matching = bands.iter().filter(|band| band.contains(score)).count();
            match matching {
                1 => {}
                0 => return Err(MatrixError::Gap(score)),
                _ => return Err(MatrixError::Overlap(score)),
            }
        }
        Ok(RiskMatrix { bands })
    }

    /// Wrap bands without the partition check. Lookup stays tolerant, so
    /// scores a gapped matrix misses come back as `None` ("unevaluated").
    pub fn unchecked(bands: Vec<RiskBand>) -> Self {
        RiskMatrix { bands }
    }

    pub fn bands(&self) -> &[RiskBand] {
        &self.bands
    }

    /// First band containing `likelihood * severity`, if any.
    pub fn evaluate(&self, likelihood: Rating, severity: Rating) -> Option<&RiskBand> {
        self.band_for_score(score(likelihood, severity))
    }

    pub fn band_for_score(&self, score: u8) -> Option<&RiskBand> {
        self.bands.iter().find(|band| band.contains(score))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("Rating {0} is out of range (expected 1-5)")]
    RatingOutOfRange(u8),

    #[error("Rating '{0}' is not a number")]
    RatingNotANumber(String),

    #[error("Risk matrix has no bands")]
    NoBands,

    #[error("Band '{label}' has invalid range {min}-{max} (scores run 1-25)")]
    BadBandRange { label: String, min: u8, max: u8 },

    #[error("Risk matrix has no band covering score {0}")]
    Gap(u8),

    #[error("Risk matrix bands overlap at score {0}")]
    Overlap(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(label: &str, min: u8, max: u8) -> RiskBand {
        RiskBand {
            id: None,
            label: label.to_string(),
            color: "#cccccc".to_string(),
            guidance: None,
            min_score: min,
            max_score: max,
        }
    }

    fn standard_matrix() -> RiskMatrix {
        RiskMatrix::validated(vec![
            band("LOW", 1, 5),
            band("MED", 6, 15),
            band("HIGH", 16, 25),
        ])
        .unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert_eq!(Rating::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_rating_from_str() {
        assert_eq!("4".parse::<Rating>().unwrap().get(), 4);
        assert!("0".parse::<Rating>().is_err());
        assert!("high".parse::<Rating>().is_err());
    }

    #[test]
    fn test_evaluate_scenarios() {
        let matrix = standard_matrix();
        let l = |v| Rating::new(v).unwrap();

        assert_eq!(matrix.evaluate(l(3), l(4)).unwrap().label, "MED");
        assert_eq!(matrix.evaluate(l(1), l(1)).unwrap().label, "LOW");
        assert_eq!(matrix.evaluate(l(5), l(5)).unwrap().label, "HIGH");
    }

    #[test]
    fn test_evaluate_covers_every_cell() {
        let matrix = standard_matrix();
        for l in Rating::all() {
            for s in Rating::all() {
                let band = matrix.evaluate(l, s).unwrap();
                let score = score(l, s);
                assert!(band.min_score <= score && score <= band.max_score);
            }
        }
    }

    #[test]
    fn test_evaluate_none_on_gap() {
        // 6..9 uncovered
        let matrix = RiskMatrix::unchecked(vec![band("LOW", 1, 5), band("HIGH", 10, 25)]);
        let l = |v| Rating::new(v).unwrap();
        assert!(matrix.evaluate(l(2), l(4)).is_none()); // score 8
        assert!(matrix.evaluate(l(2), l(2)).is_some()); // score 4
    }

    #[test]
    fn test_validated_rejects_gap() {
        let result = RiskMatrix::validated(vec![band("LOW", 1, 5), band("HIGH", 10, 25)]);
        assert_eq!(result.unwrap_err(), MatrixError::Gap(6));
    }

    #[test]
    fn test_validated_rejects_overlap() {
        let result = RiskMatrix::validated(vec![band("LOW", 1, 10), band("HIGH", 10, 25)]);
        assert_eq!(result.unwrap_err(), MatrixError::Overlap(10));
    }

    #[test]
    fn test_validated_rejects_out_of_range_band() {
        let result = RiskMatrix::validated(vec![band("ALL", 0, 25)]);
        assert!(matches!(result, Err(MatrixError::BadBandRange { .. })));
    }

    #[test]
    fn test_validated_sorts_bands() {
        let matrix = RiskMatrix::validated(vec![
            band("HIGH", 16, 25),
            band("LOW", 1, 5),
            band("MED", 6, 15),
        ])
        .unwrap();
        let labels: Vec<&str> = matrix.bands().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["LOW", "MED", "HIGH"]);
    }
}
