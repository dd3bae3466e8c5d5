use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::CourseId;
use crate::scoring::validation::is_valid_par;
use crate::scoring::HOLES;

pub const MIN_SLOPE: u32 = 55;
pub const MAX_SLOPE: u32 = 155;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub number: u8,
    pub par: u8,
    #[serde(default)]
    pub distance: Option<u32>,
}

/// A course as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub tee: String,
    pub par_total: u32,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub slope: Option<u32>,
    pub holes: Vec<Hole>,
}

impl Course {
    /// Pars ordered by hole number.
    pub fn hole_pars(&self) -> Vec<u8> {
        let mut holes: Vec<&Hole> = self.holes.iter().collect();
        holes.sort_by_key(|h| h.number);
        holes.iter().map(|h| h.par).collect()
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.tee)
    }
}

/// A course definition as submitted by an administrator, before it has an id.
///
/// Example YAML:
/// ```yaml
/// name: Pine Hollow
/// tee: white
/// par_total: 72
/// rating: 71.4
/// slope: 128
/// holes:
///   - { number: 1, par: 4, distance: 390 }
///   - { number: 2, par: 3 }
///   # ... all 18 holes
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCourse {
    pub name: String,
    pub tee: String,
    pub par_total: u32,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub slope: Option<u32>,
    pub holes: Vec<Hole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseError {
    #[error("course name must not be empty")]
    EmptyName,
    #[error("course must have exactly 18 holes, found {0}")]
    HoleCount(usize),
    #[error("hole number {0} is outside 1-18")]
    HoleNumberOutOfRange(u8),
    #[error("hole {0} is defined more than once")]
    DuplicateHole(u8),
    #[error("hole {hole}: par must be 3, 4 or 5 (got {par})")]
    InvalidPar { hole: u8, par: u8 },
    #[error("par_total {declared} does not match the sum of hole pars ({computed})")]
    ParTotalMismatch { declared: u32, computed: u32 },
    #[error("slope {0} is outside 55-155")]
    SlopeOutOfRange(u32),
    #[error("rating must be positive (got {0})")]
    InvalidRating(Decimal),
    #[error("unreadable course definition: {0}")]
    Malformed(String),
}

impl NewCourse {
    /// Parse a YAML course definition. A malformed document is reported as a
    /// course error, the same as a definition that parses but is invalid.
    pub fn from_yaml(content: &str) -> Result<Self, CourseError> {
        serde_saphyr::from_str(content).map_err(|e| CourseError::Malformed(e.to_string()))
    }

    /// Check every course invariant and report all violations.
    pub fn validate(&self) -> Result<(), Vec<CourseError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(CourseError::EmptyName);
        }

        if self.holes.len() != HOLES {
            errors.push(CourseError::HoleCount(self.holes.len()));
        }

        let mut seen = [false; HOLES];
        for hole in &self.holes {
            if hole.number == 0 || usize::from(hole.number) > HOLES {
                errors.push(CourseError::HoleNumberOutOfRange(hole.number));
            } else {
                let slot = &mut seen[usize::from(hole.number) - 1];
                if *slot {
                    errors.push(CourseError::DuplicateHole(hole.number));
                }
                *slot = true;
            }
            if !is_valid_par(hole.par) {
                errors.push(CourseError::InvalidPar {
                    hole: hole.number,
                    par: hole.par,
                });
            }
        }

        let computed: u32 = self.holes.iter().map(|h| u32::from(h.par)).sum();
        if computed != self.par_total {
            errors.push(CourseError::ParTotalMismatch {
                declared: self.par_total,
                computed,
            });
        }

        if let Some(slope) = self.slope {
            if !(MIN_SLOPE..=MAX_SLOPE).contains(&slope) {
                errors.push(CourseError::SlopeOutOfRange(slope));
            }
        }

        if let Some(rating) = self.rating {
            if rating <= Decimal::ZERO {
                errors.push(CourseError::InvalidRating(rating));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            name: self.name.trim().to_string(),
            tee: self.tee.trim().to_string(),
            par_total: self.par_total,
            rating: self.rating,
            slope: self.slope,
            holes: self.holes,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Par 72 layout: fours everywhere except two threes and two fives per nine.
    pub(crate) fn sample_new_course(name: &str) -> NewCourse {
        let pars = [4, 4, 3, 5, 4, 4, 3, 4, 5, 4, 4, 3, 5, 4, 4, 3, 4, 5];
        NewCourse {
            name: name.to_string(),
            tee: "white".to_string(),
            par_total: 72,
            rating: Some("71.4".parse().unwrap()),
            slope: Some(128),
            holes: pars
                .iter()
                .enumerate()
                .map(|(i, &par)| Hole {
                    number: i as u8 + 1,
                    par,
                    distance: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_from_yaml() {
        let holes: String = (1..=18)
            .map(|n| format!("  - {{ number: {}, par: 4 }}\n", n))
            .collect();
        let yaml = format!("name: Pine Hollow\ntee: white\npar_total: 72\nslope: 128\nholes:\n{}", holes);
        let course = NewCourse::from_yaml(&yaml).unwrap();
        assert_eq!(course.holes.len(), 18);
        assert_eq!(course.slope, Some(128));
        assert!(course.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_field() {
        let err = NewCourse::from_yaml("name: Pine Hollow\ntee: white\npar_total: 72\nholes: []\ncolour: green\n")
            .unwrap_err();
        assert!(matches!(err, CourseError::Malformed(_)));
    }

    #[test]
    fn test_valid_course() {
        assert!(sample_new_course("Pine Hollow").validate().is_ok());
    }

    #[test]
    fn test_missing_hole() {
        let mut course = sample_new_course("Pine Hollow");
        course.holes.pop();
        course.par_total = 67;
        let errors = course.validate().unwrap_err();
        assert_eq!(errors, vec![CourseError::HoleCount(17)]);
    }

    #[test]
    fn test_duplicate_and_out_of_range_holes() {
        let mut course = sample_new_course("Pine Hollow");
        course.holes[1].number = 1;
        course.holes[2].number = 19;
        let errors = course.validate().unwrap_err();
        assert!(errors.contains(&CourseError::DuplicateHole(1)));
        assert!(errors.contains(&CourseError::HoleNumberOutOfRange(19)));
    }

    #[test]
    fn test_par_total_mismatch() {
        let mut course = sample_new_course("Pine Hollow");
        course.par_total = 70;
        let errors = course.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![CourseError::ParTotalMismatch {
                declared: 70,
                computed: 72
            }]
        );
    }

    #[test]
    fn test_bad_slope_and_rating() {
        let mut course = sample_new_course("Pine Hollow");
        course.slope = Some(200);
        course.rating = Some(Decimal::ZERO);
        let errors = course.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_hole_pars_ordered_by_number() {
        let mut new_course = sample_new_course("Pine Hollow");
        new_course.holes.reverse();
        let course = new_course.into_course(7);
        let pars = course.hole_pars();
        assert_eq!(pars[0], 4);
        assert_eq!(pars[2], 3);
        assert_eq!(pars[17], 5);
        assert_eq!(course.label(), "Pine Hollow (white)");
    }

    #[test]
    fn test_parse_course_yaml() {
        let yaml = r#"
name: Short Nine Twice
tee: red
par_total: 54
holes:
  - { number: 1, par: 3, distance: 120 }
  - { number: 2, par: 3 }
"#;
        let course: NewCourse = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(course.holes.len(), 2);
        assert_eq!(course.holes[0].distance, Some(120));
        assert!(course.rating.is_none());
        assert!(course.validate().is_err());
    }
}
