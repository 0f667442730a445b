//! Time patterns and x-y curves.

use hn_core::{Real, ValidationError, check_finite, check_id, strictly_increasing};
use serde::{Deserialize, Serialize};

/// Multiplier sequence applied to a base demand, head or speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub id: String,
    pub multipliers: Vec<Real>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, multipliers: Vec<Real>) -> Result<Self, ValidationError> {
        let pattern = Self {
            id: id.into(),
            multipliers,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id(&self.id)?;
        if self.multipliers.is_empty() {
            return Err(ValidationError::inconsistent(
                &self.id,
                "pattern has no multipliers",
            ));
        }
        for m in &self.multipliers {
            check_finite(&self.id, "multipliers", *m)?;
        }
        Ok(())
    }
}

/// Purpose of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurveType {
    /// Pump head vs. flow
    Pump,
    /// Pump efficiency vs. flow
    Efficiency,
    /// Tank volume vs. depth
    Volume,
    /// GPV headloss vs. flow
    Headloss,
    #[default]
    Unknown,
}

impl CurveType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "PUMP" => Some(CurveType::Pump),
            "EFFICIENCY" => Some(CurveType::Efficiency),
            "VOLUME" => Some(CurveType::Volume),
            "HEADLOSS" => Some(CurveType::Headloss),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CurveType::Pump => "PUMP",
            CurveType::Efficiency => "EFFICIENCY",
            CurveType::Volume => "VOLUME",
            CurveType::Headloss => "HEADLOSS",
            CurveType::Unknown => "UNKNOWN",
        }
    }

    /// Pump and volume curves must be functions of strictly increasing x.
    pub fn is_monotone(self) -> bool {
        matches!(self, CurveType::Pump | CurveType::Volume)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: Real,
    pub y: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub id: String,
    #[serde(rename = "type")]
    pub curve_type: CurveType,
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(
        id: impl Into<String>,
        curve_type: CurveType,
        points: Vec<CurvePoint>,
    ) -> Result<Self, ValidationError> {
        let curve = Self {
            id: id.into(),
            curve_type,
            points,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id(&self.id)?;
        if self.points.is_empty() {
            return Err(ValidationError::inconsistent(&self.id, "curve has no points"));
        }
        for p in &self.points {
            check_finite(&self.id, "points.x", p.x)?;
            check_finite(&self.id, "points.y", p.y)?;
        }
        if self.curve_type.is_monotone() && !strictly_increasing(self.points.iter().map(|p| p.x)) {
            return Err(ValidationError::inconsistent(
                &self.id,
                format!(
                    "{} curve x values must be strictly increasing",
                    self.curve_type.as_str()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(xy: &[(Real, Real)]) -> Vec<CurvePoint> {
        xy.iter().map(|&(x, y)| CurvePoint { x, y }).collect()
    }

    #[test]
    fn pattern_must_be_non_empty() {
        assert!(Pattern::new("1", vec![]).is_err());
        assert!(Pattern::new("1", vec![1.0, 0.5]).is_ok());
    }

    #[test]
    fn monotone_curves_reject_decreasing_x() {
        let err = Curve::new("C1", CurveType::Pump, pts(&[(0.0, 100.0), (0.0, 80.0)])).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
        assert!(Curve::new("C1", CurveType::Volume, pts(&[(2.0, 1.0), (1.0, 2.0)])).is_err());
        // Efficiency and unknown curves carry no ordering rule.
        assert!(Curve::new("C1", CurveType::Efficiency, pts(&[(2.0, 1.0), (1.0, 2.0)])).is_ok());
        assert!(Curve::new("C1", CurveType::Unknown, pts(&[(2.0, 1.0), (1.0, 2.0)])).is_ok());
    }

    #[test]
    fn curve_serializes_points_as_objects() {
        let curve = Curve::new("1", CurveType::Pump, pts(&[(1500.0, 250.0)])).unwrap();
        let text = serde_json::to_string(&curve).unwrap();
        assert_eq!(
            text,
            r#"{"id":"1","type":"PUMP","points":[{"x":1500.0,"y":250.0}]}"#
        );
    }
}
