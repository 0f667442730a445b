//! Node elements: junctions, reservoirs and tanks.

use hn_core::{
    NodeType, Real, ValidationError, check_finite, check_id, check_non_negative, check_positive,
};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Plan-view position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: Real,
    pub y: Real,
}

impl Coordinate {
    pub fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    fn validate(&self, element: &str) -> Result<(), ValidationError> {
        check_finite(element, "coordinates.x", self.x)?;
        check_finite(element, "coordinates.y", self.y)?;
        Ok(())
    }
}

/// Demand node.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub id: String,
    pub elevation: Real,
    /// Base demand; negative values model an inflow.
    pub demand: Real,
    pub demand_pattern: Option<String>,
    pub coordinates: Option<Coordinate>,
}

impl Junction {
    pub fn new(id: impl Into<String>, elevation: Real, demand: Real) -> Result<Self, ValidationError> {
        let junction = Self {
            id: id.into(),
            elevation,
            demand,
            demand_pattern: None,
            coordinates: None,
        };
        junction.validate()?;
        Ok(junction)
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.demand_pattern = Some(pattern.into());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinate) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id(&self.id)?;
        check_finite(&self.id, "elevation", self.elevation)?;
        check_finite(&self.id, "demand", self.demand)?;
        if let Some(c) = &self.coordinates {
            c.validate(&self.id)?;
        }
        Ok(())
    }
}

/// Fixed-head source node.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservoir {
    pub id: String,
    pub head: Real,
    pub head_pattern: Option<String>,
    pub coordinates: Option<Coordinate>,
}

impl Reservoir {
    pub fn new(id: impl Into<String>, head: Real) -> Result<Self, ValidationError> {
        let reservoir = Self {
            id: id.into(),
            head,
            head_pattern: None,
            coordinates: None,
        };
        reservoir.validate()?;
        Ok(reservoir)
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.head_pattern = Some(pattern.into());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinate) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id(&self.id)?;
        check_finite(&self.id, "head", self.head)?;
        if let Some(c) = &self.coordinates {
            c.validate(&self.id)?;
        }
        Ok(())
    }
}

/// Water levels of a tank, measured above its elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankLevels {
    pub init: Real,
    pub min: Real,
    pub max: Real,
}

/// Storage node with a variable water level.
#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub id: String,
    pub elevation: Real,
    pub init_level: Real,
    pub min_level: Real,
    pub max_level: Real,
    pub diameter: Real,
    pub min_volume: Real,
    pub volume_curve: Option<String>,
    pub coordinates: Option<Coordinate>,
}

impl Tank {
    /// Create a tank. The diameter may be zero only when a volume curve
    /// describes the tank geometry instead.
    pub fn new(
        id: impl Into<String>,
        elevation: Real,
        levels: TankLevels,
        diameter: Real,
        volume_curve: Option<String>,
    ) -> Result<Self, ValidationError> {
        let tank = Self {
            id: id.into(),
            elevation,
            init_level: levels.init,
            min_level: levels.min,
            max_level: levels.max,
            diameter,
            min_volume: 0.0,
            volume_curve,
            coordinates: None,
        };
        tank.validate()?;
        Ok(tank)
    }

    pub fn with_min_volume(mut self, min_volume: Real) -> Result<Self, ValidationError> {
        self.min_volume = min_volume;
        self.validate()?;
        Ok(self)
    }

    pub fn with_coordinates(mut self, coordinates: Coordinate) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn levels(&self) -> TankLevels {
        TankLevels {
            init: self.init_level,
            min: self.min_level,
            max: self.max_level,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id(&self.id)?;
        check_finite(&self.id, "elevation", self.elevation)?;
        check_finite(&self.id, "init_level", self.init_level)?;
        check_finite(&self.id, "min_level", self.min_level)?;
        check_finite(&self.id, "max_level", self.max_level)?;
        if self.init_level < self.min_level {
            return Err(ValidationError::inconsistent(
                &self.id,
                format!(
                    "init_level {} is below min_level {}",
                    self.init_level, self.min_level
                ),
            ));
        }
        if self.init_level > self.max_level {
            return Err(ValidationError::inconsistent(
                &self.id,
                format!(
                    "init_level {} is above max_level {}",
                    self.init_level, self.max_level
                ),
            ));
        }
        if self.volume_curve.is_some() {
            check_non_negative(&self.id, "diameter", self.diameter)?;
        } else {
            check_positive(&self.id, "diameter", self.diameter)?;
        }
        check_non_negative(&self.id, "min_volume", self.min_volume)?;
        if let Some(c) = &self.coordinates {
            c.validate(&self.id)?;
        }
        Ok(())
    }
}

/// Owned node of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Junction(Junction),
    Reservoir(Reservoir),
    Tank(Tank),
}

/// Borrowed node of any type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Junction(&'a Junction),
    Reservoir(&'a Reservoir),
    Tank(&'a Tank),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Junction(j) => &j.id,
            Node::Reservoir(r) => &r.id,
            Node::Tank(t) => &t.id,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Junction(_) => NodeType::Junction,
            Node::Reservoir(_) => NodeType::Reservoir,
            Node::Tank(_) => NodeType::Tank,
        }
    }
}

impl NodeRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            NodeRef::Junction(j) => &j.id,
            NodeRef::Reservoir(r) => &r.id,
            NodeRef::Tank(t) => &t.id,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeRef::Junction(_) => NodeType::Junction,
            NodeRef::Reservoir(_) => NodeType::Reservoir,
            NodeRef::Tank(_) => NodeType::Tank,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinate> {
        match self {
            NodeRef::Junction(j) => j.coordinates,
            NodeRef::Reservoir(r) => r.coordinates,
            NodeRef::Tank(t) => t.coordinates,
        }
    }
}

impl Serialize for Junction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 5 + usize::from(self.coordinates.is_some());
        let mut s = serializer.serialize_struct("Junction", len)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &NodeType::Junction)?;
        s.serialize_field("elevation", &self.elevation)?;
        s.serialize_field("demand", &self.demand)?;
        s.serialize_field("demand_pattern", &self.demand_pattern)?;
        serialize_coordinates(&mut s, self.coordinates.as_ref())?;
        s.end()
    }
}

impl Serialize for Reservoir {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 4 + usize::from(self.coordinates.is_some());
        let mut s = serializer.serialize_struct("Reservoir", len)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &NodeType::Reservoir)?;
        s.serialize_field("head", &self.head)?;
        s.serialize_field("head_pattern", &self.head_pattern)?;
        serialize_coordinates(&mut s, self.coordinates.as_ref())?;
        s.end()
    }
}

impl Serialize for Tank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 9 + usize::from(self.coordinates.is_some());
        let mut s = serializer.serialize_struct("Tank", len)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &NodeType::Tank)?;
        s.serialize_field("elevation", &self.elevation)?;
        s.serialize_field("init_level", &self.init_level)?;
        s.serialize_field("min_level", &self.min_level)?;
        s.serialize_field("max_level", &self.max_level)?;
        s.serialize_field("diameter", &self.diameter)?;
        s.serialize_field("min_volume", &self.min_volume)?;
        s.serialize_field("volume_curve", &self.volume_curve)?;
        serialize_coordinates(&mut s, self.coordinates.as_ref())?;
        s.end()
    }
}

// Coordinates are the one optional field that is omitted rather than null.
fn serialize_coordinates<S: SerializeStruct>(
    s: &mut S,
    coordinates: Option<&Coordinate>,
) -> Result<(), S::Error> {
    match coordinates {
        Some(c) => s.serialize_field("coordinates", c),
        None => s.skip_field("coordinates"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(init: Real, min: Real, max: Real) -> TankLevels {
        TankLevels { init, min, max }
    }

    #[test]
    fn junction_allows_inflow_demand() {
        let j = Junction::new("J1", 100.0, -25.0).unwrap();
        assert_eq!(j.demand, -25.0);
        assert!(Junction::new("J1", Real::NAN, 0.0).is_err());
        assert!(Junction::new("", 0.0, 0.0).is_err());
    }

    #[test]
    fn tank_rejects_init_below_min() {
        let err = Tank::new("T1", 0.0, levels(2.0, 5.0, 10.0), 20.0, None).unwrap_err();
        assert_eq!(err.element(), "T1");
        assert!(err.to_string().contains("below min_level"));
    }

    #[test]
    fn tank_rejects_init_above_max() {
        let err = Tank::new("T1", 0.0, levels(12.0, 5.0, 10.0), 20.0, None).unwrap_err();
        assert!(err.to_string().contains("above max_level"));
    }

    #[test]
    fn tank_diameter_may_be_zero_with_volume_curve() {
        assert!(Tank::new("T1", 0.0, levels(5.0, 0.0, 10.0), 0.0, None).is_err());
        let tank = Tank::new("T1", 0.0, levels(5.0, 0.0, 10.0), 0.0, Some("VC".into())).unwrap();
        assert_eq!(tank.volume_curve.as_deref(), Some("VC"));
    }

    #[test]
    fn tank_min_volume_non_negative() {
        let tank = Tank::new("T1", 0.0, levels(5.0, 0.0, 10.0), 30.0, None).unwrap();
        assert!(tank.clone().with_min_volume(-1.0).is_err());
        assert_eq!(tank.with_min_volume(12.5).unwrap().min_volume, 12.5);
    }

    #[test]
    fn coordinates_omitted_when_absent() {
        let j = Junction::new("J1", 1.0, 2.0).unwrap();
        let v = serde_json::to_value(&j).unwrap();
        assert!(v.get("coordinates").is_none());
        assert!(v["demand_pattern"].is_null());
        assert_eq!(v["type"], "JUNCTION");

        let j = j.with_coordinates(Coordinate::new(3.0, 4.0));
        let v = serde_json::to_value(&j).unwrap();
        assert_eq!(v["coordinates"]["x"], 3.0);
        assert_eq!(v["coordinates"]["y"], 4.0);
    }

    #[test]
    fn tank_serializes_in_schema_order() {
        let tank = Tank::new("T1", 850.0, levels(120.0, 100.0, 150.0), 50.5, None).unwrap();
        let text = serde_json::to_string(&tank).unwrap();
        assert_eq!(
            text,
            "{\"id\":\"T1\",\"type\":\"TANK\",\"elevation\":850.0,\"init_level\":120.0,\
             \"min_level\":100.0,\"max_level\":150.0,\"diameter\":50.5,\"min_volume\":0.0,\
             \"volume_curve\":null}"
        );
    }
}
