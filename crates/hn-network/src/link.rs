//! Link elements: pipes, pumps and valves.

use hn_core::{LinkType, Real, ValidationError, check_finite, check_id, check_non_negative, check_positive};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Initial status of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PipeStatus {
    #[default]
    Open,
    Closed,
    /// Check valve: flow only from `from_node` to `to_node`.
    Cv,
}

impl PipeStatus {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "OPEN" => Some(PipeStatus::Open),
            "CLOSED" => Some(PipeStatus::Closed),
            "CV" => Some(PipeStatus::Cv),
            _ => None,
        }
    }
}

/// Valve control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValveType {
    /// Pressure reducing valve
    Prv,
    /// Pressure sustaining valve
    Psv,
    /// Pressure breaker valve
    Pbv,
    /// Flow control valve
    Fcv,
    /// Throttle control valve
    Tcv,
    /// General purpose valve (headloss curve)
    Gpv,
}

impl ValveType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "PRV" => Some(ValveType::Prv),
            "PSV" => Some(ValveType::Psv),
            "PBV" => Some(ValveType::Pbv),
            "FCV" => Some(ValveType::Fcv),
            "TCV" => Some(ValveType::Tcv),
            "GPV" => Some(ValveType::Gpv),
            _ => None,
        }
    }
}

/// Valve setting. Its meaning depends on the valve type: pressure for
/// PRV/PSV/PBV, flow for FCV, loss coefficient for TCV, and a headloss
/// curve id for GPV.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValveSetting {
    Value(Real),
    Curve(String),
}

/// How a pump's operating point is specified.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PumpDrive {
    /// Head-flow curve id.
    Curve(String),
    /// Constant power.
    Power(Real),
    /// Neither given; the pump cannot operate.
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    pub length: Real,
    pub diameter: Real,
    pub roughness: Real,
    pub minor_loss: Real,
    pub status: PipeStatus,
}

impl Pipe {
    pub fn new(
        id: impl Into<String>,
        from_node: impl Into<String>,
        to_node: impl Into<String>,
        length: Real,
        diameter: Real,
        roughness: Real,
    ) -> Result<Self, ValidationError> {
        let pipe = Self {
            id: id.into(),
            from_node: from_node.into(),
            to_node: to_node.into(),
            length,
            diameter,
            roughness,
            minor_loss: 0.0,
            status: PipeStatus::Open,
        };
        pipe.validate()?;
        Ok(pipe)
    }

    pub fn with_minor_loss(mut self, minor_loss: Real) -> Result<Self, ValidationError> {
        self.minor_loss = minor_loss;
        self.validate()?;
        Ok(self)
    }

    pub fn with_status(mut self, status: PipeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_endpoints(&self.id, &self.from_node, &self.to_node)?;
        check_positive(&self.id, "length", self.length)?;
        check_positive(&self.id, "diameter", self.diameter)?;
        check_positive(&self.id, "roughness", self.roughness)?;
        check_non_negative(&self.id, "minor_loss", self.minor_loss)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pump {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    pub drive: PumpDrive,
    pub speed: Real,
    pub pattern: Option<String>,
}

impl Pump {
    pub fn new(
        id: impl Into<String>,
        from_node: impl Into<String>,
        to_node: impl Into<String>,
        drive: PumpDrive,
    ) -> Result<Self, ValidationError> {
        let pump = Self {
            id: id.into(),
            from_node: from_node.into(),
            to_node: to_node.into(),
            drive,
            speed: 1.0,
            pattern: None,
        };
        pump.validate()?;
        Ok(pump)
    }

    pub fn with_speed(mut self, speed: Real) -> Result<Self, ValidationError> {
        self.speed = speed;
        self.validate()?;
        Ok(self)
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn pump_curve(&self) -> Option<&str> {
        match &self.drive {
            PumpDrive::Curve(id) => Some(id),
            _ => None,
        }
    }

    pub fn power(&self) -> Option<Real> {
        match self.drive {
            PumpDrive::Power(p) => Some(p),
            _ => None,
        }
    }

    /// False when neither a curve nor a power is given.
    pub fn is_usable(&self) -> bool {
        !matches!(self.drive, PumpDrive::Unspecified)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_endpoints(&self.id, &self.from_node, &self.to_node)?;
        if let PumpDrive::Power(p) = self.drive {
            check_positive(&self.id, "power", p)?;
        }
        check_non_negative(&self.id, "speed", self.speed)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valve {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
    pub diameter: Real,
    pub valve_type: ValveType,
    pub setting: ValveSetting,
    pub minor_loss: Real,
}

impl Valve {
    pub fn new(
        id: impl Into<String>,
        from_node: impl Into<String>,
        to_node: impl Into<String>,
        diameter: Real,
        valve_type: ValveType,
        setting: ValveSetting,
    ) -> Result<Self, ValidationError> {
        let valve = Self {
            id: id.into(),
            from_node: from_node.into(),
            to_node: to_node.into(),
            diameter,
            valve_type,
            setting,
            minor_loss: 0.0,
        };
        valve.validate()?;
        Ok(valve)
    }

    pub fn with_minor_loss(mut self, minor_loss: Real) -> Result<Self, ValidationError> {
        self.minor_loss = minor_loss;
        self.validate()?;
        Ok(self)
    }

    /// Headloss curve id of a GPV.
    pub fn headloss_curve(&self) -> Option<&str> {
        match &self.setting {
            ValveSetting::Curve(id) => Some(id),
            ValveSetting::Value(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_endpoints(&self.id, &self.from_node, &self.to_node)?;
        check_positive(&self.id, "diameter", self.diameter)?;
        check_non_negative(&self.id, "minor_loss", self.minor_loss)?;
        match (&self.valve_type, &self.setting) {
            (ValveType::Gpv, ValveSetting::Curve(curve)) => check_id(curve),
            (ValveType::Gpv, ValveSetting::Value(_)) => Err(ValidationError::inconsistent(
                &self.id,
                "GPV setting must name a headloss curve",
            )),
            (_, ValveSetting::Value(v)) => check_finite(&self.id, "setting", *v).map(|_| ()),
            (_, ValveSetting::Curve(_)) => Err(ValidationError::inconsistent(
                &self.id,
                "only GPV settings may name a curve",
            )),
        }
    }
}

fn check_endpoints(id: &str, from_node: &str, to_node: &str) -> Result<(), ValidationError> {
    check_id(id)?;
    check_id(from_node)?;
    check_id(to_node)?;
    if from_node == to_node {
        return Err(ValidationError::inconsistent(
            id,
            format!("link connects node '{from_node}' to itself"),
        ));
    }
    Ok(())
}

/// Owned link of any type.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Pipe(Pipe),
    Pump(Pump),
    Valve(Valve),
}

/// Borrowed link of any type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRef<'a> {
    Pipe(&'a Pipe),
    Pump(&'a Pump),
    Valve(&'a Valve),
}

impl Link {
    pub fn id(&self) -> &str {
        self.as_link_ref().id()
    }

    pub fn as_link_ref(&self) -> LinkRef<'_> {
        match self {
            Link::Pipe(p) => LinkRef::Pipe(p),
            Link::Pump(p) => LinkRef::Pump(p),
            Link::Valve(v) => LinkRef::Valve(v),
        }
    }
}

impl<'a> LinkRef<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            LinkRef::Pipe(p) => &p.id,
            LinkRef::Pump(p) => &p.id,
            LinkRef::Valve(v) => &v.id,
        }
    }

    pub fn link_type(&self) -> LinkType {
        match self {
            LinkRef::Pipe(_) => LinkType::Pipe,
            LinkRef::Pump(_) => LinkType::Pump,
            LinkRef::Valve(_) => LinkType::Valve,
        }
    }

    /// `(from_node, to_node)`
    pub fn endpoints(&self) -> (&'a str, &'a str) {
        match *self {
            LinkRef::Pipe(p) => (&p.from_node, &p.to_node),
            LinkRef::Pump(p) => (&p.from_node, &p.to_node),
            LinkRef::Valve(v) => (&v.from_node, &v.to_node),
        }
    }
}

impl Serialize for Pipe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Pipe", 9)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &LinkType::Pipe)?;
        s.serialize_field("from_node", &self.from_node)?;
        s.serialize_field("to_node", &self.to_node)?;
        s.serialize_field("length", &self.length)?;
        s.serialize_field("diameter", &self.diameter)?;
        s.serialize_field("roughness", &self.roughness)?;
        s.serialize_field("minor_loss", &self.minor_loss)?;
        s.serialize_field("status", &self.status)?;
        s.end()
    }
}

impl Serialize for Pump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Pump", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &LinkType::Pump)?;
        s.serialize_field("from_node", &self.from_node)?;
        s.serialize_field("to_node", &self.to_node)?;
        s.serialize_field("pump_curve", &self.pump_curve())?;
        s.serialize_field("power", &self.power())?;
        s.serialize_field("speed", &self.speed)?;
        s.serialize_field("pattern", &self.pattern)?;
        s.end()
    }
}

impl Serialize for Valve {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Valve", 8)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &LinkType::Valve)?;
        s.serialize_field("from_node", &self.from_node)?;
        s.serialize_field("to_node", &self.to_node)?;
        s.serialize_field("diameter", &self.diameter)?;
        s.serialize_field("valve_type", &self.valve_type)?;
        s.serialize_field("setting", &self.setting)?;
        s.serialize_field("minor_loss", &self.minor_loss)?;
        s.end()
    }
}
