//! Network-wide hydraulic options.

use hn_core::{Real, ValidationError, check_non_negative, check_positive};
use serde::{Deserialize, Serialize};

/// Head loss formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadlossFormula {
    /// Hazen-Williams
    #[default]
    #[serde(rename = "H-W")]
    HazenWilliams,
    /// Darcy-Weisbach
    #[serde(rename = "D-W")]
    DarcyWeisbach,
    /// Chezy-Manning
    #[serde(rename = "C-M")]
    ChezyManning,
}

impl HeadlossFormula {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "H-W" => Some(HeadlossFormula::HazenWilliams),
            "D-W" => Some(HeadlossFormula::DarcyWeisbach),
            "C-M" => Some(HeadlossFormula::ChezyManning),
            _ => None,
        }
    }
}

/// Flow units; they also fix the unit system of every other quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlowUnits {
    Cfs,
    #[default]
    Gpm,
    Mgd,
    Imgd,
    Afd,
    Lps,
    Lpm,
    Mld,
    Cms,
    Cmh,
    Cmd,
}

impl FlowUnits {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "CFS" => Some(FlowUnits::Cfs),
            "GPM" => Some(FlowUnits::Gpm),
            "MGD" => Some(FlowUnits::Mgd),
            "IMGD" => Some(FlowUnits::Imgd),
            "AFD" => Some(FlowUnits::Afd),
            "LPS" => Some(FlowUnits::Lps),
            "LPM" => Some(FlowUnits::Lpm),
            "MLD" => Some(FlowUnits::Mld),
            "CMS" => Some(FlowUnits::Cms),
            "CMH" => Some(FlowUnits::Cmh),
            "CMD" => Some(FlowUnits::Cmd),
            _ => None,
        }
    }

    pub fn unit_system(self) -> UnitSystem {
        match self {
            FlowUnits::Cfs | FlowUnits::Gpm | FlowUnits::Mgd | FlowUnits::Imgd | FlowUnits::Afd => {
                UnitSystem::Us
            }
            FlowUnits::Lps
            | FlowUnits::Lpm
            | FlowUnits::Mld
            | FlowUnits::Cms
            | FlowUnits::Cmh
            | FlowUnits::Cmd => UnitSystem::Si,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Us,
    Si,
}

impl UnitSystem {
    pub fn default_pressure(self) -> PressureUnits {
        match self {
            UnitSystem::Us => PressureUnits::Psi,
            UnitSystem::Si => PressureUnits::Meters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PressureUnits {
    #[default]
    Psi,
    Kpa,
    Meters,
    Bar,
    Feet,
}

impl PressureUnits {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "PSI" => Some(PressureUnits::Psi),
            "KPA" => Some(PressureUnits::Kpa),
            "METERS" => Some(PressureUnits::Meters),
            "BAR" => Some(PressureUnits::Bar),
            "FEET" => Some(PressureUnits::Feet),
            _ => None,
        }
    }
}

/// Demand-driven or pressure-driven demand model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DemandModel {
    #[default]
    Dda,
    Pda,
}

impl DemandModel {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "DDA" => Some(DemandModel::Dda),
            "PDA" => Some(DemandModel::Pda),
            _ => None,
        }
    }
}

/// Options that apply to the whole network. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkOptions {
    pub headloss: HeadlossFormula,
    pub units: FlowUnits,
    pub pressure: PressureUnits,
    /// Default demand pattern id.
    pub pattern: Option<String>,
    pub hydraulic_timestep: Real,
    pub quality_timestep: Real,
    pub duration: Real,
    pub demand_model: DemandModel,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            headloss: HeadlossFormula::default(),
            units: FlowUnits::default(),
            pressure: PressureUnits::default(),
            pattern: None,
            hydraulic_timestep: 3600.0,
            quality_timestep: 300.0,
            duration: 0.0,
            demand_model: DemandModel::default(),
        }
    }
}

impl NetworkOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("options", "hydraulic_timestep", self.hydraulic_timestep)?;
        check_non_negative("options", "quality_timestep", self.quality_timestep)?;
        check_non_negative("options", "duration", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let opts = NetworkOptions::default();
        opts.validate().unwrap();
        assert_eq!(opts.headloss, HeadlossFormula::HazenWilliams);
        assert_eq!(opts.units, FlowUnits::Gpm);
        assert_eq!(opts.pressure, PressureUnits::Psi);
    }

    #[test]
    fn timestep_rules() {
        let opts = NetworkOptions {
            hydraulic_timestep: 0.0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
        let opts = NetworkOptions {
            quality_timestep: 0.0,
            duration: -1.0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn flow_units_pick_unit_system() {
        assert_eq!(FlowUnits::from_keyword("lps").unwrap().unit_system(), UnitSystem::Si);
        assert_eq!(FlowUnits::Mgd.unit_system(), UnitSystem::Us);
        assert_eq!(UnitSystem::Si.default_pressure(), PressureUnits::Meters);
    }

    #[test]
    fn serializes_keywords() {
        let v = serde_json::to_value(NetworkOptions::default()).unwrap();
        assert_eq!(v["headloss"], "H-W");
        assert_eq!(v["units"], "GPM");
        assert_eq!(v["pressure"], "PSI");
        assert!(v["pattern"].is_null());
        assert_eq!(v["demand_model"], "DDA");
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "headloss",
                "units",
                "pressure",
                "pattern",
                "hydraulic_timestep",
                "quality_timestep",
                "duration",
                "demand_model"
            ]
        );
    }
}
