//! `[OPTIONS]` and `[TIMES]` key/value lines.

use hn_core::{FormatError, as_seconds, parse_duration};
use hn_network::{DemandModel, FlowUnits, HeadlossFormula, NetworkOptions, PressureUnits};

use crate::fields::Fields;
use crate::section::Record;

/// Options collected so far. Keys not listed here are accepted and ignored.
#[derive(Debug, Default)]
pub(crate) struct Settings {
    options: NetworkOptions,
    units_set: bool,
    pressure_set: bool,
}

impl Settings {
    pub fn apply_option(&mut self, rec: &Record<'_>) -> Result<(), FormatError> {
        let mut f = Fields::new(rec);
        let key = f.text("option")?.to_ascii_uppercase();
        match key.as_str() {
            "UNITS" => {
                let word = f.text("units")?;
                self.options.units =
                    FlowUnits::from_keyword(word).ok_or_else(|| f.invalid("units", word))?;
                self.units_set = true;
            }
            "HEADLOSS" => {
                let word = f.text("headloss")?;
                self.options.headloss =
                    HeadlossFormula::from_keyword(word).ok_or_else(|| f.invalid("headloss", word))?;
            }
            "PRESSURE" => {
                let word = f.text("pressure")?;
                // PRESSURE EXPONENT belongs to the pressure-driven demand model.
                if word.eq_ignore_ascii_case("EXPONENT") {
                    return Ok(());
                }
                self.options.pressure =
                    PressureUnits::from_keyword(word).ok_or_else(|| f.invalid("pressure", word))?;
                self.pressure_set = true;
            }
            "PATTERN" => {
                self.options.pattern = Some(f.text("pattern")?.to_string());
            }
            "DEMAND" => {
                let second = f.text("option")?;
                if !second.eq_ignore_ascii_case("MODEL") {
                    return Ok(());
                }
                let word = f.text("demand model")?;
                self.options.demand_model =
                    DemandModel::from_keyword(word).ok_or_else(|| f.invalid("demand model", word))?;
            }
            _ => return Ok(()),
        }
        f.finish()
    }

    pub fn apply_time(&mut self, rec: &Record<'_>) -> Result<(), FormatError> {
        let mut f = Fields::new(rec);
        let key = f.text("time")?.to_ascii_uppercase();
        let (slot, field) = match key.as_str() {
            "DURATION" => (&mut self.options.duration, "duration"),
            "HYDRAULIC" | "QUALITY" => {
                let second = f.text("time")?;
                if !second.eq_ignore_ascii_case("TIMESTEP") {
                    return Ok(());
                }
                if key == "HYDRAULIC" {
                    (&mut self.options.hydraulic_timestep, "hydraulic timestep")
                } else {
                    (&mut self.options.quality_timestep, "quality timestep")
                }
            }
            _ => return Ok(()),
        };

        let value = f.text(field)?;
        let unit = f.opt_text();
        let time = parse_duration(value, unit).ok_or_else(|| match unit {
            Some(unit) => f.invalid(field, &format!("{value} {unit}")),
            None => f.invalid(field, value),
        })?;
        *slot = as_seconds(time);
        f.finish()
    }

    /// Final options. Pressure units follow the flow unit system unless
    /// they were given explicitly.
    pub fn finish(mut self) -> NetworkOptions {
        if self.units_set && !self.pressure_set {
            self.options.pressure = self.options.units.unit_system().default_pressure();
        }
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::lex;

    fn settle(text: &str) -> Result<NetworkOptions, FormatError> {
        let mut settings = Settings::default();
        for rec in lex(text)? {
            match rec.section {
                crate::section::Section::Options => settings.apply_option(&rec)?,
                _ => settings.apply_time(&rec)?,
            }
        }
        Ok(settings.finish())
    }

    #[test]
    fn unspecified_options_keep_defaults() {
        let opts = settle("[OPTIONS]\nTrials 40\nAccuracy 0.001\n").unwrap();
        assert_eq!(opts, NetworkOptions::default());
    }

    #[test]
    fn options_are_read() {
        let opts = settle(
            "[OPTIONS]\nUnits LPS\nHeadloss D-W\nPattern 1\nDemand Model PDA\nDemand Multiplier 1.0\nPressure Exponent 0.5\n",
        )
        .unwrap();
        assert_eq!(opts.units, FlowUnits::Lps);
        assert_eq!(opts.headloss, HeadlossFormula::DarcyWeisbach);
        assert_eq!(opts.pattern.as_deref(), Some("1"));
        assert_eq!(opts.demand_model, DemandModel::Pda);
        // SI flow units without an explicit pressure unit.
        assert_eq!(opts.pressure, PressureUnits::Meters);
    }

    #[test]
    fn explicit_pressure_wins() {
        let opts = settle("[OPTIONS]\nUNITS CMH\nPRESSURE KPA\n").unwrap();
        assert_eq!(opts.pressure, PressureUnits::Kpa);
    }

    #[test]
    fn bad_option_value_is_format_error() {
        let err = settle("[OPTIONS]\nUNITS FURLONGS\n").unwrap_err();
        assert!(matches!(err, FormatError::InvalidToken { field: "units", line: 2, .. }));
    }

    #[test]
    fn times_convert_to_seconds() {
        let opts = settle(
            "[TIMES]\nDuration 24:00\nHydraulic Timestep 30 MIN\nQuality Timestep 0:05\nPattern Timestep 2\nStart ClockTime 12 am\n",
        )
        .unwrap();
        assert_eq!(opts.duration, 86_400.0);
        assert_eq!(opts.hydraulic_timestep, 1800.0);
        assert_eq!(opts.quality_timestep, 300.0);
    }

    #[test]
    fn bare_numbers_are_hours() {
        let opts = settle("[TIMES]\nDURATION 72\nHYDRAULIC TIMESTEP 1:00:30\n").unwrap();
        assert_eq!(opts.duration, 72.0 * 3600.0);
        assert_eq!(opts.hydraulic_timestep, 3630.0);
    }

    #[test]
    fn bad_time_names_token() {
        let err = settle("[TIMES]\nDURATION 24 FORTNIGHTS\n").unwrap_err();
        assert!(
            matches!(err, FormatError::InvalidToken { section: "TIMES", ref token, .. } if token == "24 FORTNIGHTS")
        );
    }
}
