//! Record layouts of the element and data sections.

use hn_core::{HnResult, Real, ValidationError};
use hn_network::{
    Coordinate, CurvePoint, Junction, Pipe, PipeStatus, Pump, PumpDrive, Reservoir, Tank,
    TankLevels, Valve, ValveSetting, ValveType,
};

use crate::fields::Fields;
use crate::section::Record;

/// `id elev [demand [pattern]]`
pub(crate) fn junction(rec: &Record<'_>) -> HnResult<Junction> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let elevation = f.real("elevation")?;
    let demand = f.opt_real("demand")?.unwrap_or(0.0);
    let pattern = f.opt_text();
    f.finish()?;

    let junction = Junction::new(id, elevation, demand)?;
    Ok(match pattern {
        Some(p) => junction.with_pattern(p),
        None => junction,
    })
}

/// `id head [pattern]`
pub(crate) fn reservoir(rec: &Record<'_>) -> HnResult<Reservoir> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let head = f.real("head")?;
    let pattern = f.opt_text();
    f.finish()?;

    let reservoir = Reservoir::new(id, head)?;
    Ok(match pattern {
        Some(p) => reservoir.with_pattern(p),
        None => reservoir,
    })
}

/// `id elev init min max diam [minvol [volcurve [overflow]]]`
pub(crate) fn tank(rec: &Record<'_>) -> HnResult<Tank> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let elevation = f.real("elevation")?;
    let levels = TankLevels {
        init: f.real("init_level")?,
        min: f.real("min_level")?,
        max: f.real("max_level")?,
    };
    let diameter = f.real("diameter")?;
    let min_volume = f.opt_real("min_volume")?;
    let volume_curve = f.opt_text().filter(|c| *c != "*");
    if let Some(overflow) = f.opt_text() {
        if !matches!(overflow.to_ascii_uppercase().as_str(), "YES" | "NO") {
            return Err(f.invalid("overflow", overflow).into());
        }
    }
    f.finish()?;

    let tank = Tank::new(id, elevation, levels, diameter, volume_curve.map(str::to_string))?;
    Ok(match min_volume {
        Some(v) => tank.with_min_volume(v)?,
        None => tank,
    })
}

/// `id n1 n2 length diam rough [minorloss [status]]`
pub(crate) fn pipe(rec: &Record<'_>) -> HnResult<Pipe> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let from = f.text("node1")?;
    let to = f.text("node2")?;
    let length = f.real("length")?;
    let diameter = f.real("diameter")?;
    let roughness = f.real("roughness")?;
    let minor_loss = f.opt_real("minor_loss")?;
    let status = match f.opt_text() {
        Some(word) => Some(PipeStatus::from_keyword(word).ok_or_else(|| f.invalid("status", word))?),
        None => None,
    };
    f.finish()?;

    let mut pipe = Pipe::new(id, from, to, length, diameter, roughness)?;
    if let Some(k) = minor_loss {
        pipe = pipe.with_minor_loss(k)?;
    }
    if let Some(status) = status {
        pipe = pipe.with_status(status);
    }
    Ok(pipe)
}

/// `id n1 n2` followed by `HEAD curve`, `POWER kw`, `SPEED s` and
/// `PATTERN pat` pairs in any order.
pub(crate) fn pump(rec: &Record<'_>) -> HnResult<Pump> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let from = f.text("node1")?;
    let to = f.text("node2")?;

    let mut curve = None;
    let mut power = None;
    let mut speed = None;
    let mut pattern = None;
    while let Some(keyword) = f.opt_text() {
        match keyword.to_ascii_uppercase().as_str() {
            "HEAD" => curve = Some(f.text("head curve")?),
            "POWER" => power = Some(f.real("power")?),
            "SPEED" => speed = Some(f.real("speed")?),
            "PATTERN" => pattern = Some(f.text("pattern")?),
            _ => return Err(f.invalid("pump keyword", keyword).into()),
        }
    }

    let drive = match (curve, power) {
        (Some(_), Some(_)) => {
            return Err(ValidationError::inconsistent(
                id,
                "pump has both a HEAD curve and a POWER rating",
            )
            .into());
        }
        (Some(c), None) => PumpDrive::Curve(c.to_string()),
        (None, Some(p)) => PumpDrive::Power(p),
        (None, None) => PumpDrive::Unspecified,
    };

    let mut pump = Pump::new(id, from, to, drive)?;
    if let Some(s) = speed {
        pump = pump.with_speed(s)?;
    }
    if let Some(p) = pattern {
        pump = pump.with_pattern(p);
    }
    Ok(pump)
}

/// `id n1 n2 diam type setting [minorloss]`; a GPV setting is a curve id.
pub(crate) fn valve(rec: &Record<'_>) -> HnResult<Valve> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let from = f.text("node1")?;
    let to = f.text("node2")?;
    let diameter = f.real("diameter")?;
    let type_word = f.text("valve type")?;
    let valve_type =
        ValveType::from_keyword(type_word).ok_or_else(|| f.invalid("valve type", type_word))?;
    let setting_token = f.text("setting")?;
    let setting = match valve_type {
        ValveType::Gpv => ValveSetting::Curve(setting_token.to_string()),
        _ => ValveSetting::Value(f.number("setting", setting_token)?),
    };
    let minor_loss = f.opt_real("minor_loss")?;
    f.finish()?;

    let valve = Valve::new(id, from, to, diameter, valve_type, setting)?;
    Ok(match minor_loss {
        Some(k) => valve.with_minor_loss(k)?,
        None => valve,
    })
}

/// `id m1 m2 ...`
pub(crate) fn pattern_row<'a>(rec: &Record<'a>) -> HnResult<(&'a str, Vec<Real>)> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let first = f.real("multiplier")?;
    let mut multipliers = vec![first];
    multipliers.extend(f.rest_reals("multiplier")?);
    Ok((id, multipliers))
}

/// `id x y`
pub(crate) fn curve_point<'a>(rec: &Record<'a>) -> HnResult<(&'a str, CurvePoint)> {
    let mut f = Fields::new(rec);
    let id = f.text("id")?;
    let x = f.real("x")?;
    let y = f.real("y")?;
    f.finish()?;
    Ok((id, CurvePoint { x, y }))
}

/// `node x y`
pub(crate) fn coordinate<'a>(rec: &Record<'a>) -> HnResult<(&'a str, Coordinate)> {
    let mut f = Fields::new(rec);
    let id = f.text("node")?;
    let x = f.real("x")?;
    let y = f.real("y")?;
    f.finish()?;
    Ok((id, Coordinate::new(x, y)))
}

pub(crate) struct DemandRow<'a> {
    pub junction: &'a str,
    pub demand: Real,
    pub pattern: Option<&'a str>,
}

/// `junction demand [pattern]`
pub(crate) fn demand<'a>(rec: &Record<'a>) -> HnResult<DemandRow<'a>> {
    let mut f = Fields::new(rec);
    let junction = f.text("junction")?;
    let demand = f.real("demand")?;
    let pattern = f.opt_text();
    f.finish()?;
    Ok(DemandRow {
        junction,
        demand,
        pattern,
    })
}

/// Link status or setting override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StatusValue {
    Open,
    Closed,
    Active,
    Setting(Real),
}

/// `link value`
pub(crate) fn status<'a>(rec: &Record<'a>) -> HnResult<(&'a str, StatusValue)> {
    let mut f = Fields::new(rec);
    let link = f.text("link")?;
    let word = f.text("status")?;
    let value = match word.to_ascii_uppercase().as_str() {
        "OPEN" => StatusValue::Open,
        "CLOSED" => StatusValue::Closed,
        "ACTIVE" => StatusValue::Active,
        _ => StatusValue::Setting(f.number("status", word)?),
    };
    f.finish()?;
    Ok((link, value))
}
