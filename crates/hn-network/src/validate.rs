//! Whole-network validation.

use std::collections::{HashMap, HashSet};

use hn_core::{ElementKind, HnResult, RefKind, ReferenceError, ValidationError};

use crate::curve::CurveType;
use crate::network::WaterNetwork;

pub(crate) fn validate_network(net: &WaterNetwork) -> HnResult<()> {
    let kinds = validate_elements(net)?;

    let pattern_ids = unique_ids(net.patterns().iter().map(|p| p.id.as_str()), "patterns")?;
    let curve_types = {
        let mut map = HashMap::new();
        for curve in net.curves() {
            if map.insert(curve.id.as_str(), curve.curve_type).is_some() {
                return Err(ValidationError::DuplicateId {
                    id: curve.id.clone(),
                    context: "curves",
                }
                .into());
            }
        }
        map
    };

    for link in net.links() {
        let (from, to) = link.endpoints();
        for end in [from, to] {
            match kinds.get(end) {
                Some(kind) if kind.is_node() => {}
                _ => return Err(ReferenceError::new(link.id(), end, RefKind::Node).into()),
            }
        }
    }

    let check_pattern = |referrer: &str, pattern: Option<&String>| -> HnResult<()> {
        match pattern {
            Some(p) if !pattern_ids.contains(p.as_str()) => {
                Err(ReferenceError::new(referrer, p.as_str(), RefKind::Pattern).into())
            }
            _ => Ok(()),
        }
    };
    for j in net.junctions() {
        check_pattern(&j.id, j.demand_pattern.as_ref())?;
    }
    for r in net.reservoirs() {
        check_pattern(&r.id, r.head_pattern.as_ref())?;
    }
    for p in net.pumps() {
        check_pattern(&p.id, p.pattern.as_ref())?;
    }
    check_pattern("options", net.options().pattern.as_ref())?;

    let check_curve = |referrer: &str, curve: Option<&str>, expected: CurveType| -> HnResult<()> {
        let Some(id) = curve else {
            return Ok(());
        };
        match curve_types.get(id) {
            None => Err(ReferenceError::new(referrer, id, RefKind::Curve).into()),
            Some(&found) if found != expected && found != CurveType::Unknown => {
                Err(ValidationError::inconsistent(
                    referrer,
                    format!(
                        "curve '{id}' is a {} curve, expected {}",
                        found.as_str(),
                        expected.as_str()
                    ),
                )
                .into())
            }
            Some(_) => Ok(()),
        }
    };
    for t in net.tanks() {
        check_curve(&t.id, t.volume_curve.as_deref(), CurveType::Volume)?;
    }
    for p in net.pumps() {
        check_curve(&p.id, p.pump_curve(), CurveType::Pump)?;
    }
    for v in net.valves() {
        check_curve(&v.id, v.headloss_curve(), CurveType::Headloss)?;
    }

    Ok(())
}

/// Run each element's own rules and rebuild the node/link id table.
fn validate_elements(net: &WaterNetwork) -> HnResult<HashMap<&str, ElementKind>> {
    let mut entries: Vec<(&str, ElementKind)> = Vec::with_capacity(net.node_count() + net.link_count());
    for j in net.junctions() {
        j.validate()?;
        entries.push((j.id.as_str(), ElementKind::JUNCTION));
    }
    for r in net.reservoirs() {
        r.validate()?;
        entries.push((r.id.as_str(), ElementKind::RESERVOIR));
    }
    for t in net.tanks() {
        t.validate()?;
        entries.push((t.id.as_str(), ElementKind::TANK));
    }
    for p in net.pipes() {
        p.validate()?;
        entries.push((p.id.as_str(), ElementKind::PIPE));
    }
    for p in net.pumps() {
        p.validate()?;
        entries.push((p.id.as_str(), ElementKind::PUMP));
    }
    for v in net.valves() {
        v.validate()?;
        entries.push((v.id.as_str(), ElementKind::VALVE));
    }
    for p in net.patterns() {
        p.validate()?;
    }
    for c in net.curves() {
        c.validate()?;
    }
    net.options().validate()?;

    let mut table = HashMap::with_capacity(entries.len());
    for (id, kind) in entries {
        if table.insert(id, kind).is_some() {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: "nodes and links",
            }
            .into());
        }
    }
    Ok(table)
}

fn unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    context: &'static str,
) -> HnResult<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context,
            }
            .into());
        }
    }
    Ok(seen)
}
