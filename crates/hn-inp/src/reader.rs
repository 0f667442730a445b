//! Multi-pass assembly of a `WaterNetwork` from lexed records.
//!
//! 1. Collect every node and link id into one table so records may refer
//!    to elements declared further down the file.
//! 2. Build typed elements, patterns, curves and options.
//! 3. Apply `[DEMANDS]`, `[STATUS]` and `[COORDINATES]` overrides.
//! 4. Infer the purpose of unlabelled curves from their users.
//! 5. Hand everything to the network and validate cross references.
//!
//! Nothing escapes unless every pass succeeds.

use std::collections::{HashMap, HashSet};

use hn_core::{
    ElementKind, FormatError, HnError, HnResult, LinkType, NodeType, Real, RefKind,
    ReferenceError, ValidationError,
};
use hn_network::{
    Curve, CurvePoint, CurveType, Junction, Pattern, Pipe, PipeStatus, Pump, Reservoir, Tank,
    Valve, ValveSetting, WaterNetwork,
};

use crate::records::{self, StatusValue};
use crate::section::{Record, Section, lex};
use crate::settings::Settings;
use crate::{InvalidRecordPolicy, ParseOptions, ParseOutcome};

pub(crate) fn parse(text: &str, options: &ParseOptions) -> HnResult<ParseOutcome> {
    let lines = lex(text)?;
    let mut builder = Builder::new(options.invalid_records);
    builder.collect_ids(&lines)?;
    builder.build_elements(&lines)?;
    builder.apply_overrides(&lines)?;
    builder.infer_curve_types()?;
    builder.finish()
}

struct CurveDraft<'a> {
    id: &'a str,
    label: Option<CurveType>,
    points: Vec<CurvePoint>,
}

struct Builder<'a> {
    policy: InvalidRecordPolicy,
    skipped: Vec<ValidationError>,

    kinds: HashMap<&'a str, ElementKind>,
    /// Lines whose element record was dropped under the skip policy.
    excluded_lines: HashSet<usize>,
    /// Ids of dropped elements; overrides aimed at them are dropped too.
    dropped: HashSet<&'a str>,

    title: Vec<&'a str>,
    junctions: Vec<Junction>,
    reservoirs: Vec<Reservoir>,
    tanks: Vec<Tank>,
    pipes: Vec<Pipe>,
    pumps: Vec<Pump>,
    valves: Vec<Valve>,
    patterns: Vec<(&'a str, Vec<Real>)>,
    curves: Vec<CurveDraft<'a>>,
    settings: Settings,
}

impl<'a> Builder<'a> {
    fn new(policy: InvalidRecordPolicy) -> Self {
        Self {
            policy,
            skipped: Vec::new(),
            kinds: HashMap::new(),
            excluded_lines: HashSet::new(),
            dropped: HashSet::new(),
            title: Vec::new(),
            junctions: Vec::new(),
            reservoirs: Vec::new(),
            tanks: Vec::new(),
            pipes: Vec::new(),
            pumps: Vec::new(),
            valves: Vec::new(),
            patterns: Vec::new(),
            curves: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Route a construction result through the invalid-record policy.
    /// Only validation failures can be skipped.
    fn admit<T>(&mut self, built: HnResult<T>) -> HnResult<Option<T>> {
        match built {
            Ok(value) => Ok(Some(value)),
            Err(HnError::Validation(err)) if self.policy == InvalidRecordPolicy::Skip => {
                self.skipped.push(err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    // ---- pass 1 -------------------------------------------------------

    fn collect_ids(&mut self, lines: &[Record<'a>]) -> HnResult<()> {
        for rec in lines.iter().filter(|r| r.section.declares_element()) {
            let id = rec.tokens[0];
            let kind = element_kind(rec.section);
            let claim: HnResult<()> = if self.kinds.contains_key(id) {
                Err(ValidationError::DuplicateId {
                    id: id.to_string(),
                    context: "nodes and links",
                }
                .into())
            } else {
                Ok(())
            };
            match self.admit(claim)? {
                Some(()) => {
                    self.kinds.insert(id, kind);
                }
                None => {
                    self.excluded_lines.insert(rec.line);
                }
            }
        }
        Ok(())
    }

    // ---- pass 2 -------------------------------------------------------

    fn build_elements(&mut self, lines: &[Record<'a>]) -> HnResult<()> {
        let mut pattern_index: HashMap<&'a str, usize> = HashMap::new();
        let mut curve_index: HashMap<&'a str, usize> = HashMap::new();

        for rec in lines {
            if self.excluded_lines.contains(&rec.line) {
                continue;
            }
            match rec.section {
                Section::Title => self.title.push(rec.text),
                Section::Junctions => {
                    let built = records::junction(rec);
                    if let Some(j) = self.admit_element(rec, built)? {
                        self.junctions.push(j);
                    }
                }
                Section::Reservoirs => {
                    let built = records::reservoir(rec);
                    if let Some(r) = self.admit_element(rec, built)? {
                        self.reservoirs.push(r);
                    }
                }
                Section::Tanks => {
                    let built = records::tank(rec);
                    if let Some(t) = self.admit_element(rec, built)? {
                        self.tanks.push(t);
                    }
                }
                Section::Pipes => {
                    let built = records::pipe(rec);
                    if let Some(p) = self.admit_element(rec, built)? {
                        self.pipes.push(p);
                    }
                }
                Section::Pumps => {
                    let built = records::pump(rec);
                    if let Some(p) = self.admit_element(rec, built)? {
                        self.pumps.push(p);
                    }
                }
                Section::Valves => {
                    let built = records::valve(rec);
                    if let Some(v) = self.admit_element(rec, built)? {
                        self.valves.push(v);
                    }
                }
                Section::Patterns => {
                    let (id, multipliers) = records::pattern_row(rec)?;
                    match pattern_index.get(id) {
                        Some(&i) => self.patterns[i].1.extend(multipliers),
                        None => {
                            pattern_index.insert(id, self.patterns.len());
                            self.patterns.push((id, multipliers));
                        }
                    }
                }
                Section::Curves => {
                    let (id, point) = records::curve_point(rec)?;
                    match curve_index.get(id) {
                        Some(&i) => self.curves[i].points.push(point),
                        None => {
                            curve_index.insert(id, self.curves.len());
                            self.curves.push(CurveDraft {
                                id,
                                label: rec.label,
                                points: vec![point],
                            });
                        }
                    }
                }
                Section::Options => self.settings.apply_option(rec)?,
                Section::Times => self.settings.apply_time(rec)?,
                Section::Coordinates | Section::Demands | Section::Status => {}
            }
        }
        Ok(())
    }

    fn admit_element<T>(&mut self, rec: &Record<'a>, built: HnResult<T>) -> HnResult<Option<T>> {
        let admitted = self.admit(built)?;
        if admitted.is_none() {
            self.dropped.insert(rec.tokens[0]);
        }
        Ok(admitted)
    }

    // ---- pass 3 -------------------------------------------------------

    fn apply_overrides(&mut self, lines: &[Record<'a>]) -> HnResult<()> {
        let mut demanded: HashSet<&'a str> = HashSet::new();

        for rec in lines {
            match rec.section {
                Section::Demands => {
                    let row = records::demand(rec)?;
                    if self.dropped.contains(row.junction) || !demanded.insert(row.junction) {
                        // Later rows add demand categories, which are not modelled.
                        continue;
                    }
                    let referrer = section_referrer(rec);
                    let Some(junction) = self.junctions.iter_mut().find(|j| j.id == row.junction)
                    else {
                        return Err(
                            ReferenceError::new(referrer, row.junction, RefKind::Junction).into(),
                        );
                    };
                    junction.demand = row.demand;
                    junction.demand_pattern = row.pattern.map(str::to_string);
                }
                Section::Status => {
                    let (link, value) = records::status(rec)?;
                    if self.dropped.contains(link) {
                        continue;
                    }
                    let checked = self.apply_status(rec, link, value);
                    self.admit(checked)?;
                }
                Section::Coordinates => {
                    let (node, xy) = records::coordinate(rec)?;
                    if self.dropped.contains(node) {
                        continue;
                    }
                    let missing = || ReferenceError::new(section_referrer(rec), node, RefKind::Node);
                    let slot = match self.kinds.get(node) {
                        Some(ElementKind::Node(NodeType::Junction)) => self
                            .junctions
                            .iter_mut()
                            .find(|j| j.id == node)
                            .map(|j| &mut j.coordinates),
                        Some(ElementKind::Node(NodeType::Reservoir)) => self
                            .reservoirs
                            .iter_mut()
                            .find(|r| r.id == node)
                            .map(|r| &mut r.coordinates),
                        Some(ElementKind::Node(NodeType::Tank)) => self
                            .tanks
                            .iter_mut()
                            .find(|t| t.id == node)
                            .map(|t| &mut t.coordinates),
                        Some(ElementKind::Link(_)) | None => None,
                    };
                    *slot.ok_or_else(missing)? = Some(xy);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_status(&mut self, rec: &Record<'a>, link: &'a str, value: StatusValue) -> HnResult<()> {
        let missing = || ReferenceError::new(section_referrer(rec), link, RefKind::Link);
        let invalid = |token: String| FormatError::InvalidToken {
            section: rec.section.name(),
            line: rec.line,
            field: "status",
            token,
        };
        match self.kinds.get(link) {
            Some(ElementKind::Link(LinkType::Pipe)) => {
                let pipe = self.pipes.iter_mut().find(|p| p.id == link).ok_or_else(missing)?;
                pipe.status = match value {
                    StatusValue::Open => PipeStatus::Open,
                    StatusValue::Closed => PipeStatus::Closed,
                    other => return Err(invalid(status_token(other)).into()),
                };
            }
            Some(ElementKind::Link(LinkType::Pump)) => match value {
                StatusValue::Open | StatusValue::Closed => {}
                // A number is a relative speed setting.
                StatusValue::Setting(speed) => {
                    let pump = self.pumps.iter_mut().find(|p| p.id == link).ok_or_else(missing)?;
                    *pump = pump.clone().with_speed(speed)?;
                }
                StatusValue::Active => return Err(invalid(status_token(value)).into()),
            },
            Some(ElementKind::Link(LinkType::Valve)) => {
                let valve = self.valves.iter_mut().find(|v| v.id == link).ok_or_else(missing)?;
                if let StatusValue::Setting(setting) = value {
                    if valve.headloss_curve().is_some() {
                        return Err(invalid(status_token(value)).into());
                    }
                    valve.setting = ValveSetting::Value(setting);
                    valve.validate()?;
                }
            }
            Some(ElementKind::Node(_)) | None => return Err(missing().into()),
        }
        Ok(())
    }

    // ---- pass 4 -------------------------------------------------------

    fn infer_curve_types(&mut self) -> HnResult<()> {
        let mut uses: HashMap<&str, (CurveType, String)> = HashMap::new();
        let users = self
            .pumps
            .iter()
            .filter_map(|p| Some((p.pump_curve()?, CurveType::Pump, p.id.as_str())))
            .chain(
                self.tanks
                    .iter()
                    .filter_map(|t| Some((t.volume_curve.as_deref()?, CurveType::Volume, t.id.as_str()))),
            )
            .chain(
                self.valves
                    .iter()
                    .filter_map(|v| Some((v.headloss_curve()?, CurveType::Headloss, v.id.as_str()))),
            );

        for (curve, purpose, user) in users {
            match uses.get(curve) {
                Some((seen, first_user)) if *seen != purpose => {
                    return Err(ValidationError::inconsistent(
                        curve,
                        format!(
                            "curve used as a {} curve by '{}' and as a {} curve by '{}'",
                            seen.as_str(),
                            first_user,
                            purpose.as_str(),
                            user
                        ),
                    )
                    .into());
                }
                Some(_) => {}
                None => {
                    uses.insert(curve, (purpose, user.to_string()));
                }
            }
        }

        for draft in &mut self.curves {
            if draft.label.is_none() {
                draft.label = uses.get(draft.id).map(|(purpose, _)| *purpose);
            }
        }
        Ok(())
    }

    // ---- pass 5 -------------------------------------------------------

    fn finish(mut self) -> HnResult<ParseOutcome> {
        let mut net = WaterNetwork::new(self.title.join("\n"));

        for (id, multipliers) in std::mem::take(&mut self.patterns) {
            let added = Pattern::new(id, multipliers).and_then(|p| net.add_pattern(p));
            self.admit(added.map_err(HnError::from))?;
        }
        for draft in std::mem::take(&mut self.curves) {
            let curve_type = draft.label.unwrap_or_default();
            let added = Curve::new(draft.id, curve_type, draft.points).and_then(|c| net.add_curve(c));
            self.admit(added.map_err(HnError::from))?;
        }

        for j in std::mem::take(&mut self.junctions) {
            net.add_junction(j)?;
        }
        for r in std::mem::take(&mut self.reservoirs) {
            net.add_reservoir(r)?;
        }
        for t in std::mem::take(&mut self.tanks) {
            net.add_tank(t)?;
        }
        for p in std::mem::take(&mut self.pipes) {
            net.add_pipe(p)?;
        }
        for p in std::mem::take(&mut self.pumps) {
            net.add_pump(p)?;
        }
        for v in std::mem::take(&mut self.valves) {
            net.add_valve(v)?;
        }
        net.set_options(self.settings.finish());

        net.validate()?;
        Ok(ParseOutcome {
            network: net,
            skipped: self.skipped,
        })
    }
}

fn element_kind(section: Section) -> ElementKind {
    match section {
        Section::Junctions => ElementKind::JUNCTION,
        Section::Reservoirs => ElementKind::RESERVOIR,
        Section::Tanks => ElementKind::TANK,
        Section::Pipes => ElementKind::PIPE,
        Section::Pumps => ElementKind::PUMP,
        _ => ElementKind::VALVE,
    }
}

fn section_referrer(rec: &Record<'_>) -> String {
    format!("[{}] line {}", rec.section.name(), rec.line)
}

fn status_token(value: StatusValue) -> String {
    match value {
        StatusValue::Open => "OPEN".to_string(),
        StatusValue::Closed => "CLOSED".to_string(),
        StatusValue::Active => "ACTIVE".to_string(),
        StatusValue::Setting(v) => v.to_string(),
    }
}
