//! The `WaterNetwork` aggregate root.

use std::collections::{HashMap, HashSet};

use hn_core::{ElementKind, HnResult, LinkType, NodeType, ReferenceError, RefKind, ValidationError};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::curve::{Curve, Pattern};
use crate::link::{Link, LinkRef, Pipe, Pump, Valve};
use crate::node::{Coordinate, Junction, Node, NodeRef, Reservoir, Tank};
use crate::options::NetworkOptions;
use crate::validate;

/// Element counts, recomputed from the live collections on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Statistics {
    pub total_junctions: usize,
    pub total_reservoirs: usize,
    pub total_tanks: usize,
    pub total_pipes: usize,
    pub total_pumps: usize,
    pub total_valves: usize,
    pub total_nodes: usize,
    pub total_links: usize,
}

/// A complete network description.
///
/// The aggregate owns one ordered collection per element kind. Elements
/// enter and leave only through the named `add_*` / `remove_*` operations,
/// which keep the shared node/link id namespace and the pattern and curve
/// namespaces free of duplicates. Cross references are checked by
/// [`WaterNetwork::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterNetwork {
    title: String,
    junctions: Vec<Junction>,
    reservoirs: Vec<Reservoir>,
    tanks: Vec<Tank>,
    pipes: Vec<Pipe>,
    pumps: Vec<Pump>,
    valves: Vec<Valve>,
    patterns: Vec<Pattern>,
    curves: Vec<Curve>,
    options: NetworkOptions,

    /// Node and link ids share one namespace.
    element_ids: HashMap<String, ElementKind>,
    pattern_ids: HashSet<String>,
    curve_ids: HashSet<String>,
}

impl WaterNetwork {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn reservoirs(&self) -> &[Reservoir] {
        &self.reservoirs
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pumps(&self) -> &[Pump] {
        &self.pumps
    }

    pub fn valves(&self) -> &[Valve] {
        &self.valves
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut NetworkOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: NetworkOptions) {
        self.options = options;
    }

    // ---- mutation -------------------------------------------------------

    pub fn add_junction(&mut self, junction: Junction) -> Result<(), ValidationError> {
        junction.validate()?;
        self.claim_element_id(&junction.id, ElementKind::JUNCTION)?;
        self.junctions.push(junction);
        Ok(())
    }

    pub fn add_reservoir(&mut self, reservoir: Reservoir) -> Result<(), ValidationError> {
        reservoir.validate()?;
        self.claim_element_id(&reservoir.id, ElementKind::RESERVOIR)?;
        self.reservoirs.push(reservoir);
        Ok(())
    }

    pub fn add_tank(&mut self, tank: Tank) -> Result<(), ValidationError> {
        tank.validate()?;
        self.claim_element_id(&tank.id, ElementKind::TANK)?;
        self.tanks.push(tank);
        Ok(())
    }

    pub fn add_pipe(&mut self, pipe: Pipe) -> Result<(), ValidationError> {
        pipe.validate()?;
        self.claim_element_id(&pipe.id, ElementKind::PIPE)?;
        self.pipes.push(pipe);
        Ok(())
    }

    pub fn add_pump(&mut self, pump: Pump) -> Result<(), ValidationError> {
        pump.validate()?;
        self.claim_element_id(&pump.id, ElementKind::PUMP)?;
        self.pumps.push(pump);
        Ok(())
    }

    pub fn add_valve(&mut self, valve: Valve) -> Result<(), ValidationError> {
        valve.validate()?;
        self.claim_element_id(&valve.id, ElementKind::VALVE)?;
        self.valves.push(valve);
        Ok(())
    }

    pub fn add_pattern(&mut self, pattern: Pattern) -> Result<(), ValidationError> {
        pattern.validate()?;
        if !self.pattern_ids.insert(pattern.id.clone()) {
            return Err(ValidationError::DuplicateId {
                id: pattern.id,
                context: "patterns",
            });
        }
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn add_curve(&mut self, curve: Curve) -> Result<(), ValidationError> {
        curve.validate()?;
        if !self.curve_ids.insert(curve.id.clone()) {
            return Err(ValidationError::DuplicateId {
                id: curve.id,
                context: "curves",
            });
        }
        self.curves.push(curve);
        Ok(())
    }

    /// Remove a node by id. Links that still name it are left in place and
    /// will fail [`WaterNetwork::validate`] until they are removed too.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let kind = *self.element_ids.get(id)?;
        let removed = match kind {
            ElementKind::Node(NodeType::Junction) => {
                take_by_id(&mut self.junctions, id, |j| &j.id).map(Node::Junction)
            }
            ElementKind::Node(NodeType::Reservoir) => {
                take_by_id(&mut self.reservoirs, id, |r| &r.id).map(Node::Reservoir)
            }
            ElementKind::Node(NodeType::Tank) => {
                take_by_id(&mut self.tanks, id, |t| &t.id).map(Node::Tank)
            }
            ElementKind::Link(_) => return None,
        };
        self.element_ids.remove(id);
        removed
    }

    pub fn remove_link(&mut self, id: &str) -> Option<Link> {
        let kind = *self.element_ids.get(id)?;
        let removed = match kind {
            ElementKind::Link(LinkType::Pipe) => {
                take_by_id(&mut self.pipes, id, |p| &p.id).map(Link::Pipe)
            }
            ElementKind::Link(LinkType::Pump) => {
                take_by_id(&mut self.pumps, id, |p| &p.id).map(Link::Pump)
            }
            ElementKind::Link(LinkType::Valve) => {
                take_by_id(&mut self.valves, id, |v| &v.id).map(Link::Valve)
            }
            ElementKind::Node(_) => return None,
        };
        self.element_ids.remove(id);
        removed
    }

    pub fn remove_pattern(&mut self, id: &str) -> Option<Pattern> {
        self.pattern_ids.remove(id);
        take_by_id(&mut self.patterns, id, |p| &p.id)
    }

    pub fn remove_curve(&mut self, id: &str) -> Option<Curve> {
        self.curve_ids.remove(id);
        take_by_id(&mut self.curves, id, |c| &c.id)
    }

    /// Attach coordinates to an existing node.
    pub fn set_coordinates(&mut self, id: &str, coordinates: Coordinate) -> Result<(), ReferenceError> {
        let missing = || ReferenceError::new("coordinates", id, RefKind::Node);
        match self.element_ids.get(id) {
            Some(ElementKind::Node(NodeType::Junction)) => {
                let j = self.junctions.iter_mut().find(|j| j.id == id).ok_or_else(missing)?;
                j.coordinates = Some(coordinates);
            }
            Some(ElementKind::Node(NodeType::Reservoir)) => {
                let r = self.reservoirs.iter_mut().find(|r| r.id == id).ok_or_else(missing)?;
                r.coordinates = Some(coordinates);
            }
            Some(ElementKind::Node(NodeType::Tank)) => {
                let t = self.tanks.iter_mut().find(|t| t.id == id).ok_or_else(missing)?;
                t.coordinates = Some(coordinates);
            }
            Some(ElementKind::Link(_)) | None => return Err(missing()),
        }
        Ok(())
    }

    // ---- lookup ---------------------------------------------------------

    /// Kind registered for an id in the node/link namespace.
    pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
        self.element_ids.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<NodeRef<'_>> {
        match self.element_ids.get(id)? {
            ElementKind::Node(NodeType::Junction) => {
                self.junctions.iter().find(|j| j.id == id).map(NodeRef::Junction)
            }
            ElementKind::Node(NodeType::Reservoir) => {
                self.reservoirs.iter().find(|r| r.id == id).map(NodeRef::Reservoir)
            }
            ElementKind::Node(NodeType::Tank) => {
                self.tanks.iter().find(|t| t.id == id).map(NodeRef::Tank)
            }
            ElementKind::Link(_) => None,
        }
    }

    pub fn link(&self, id: &str) -> Option<LinkRef<'_>> {
        match self.element_ids.get(id)? {
            ElementKind::Link(LinkType::Pipe) => {
                self.pipes.iter().find(|p| p.id == id).map(LinkRef::Pipe)
            }
            ElementKind::Link(LinkType::Pump) => {
                self.pumps.iter().find(|p| p.id == id).map(LinkRef::Pump)
            }
            ElementKind::Link(LinkType::Valve) => {
                self.valves.iter().find(|v| v.id == id).map(LinkRef::Valve)
            }
            ElementKind::Node(_) => None,
        }
    }

    pub fn pattern(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn curve(&self, id: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.id == id)
    }

    /// Iterate over all nodes: junctions, then reservoirs, then tanks.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.junctions
            .iter()
            .map(NodeRef::Junction)
            .chain(self.reservoirs.iter().map(NodeRef::Reservoir))
            .chain(self.tanks.iter().map(NodeRef::Tank))
    }

    /// Iterate over all links: pipes, then pumps, then valves.
    pub fn links(&self) -> impl Iterator<Item = LinkRef<'_>> {
        self.pipes
            .iter()
            .map(LinkRef::Pipe)
            .chain(self.pumps.iter().map(LinkRef::Pump))
            .chain(self.valves.iter().map(LinkRef::Valve))
    }

    pub fn node_count(&self) -> usize {
        self.junctions.len() + self.reservoirs.len() + self.tanks.len()
    }

    pub fn link_count(&self) -> usize {
        self.pipes.len() + self.pumps.len() + self.valves.len()
    }

    /// Pumps with neither a head curve nor a power rating.
    pub fn unusable_pumps(&self) -> impl Iterator<Item = &Pump> {
        self.pumps.iter().filter(|p| !p.is_usable())
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            total_junctions: self.junctions.len(),
            total_reservoirs: self.reservoirs.len(),
            total_tanks: self.tanks.len(),
            total_pipes: self.pipes.len(),
            total_pumps: self.pumps.len(),
            total_valves: self.valves.len(),
            total_nodes: self.node_count(),
            total_links: self.link_count(),
        }
    }

    /// Check every element rule, id uniqueness and every cross reference.
    pub fn validate(&self) -> HnResult<()> {
        validate::validate_network(self)
    }

    fn claim_element_id(&mut self, id: &str, kind: ElementKind) -> Result<(), ValidationError> {
        if self.element_ids.contains_key(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: "nodes and links",
            });
        }
        self.element_ids.insert(id.to_string(), kind);
        Ok(())
    }
}

fn take_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &String) -> Option<T> {
    let pos = items.iter().position(|item| key(item) == id)?;
    Some(items.remove(pos))
}

#[derive(Serialize)]
struct NodesView<'a> {
    junctions: &'a [Junction],
    reservoirs: &'a [Reservoir],
    tanks: &'a [Tank],
}

#[derive(Serialize)]
struct LinksView<'a> {
    pipes: &'a [Pipe],
    pumps: &'a [Pump],
    valves: &'a [Valve],
}

impl Serialize for WaterNetwork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("WaterNetwork", 7)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field(
            "nodes",
            &NodesView {
                junctions: &self.junctions,
                reservoirs: &self.reservoirs,
                tanks: &self.tanks,
            },
        )?;
        s.serialize_field(
            "links",
            &LinksView {
                pipes: &self.pipes,
                pumps: &self.pumps,
                valves: &self.valves,
            },
        )?;
        s.serialize_field("patterns", &self.patterns)?;
        s.serialize_field("curves", &self.curves)?;
        s.serialize_field("options", &self.options)?;
        s.serialize_field("statistics", &self.statistics())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::PumpDrive;
    use crate::node::TankLevels;

    fn small_network() -> WaterNetwork {
        let mut net = WaterNetwork::new("small");
        net.add_reservoir(Reservoir::new("R1", 100.0).unwrap()).unwrap();
        net.add_junction(Junction::new("J1", 10.0, 5.0).unwrap()).unwrap();
        net.add_junction(Junction::new("J2", 12.0, 3.0).unwrap()).unwrap();
        net.add_pipe(Pipe::new("P1", "R1", "J1", 100.0, 12.0, 100.0).unwrap())
            .unwrap();
        net.add_pipe(Pipe::new("P2", "J1", "J2", 100.0, 12.0, 100.0).unwrap())
            .unwrap();
        net
    }

    #[test]
    fn duplicate_ids_rejected_across_nodes_and_links() {
        let mut net = small_network();
        let err = net
            .add_tank(
                Tank::new(
                    "P1",
                    0.0,
                    TankLevels {
                        init: 1.0,
                        min: 0.0,
                        max: 2.0,
                    },
                    10.0,
                    None,
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { ref id, .. } if id == "P1"));
        assert_eq!(net.tanks().len(), 0);
    }

    #[test]
    fn statistics_track_mutations() {
        let mut net = small_network();
        let stats = net.statistics();
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.total_links, 2);

        assert!(net.remove_link("P2").is_some());
        assert!(net.remove_node("J2").is_some());
        let stats = net.statistics();
        assert_eq!(stats.total_junctions, 1);
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.total_links, 1);
        net.validate().unwrap();
    }

    #[test]
    fn remove_node_does_not_remove_links() {
        let mut net = small_network();
        assert!(net.remove_link("J1").is_none());
        assert!(net.remove_node("P1").is_none());
        assert!(net.remove_node("J2").is_some());
        let err = net.validate().unwrap_err();
        assert!(err.is_reference());
    }

    #[test]
    fn removed_id_can_be_reused() {
        let mut net = small_network();
        net.remove_link("P2").unwrap();
        net.add_pump(Pump::new("P2", "J1", "J2", PumpDrive::Power(10.0)).unwrap())
            .unwrap();
        assert_eq!(net.link("P2").unwrap().link_type(), LinkType::Pump);
    }

    #[test]
    fn lookups_respect_namespace_kind() {
        let net = small_network();
        assert!(net.node("J1").is_some());
        assert!(net.node("P1").is_none());
        assert_eq!(net.link("P1").unwrap().endpoints(), ("R1", "J1"));
        assert_eq!(net.kind_of("R1"), Some(ElementKind::RESERVOIR));
        assert_eq!(net.nodes().count(), 3);
        assert_eq!(net.links().count(), 2);
    }

    #[test]
    fn set_coordinates_targets_nodes_only() {
        let mut net = small_network();
        net.set_coordinates("J1", Coordinate::new(1.0, 2.0)).unwrap();
        assert_eq!(
            net.node("J1").unwrap().coordinates(),
            Some(Coordinate::new(1.0, 2.0))
        );
        let err = net.set_coordinates("P1", Coordinate::new(0.0, 0.0)).unwrap_err();
        assert_eq!(err.target, "P1");
        assert!(net.set_coordinates("nope", Coordinate::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn unusable_pumps_are_flagged() {
        let mut net = small_network();
        net.add_pump(Pump::new("PU1", "R1", "J1", PumpDrive::Unspecified).unwrap())
            .unwrap();
        let flagged: Vec<&str> = net.unusable_pumps().map(|p| p.id.as_str()).collect();
        assert_eq!(flagged, ["PU1"]);
    }
}
