use std::path::PathBuf;

use hn_inp::read_file;
use hn_network::{Coordinate, CurveType, FlowUnits, HeadlossFormula, PipeStatus, PressureUnits};

fn net1_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/net1.inp")
}

#[test]
fn net1_element_counts() {
    let net = read_file(&net1_path()).unwrap();
    let stats = net.statistics();
    assert_eq!(stats.total_junctions, 9);
    assert_eq!(stats.total_reservoirs, 1);
    assert_eq!(stats.total_tanks, 1);
    assert_eq!(stats.total_pipes, 12);
    assert_eq!(stats.total_pumps, 1);
    assert_eq!(stats.total_valves, 0);
    assert_eq!(stats.total_nodes, 11);
    assert_eq!(stats.total_links, 13);
}

#[test]
fn net1_title_and_options() {
    let net = read_file(&net1_path()).unwrap();
    assert!(net.title().starts_with("EPANET Example Network 1\n"));
    assert_eq!(net.title().lines().count(), 3);

    let opts = net.options();
    assert_eq!(opts.units, FlowUnits::Gpm);
    assert_eq!(opts.headloss, HeadlossFormula::HazenWilliams);
    assert_eq!(opts.pressure, PressureUnits::Psi);
    assert_eq!(opts.pattern.as_deref(), Some("1"));
    assert_eq!(opts.duration, 86_400.0);
    assert_eq!(opts.hydraulic_timestep, 3600.0);
    assert_eq!(opts.quality_timestep, 300.0);
}

#[test]
fn net1_elements() {
    let net = read_file(&net1_path()).unwrap();

    let tank = &net.tanks()[0];
    assert_eq!(tank.id, "2");
    assert_eq!(tank.diameter, 50.5);
    assert_eq!(tank.coordinates, Some(Coordinate::new(50.0, 90.0)));

    let pipe = net.pipes().iter().find(|p| p.id == "P110").unwrap();
    assert_eq!((pipe.from_node.as_str(), pipe.to_node.as_str()), ("2", "12"));
    assert_eq!(pipe.status, PipeStatus::Open);

    let pump = &net.pumps()[0];
    assert_eq!(pump.pump_curve(), Some("1"));
    assert_eq!(pump.speed, 1.0);

    // Repeated pattern rows append multipliers.
    assert_eq!(net.pattern("1").unwrap().multipliers.len(), 12);
    assert_eq!(net.curve("1").unwrap().curve_type, CurveType::Pump);

    // Junction order follows the file.
    let ids: Vec<&str> = net.junctions().iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, ["10", "11", "12", "13", "21", "22", "23", "31", "32"]);
}

#[test]
fn net1_projects_to_schema() {
    let net = read_file(&net1_path()).unwrap();
    let v = serde_json::to_value(&net).unwrap();
    let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["title", "nodes", "links", "patterns", "curves", "options", "statistics"]
    );
    assert_eq!(v["nodes"]["reservoirs"][0]["type"], "RESERVOIR");
    assert_eq!(v["nodes"]["reservoirs"][0]["coordinates"]["x"], 10.0);
    assert_eq!(v["links"]["pumps"][0]["pump_curve"], "1");
    assert!(v["links"]["pumps"][0]["power"].is_null());
    assert_eq!(v["statistics"]["total_links"], 13);
}

#[test]
fn missing_file_is_io_error() {
    let err = read_file(&net1_path().with_file_name("does-not-exist.inp")).unwrap_err();
    assert!(matches!(err, hn_core::HnError::Io(_)));
}
