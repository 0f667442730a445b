use hn_json::{Indent, decode, encode, encode_value, to_value};
use hn_network::*;
use proptest::prelude::*;

/// Finite values with short decimal expansions plus a few awkward ones.
fn real() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-100_000i64..100_000).prop_map(|v| v as f64 / 100.0),
        Just(0.1),
        Just(1e-7),
        Just(123_456_789.125),
    ]
}

fn positive() -> impl Strategy<Value = f64> {
    (1u32..100_000).prop_map(|v| v as f64 / 10.0)
}

#[derive(Debug, Clone)]
struct Shape {
    junctions: Vec<(f64, f64, Option<(f64, f64)>)>,
    head: f64,
    pipe_dims: Vec<(f64, f64, f64)>,
    multipliers: Vec<f64>,
    curve_steps: Vec<(f64, f64)>,
    with_tank: bool,
    with_valve: bool,
    indent: Option<usize>,
}

fn shape() -> impl Strategy<Value = Shape> {
    (1usize..6)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((real(), real(), prop::option::of((real(), real()))), n),
                real(),
                prop::collection::vec((positive(), positive(), positive()), n),
                prop::collection::vec(real(), 1..8),
                prop::collection::vec((positive(), real()), 1..5),
                any::<bool>(),
                any::<bool>(),
                prop::option::of(0usize..6),
            )
        })
        .prop_map(
            |(junctions, head, pipe_dims, multipliers, curve_steps, with_tank, with_valve, indent)| {
                Shape {
                    junctions,
                    head,
                    pipe_dims,
                    multipliers,
                    curve_steps,
                    with_tank,
                    with_valve,
                    indent,
                }
            },
        )
}

fn build(shape: &Shape) -> WaterNetwork {
    let mut net = WaterNetwork::new("generated \"network\"\nline two");
    net.add_reservoir(Reservoir::new("R", shape.head).unwrap()).unwrap();
    net.add_pattern(Pattern::new("PAT", shape.multipliers.clone()).unwrap())
        .unwrap();

    let mut x = 0.0;
    let points = shape
        .curve_steps
        .iter()
        .map(|&(dx, y)| {
            x += dx;
            CurvePoint { x, y }
        })
        .collect();
    net.add_curve(Curve::new("C", CurveType::Pump, points).unwrap())
        .unwrap();

    let mut upstream = "R".to_string();
    for (i, (&(elevation, demand, xy), &(length, diameter, roughness))) in
        shape.junctions.iter().zip(&shape.pipe_dims).enumerate()
    {
        let id = format!("J{i}");
        let mut j = Junction::new(&id, elevation, demand).unwrap().with_pattern("PAT");
        if let Some((x, y)) = xy {
            j = j.with_coordinates(Coordinate::new(x, y));
        }
        net.add_junction(j).unwrap();
        net.add_pipe(Pipe::new(format!("P{i}"), &upstream, &id, length, diameter, roughness).unwrap())
            .unwrap();
        upstream = id;
    }
    net.add_pump(Pump::new("PU", "R", "J0", PumpDrive::Curve("C".into())).unwrap())
        .unwrap();

    if shape.with_tank {
        let tank = Tank::new(
            "T",
            shape.head,
            TankLevels {
                init: 2.0,
                min: 1.0,
                max: 3.0,
            },
            12.5,
            None,
        )
        .unwrap();
        net.add_tank(tank).unwrap();
        net.add_pipe(Pipe::new("PT", &upstream, "T", 10.0, 8.0, 100.0).unwrap())
            .unwrap();
    }
    if shape.with_valve {
        net.add_valve(
            Valve::new("V", "R", &upstream, 6.0, ValveType::Prv, ValveSetting::Value(shape.head))
                .unwrap(),
        )
        .unwrap();
    }
    net.validate().unwrap();
    net
}

fn indent_of(shape: &Shape) -> Indent {
    match shape.indent {
        Some(n) => Indent::Spaces(n),
        None => Indent::Compact,
    }
}

proptest! {
    #[test]
    fn decode_of_encode_equals_projection(shape in shape()) {
        let net = build(&shape);
        let text = encode(&net, indent_of(&shape)).unwrap();
        prop_assert_eq!(decode(&text).unwrap(), to_value(&net).unwrap());
    }

    #[test]
    fn key_order_survives_decoding(shape in shape()) {
        let net = build(&shape);
        let indent = indent_of(&shape);
        let text = encode(&net, indent).unwrap();
        let again = encode_value(&decode(&text).unwrap(), indent).unwrap();
        prop_assert_eq!(again, text);
    }

    #[test]
    fn encode_is_idempotent(shape in shape()) {
        let net = build(&shape);
        let indent = indent_of(&shape);
        prop_assert_eq!(encode(&net, indent).unwrap(), encode(&net, indent).unwrap());
    }

    #[test]
    fn projected_statistics_match_collections(shape in shape()) {
        let net = build(&shape);
        let v = decode(&encode(&net, Indent::Compact).unwrap()).unwrap();
        let stats = &v["statistics"];
        let len = |a: &serde_json::Value| a.as_array().map(Vec::len).unwrap_or(0) as u64;
        let nodes = &v["nodes"];
        let links = &v["links"];
        prop_assert_eq!(stats["total_junctions"].as_u64(), Some(len(&nodes["junctions"])));
        prop_assert_eq!(stats["total_tanks"].as_u64(), Some(len(&nodes["tanks"])));
        prop_assert_eq!(stats["total_valves"].as_u64(), Some(len(&links["valves"])));
        prop_assert_eq!(
            stats["total_nodes"].as_u64(),
            Some(len(&nodes["junctions"]) + len(&nodes["reservoirs"]) + len(&nodes["tanks"]))
        );
        prop_assert_eq!(
            stats["total_links"].as_u64(),
            Some(len(&links["pipes"]) + len(&links["pumps"]) + len(&links["valves"]))
        );
    }
}

#[test]
fn top_level_keys_in_schema_order() {
    let shape = Shape {
        junctions: vec![(1.0, 2.0, None)],
        head: 10.0,
        pipe_dims: vec![(1.0, 1.0, 1.0)],
        multipliers: vec![1.0],
        curve_steps: vec![(1.0, 1.0)],
        with_tank: false,
        with_valve: false,
        indent: Some(2),
    };
    let text = encode(&build(&shape), Indent::Spaces(2)).unwrap();
    let positions: Vec<usize> = [
        "\"title\"",
        "\"nodes\"",
        "\"links\"",
        "\"patterns\"",
        "\"curves\"",
        "\"options\"",
        "\"statistics\"",
    ]
    .iter()
    .map(|key| text.find(key).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert!(!text.contains("\"coordinates\""));
}
