//! hn-network: element and network model for hydronet.
//!
//! Provides:
//! - Node elements (Junction, Reservoir, Tank) and link elements (Pipe, Pump, Valve)
//! - Patterns and curves
//! - Network-wide options
//! - The `WaterNetwork` aggregate with named mutation operations,
//!   on-demand statistics and whole-network validation
//!
//! Every element validates its own field rules on construction and
//! serializes to the fixed JSON schema through `serde::Serialize`.
//!
//! # Example
//!
//! ```
//! use hn_network::{Junction, Pipe, Reservoir, WaterNetwork};
//!
//! let mut net = WaterNetwork::new("demo");
//! net.add_reservoir(Reservoir::new("R1", 100.0).unwrap()).unwrap();
//! net.add_junction(Junction::new("J1", 10.0, 5.0).unwrap()).unwrap();
//! net.add_pipe(Pipe::new("P1", "R1", "J1", 1000.0, 12.0, 100.0).unwrap()).unwrap();
//! net.validate().unwrap();
//!
//! assert_eq!(net.statistics().total_links, 1);
//! ```

pub mod curve;
pub mod link;
pub mod network;
pub mod node;
pub mod options;
mod validate;

// Re-exports
pub use curve::{Curve, CurvePoint, CurveType, Pattern};
pub use link::{Link, LinkRef, Pipe, PipeStatus, Pump, PumpDrive, Valve, ValveSetting, ValveType};
pub use network::{Statistics, WaterNetwork};
pub use node::{Coordinate, Junction, Node, NodeRef, Reservoir, Tank, TankLevels};
pub use options::{DemandModel, FlowUnits, HeadlossFormula, NetworkOptions, PressureUnits, UnitSystem};
