pub mod topology;

pub use topology::{Tier, TopologyEdge, TopologyGraph, TopologyNode};
