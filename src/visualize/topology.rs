use crate::config::GenomeConfig;
use crate::engines::generation::{Genome, NodeKey};
use crate::error::{NeuroLanderError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const TITLE: &str = "Neural Network Visualization";

const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const SALMON: RGBColor = RGBColor(250, 128, 114);
const EDGE_GREY: RGBColor = RGBColor(128, 128, 128);

const NODE_RADIUS: i32 = 16;
const NODE_GAP: f64 = 0.07;
const ARROW_LENGTH: f64 = 0.05;
const ARROW_SPREAD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Input,
    Hidden,
    Output,
}

impl Tier {
    pub fn layer(&self) -> usize {
        match self {
            Tier::Input => 0,
            Tier::Hidden => 1,
            Tier::Output => 2,
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            Tier::Input => LIGHT_BLUE,
            Tier::Hidden => LIGHT_GREEN,
            Tier::Output => SALMON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyNode {
    pub key: NodeKey,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub weight: f64,
}

/// Layered view of a genome: inputs, hidden nodes and outputs, joined by the
/// enabled connections.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyGraph {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
}

impl TopologyGraph {
    pub fn from_genome(genome: &Genome, config: &GenomeConfig) -> Self {
        let inputs = config.input_keys();
        let outputs = config.output_keys();

        let mut nodes: Vec<TopologyNode> = inputs
            .iter()
            .map(|&key| TopologyNode { key, tier: Tier::Input })
            .chain(outputs.iter().map(|&key| TopologyNode { key, tier: Tier::Output }))
            .collect();

        nodes.extend(
            genome
                .nodes
                .keys()
                .filter(|k| !inputs.contains(k) && !outputs.contains(k))
                .map(|&key| TopologyNode { key, tier: Tier::Hidden }),
        );

        let known: BTreeSet<NodeKey> = nodes.iter().map(|n| n.key).collect();
        let edges = genome
            .connections
            .values()
            .filter(|c| c.enabled)
            .filter(|c| {
                let ok = known.contains(&c.key.0) && known.contains(&c.key.1);
                if !ok {
                    log::warn!("Skipping connection {:?} with an unknown endpoint", c.key);
                }
                ok
            })
            .map(|c| TopologyEdge {
                from: c.key.0,
                to: c.key.1,
                weight: c.weight,
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn nodes_in(&self, tier: Tier) -> impl Iterator<Item = &TopologyNode> {
        self.nodes.iter().filter(move |n| n.tier == tier)
    }

    /// Column per non-empty tier, nodes spread evenly down each column.
    /// Coordinates lie in `[-1, 1]`; a lone column or node sits at 0.
    pub fn multipartite_layout(&self) -> BTreeMap<NodeKey, (f64, f64)> {
        let mut tiers: BTreeMap<usize, Vec<NodeKey>> = BTreeMap::new();
        for node in &self.nodes {
            tiers.entry(node.tier.layer()).or_default().push(node.key);
        }

        let columns = tiers.len();
        let mut positions = BTreeMap::new();
        for (column, keys) in tiers.values().enumerate() {
            let x = spread(column, columns);
            for (row, &key) in keys.iter().enumerate() {
                positions.insert(key, (x, -spread(row, keys.len())));
            }
        }
        positions
    }

    pub fn render_png<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let path = path.as_ref();
        let positions = self.multipartite_layout();

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        let root = root.titled(TITLE, ("sans-serif", 24)).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(30)
            .build_cartesian_2d(-1.2f64..1.2f64, -1.2f64..1.2f64)
            .map_err(render_error)?;

        for edge in &self.edges {
            let (Some(&from), Some(&to)) = (positions.get(&edge.from), positions.get(&edge.to)) else {
                continue;
            };
            for segment in arrow(from, to) {
                chart
                    .draw_series(std::iter::once(PathElement::new(segment, EDGE_GREY.stroke_width(1))))
                    .map_err(render_error)?;
            }
        }

        let label_style = TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        for node in &self.nodes {
            let Some(&center) = positions.get(&node.key) else {
                continue;
            };
            chart
                .draw_series(std::iter::once(Circle::new(center, NODE_RADIUS, node.tier.color().filled())))
                .map_err(render_error)?;
            chart
                .draw_series(std::iter::once(Text::new(node.key.to_string(), center, label_style.clone())))
                .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
        log::info!("Rendered network topology to {}", path.display());
        Ok(())
    }
}

fn spread(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        -1.0 + 2.0 * index as f64 / (count - 1) as f64
    }
}

/// Shaft plus two head strokes, stopped short of both node centres.
fn arrow(from: (f64, f64), to: (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= 2.0 * NODE_GAP {
        return vec![vec![from, to]];
    }
    let (ux, uy) = (dx / length, dy / length);
    let start = (from.0 + ux * NODE_GAP, from.1 + uy * NODE_GAP);
    let tip = (to.0 - ux * NODE_GAP, to.1 - uy * NODE_GAP);

    let head = |side: f64| {
        let (sin, cos) = (side * ARROW_SPREAD).sin_cos();
        let (bx, by) = (-ux * cos + uy * sin, -ux * sin - uy * cos);
        vec![tip, (tip.0 + bx * ARROW_LENGTH, tip.1 + by * ARROW_LENGTH)]
    };

    vec![vec![start, tip], head(1.0), head(-1.0)]
}

fn render_error<E: std::fmt::Display>(e: E) -> NeuroLanderError {
    NeuroLanderError::Render(e.to_string())
}
