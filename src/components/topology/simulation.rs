//! Force-directed layout engine.
//!
//! Owns the node and link lists and advances node positions one tick at a
//! time. Energy is tracked as `alpha`: every tick moves alpha toward
//! `alpha_target` by `alpha_decay`, and the engine stops itself once alpha
//! falls below `alpha_min`. While a node is dragged the target is raised so
//! the layout stays responsive without being reset.
//!
//! Links are attached in an explicit resolve step ([`Simulation::set_graph`]):
//! host links name their endpoints by id, engine links hold [`NodeHandle`]s.
//! A link whose endpoint cannot be resolved is dropped and reported, so
//! every stored link always points at a live node.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::{debug, warn};

use super::config::{Config, ForceConfig};
use super::error::{Result, TopologyError};
use super::forces::{self, Jiggle, Spring};
use super::geometry::Point;
use super::spatial;
use super::types::{GraphData, GraphNode, Link, LinkRaw, LinkType, Node, NodeHandle};

/// Spacing of the seed spiral for nodes without a position.
const INITIAL_RADIUS: f64 = 10.0;

/// Simulation parameters derived from [`Config`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
	pub force: ForceConfig,
	/// Per-node collision radius.
	pub collide_radius: f64,
}

impl From<&Config> for SimulationParams {
	fn from(config: &Config) -> Self {
		Self {
			force: config.force.clone(),
			collide_radius: config.collide_radius(),
		}
	}
}

/// Outcome of replacing the graph contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphReport {
	pub nodes: usize,
	pub links: usize,
	/// Nodes whose id was already taken earlier in the same list.
	pub duplicate_nodes: Vec<String>,
	/// Links dropped because an endpoint is not in the node set.
	pub dropped_links: Vec<TopologyError>,
}

/// What a cascade removal took out of the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Removal {
	pub nodes: Vec<Node>,
	pub links: Vec<LinkRaw>,
}

/// The layout engine.
pub struct Simulation {
	nodes: Vec<Node>,
	links: Vec<Link>,
	springs: Vec<Spring>,
	index: HashMap<String, NodeHandle>,
	params: SimulationParams,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
	jiggle: Jiggle,
}

impl Simulation {
	pub fn new(params: SimulationParams, center: Point) -> Self {
		let alpha_decay = Self::decay_for(params.force.alpha_min);
		Self {
			nodes: Vec::new(),
			links: Vec::new(),
			springs: Vec::new(),
			index: HashMap::new(),
			params,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay,
			running: true,
			jiggle: Jiggle::default(),
		}
	}

	/// Decay that takes alpha from 1 to `alpha_min` in 300 ticks.
	fn decay_for(alpha_min: f64) -> f64 {
		1.0 - alpha_min.powf(1.0 / 300.0)
	}

	/// Replace the tracked nodes and links.
	///
	/// Nodes whose id was already present keep their position, velocity and
	/// pin. New nodes take their given coordinates, or a spot on a spiral
	/// around the layout center. Links are then resolved against the new node
	/// set; unresolvable ones are dropped and listed in the report.
	pub fn set_graph(&mut self, nodes: Vec<GraphNode>, links: Vec<LinkRaw>) -> GraphReport {
		let mut previous: HashMap<String, Node> =
			self.nodes.drain(..).map(|n| (n.id.clone(), n)).collect();
		let mut report = GraphReport::default();
		let mut seen = HashSet::new();

		for seed in nodes {
			if !seen.insert(seed.id.clone()) {
				warn!("topo-graph: duplicate node id `{}` ignored", seed.id);
				report.duplicate_nodes.push(seed.id);
				continue;
			}
			let node = match previous.remove(&seed.id) {
				Some(mut kept) => {
					kept.name = seed.name;
					kept.img = seed.img;
					kept
				}
				None => self.spawn(seed),
			};
			self.nodes.push(node);
		}

		self.reindex();
		self.links.clear();
		for raw in links {
			match raw.resolve(&self.index) {
				Ok(link) => {
					if let Err(e) = link.link_type.parse::<LinkType>() {
						warn!("topo-graph: link `{}`: {e}, it will not be drawn", link.id);
					}
					self.links.push(link);
				}
				Err(e) => {
					warn!("topo-graph: {e}, link dropped");
					report.dropped_links.push(e);
				}
			}
		}
		self.rebuild_springs();

		report.nodes = self.nodes.len();
		report.links = self.links.len();
		debug!(
			"topo-graph: graph set with {} nodes, {} links",
			report.nodes, report.links
		);
		report
	}

	fn spawn(&self, seed: GraphNode) -> Node {
		let i = self.nodes.len() as f64;
		let (x, y) = match (seed.x, seed.y) {
			(Some(x), Some(y)) if x.is_finite() && y.is_finite() => (x, y),
			_ => {
				let radius = INITIAL_RADIUS * (0.5 + i).sqrt();
				let angle = i * PI * (3.0 - 5f64.sqrt());
				(
					self.center.x + radius * angle.cos(),
					self.center.y + radius * angle.sin(),
				)
			}
		};
		Node {
			id: seed.id,
			name: seed.name,
			img: seed.img,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	fn reindex(&mut self) {
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), NodeHandle(i)))
			.collect();
	}

	fn rebuild_springs(&mut self) {
		self.springs = Spring::build(
			self.links.iter().map(|l| (l.source.0, l.target.0)),
			self.nodes.len(),
		);
	}

	/// Remove every node named in `ids` and every link touching one of them.
	///
	/// Unknown ids are ignored. The node and link lists are rebuilt in one
	/// step, so no link ever points at a removed node.
	pub fn remove_by_ids<I, S>(&mut self, ids: I) -> Removal
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let doomed: HashSet<NodeHandle> = ids
			.into_iter()
			.filter_map(|id| self.index.get(id.as_ref()).copied())
			.collect();
		if doomed.is_empty() {
			return Removal::default();
		}

		let mut removal = Removal::default();
		let (kept_links, dropped_links): (Vec<Link>, Vec<Link>) = self
			.links
			.drain(..)
			.partition(|l| !doomed.contains(&l.source) && !doomed.contains(&l.target));
		removal.links = dropped_links.iter().map(|l| l.to_raw(&self.nodes)).collect();

		let mut remap = vec![None; self.nodes.len()];
		let mut kept_nodes = Vec::with_capacity(self.nodes.len() - doomed.len());
		for (i, node) in self.nodes.drain(..).enumerate() {
			if doomed.contains(&NodeHandle(i)) {
				removal.nodes.push(node);
			} else {
				remap[i] = Some(NodeHandle(kept_nodes.len()));
				kept_nodes.push(node);
			}
		}
		self.nodes = kept_nodes;
		self.links = kept_links
			.into_iter()
			.filter_map(|mut l| {
				l.source = remap[l.source.0]?;
				l.target = remap[l.target.0]?;
				Some(l)
			})
			.collect();
		self.reindex();
		self.rebuild_springs();
		debug!(
			"topo-graph: removed {} nodes, {} links",
			removal.nodes.len(),
			removal.links.len()
		);
		removal
	}

	/// Freeze a node at its current position.
	pub fn pin(&mut self, id: &str) -> Result<()> {
		self.node_mut(id)?.pin();
		Ok(())
	}

	pub fn pin_at(&mut self, id: &str, at: Point) -> Result<()> {
		self.node_mut(id)?.pin_at(at.x, at.y);
		Ok(())
	}

	/// Release a node back to the forces.
	pub fn unpin(&mut self, id: &str) -> Result<()> {
		self.node_mut(id)?.unpin();
		Ok(())
	}

	/// Pin every node where it is, or release every pin.
	pub fn set_all_pinned(&mut self, pinned: bool) {
		for node in &mut self.nodes {
			if pinned {
				node.pin();
			} else {
				node.unpin();
			}
		}
	}

	/// Halt ticking. Safe to call repeatedly.
	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Resume ticking from the current alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Raise alpha to at least `alpha` and resume ticking.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
		self.running = true;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Advance one tick. Returns `false` without doing anything while stopped.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.step();
		if self.alpha < self.params.force.alpha_min {
			debug!("topo-graph: simulation cooled down, stopping");
			self.running = false;
		}
		true
	}

	fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		let alpha = self.alpha;
		let force = &self.params.force;

		forces::collide(
			&mut self.nodes,
			self.params.collide_radius,
			force.collide_strength,
			&mut self.jiggle,
		);
		forces::many_body(
			&mut self.nodes,
			force.charge_strength,
			force.charge_distance_min,
			force.charge_distance_max,
			alpha,
			&mut self.jiggle,
		);
		forces::center(&mut self.nodes, self.center, 1.0);
		forces::springs(
			&mut self.nodes,
			&self.springs,
			force.link_distance,
			force.link_strength,
			alpha,
			&mut self.jiggle,
		);

		let keep = 1.0 - force.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	/// Nearest node strictly within `radius` of a graph-space point.
	pub fn find(&self, at: Point, radius: f64) -> Option<&Node> {
		spatial::nearest_within(&self.nodes, at, radius).map(|h| &self.nodes[h.0])
	}

	/// Move the point the centering force pulls toward.
	pub fn set_center(&mut self, center: Point) {
		self.center = center;
	}

	pub fn center(&self) -> Point {
		self.center
	}

	/// Swap in new parameters, e.g. after a config merge.
	pub fn set_params(&mut self, params: SimulationParams) {
		self.alpha_decay = Self::decay_for(params.force.alpha_min);
		self.params = params;
	}

	pub fn params(&self) -> &SimulationParams {
		&self.params
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn handle(&self, id: &str) -> Option<NodeHandle> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.handle(id).map(|h| &self.nodes[h.0])
	}

	pub fn node_at(&self, handle: NodeHandle) -> &Node {
		&self.nodes[handle.0]
	}

	pub(crate) fn node_at_mut(&mut self, handle: NodeHandle) -> &mut Node {
		&mut self.nodes[handle.0]
	}

	pub(crate) fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
		let handle = self
			.handle(id)
			.ok_or_else(|| TopologyError::UnknownId(id.to_string()))?;
		Ok(&mut self.nodes[handle.0])
	}

	pub fn link(&self, id: &str) -> Option<&Link> {
		self.links.iter().find(|l| l.id == id)
	}

	/// Current links in host form.
	pub fn raw_links(&self) -> Vec<LinkRaw> {
		self.links.iter().map(|l| l.to_raw(&self.nodes)).collect()
	}

	/// Snapshot of the graph with current positions.
	pub fn graph_data(&self) -> GraphData {
		GraphData {
			nodes: self.nodes.iter().map(Node::to_graph_node).collect(),
			links: self.raw_links(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sim() -> Simulation {
		Simulation::new(SimulationParams::from(&Config::default()), Point::new(400.0, 300.0))
	}

	fn seeded(sim: &mut Simulation) -> GraphReport {
		sim.set_graph(
			vec![
				GraphNode::new("a", "A").at(350.0, 300.0),
				GraphNode::new("b", "B").at(450.0, 300.0),
				GraphNode::new("c", "C").at(400.0, 380.0),
			],
			vec![
				LinkRaw::new("ab", "a", "b", "1-N"),
				LinkRaw::new("bc", "b", "c", "N-N"),
				LinkRaw::new("ca", "c", "a", "1-1"),
			],
		)
	}

	fn assert_links_resolve(sim: &Simulation) {
		for link in sim.links() {
			assert!(link.source.index() < sim.nodes().len());
			assert!(link.target.index() < sim.nodes().len());
		}
	}

	#[test]
	fn dangling_links_are_dropped_and_reported() {
		let mut sim = sim();
		let report = sim.set_graph(
			vec![GraphNode::new("a", "A"), GraphNode::new("b", "B")],
			vec![LinkRaw::new("ab", "a", "b", "1-1"), LinkRaw::new("ax", "a", "x", "1-1")],
		);
		assert_eq!(report.links, 1);
		assert_eq!(
			report.dropped_links,
			vec![TopologyError::DanglingLink {
				link: "ax".into(),
				node: "x".into()
			}]
		);
		assert_links_resolve(&sim);
	}

	#[test]
	fn set_graph_keeps_positions_of_persisting_ids() {
		let mut sim = sim();
		seeded(&mut sim);
		for _ in 0..10 {
			sim.tick();
		}
		sim.pin("b").unwrap();
		let before = sim.node("b").unwrap().clone();

		sim.set_graph(
			vec![GraphNode::new("b", "Renamed").at(0.0, 0.0), GraphNode::new("d", "D")],
			vec![LinkRaw::new("bd", "b", "d", "1-N")],
		);
		let after = sim.node("b").unwrap();
		assert_eq!((after.x, after.y), (before.x, before.y));
		assert_eq!(after.fx, before.fx);
		assert_eq!(after.name, "Renamed");
		assert!(sim.node("a").is_none());
		assert_eq!(sim.links()[0].to_raw(sim.nodes()).target, "d");
	}

	#[test]
	fn duplicate_ids_keep_the_first() {
		let mut sim = sim();
		let report = sim.set_graph(
			vec![GraphNode::new("a", "first"), GraphNode::new("a", "second")],
			Vec::new(),
		);
		assert_eq!(report.nodes, 1);
		assert_eq!(report.duplicate_nodes, vec!["a".to_string()]);
		assert_eq!(sim.node("a").unwrap().name, "first");
	}

	#[test]
	fn unpositioned_nodes_get_distinct_seeds() {
		let mut sim = sim();
		sim.set_graph((0..5).map(|i| GraphNode::new(i.to_string(), "n")).collect(), Vec::new());
		let points: Vec<_> = sim.nodes().iter().map(|n| (n.x, n.y)).collect();
		for (i, a) in points.iter().enumerate() {
			for b in &points[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}

	#[test]
	fn cascade_removes_exactly_the_touching_links() {
		let mut sim = sim();
		seeded(&mut sim);
		let removal = sim.remove_by_ids(["a"]);
		assert_eq!(removal.nodes.len(), 1);
		let mut gone: Vec<_> = removal.links.iter().map(|l| l.id.as_str()).collect();
		gone.sort();
		assert_eq!(gone, vec!["ab", "ca"]);
		assert_eq!(sim.raw_links().iter().map(|l| l.id.as_str()).collect::<Vec<_>>(), vec!["bc"]);
		assert_links_resolve(&sim);
		let bc = &sim.raw_links()[0];
		assert_eq!((bc.source.as_str(), bc.target.as_str()), ("b", "c"));
	}

	#[test]
	fn removing_unknown_ids_changes_nothing() {
		let mut sim = sim();
		seeded(&mut sim);
		assert_eq!(sim.remove_by_ids(["nope"]), Removal::default());
		assert_eq!(sim.nodes().len(), 3);
		assert_eq!(sim.links().len(), 3);
	}

	#[test]
	fn pinned_nodes_hold_still() {
		let mut sim = sim();
		seeded(&mut sim);
		sim.pin_at("a", Point::new(10.0, 20.0)).unwrap();
		for _ in 0..20 {
			sim.tick();
		}
		let a = sim.node("a").unwrap();
		assert_eq!((a.x, a.y, a.vx, a.vy), (10.0, 20.0, 0.0, 0.0));
		sim.unpin("a").unwrap();
		assert!(!sim.node("a").unwrap().is_pinned());
		assert_eq!(sim.pin("zz"), Err(TopologyError::UnknownId("zz".into())));
	}

	#[test]
	fn set_all_pinned_snapshots_positions() {
		let mut sim = sim();
		seeded(&mut sim);
		sim.set_all_pinned(true);
		assert!(sim.nodes().iter().all(|n| n.fx == Some(n.x) && n.fy == Some(n.y)));
		sim.set_all_pinned(false);
		assert!(sim.nodes().iter().all(|n| !n.is_pinned()));
	}

	#[test]
	fn stop_is_idempotent_and_blocks_ticks() {
		let mut sim = sim();
		seeded(&mut sim);
		sim.stop();
		sim.stop();
		assert!(!sim.is_running());
		let before = sim.nodes().to_vec();
		assert!(!sim.tick());
		assert_eq!(sim.nodes(), &before[..]);
		sim.restart();
		assert!(sim.tick());
	}

	#[test]
	fn alpha_decays_until_the_simulation_stops() {
		let mut sim = sim();
		seeded(&mut sim);
		let mut ticks = 0;
		while sim.tick() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never cooled down");
		}
		assert!(sim.alpha() < sim.params().force.alpha_min);
		assert!((290..=310).contains(&ticks));
	}

	#[test]
	fn alpha_target_keeps_the_layout_warm() {
		let mut sim = sim();
		seeded(&mut sim);
		sim.set_alpha_target(0.3);
		for _ in 0..2000 {
			assert!(sim.tick());
		}
		assert!((sim.alpha() - 0.3).abs() < 0.01);
	}

	#[test]
	fn empty_graph_ticks_are_harmless() {
		let mut sim = sim();
		sim.set_graph(Vec::new(), Vec::new());
		assert!(sim.tick());
		assert!(sim.nodes().is_empty());
	}

	#[test]
	fn layout_separates_and_centers_nodes() {
		let mut sim = sim();
		sim.set_graph(
			vec![GraphNode::new("a", "A").at(400.0, 300.0), GraphNode::new("b", "B").at(401.0, 300.0)],
			vec![LinkRaw::new("ab", "a", "b", "1-1")],
		);
		while sim.tick() {}
		let (a, b) = (sim.node("a").unwrap(), sim.node("b").unwrap());
		let gap = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
		assert!(gap > 60.0, "nodes still overlap: {gap}");
		let mid = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		assert!((mid.0 - 400.0).abs() < 1.0 && (mid.1 - 300.0).abs() < 1.0);
	}

	#[test]
	fn find_uses_graph_space() {
		let mut sim = sim();
		seeded(&mut sim);
		assert_eq!(sim.find(Point::new(452.0, 301.0), 30.0).map(|n| n.id.as_str()), Some("b"));
		assert!(sim.find(Point::new(0.0, 0.0), 30.0).is_none());
	}
}
