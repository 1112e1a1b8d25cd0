//! Transit graph construction and all-pairs routing.
//!
//! The router is hand-rolled rather than built on
//! `petgraph::algo::dijkstra`: that function only returns distances, and
//! recovering the full edge path (not just stops) for each query needs
//! predecessor *edges*, not predecessor nodes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::catalogue::Catalogue;

/// What a travel edge represents, looked up by `EdgeIndex`. Wait edges carry
/// no payload beyond their weight and aren't present in this map.
#[derive(Clone, Debug)]
pub struct TravelEdge {
    pub bus: String,
    pub span_count: usize,
}

/// The transit graph: two vertices per stop (`arrived`, `waiting`), wait
/// edges connecting a stop's waiting vertex to its arrived vertex, and
/// travel edges connecting one stop's arrived vertex to another's waiting
/// vertex.
///
/// Wait edges are added first, in ascending stop-name order, so their edge
/// ids occupy `0..stop_count`; travel edges follow, so a travel edge's id
/// minus `stop_count` has no particular meaning on its own but the ordering
/// is deterministic given deterministic input (Design Notes: edge ids are an
/// internal implementation detail here, never surfaced to callers).
pub struct TransitGraph {
    graph: DiGraph<(), f64>,
    waiting_vertex: HashMap<String, NodeIndex>,
    stop_of_vertex: HashMap<NodeIndex, String>,
    travel_edges: HashMap<EdgeIndex, TravelEdge>,
}

impl TransitGraph {
    /// Builds the graph from a catalogue's buses, materialising any
    /// not-yet-memoised pairwise distances along the way via
    /// `Catalogue::distance_or_insert` (Design Notes §9: the distance memo
    /// is fully populated here so query-time `distance()` never mutates).
    pub fn build(catalogue: &mut Catalogue, bus_wait_time: f64, bus_velocity_kmh: f64) -> TransitGraph {
        let stop_names: Vec<String> = catalogue.stops().map(|s| s.name.clone()).collect();
        let n = stop_names.len();

        let mut graph = DiGraph::<(), f64>::new();
        let arrived: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
        let waiting: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();

        let mut waiting_vertex = HashMap::new();
        let mut stop_of_vertex = HashMap::new();
        let mut index_of = HashMap::new();
        for (i, name) in stop_names.iter().enumerate() {
            waiting_vertex.insert(name.clone(), waiting[i]);
            stop_of_vertex.insert(arrived[i], name.clone());
            stop_of_vertex.insert(waiting[i], name.clone());
            index_of.insert(name.clone(), i);
        }

        for i in 0..n {
            graph.add_edge(waiting[i], arrived[i], bus_wait_time);
        }

        // Collect bus routes before mutating the catalogue's distance memo,
        // to avoid holding an immutable borrow of `catalogue` across the
        // `distance_or_insert` calls below.
        let bus_routes: Vec<(String, Vec<String>)> = catalogue
            .buses()
            .map(|b| (b.number.clone(), b.route.stops().to_vec()))
            .collect();

        #[derive(Clone)]
        struct Cell {
            bus: String,
            span_count: usize,
            weight: f64,
        }
        let mut cells: Vec<Option<Cell>> = vec![None; n * n];

        for (bus, stops) in &bus_routes {
            for i in 0..stops.len().saturating_sub(1) {
                let mut meters = 0.0;
                for j in (i + 1)..stops.len() {
                    meters += catalogue.distance_or_insert(&stops[j - 1], &stops[j]);
                    let span_count = j - i;
                    let weight = meters / (bus_velocity_kmh * 1000.0 / 60.0);

                    let u = index_of[&stops[i]];
                    let v = index_of[&stops[j]];
                    let cell_idx = u * n + v;
                    let replace = match &cells[cell_idx] {
                        None => true,
                        Some(existing) => weight < existing.weight,
                    };
                    if replace {
                        cells[cell_idx] = Some(Cell {
                            bus: bus.clone(),
                            span_count,
                            weight,
                        });
                    }
                }
            }
        }

        let mut travel_edges = HashMap::new();
        for u in 0..n {
            for v in 0..n {
                if let Some(cell) = &cells[u * n + v] {
                    let id = graph.add_edge(arrived[u], waiting[v], cell.weight);
                    travel_edges.insert(
                        id,
                        TravelEdge {
                            bus: cell.bus.clone(),
                            span_count: cell.span_count,
                        },
                    );
                }
            }
        }

        TransitGraph {
            graph,
            waiting_vertex,
            stop_of_vertex,
            travel_edges,
        }
    }

    pub fn waiting_vertex_of(&self, stop: &str) -> Option<NodeIndex> {
        self.waiting_vertex.get(stop).copied()
    }

    pub fn stop_of(&self, vertex: NodeIndex) -> Option<&str> {
        self.stop_of_vertex.get(&vertex).map(String::as_str)
    }

    /// The edge's weight and, if it's a travel edge, the bus and span count
    /// it represents. `None` in the second slot means a wait edge.
    pub fn edge_info(&self, edge: EdgeIndex) -> (f64, Option<&TravelEdge>) {
        let weight = *self.graph.edge_weight(edge).expect("edge exists");
        (weight, self.travel_edges.get(&edge))
    }

    pub fn edge_endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph.edge_endpoints(edge).expect("edge exists")
    }

    fn inner(&self) -> &DiGraph<(), f64> {
        &self.graph
    }
}

/// A recovered shortest path: total weight plus the ordered edges traversed.
#[derive(Clone, Debug)]
pub struct RoutePath {
    pub weight: f64,
    pub edges: Vec<EdgeIndex>,
}

/// All-pairs shortest paths over a [`TransitGraph`], with full edge-path
/// recovery per pair. Built once up front (Design Notes §9, option (a)): no
/// handle/release protocol is needed since Rust ownership already lets a
/// caller hold a `RoutePath` for as long as it wants.
pub struct Router {
    distance: Vec<Vec<Option<f64>>>,
    prev_edge: Vec<Vec<Option<EdgeIndex>>>,
}

struct HeapItem {
    dist: f64,
    node: NodeIndex,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl Eq for HeapItem {}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest distance.
        other.dist.partial_cmp(&self.dist).unwrap_or(Ordering::Equal)
    }
}

impl Router {
    pub fn build(graph: &TransitGraph) -> Router {
        let n = graph.inner().node_count();
        let mut distance = vec![vec![None; n]; n];
        let mut prev_edge = vec![vec![None; n]; n];

        for src in graph.inner().node_indices() {
            let (dist_row, prev_row) = dijkstra_from(graph.inner(), src);
            distance[src.index()] = dist_row;
            prev_edge[src.index()] = prev_row;
        }

        Router { distance, prev_edge }
    }

    /// Shortest path from `from` to `to`, or `None` if unreachable.
    /// `from == to` short-circuits to a zero-weight, zero-edge path without
    /// consulting the precomputed tables.
    pub fn build_route(&self, graph: &TransitGraph, from: NodeIndex, to: NodeIndex) -> Option<RoutePath> {
        if from == to {
            return Some(RoutePath {
                weight: 0.0,
                edges: Vec::new(),
            });
        }

        let weight = self.distance[from.index()][to.index()]?;

        let mut edges = Vec::new();
        let mut cur = to;
        while cur != from {
            let edge = self.prev_edge[from.index()][cur.index()]?;
            edges.push(edge);
            let (src, _) = graph.edge_endpoints(edge);
            cur = src;
        }
        edges.reverse();

        Some(RoutePath { weight, edges })
    }
}

/// Single-source Dijkstra returning, for every reachable vertex, the best
/// known distance and the edge used to reach it. Strict less-than weight
/// comparisons (never `<=`) so the first-explored predecessor at a given
/// distance wins ties, matching deterministic edge-insertion order.
fn dijkstra_from(graph: &DiGraph<(), f64>, src: NodeIndex) -> (Vec<Option<f64>>, Vec<Option<EdgeIndex>>) {
    let n = graph.node_count();
    let mut dist = vec![None; n];
    let mut prev = vec![None; n];
    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[src.index()] = Some(0.0);
    heap.push(HeapItem { dist: 0.0, node: src });

    while let Some(HeapItem { dist: d, node: u }) = heap.pop() {
        if visited[u.index()] {
            continue;
        }
        visited[u.index()] = true;

        for edge in graph.edges(u) {
            let v = edge.target();
            let candidate = d + *edge.weight();
            let better = match dist[v.index()] {
                Some(cur) => candidate < cur,
                None => true,
            };
            if better {
                dist[v.index()] = Some(candidate);
                prev[v.index()] = Some(edge.id());
                heap.push(HeapItem { dist: candidate, node: v });
            }
        }
    }

    (dist, prev)
}
