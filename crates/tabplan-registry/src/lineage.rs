//! Lineage graph of sources, transforms and outputs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineageKind {
    Source,
    Transform,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: LineageKind,
    pub metadata: Map<String, Value>,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Staggered grid slot for the n-th node
    fn nth(n: usize) -> Self {
        let n = i32::try_from(n).unwrap_or(i32::MAX / 250);
        Self {
            x: (n % 3) * 250 + 100,
            y: (n / 3) * 150 + 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageGraph {
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

/// Source → transform → output relationships, recorded after each run
#[derive(Debug, Default)]
pub struct LineageTracker {
    graph: Mutex<LineageGraph>,
}

impl LineageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless one with the same id exists
    pub fn add_node(&self, id: &str, kind: LineageKind, label: &str, metadata: Map<String, Value>) {
        let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        if graph.nodes.iter().any(|n| n.id == id) {
            return;
        }

        let position = Position::nth(graph.nodes.len());
        graph.nodes.push(LineageNode {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            metadata,
            position,
        });
    }

    /// Add an edge unless the same source/target pair exists
    pub fn add_edge(&self, source: &str, target: &str, label: &str) {
        let id = format!("e-{}-{}", source, target);
        let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
        if graph.edges.iter().any(|e| e.id == id) {
            return;
        }

        graph.edges.push(LineageEdge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            label: label.to_string(),
        });
    }

    /// Record `source → transform → output` in one call
    pub fn record_transform(&self, run: TransformRecord<'_>) {
        self.add_node(run.source, LineageKind::Source, run.source, rows_metadata(run.source_rows));
        self.add_node(run.transform_id, LineageKind::Transform, run.transform_label, run.transform_metadata);
        self.add_edge(run.source, run.transform_id, "Applied Plan");
        self.add_node(run.output, LineageKind::Output, run.output, rows_metadata(run.output_rows));
        self.add_edge(run.transform_id, run.output, "Generated");
    }

    pub fn graph(&self) -> LineageGraph {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        *self.graph.lock().unwrap_or_else(PoisonError::into_inner) = LineageGraph::default();
    }
}

/// Inputs for [`LineageTracker::record_transform`]
#[derive(Debug, Clone)]
pub struct TransformRecord<'a> {
    pub source: &'a str,
    pub source_rows: usize,
    pub transform_id: &'a str,
    pub transform_label: &'a str,
    pub transform_metadata: Map<String, Value>,
    pub output: &'a str,
    pub output_rows: usize,
}

fn rows_metadata(rows: usize) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("rows".to_string(), Value::from(rows));
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_and_edges_dedup() {
        let tracker = LineageTracker::new();
        tracker.add_node("a", LineageKind::Source, "a", Map::new());
        tracker.add_node("a", LineageKind::Output, "again", Map::new());
        tracker.add_node("b", LineageKind::Output, "b", Map::new());
        tracker.add_edge("a", "b", "x");
        tracker.add_edge("a", "b", "y");

        let graph = tracker.graph();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].kind, LineageKind::Source);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].id, "e-a-b");
        assert_eq!(graph.edges[0].label, "x");
    }

    #[test]
    fn test_grid_positions() {
        assert_eq!(Position::nth(0), Position { x: 100, y: 100 });
        assert_eq!(Position::nth(2), Position { x: 600, y: 100 });
        assert_eq!(Position::nth(4), Position { x: 350, y: 250 });
    }

    #[test]
    fn test_record_transform_chain() {
        let tracker = LineageTracker::new();
        tracker.record_transform(TransformRecord {
            source: "sales.csv",
            source_rows: 3,
            transform_id: "transform_group_summary_table_sales.csv",
            transform_label: "Smart Transform",
            transform_metadata: Map::new(),
            output: "group_summary_table_sales.csv",
            output_rows: 2,
        });

        let graph = tracker.graph();
        let kinds: Vec<_> = graph.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![LineageKind::Source, LineageKind::Transform, LineageKind::Output]);
        assert_eq!(graph.nodes[2].metadata["rows"], Value::from(2));
        assert_eq!(graph.edges.len(), 2);

        tracker.clear();
        assert!(tracker.graph().nodes.is_empty());
    }
}
