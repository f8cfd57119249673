//! Pipeline diagram derived from a plan
//!
//! Presentation layers render a plan as source → transform nodes → output.
//! The diagram is linear: one transform node per plan table.

use serde::{Deserialize, Serialize};

use crate::{Operation, Plan};

const NODE_Y: i32 = 180;
const FIRST_TRANSFORM_X: i32 = 320;
const NODE_SPACING: i32 = 220;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub data: NodeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Transform,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineGraph {
    pub nodes: Vec<PipelineNode>,
    pub connections: Vec<PipelineEdge>,
}

impl Plan {
    /// Build the source → transforms → export diagram for this plan
    pub fn pipeline_graph(&self) -> PipelineGraph {
        let mut nodes = vec![node("source-1", NodeKind::Source, "Data Source", 100, "Database")];
        let mut connections = Vec::new();

        let mut last_id = "source-1".to_string();
        let mut x = FIRST_TRANSFORM_X;

        for (idx, table) in self.tables.iter().enumerate() {
            // The passthrough table adds nothing next to real transforms
            if table.is_default() && self.tables.len() > 1 {
                continue;
            }

            let id = format!("transform-{}", idx);
            let icon = match table.operations.first() {
                Some(Operation::GroupBy { .. }) => "GitMerge",
                Some(Operation::OrderBy { .. }) => "ListOrdered",
                _ => "Filter",
            };

            nodes.push(node(&id, NodeKind::Transform, &table.title, x, icon));
            connections.push(PipelineEdge {
                from: last_id,
                to: id.clone(),
            });
            last_id = id;
            x += NODE_SPACING;
        }

        nodes.push(node("export-1", NodeKind::Output, "Export Result", x, "Download"));
        connections.push(PipelineEdge {
            from: last_id,
            to: "export-1".to_string(),
        });

        PipelineGraph { nodes, connections }
    }
}

fn node(id: &str, kind: NodeKind, label: &str, x: i32, icon: &str) -> PipelineNode {
    PipelineNode {
        id: id.to_string(),
        kind,
        label: label.to_string(),
        x,
        y: NODE_Y,
        data: NodeData {
            icon: icon.to_string(),
        },
    }
}
