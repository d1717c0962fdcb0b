//! Stable JSON document for saving and diffing graphs.
//!
//! Nodes are written as an object keyed by id in sorted order, edges as an
//! array sorted by `(source, target)`. Every entry sits on its own line so
//! that textual diffs stay readable.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{AttrValue, Attributes, ConceptGraph, GraphEdge, GraphNode};

const NODE_FIELDS: &[&str] = &["label"];
const EDGE_FIELDS: &[&str] = &["id", "source", "target", "label"];

#[derive(Serialize)]
struct NodeEntry<'a> {
    label: &'a str,
    #[serde(flatten)]
    attributes: IndexMap<&'a str, &'a AttrValue>,
}

#[derive(Serialize)]
struct EdgeEntry<'a> {
    id: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(flatten)]
    attributes: IndexMap<&'a str, &'a AttrValue>,
}

/// Attributes that would shadow a dedicated field are left out.
fn extra_attributes<'a>(
    attributes: &'a Attributes,
    reserved: &[&str],
) -> IndexMap<&'a str, &'a AttrValue> {
    attributes
        .iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}

fn node_entry(node: &GraphNode) -> NodeEntry<'_> {
    NodeEntry {
        label: &node.label,
        attributes: extra_attributes(&node.attributes, NODE_FIELDS),
    }
}

fn edge_entry(edge: &GraphEdge) -> EdgeEntry<'_> {
    EdgeEntry {
        id: &edge.id,
        source: &edge.source,
        target: &edge.target,
        label: edge.label.as_deref(),
        attributes: extra_attributes(&edge.attributes, EDGE_FIELDS),
    }
}

/// Render the graph as a line-oriented JSON document.
pub fn to_json_document(graph: &ConceptGraph) -> Result<String, serde_json::Error> {
    let mut nodes: Vec<&GraphNode> = graph.nodes.iter().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut edges: Vec<&GraphEdge> = graph.edges.iter().collect();
    edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

    let mut out = String::from("{\n    \"nodes\": {");
    for (idx, node) in nodes.iter().enumerate() {
        out.push_str(if idx == 0 { "\n" } else { ",\n" });
        out.push_str("        ");
        out.push_str(&serde_json::to_string(&node.id)?);
        out.push_str(": ");
        out.push_str(&serde_json::to_string(&node_entry(node))?);
    }
    if !nodes.is_empty() {
        out.push_str("\n    ");
    }
    out.push_str("},\n    \"edges\": [");
    for (idx, edge) in edges.iter().enumerate() {
        out.push_str(if idx == 0 { "\n" } else { ",\n" });
        out.push_str("        ");
        out.push_str(&serde_json::to_string(&edge_entry(edge))?);
    }
    if !edges.is_empty() {
        out.push_str("\n    ");
    }
    out.push_str("]\n}\n");
    Ok(out)
}
