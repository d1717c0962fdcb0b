#![forbid(unsafe_code)]

//! Graph model shared by the GDL parser, CLI and wasm bindings.
//!
//! A parse produces a [`ConceptGraph`] of [`GraphNode`]s and [`GraphEdge`]s
//! together with a list of [`GdlWarning`]s. Nothing in this crate performs
//! I/O; loading text and presenting warnings is left to callers.

pub mod analysis;
pub mod config;
pub mod export;

pub use analysis::{DuplicateEdge, GraphReport};
pub use config::{ConfigError, GdlConfig, SuggestionConfig, ValidateConfig};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered attribute map; insertion order is the order keys were first written.
pub type Attributes = IndexMap<String, AttrValue>;

/// A primitive attribute value after type coercion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

/// Largest magnitude at which every integer is exactly representable in an f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn integral_value(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        Some(value as i64)
    } else {
        None
    }
}

// Integral numbers serialize as JSON integers so `count=3` round-trips as `3`.
impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(value) => match integral_value(*value) {
                Some(integer) => serializer.serialize_i64(integer),
                None => serializer.serialize_f64(*value),
            },
            Self::Text(value) => serializer.serialize_str(value),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Canonical id, unique within one graph.
    pub id: String,
    pub label: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    /// Canonical id of the source node.
    pub source: String,
    /// Canonical id of the target node.
    pub target: String,
    pub label: Option<String>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConceptGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl ConceptGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Find a node by canonical id.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Find an edge by id.
    #[must_use]
    pub fn find_edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Edges whose source is the given canonical node id.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    /// Edges whose target is the given canonical node id.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |edge| edge.target == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// The line matched neither the node nor the edge pattern.
    InvalidSyntax,
    /// The edge source was not declared before the edge line.
    SourceNotFound,
    /// The edge target was not declared before the edge line.
    TargetNotFound,
    /// An explicit edge id was already used by an earlier edge.
    DuplicateEdgeId,
}

impl WarningKind {
    /// Stable code for tooling output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSyntax => "gdl/warn/invalid-syntax",
            Self::SourceNotFound => "gdl/warn/source-not-found",
            Self::TargetNotFound => "gdl/warn/target-not-found",
            Self::DuplicateEdgeId => "gdl/warn/duplicate-edge-id",
        }
    }

    #[must_use]
    pub const fn is_unresolved_reference(self) -> bool {
        matches!(self, Self::SourceNotFound | Self::TargetNotFound)
    }
}

/// A non-fatal diagnostic describing a line that was dropped.
///
/// Warnings are plain data: the parser never formats them for display.
/// [`GdlWarning::message`] provides an English rendering for tools that do
/// not localize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdlWarning {
    pub kind: WarningKind,
    /// 1-based source line.
    pub line: usize,
    /// Offending line text, unresolved reference, or reused edge id.
    pub subject: String,
    /// Known aliases close to an unresolved reference, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl GdlWarning {
    #[must_use]
    pub fn new(kind: WarningKind, line: usize, subject: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            subject: subject.into(),
            suggestions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.as_str()
    }

    #[must_use]
    pub fn message(&self) -> String {
        let line = self.line;
        let subject = &self.subject;
        match self.kind {
            WarningKind::InvalidSyntax => format!("Line {line}: invalid syntax: {subject}"),
            WarningKind::SourceNotFound => format!(
                "Line {line}: edge source '{subject}' not defined{}",
                self.suggestion_suffix()
            ),
            WarningKind::TargetNotFound => format!(
                "Line {line}: edge target '{subject}' not defined{}",
                self.suggestion_suffix()
            ),
            WarningKind::DuplicateEdgeId => {
                format!("Line {line}: edge id '{subject}' is already in use")
            }
        }
    }

    fn suggestion_suffix(&self) -> String {
        if self.suggestions.is_empty() {
            String::new()
        } else {
            format!(". Did you mean: {}?", self.suggestions.join(", "))
        }
    }
}

impl fmt::Display for GdlWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AttrValue, Attributes, ConceptGraph, GdlWarning, GraphEdge, GraphNode, WarningKind};

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            label: id.to_uppercase(),
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn integral_numbers_serialize_without_fraction() {
        let mut attributes = Attributes::new();
        attributes.insert("count".to_string(), AttrValue::Number(3.0));
        attributes.insert("ratio".to_string(), AttrValue::Number(2.5));
        attributes.insert("flag".to_string(), AttrValue::Bool(true));
        attributes.insert("tag".to_string(), AttrValue::from("hi"));

        let value = serde_json::to_value(&attributes).expect("serialize attributes");
        assert_eq!(
            value,
            json!({"count": 3, "ratio": 2.5, "flag": true, "tag": "hi"})
        );
    }

    #[test]
    fn attribute_order_is_preserved_in_json() {
        let mut attributes = Attributes::new();
        attributes.insert("zeta".to_string(), AttrValue::from("z"));
        attributes.insert("alpha".to_string(), AttrValue::from("a"));
        let encoded = serde_json::to_string(&attributes).expect("serialize attributes");
        assert_eq!(encoded, r#"{"zeta":"z","alpha":"a"}"#);
    }

    #[test]
    fn attr_value_deserializes_untagged() {
        let decoded: Vec<AttrValue> =
            serde_json::from_str(r#"[true, 4, 1.5, "x"]"#).expect("deserialize values");
        assert_eq!(
            decoded,
            vec![
                AttrValue::Bool(true),
                AttrValue::Number(4.0),
                AttrValue::Number(1.5),
                AttrValue::Text("x".to_string()),
            ]
        );
    }

    #[test]
    fn attr_value_display_matches_source_text() {
        assert_eq!(AttrValue::Number(3.0).to_string(), "3");
        assert_eq!(AttrValue::Number(-0.25).to_string(), "-0.25");
        assert_eq!(AttrValue::Bool(false).to_string(), "false");
        assert_eq!(AttrValue::from("hi there").to_string(), "hi there");
        assert_eq!(AttrValue::Number(1.0).type_name(), "number");
    }

    #[test]
    fn graph_lookup_helpers() {
        let graph = ConceptGraph {
            nodes: vec![node("a"), node("b")],
            edges: vec![GraphEdge {
                id: "e0".to_string(),
                source: "a".to_string(),
                target: "b".to_string(),
                label: None,
                attributes: Attributes::new(),
            }],
        };

        assert_eq!(graph.find_node("b").map(|n| n.label.as_str()), Some("B"));
        assert!(graph.find_node("c").is_none());
        assert!(graph.find_edge("e0").is_some());
        assert_eq!(graph.outgoing("a").count(), 1);
        assert_eq!(graph.incoming("a").count(), 0);
        assert!(!graph.is_empty());
        assert!(ConceptGraph::new().is_empty());
    }

    #[test]
    fn warning_codes_are_stable() {
        let cases = [
            (WarningKind::InvalidSyntax, "gdl/warn/invalid-syntax"),
            (WarningKind::SourceNotFound, "gdl/warn/source-not-found"),
            (WarningKind::TargetNotFound, "gdl/warn/target-not-found"),
            (WarningKind::DuplicateEdgeId, "gdl/warn/duplicate-edge-id"),
        ];
        for (kind, code) in cases {
            assert_eq!(kind.as_str(), code);
        }
        assert!(WarningKind::TargetNotFound.is_unresolved_reference());
        assert!(!WarningKind::InvalidSyntax.is_unresolved_reference());
    }

    #[test]
    fn warning_message_includes_suggestions() {
        let warning = GdlWarning::new(WarningKind::SourceNotFound, 4, "Fooo")
            .with_suggestions(vec!["Foo".to_string(), "f1".to_string()]);
        assert_eq!(
            warning.message(),
            "Line 4: edge source 'Fooo' not defined. Did you mean: Foo, f1?"
        );

        let plain = GdlWarning::new(WarningKind::InvalidSyntax, 2, "what is this");
        assert_eq!(plain.to_string(), "Line 2: invalid syntax: what is this");
    }

    #[test]
    fn warning_json_omits_empty_suggestions() {
        let warning = GdlWarning::new(WarningKind::TargetNotFound, 1, "B");
        let value = serde_json::to_value(&warning).expect("serialize warning");
        assert_eq!(
            value,
            json!({"kind": "TargetNotFound", "line": 1, "subject": "B"})
        );
    }
}
