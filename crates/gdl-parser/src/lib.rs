#![forbid(unsafe_code)]

//! Parser for the Graph Definition Language (GDL).
//!
//! GDL is line oriented. Every line is one of:
//!
//! ```text
//! [Label](id=x, key=value)          node declaration
//! source -> target : "label" (k=v)  edge declaration
//! # comment                         ignored, as is a trailing unquoted `# ...`
//! ```
//!
//! Parsing is a single top-to-bottom pass and never fails: lines that cannot
//! be used are reported as [`GdlWarning`]s and skipped. Edges may only refer
//! to nodes declared on earlier lines.

mod attributes;
mod comment;
mod graph_builder;
mod ids;
mod statement;
mod suggest;

use gdl_core::{ConceptGraph, GdlConfig, GdlWarning, SuggestionConfig, WarningKind};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub use attributes::{coerce_value, number_to_string, parse_attributes};
pub use comment::strip_comment;
pub use ids::IdAllocator;
pub use statement::{EdgeDecl, LineKind, NodeDecl, classify_line};
pub use suggest::{close_matches, similarity};

use graph_builder::GraphBuilder;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParseResult {
    pub graph: ConceptGraph,
    pub warnings: Vec<GdlWarning>,
}

impl ParseResult {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[must_use]
    pub fn warnings_of(&self, kind: WarningKind) -> Vec<&GdlWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.kind == kind)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOptions {
    pub suggestions: SuggestionConfig,
}

impl From<&GdlConfig> for ParseOptions {
    fn from(config: &GdlConfig) -> Self {
        Self {
            suggestions: config.suggestions.clone(),
        }
    }
}

/// Parse GDL text with default options.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    parse_with_options(input, &ParseOptions::default())
}

#[must_use]
pub fn parse_with_options(input: &str, options: &ParseOptions) -> ParseResult {
    let mut builder = GraphBuilder::new(options);

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let kind = classify_line(strip_comment(line));
        tracing::trace!(line = line_number, ?kind, "classified line");
        match kind {
            LineKind::Blank => {}
            LineKind::Node(decl) => {
                builder.declare_node(line_number, decl);
            }
            LineKind::Edge(decl) => builder.declare_edge(line_number, decl),
            LineKind::Invalid => builder.add_warning(GdlWarning::new(
                WarningKind::InvalidSyntax,
                line_number,
                line.trim(),
            )),
        }
    }

    builder.finish()
}

/// Compact JSON summary of a parse: counts plus rendered warnings.
#[must_use]
pub fn parse_summary_json(parsed: &ParseResult) -> String {
    json!({
        "node_count": parsed.graph.nodes.len(),
        "edge_count": parsed.graph.edges.len(),
        "warning_count": parsed.warnings.len(),
        "warnings": parsed
            .warnings
            .iter()
            .map(GdlWarning::message)
            .collect::<Vec<_>>(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use gdl_core::{AttrValue, SuggestionConfig, WarningKind};
    use proptest::prelude::*;

    use super::{ParseOptions, ParseResult, parse, parse_summary_json, parse_with_options, strip_comment};

    fn edge_endpoints(result: &ParseResult) -> Vec<(&str, &str)> {
        result
            .graph
            .edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str()))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = parse("");
        assert!(result.graph.is_empty());
        assert!(!result.has_warnings());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let result = parse("# heading\n\n   \n# [A]\n");
        assert!(result.graph.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn redeclaration_keeps_first_node() {
        let result = parse("[A](id=x)\n[A](id=x)");
        assert_eq!(result.graph.nodes.len(), 1);
        assert_eq!(result.graph.nodes[0].id, "x");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn redeclaration_does_not_merge_attributes() {
        let result = parse("[A](color=red)\n[A](color=blue, size=2)");
        assert_eq!(result.graph.nodes.len(), 1);
        let attributes = &result.graph.nodes[0].attributes;
        assert_eq!(attributes.get("color"), Some(&AttrValue::from("red")));
        assert!(attributes.get("size").is_none());
    }

    #[test]
    fn explicit_id_and_label_both_resolve() {
        let result = parse("[Foo](id=f1)\n[Bar](id=b1)\nf1 -> Bar\nFoo -> b1");
        assert_eq!(result.graph.nodes.len(), 2);
        assert_eq!(edge_endpoints(&result), vec![("f1", "b1"), ("f1", "b1")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn forward_references_are_rejected() {
        let result = parse("A -> B\n[A]\n[B]");
        assert_eq!(result.graph.nodes.len(), 2);
        assert!(result.graph.edges.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::SourceNotFound);
        assert_eq!(result.warnings[0].subject, "A");
        assert_eq!(result.warnings[0].line, 1);
    }

    #[test]
    fn unresolved_target_is_reported() {
        let result = parse("[A]\nA -> B");
        assert!(result.graph.edges.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::TargetNotFound);
        assert_eq!(result.warnings[0].subject, "B");
        assert_eq!(result.warnings[0].line, 2);
    }

    #[test]
    fn quoted_hash_survives_comment_stripping() {
        let result = parse("[A]\n[B]\n[A] -> [B] : \"uses # sign\"\n[A] -> [B] : \"ok\" # trailing note");
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        let labels: Vec<Option<&str>> = result
            .graph
            .edges
            .iter()
            .map(|edge| edge.label.as_deref())
            .collect();
        assert_eq!(labels, vec![Some("uses # sign"), Some("ok")]);
    }

    #[test]
    fn node_attributes_are_coerced() {
        let result = parse("[N](id=n, flag=true, count=3, tag=hi)");
        let node = &result.graph.nodes[0];
        assert_eq!(node.id, "n");
        assert_eq!(node.label, "N");
        assert_eq!(node.attributes.len(), 3);
        assert_eq!(node.attributes.get("flag"), Some(&AttrValue::Bool(true)));
        assert_eq!(node.attributes.get("count"), Some(&AttrValue::Number(3.0)));
        assert_eq!(node.attributes.get("tag"), Some(&AttrValue::from("hi")));
    }

    #[test]
    fn label_attribute_overrides_bracket_text() {
        let result = parse("[short](label=A much longer label)\nshort -> short");
        let node = &result.graph.nodes[0];
        assert_eq!(node.label, "A much longer label");
        assert!(node.attributes.is_empty());
        // The bracket text is not an alias; only the id and label are.
        assert_eq!(result.warnings[0].kind, WarningKind::SourceNotFound);
    }

    #[test]
    fn numeric_id_is_used_as_text() {
        let result = parse("[One](id=1)\n[Two](id=2)\n1 -> 2");
        assert_eq!(result.graph.nodes[0].id, "1");
        assert_eq!(edge_endpoints(&result), vec![("1", "2")]);
    }

    #[test]
    fn generated_id_claims_its_alias() {
        let result = parse("[A]\n[n0]\n[B]\nn0 -> B");
        let nodes: Vec<(&str, &str)> = result
            .graph
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.label.as_str()))
            .collect();
        assert_eq!(nodes, vec![("n0", "A"), ("n1", "B")]);
        assert_eq!(edge_endpoints(&result), vec![("n0", "n1")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn generated_ids_are_sequential() {
        let result = parse("[A]\n[B]\nA -> B\nB -> A");
        let node_ids: Vec<&str> = result.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let edge_ids: Vec<&str> = result.graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(node_ids, vec!["n0", "n1"]);
        assert_eq!(edge_ids, vec!["e0", "e1"]);
    }

    #[test]
    fn edge_label_precedence_and_attribute_lifting() {
        let result = parse(
            "[A]\n[B]\nA -> B : \"quoted\" (label=attr, id=r1, weight=2)\nA -> B (label=attr)",
        );
        let first = &result.graph.edges[0];
        assert_eq!(first.id, "r1");
        assert_eq!(first.label.as_deref(), Some("quoted"));
        assert_eq!(first.attributes.len(), 1);
        assert_eq!(first.attributes.get("weight"), Some(&AttrValue::Number(2.0)));

        let second = &result.graph.edges[1];
        assert_eq!(second.id, "e0");
        assert_eq!(second.label.as_deref(), Some("attr"));
        assert!(second.attributes.is_empty());
    }

    #[test]
    fn duplicate_explicit_edge_id_is_dropped() {
        let result = parse("[A]\n[B]\nA -> B (id=r)\nB -> A (id=r)");
        assert_eq!(result.graph.edges.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DuplicateEdgeId);
        assert_eq!(result.warnings[0].subject, "r");
        assert_eq!(result.warnings[0].line, 4);
    }

    #[test]
    fn invalid_lines_carry_their_text() {
        let result = parse("[A]\nnot gdl at all\n[B]");
        assert_eq!(result.graph.nodes.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::InvalidSyntax);
        assert_eq!(result.warnings[0].subject, "not gdl at all");
        assert_eq!(result.warnings[0].line, 2);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let result = parse("[A]\r\n[B]\r\nA -> B\r\n");
        assert_eq!(result.graph.nodes.len(), 2);
        assert_eq!(result.graph.edges.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unresolved_reference_carries_suggestions() {
        let result = parse("[Concept]\n[Map]\nconcept -> Mpa");
        assert_eq!(result.warnings[0].kind, WarningKind::SourceNotFound);
        assert_eq!(result.warnings[0].suggestions, vec!["Concept"]);
    }

    #[test]
    fn suggestions_can_be_disabled() {
        let options = ParseOptions {
            suggestions: SuggestionConfig {
                enabled: false,
                ..SuggestionConfig::default()
            },
        };
        let result = parse_with_options("[Concept]\nconcept -> Concept", &options);
        assert!(result.warnings[0].suggestions.is_empty());
    }

    #[test]
    fn summary_json_reports_counts() {
        let result = parse("[A]\n[B]\nA -> B\nA -> C");
        let summary = parse_summary_json(&result);
        assert!(summary.contains("\"node_count\":2"));
        assert!(summary.contains("\"edge_count\":1"));
        assert!(summary.contains("\"warning_count\":1"));
        assert!(summary.contains("edge target 'C' not defined"));
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = parse("[A](id=a, weight=1.5, on=false)\n[B]\na -> B : \"x\" (kind=uses)\nbogus");
        let encoded = serde_json::to_string(&result).expect("serialize result");
        let decoded: ParseResult = serde_json::from_str(&encoded).expect("deserialize result");
        assert_eq!(decoded, result);
    }

    fn gdl_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z ]{1,6}",
            "\\[[A-Za-z ]{0,6}\\]",
            "\\[[A-Za-z]{1,4}\\]\\((id|label|w)=[a-z0-9]{1,3}\\)",
            "[A-Za-z]{1,4} -> [A-Za-z]{1,4}",
            "[A-Za-z]{1,4} -> [A-Za-z]{1,4} : \"[a-z #]{0,6}\"",
            "# [a-z ]{0,8}",
            ".{0,24}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_parse_is_total_and_deterministic(input in ".{0,256}") {
            let first = parse(&input);
            let second = parse(&input);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_every_content_line_has_an_outcome(lines in prop::collection::vec(gdl_line(), 0..16)) {
            let input = lines.join("\n");
            let result = parse(&input);
            let has_content = input
                .lines()
                .any(|line| !strip_comment(line).trim().is_empty());
            let outcomes = result.warnings.len() + result.graph.nodes.len() + result.graph.edges.len();
            if has_content {
                prop_assert!(outcomes >= 1);
            }
        }

        #[test]
        fn prop_ids_are_unique_and_edges_resolve(lines in prop::collection::vec(gdl_line(), 0..24)) {
            let result = parse(&lines.join("\n"));
            let mut node_ids: Vec<&str> = result.graph.nodes.iter().map(|n| n.id.as_str()).collect();
            node_ids.sort_unstable();
            node_ids.dedup();
            prop_assert_eq!(node_ids.len(), result.graph.nodes.len());

            let mut edge_ids: Vec<&str> = result.graph.edges.iter().map(|e| e.id.as_str()).collect();
            edge_ids.sort_unstable();
            edge_ids.dedup();
            prop_assert_eq!(edge_ids.len(), result.graph.edges.len());

            for edge in &result.graph.edges {
                prop_assert!(result.graph.find_node(&edge.source).is_some());
                prop_assert!(result.graph.find_node(&edge.target).is_some());
            }
        }
    }
}
