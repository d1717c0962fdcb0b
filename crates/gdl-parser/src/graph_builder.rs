use gdl_core::{AttrValue, ConceptGraph, GdlWarning, GraphEdge, GraphNode, WarningKind};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{
    ParseOptions, ParseResult,
    attributes::parse_attributes,
    ids::IdAllocator,
    statement::{EdgeDecl, NodeDecl},
    suggest::close_matches,
};

/// Per-parse state: the graph under construction, the alias map and the id
/// allocator. Dropped (or turned into a [`ParseResult`]) when the parse ends.
pub(crate) struct GraphBuilder<'o> {
    graph: ConceptGraph,
    /// Alias -> index into `graph.nodes`, in registration order.
    aliases: IndexMap<String, usize>,
    edge_ids: FxHashSet<String>,
    ids: IdAllocator,
    warnings: Vec<GdlWarning>,
    options: &'o ParseOptions,
}

impl<'o> GraphBuilder<'o> {
    pub(crate) fn new(options: &'o ParseOptions) -> Self {
        Self {
            graph: ConceptGraph::new(),
            aliases: IndexMap::new(),
            edge_ids: FxHashSet::default(),
            ids: IdAllocator::new(),
            warnings: Vec::new(),
            options,
        }
    }

    pub(crate) fn add_warning(&mut self, warning: GdlWarning) {
        debug!(
            code = warning.code(),
            line = warning.line,
            subject = %warning.subject,
            "dropping line"
        );
        self.warnings.push(warning);
    }

    /// Declare a node, or return the existing one when its lookup key is
    /// already a known alias. Returns the node's canonical id.
    pub(crate) fn declare_node(&mut self, line: usize, decl: NodeDecl<'_>) -> &str {
        let mut attributes = decl.attributes.map(parse_attributes).unwrap_or_default();
        let explicit_id = attributes.shift_remove("id").map(|value| value.to_string());
        let label = attributes
            .shift_remove("label")
            .map_or_else(|| decl.text.to_string(), |value| value.to_string());

        let lookup_key = explicit_id.clone().unwrap_or_else(|| label.clone());
        if let Some(&index) = self.aliases.get(&lookup_key) {
            debug!(line, alias = %lookup_key, "node already declared; keeping first declaration");
            return &self.graph.nodes[index].id;
        }

        let canonical_id = match explicit_id {
            Some(id) => id,
            None => self.ids.next_node_id(|candidate| self.aliases.contains_key(candidate)),
        };

        let index = self.graph.nodes.len();
        self.aliases.insert(lookup_key, index);
        self.aliases.entry(canonical_id.clone()).or_insert(index);
        if label != canonical_id {
            // A label already claimed by another node stays with that node.
            self.aliases.entry(label.clone()).or_insert(index);
        }

        self.graph.nodes.push(GraphNode {
            id: canonical_id,
            label,
            attributes,
        });
        &self.graph.nodes[index].id
    }

    /// Resolve both endpoints and append the edge, or record why it was
    /// dropped.
    pub(crate) fn declare_edge(&mut self, line: usize, decl: EdgeDecl<'_>) {
        let Some(source) = self.resolve(decl.source) else {
            let warning = self.unresolved(WarningKind::SourceNotFound, line, decl.source);
            self.add_warning(warning);
            return;
        };
        let Some(target) = self.resolve(decl.target) else {
            let warning = self.unresolved(WarningKind::TargetNotFound, line, decl.target);
            self.add_warning(warning);
            return;
        };

        let mut attributes = decl.attributes.map(parse_attributes).unwrap_or_default();
        let explicit_id = attributes.shift_remove("id").map(|value| value.to_string());
        let attribute_label = attributes.shift_remove("label");
        let label = decl
            .label
            .map(str::to_string)
            .or_else(|| attribute_label.as_ref().map(AttrValue::to_string));

        let id = match explicit_id {
            Some(id) if self.edge_ids.contains(&id) => {
                self.add_warning(GdlWarning::new(WarningKind::DuplicateEdgeId, line, id));
                return;
            }
            Some(id) => id,
            None => self.ids.next_edge_id(|candidate| self.edge_ids.contains(candidate)),
        };
        self.edge_ids.insert(id.clone());

        self.graph.edges.push(GraphEdge {
            id,
            source,
            target,
            label,
            attributes,
        });
    }

    fn resolve(&self, alias: &str) -> Option<String> {
        self.aliases
            .get(alias)
            .map(|&index| self.graph.nodes[index].id.clone())
    }

    fn unresolved(&self, kind: WarningKind, line: usize, reference: &str) -> GdlWarning {
        let suggestions = close_matches(
            reference,
            self.aliases.keys().map(String::as_str),
            &self.options.suggestions,
        );
        GdlWarning::new(kind, line, reference).with_suggestions(suggestions)
    }

    pub(crate) fn finish(self) -> ParseResult {
        debug!(
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            warnings = self.warnings.len(),
            "parse finished"
        );
        ParseResult {
            graph: self.graph,
            warnings: self.warnings,
        }
    }
}
