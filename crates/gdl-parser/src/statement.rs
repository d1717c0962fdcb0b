use chumsky::prelude::*;

/// `[text]` with an optional raw attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDecl<'a> {
    pub text: &'a str,
    /// Inner text of `( ... )`, without the parentheses.
    pub attributes: Option<&'a str>,
}

/// `source -> target` with an optional quoted label and raw attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDecl<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub label: Option<&'a str>,
    pub attributes: Option<&'a str>,
}

/// Classification of one comment-stripped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Node(NodeDecl<'a>),
    Edge(EdgeDecl<'a>),
    Invalid,
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    let (statement, errors) = statement_parser().parse(trimmed).into_output_errors();
    if !errors.is_empty() {
        tracing::trace!(line = trimmed, errors = errors.len(), "statement did not parse");
        return LineKind::Invalid;
    }

    match statement {
        Some(LineKind::Node(decl)) => {
            let text = decl.text.trim();
            if text.is_empty() {
                return LineKind::Invalid;
            }
            LineKind::Node(NodeDecl { text, ..decl })
        }
        Some(LineKind::Edge(decl)) => {
            match (normalize_reference(decl.source), normalize_reference(decl.target)) {
                (Some(source), Some(target)) => LineKind::Edge(EdgeDecl {
                    source,
                    target,
                    label: decl.label.filter(|label| !label.is_empty()),
                    attributes: decl.attributes,
                }),
                _ => LineKind::Invalid,
            }
        }
        _ => LineKind::Invalid,
    }
}

/// Trim a reference and unwrap the `[alias]` spelling.
fn normalize_reference(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let reference = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map_or(trimmed, str::trim);
    (!reference.is_empty()).then_some(reference)
}

// Node declarations are tried first; `[A] -> [B]` fails the node branch
// because text follows the closing bracket.
fn statement_parser<'a>() -> impl Parser<'a, &'a str, LineKind<'a>, extra::Err<Rich<'a, char>>> {
    let inline_ws = any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .to(());

    let attr_list = just('(')
        .ignore_then(any().filter(|c: &char| *c != ')').repeated().to_slice())
        .then_ignore(just(')'));

    let node = just('[')
        .ignore_then(
            any()
                .filter(|c: &char| *c != ']')
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just(']'))
        .then_ignore(inline_ws.clone())
        .then(attr_list.clone().or_not())
        .then_ignore(inline_ws.clone())
        .then_ignore(end())
        .map(|(text, attributes)| LineKind::Node(NodeDecl { text, attributes }));

    let arrow = just("->");

    let source = any()
        .and_is(arrow.clone().not())
        .repeated()
        .at_least(1)
        .to_slice();

    let target = any()
        .filter(|c: &char| !matches!(*c, ':' | '('))
        .repeated()
        .at_least(1)
        .to_slice();

    let quoted_label = just(':')
        .ignore_then(inline_ws.clone())
        .ignore_then(just('"'))
        .ignore_then(any().filter(|c: &char| *c != '"').repeated().to_slice())
        .then_ignore(just('"'))
        .then_ignore(inline_ws.clone());

    let edge = source
        .then_ignore(arrow)
        .then(target)
        .then(quoted_label.or_not())
        .then(attr_list.or_not())
        .then_ignore(inline_ws)
        .then_ignore(end())
        .map(|(((source, target), label), attributes)| {
            LineKind::Edge(EdgeDecl {
                source,
                target,
                label,
                attributes,
            })
        });

    choice((node, edge))
}
