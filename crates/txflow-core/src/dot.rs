//! Graphviz DOT serialisation of a [`FlowGraph`].
//!
//! Node IDs are the raw txids/addresses so edges stay unambiguous; the
//! display name goes into the `label` attribute.

use crate::graph::{EdgeKind, FlowEdge, FlowGraph, FlowNode, NodeKind};
use crate::types::format_btc;

const HEADER: &[&str] = &[
    "digraph bitcoin_flow {",
    "    rankdir=LR;",
    "    graph [fontname=\"monospace\"];",
    "    node [fontname=\"monospace\", fontsize=10];",
    "    edge [fontname=\"Arial\", fontsize=8];",
];

pub fn render_dot(graph: &FlowGraph, shorten_addresses: bool) -> String {
    let mut lines: Vec<String> = HEADER.iter().map(|line| (*line).to_owned()).collect();

    lines.push(String::new());
    lines.extend(
        graph
            .nodes()
            .iter()
            .map(|node| render_node(node, shorten_addresses)),
    );

    lines.push(String::new());
    lines.extend(graph.edges().iter().map(render_edge));

    lines.push("}".to_owned());
    let mut dot = lines.join("\n");
    dot.push('\n');
    dot
}

fn render_node(node: &FlowNode, shorten_addresses: bool) -> String {
    let label = escape(&node.display_name(shorten_addresses));
    let attrs = match node.kind {
        NodeKind::Transaction if node.in_file => format!("label=\"{label}\", shape=box"),
        NodeKind::Transaction => format!("label=\"{label}\", shape=box, style=dashed"),
        NodeKind::Address => format!(
            "label=\"{label}\", shape=ellipse, tooltip=\"received {} BTC\"",
            format_btc(node.received)
        ),
    };
    format!("    \"{}\" [{attrs}];", escape(&node.id))
}

fn render_edge(edge: &FlowEdge) -> String {
    let mut attrs = Vec::new();
    if let Some(amount) = edge.amount {
        attrs.push(format!("label=\"{}\"", format_btc(amount)));
    }
    if edge.kind == EdgeKind::Spend {
        attrs.push(format!("tooltip=\"{}:{}\"", escape(&edge.source), edge.index));
    }

    let head = format!(
        "    \"{}\" -> \"{}\"",
        escape(&edge.source),
        escape(&edge.target)
    );
    if attrs.is_empty() {
        format!("{head};")
    } else {
        format!("{head} [{}];", attrs.join(", "))
    }
}

/// Escape a string for use inside a double-quoted DOT ID.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_flow_graph;
    use crate::labels::LabelMap;
    use crate::test_util::{input, output, record};
    use crate::types::IdEntry;

    #[test]
    fn genesis_scenario_renders_expected_dot() {
        let mut labels = LabelMap::new();
        labels.add_id_entries(&[IdEntry {
            txid: "deadbeef".into(),
            label: Some("Genesis".into()),
        }]);
        let graph = build_flow_graph(
            &[record("deadbeef", vec![], vec![output("bc1qxyz", 150_000_000)])],
            &labels,
        );

        let dot = render_dot(&graph, true);
        let expected = "\
digraph bitcoin_flow {
    rankdir=LR;
    graph [fontname=\"monospace\"];
    node [fontname=\"monospace\", fontsize=10];
    edge [fontname=\"Arial\", fontsize=8];

    \"deadbeef\" [label=\"Genesis\", shape=box];
    \"bc1qxyz\" [label=\"bc1qxyz\", shape=ellipse, tooltip=\"received 1.5 BTC\"];

    \"deadbeef\" -> \"bc1qxyz\" [label=\"1.5\"];
}
";
        assert_eq!(dot, expected);
    }

    #[test]
    fn spend_edges_render_amount_when_known() {
        let mut rec = record("t2", vec![input("t1", 1), input("t0", 0)], vec![]);
        rec.vin[0].value = Some(bitcoin::Amount::from_sat(30_000_000));
        let graph = build_flow_graph(&[rec], &LabelMap::new());
        let dot = render_dot(&graph, true);

        assert!(dot.contains("    \"t1\" -> \"t2\" [label=\"0.3\", tooltip=\"t1:1\"];"));
        assert!(dot.contains("    \"t0\" -> \"t2\" [tooltip=\"t0:0\"];"));
        assert!(dot.contains("    \"t1\" [label=\"t1\", shape=box, style=dashed];"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut labels = LabelMap::new();
        labels.insert_address_label("a", "say \"hi\"\\now");
        let graph = build_flow_graph(&[record("t", vec![], vec![output("a", 1)])], &labels);
        let dot = render_dot(&graph, true);
        assert!(dot.contains(r#"[label="say \"hi\"\\now", shape=ellipse"#), "got {dot}");
    }

    #[test]
    fn empty_graph_is_valid_dot() {
        let dot = render_dot(&FlowGraph::default(), true);
        assert!(dot.starts_with("digraph bitcoin_flow {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(!dot.contains("->"));
    }
}
