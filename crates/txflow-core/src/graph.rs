use std::collections::HashMap;

use bitcoin::Amount;

use crate::labels::{shorten_identifier, LabelMap};
use crate::types::TxRecord;

// ==============================================================================
// Flow Graph Model
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Transaction,
    Address,
}

#[derive(Debug, Clone)]
pub struct FlowNode {
    /// Raw txid or address; unique within a graph.
    pub id: String,
    pub kind: NodeKind,
    /// Resolved display label, if any source provided one.
    pub label: Option<String>,
    /// `false` for transactions only referenced by another record's inputs.
    pub in_file: bool,
    /// Total value paid to this node by outputs in the file.
    pub received: Amount,
}

impl FlowNode {
    /// The name shown in the rendered graph: the label when present,
    /// otherwise the raw id (addresses optionally shortened).
    pub fn display_name(&self, shorten_addresses: bool) -> String {
        match (&self.label, self.kind) {
            (Some(label), _) => label.clone(),
            (None, NodeKind::Address) if shorten_addresses => shorten_identifier(&self.id),
            (None, _) => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Funding transaction → spending transaction, for one input.
    Spend,
    /// Transaction → receiving address, for one output.
    Pay,
}

/// A directed value-flow edge. `index` is the spent output index for
/// `Spend` edges and the output position for `Pay` edges.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub index: u32,
    /// Unknown for inputs whose value could not be resolved.
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub transactions: usize,
    pub addresses: usize,
    pub edges: usize,
    pub total_output: Amount,
}

/// Nodes in first-seen order, deduplicated by id; edges in record order,
/// never deduplicated.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    index: HashMap<String, usize>,
    edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let count = |kind: NodeKind| self.nodes.iter().filter(|n| n.kind == kind).count();
        let total_output = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Pay)
            .filter_map(|e| e.amount)
            .fold(Amount::ZERO, |acc, v| acc.checked_add(v).unwrap_or(Amount::MAX));
        GraphStats {
            transactions: count(NodeKind::Transaction),
            addresses: count(NodeKind::Address),
            edges: self.edges.len(),
            total_output,
        }
    }

    /// Return the node for `id`, inserting it if absent. An existing node
    /// keeps its kind.
    fn ensure_node(&mut self, id: &str, kind: NodeKind) -> &mut FlowNode {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                self.nodes.push(FlowNode {
                    id: id.to_owned(),
                    kind,
                    label: None,
                    in_file: false,
                    received: Amount::ZERO,
                });
                let idx = self.nodes.len() - 1;
                self.index.insert(id.to_owned(), idx);
                idx
            }
        };
        &mut self.nodes[idx]
    }
}

// ==============================================================================
// Flow Graph Builder
// ==============================================================================

/// Build the value-flow graph for `records`.
///
/// Every input adds a `prev_txid → txid` edge and every output a
/// `txid → address` edge, so a graph built from N records with I inputs and
/// O outputs has exactly I + O edges and at most N + I + O nodes. Labels are
/// resolved once per node through `labels`.
pub fn build_flow_graph(records: &[TxRecord], labels: &LabelMap) -> FlowGraph {
    let mut graph = FlowGraph::default();
    let mut record_labels: HashMap<&str, &str> = HashMap::new();

    // Declare every record's transaction first so they lead the node list.
    for record in records {
        graph.ensure_node(&record.txid, NodeKind::Transaction).in_file = true;
        if let Some(label) = record.label.as_deref() {
            record_labels.insert(&record.txid, label);
        }
    }

    for record in records {
        for input in &record.vin {
            graph.ensure_node(&input.txid, NodeKind::Transaction);
            graph.edges.push(FlowEdge {
                source: input.txid.clone(),
                target: record.txid.clone(),
                kind: EdgeKind::Spend,
                index: input.vout,
                amount: input.value,
            });
        }

        for (n, output) in record.vout.iter().enumerate() {
            let node = graph.ensure_node(&output.address, NodeKind::Address);
            node.received = node
                .received
                .checked_add(output.value)
                .unwrap_or(Amount::MAX);
            graph.edges.push(FlowEdge {
                source: record.txid.clone(),
                target: output.address.clone(),
                kind: EdgeKind::Pay,
                index: n as u32,
                amount: Some(output.value),
            });
        }
    }

    for node in &mut graph.nodes {
        let record_label = record_labels.get(node.id.as_str()).copied();
        node.label = labels.resolve(&node.id, record_label).map(str::to_owned);
    }

    let stats = graph.stats();
    tracing::debug!(
        transactions = stats.transactions,
        addresses = stats.addresses,
        edges = stats.edges,
        "built flow graph"
    );
    graph
}
