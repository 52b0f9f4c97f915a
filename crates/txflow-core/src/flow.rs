//! Graph builder pipeline: intermediate record file → flow graph → DOT file.

use std::path::Path;

use crate::dot::render_dot;
use crate::error::CoreError;
use crate::graph::{build_flow_graph, GraphStats};
use crate::labels::LabelMap;
use crate::records::{read_records, RecordFormat};

/// Default output path when none is given on the command line.
pub const DEFAULT_DOT_FILE: &str = "bitcoin_flow.dot";

/// Default side file mapping addresses to labels.
pub const DEFAULT_ADDR_MAP_FILE: &str = "addr_map.json";

/// Everything a graph-building run needs, built once from CLI arguments.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub labels: LabelMap,
    /// Shorten unlabelled addresses to `abcd...wxyz`.
    pub shorten_addresses: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            labels: LabelMap::new(),
            shorten_addresses: true,
        }
    }
}

#[derive(Debug)]
pub struct FlowSummary {
    /// `None` when no line of the input matched a known format.
    pub format: Option<RecordFormat>,
    pub records: usize,
    pub skipped: usize,
    pub stats: GraphStats,
}

/// Read `input`, build the flow graph and write DOT to `output`.
///
/// Malformed records are skipped; an empty or fully unparseable input still
/// produces a valid, empty graph. Only I/O failures are errors.
pub fn run(config: &GraphConfig, input: &Path, output: &Path) -> Result<FlowSummary, CoreError> {
    let parsed = read_records(input)?;
    tracing::info!(
        path = %input.display(),
        records = parsed.records.len(),
        skipped = parsed.skipped,
        "parsed transaction records"
    );

    let graph = build_flow_graph(&parsed.records, &config.labels);
    let dot = render_dot(&graph, config.shorten_addresses);
    std::fs::write(output, dot).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            e.kind(),
            format!("write DOT file {}: {e}", output.display()),
        ))
    })?;

    let stats = graph.stats();
    tracing::info!(
        path = %output.display(),
        transactions = stats.transactions,
        addresses = stats.addresses,
        edges = stats.edges,
        "wrote DOT file"
    );

    Ok(FlowSummary {
        format: parsed.format,
        records: parsed.records.len(),
        skipped: parsed.skipped,
        stats,
    })
}
