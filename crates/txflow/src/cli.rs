use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;

use txflow_core::esplora::{PrevoutMode, DEFAULT_BASE_URL};
use txflow_core::fetch::{duration_from_secs, FetchConfig};
use txflow_core::flow::{GraphConfig, DEFAULT_ADDR_MAP_FILE, DEFAULT_DOT_FILE};
use txflow_core::ids::load_id_list;
use txflow_core::records::RecordFormat;

/// Fetch transactions from an Esplora API and save their inputs and outputs
/// for `flow_to_dot`.
#[derive(Parser, Debug)]
#[command(name = "fetcher", version, about, arg_required_else_help = true)]
pub struct FetcherCli {
    /// Identifier list: one txid per line, optionally followed by `,label`.
    pub txid_list: PathBuf,

    /// File to write transaction records to (created or truncated).
    pub output: PathBuf,

    /// Esplora API base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "TXFLOW_BASE_URL")]
    pub base_url: String,

    /// Seconds to sleep after every API request.
    #[arg(long, default_value_t = 0.1)]
    pub delay: f64,

    /// Output format: `json` (one JSON object per line) or `text`.
    #[arg(long, default_value = "json")]
    pub format: RecordFormat,

    /// Input value resolution: `embedded` uses only the prevout data in the
    /// response, `lookup` also fetches funding transactions when missing.
    #[arg(long, default_value = "lookup")]
    pub prevout: PrevoutMode,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 10.0)]
    pub timeout: f64,
}

impl FetcherCli {
    pub fn fetch_config(&self) -> eyre::Result<FetchConfig> {
        Ok(FetchConfig {
            base_url: self.base_url.clone(),
            delay: duration_from_secs(self.delay, "delay")?,
            timeout: duration_from_secs(self.timeout, "timeout")?,
            format: self.format,
            prevout: self.prevout,
        })
    }
}

/// Convert fetched transaction records into a Graphviz DOT flow graph.
#[derive(Parser, Debug)]
#[command(name = "flow_to_dot", version, about, arg_required_else_help = true)]
pub struct FlowToDotCli {
    /// Transaction records written by `fetcher` (JSON lines or text).
    pub input: PathBuf,

    /// DOT file to write.
    #[arg(default_value = DEFAULT_DOT_FILE)]
    pub output: PathBuf,

    /// JSON object mapping address → label. Defaults to `addr_map.json`
    /// in the working directory, loaded only if present.
    #[arg(long)]
    pub addr_map: Option<PathBuf>,

    /// Identifier list whose inline `txid,label` entries label transactions.
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Show unlabelled addresses in full instead of `abcd...wxyz`.
    #[arg(long)]
    pub full_addresses: bool,
}

impl FlowToDotCli {
    pub fn graph_config(&self) -> eyre::Result<GraphConfig> {
        let mut config = GraphConfig {
            shorten_addresses: !self.full_addresses,
            ..Default::default()
        };

        if let Some(path) = &self.labels {
            let entries = load_id_list(path).context("load identifier list labels")?;
            config.labels.add_id_entries(&entries);
            tracing::info!(path = %path.display(), entries = entries.len(), "loaded inline labels");
        }

        match &self.addr_map {
            Some(path) => {
                let count = config
                    .labels
                    .add_address_map_file(path)
                    .context("load address map")?;
                tracing::info!(path = %path.display(), entries = count, "loaded address map");
            }
            None => {
                config
                    .labels
                    .add_address_map_file_if_present(std::path::Path::new(DEFAULT_ADDR_MAP_FILE));
            }
        }

        Ok(config)
    }
}
