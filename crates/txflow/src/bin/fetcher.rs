use clap::Parser;
use eyre::{eyre, WrapErr};

use txflow::cli::FetcherCli;
use txflow_core::esplora::HttpEsploraClient;
use txflow_core::fetch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let args = FetcherCli::parse();
    txflow::init_tracing();

    let config = args.fetch_config()?;
    let client = HttpEsploraClient::new(&config.base_url, config.timeout, config.delay)
        .context("configure Esplora client")?;
    println!("Using Esplora API: {}", client.base_url());

    let summary = fetch::run(&client, &config, &args.txid_list, &args.output)
        .await
        .context("fetch transactions")?;

    println!();
    println!(
        "Fetched {}/{} transactions into {}",
        summary.written,
        summary.requested,
        args.output.display()
    );
    for skipped in &summary.skipped {
        println!("  skipped {}: {}", skipped.txid, skipped.reason);
    }

    if summary.requested > 0 && summary.written == 0 {
        return Err(eyre!("no transactions fetched successfully"));
    }

    println!();
    println!("Render the flow graph with:");
    println!("  flow_to_dot {} bitcoin_flow.dot", args.output.display());
    Ok(())
}
