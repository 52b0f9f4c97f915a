use clap::Parser;
use eyre::WrapErr;

use txflow::cli::FlowToDotCli;
use txflow_core::flow;

fn main() -> eyre::Result<()> {
    let args = FlowToDotCli::parse();
    txflow::init_tracing();

    let config = args.graph_config()?;
    println!("Parsing transactions from: {}", args.input.display());
    let summary = flow::run(&config, &args.input, &args.output).context("build flow graph")?;

    match summary.format {
        Some(format) => println!("Detected {format} records"),
        None => println!("No readable records found; writing an empty graph"),
    }
    println!(
        "Found {} transactions ({} skipped lines), {} addresses, {} edges",
        summary.records, summary.skipped, summary.stats.addresses, summary.stats.edges
    );
    println!("DOT file saved as: {}", args.output.display());
    println!(
        "To visualize: dot -Tpng {} -o bitcoin_flow.png",
        args.output.display()
    );
    Ok(())
}
