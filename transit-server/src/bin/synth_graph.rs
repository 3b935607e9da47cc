//! Build a timetabled graph snapshot from a bare link network.
//!
//! Reads a base network (stops and links with distances), names the stops,
//! synthesises bus schedules, adds walking transfers, keeps the largest
//! connected component and writes the snapshot the server loads.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::graph::{
    GraphBuilder, GraphError, ScheduleSynth, Snapshot, StopNames, SynthConfig, TransferConfig,
    add_walk_transfers, random_network, save_snapshot,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base network JSON (stops and links). A random network is generated
    /// when the file does not exist.
    base: PathBuf,

    /// Where to write the timetabled snapshot.
    out: PathBuf,

    /// Optional `stop_id,stop_name` CSV.
    stops_csv: Option<PathBuf>,

    /// Seed for schedule synthesis and the random fallback network.
    #[arg(default_value_t = 42)]
    seed: u64,

    /// Stops in the random fallback network.
    #[arg(long, default_value_t = 200)]
    random_stops: usize,

    /// Link probability in the random fallback network.
    #[arg(long, default_value_t = 0.05)]
    link_probability: f64,

    /// Walking transfer radius in metres.
    #[arg(long, default_value_t = 300.0)]
    max_walk_m: f64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_server=info,synth_graph=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("synthesis failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), GraphError> {
    let mut builder = load_base(args)?;

    if let Some(path) = &args.stops_csv {
        let named = StopNames::from_path(path)?.apply(&mut builder);
        info!(named, "applied stop names");
    } else {
        StopNames::default().apply(&mut builder);
    }

    ScheduleSynth::new(SynthConfig::default(), args.seed)?.apply(&mut builder);

    let transfers = TransferConfig {
        max_walk_m: args.max_walk_m,
        ..TransferConfig::default()
    };
    add_walk_transfers(&mut builder, &transfers)?;

    let removed = builder.retain_largest_component();
    if removed > 0 {
        info!(removed, "dropped stops outside the largest component");
    }

    let graph = builder.build();
    save_snapshot(&graph, &args.out)?;
    info!(
        stops = graph.stop_count(),
        edges = graph.edge_count(),
        out = %args.out.display(),
        "done"
    );
    Ok(())
}

fn load_base(args: &Args) -> Result<GraphBuilder, GraphError> {
    if !args.base.exists() {
        warn!(
            path = %args.base.display(),
            stops = args.random_stops,
            "base network not found, generating a random one"
        );
        return random_network(args.random_stops, args.link_probability, args.seed);
    }
    let file = std::fs::File::open(&args.base)?;
    let builder = Snapshot::from_reader(std::io::BufReader::new(file))?.into_builder()?;
    info!(
        path = %args.base.display(),
        stops = builder.stop_count(),
        links = builder.edge_count(),
        "base network read"
    );
    Ok(builder)
}
