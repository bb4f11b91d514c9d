use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ecoroute_cli::batch::{run_query, BatchQuery};
use ecoroute_cli::output::{to_json, EcoReport, NetworkListing, OutputFormat, TextRenderer};
use ecoroute_cli::terminal::ColorPalette;
use ecoroute_lib::{
    load_network, plan_independent_route, plan_park_and_walk, plan_park_and_walk_alternatives,
    plan_restricted_route, resolve_dataset, resolve_exclusions, DatasetPaths,
    Error as RouteError, Exclusions, IndependentSummary, LocationId, Network, NoRouteReason,
    ParkAndWalkRequest, ParkAndWalkSummary, RestrictedRequest, RouteOutputKind, RouteSummary,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Driving and park-and-walk route planning")]
struct Cli {
    /// Directory containing Locations.csv and Distances.csv.
    #[arg(long, global = true, env = "ECOROUTE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Explicit location table (requires --distances).
    #[arg(long, global = true, requires = "distances")]
    locations: Option<PathBuf>,

    /// Explicit segment table (requires --locations).
    #[arg(long, global = true, requires = "locations")]
    distances: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the loaded locations and roads.
    Network,
    /// Fastest driving route plus an independent alternative.
    Route {
        #[command(flatten)]
        endpoints: Endpoints,
    },
    /// Fastest driving route that avoids locations or roads and may pass a waypoint.
    Restricted {
        #[command(flatten)]
        endpoints: Endpoints,
        #[command(flatten)]
        avoid: Avoid,
        /// Location the route must pass through.
        #[arg(long = "include-node")]
        include_node: Option<String>,
    },
    /// Drive to a parking location and walk the rest.
    Eco {
        #[command(flatten)]
        endpoints: Endpoints,
        #[command(flatten)]
        avoid: Avoid,
        /// Maximum walking time in minutes.
        #[arg(long = "max-walk")]
        max_walk: u64,
    },
    /// Answer a batch query file.
    Batch {
        /// Query file in the `Key:value` batch format.
        #[arg(long)]
        input: PathBuf,
        /// Write the answer here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct Endpoints {
    /// Starting location (id, name or code).
    #[arg(long = "from")]
    from: String,
    /// Destination location (id, name or code).
    #[arg(long = "to")]
    to: String,
}

#[derive(Args, Debug)]
struct Avoid {
    /// Location to avoid; repeatable.
    #[arg(long = "avoid-node")]
    avoid_nodes: Vec<String>,
    /// Road to avoid, given as `A,B`; repeatable.
    #[arg(long = "avoid-segment")]
    avoid_segments: Vec<String>,
}

impl Avoid {
    fn resolve(&self, network: &Network) -> Result<Exclusions> {
        let segments = self
            .avoid_segments
            .iter()
            .map(|pair| match pair.split_once(',') {
                Some((a, b)) => Ok((a.trim().to_string(), b.trim().to_string())),
                None => bail!("invalid --avoid-segment '{pair}', expected A,B"),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(resolve_exclusions(
            network,
            self.avoid_nodes.as_slice(),
            segments.as_slice(),
        )?)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let renderer = TextRenderer::new(ColorPalette::detect());

    let network = load(&cli)?;
    let output = match &cli.command {
        Command::Network => handle_network(&network, cli.format, renderer)?,
        Command::Route { endpoints } => handle_route(&network, endpoints, cli.format, renderer)?,
        Command::Restricted {
            endpoints,
            avoid,
            include_node,
        } => handle_restricted(
            &network,
            endpoints,
            avoid,
            include_node.as_deref(),
            cli.format,
            renderer,
        )?,
        Command::Eco {
            endpoints,
            avoid,
            max_walk,
        } => handle_eco(&network, endpoints, avoid, *max_walk, cli.format, renderer)?,
        Command::Batch { input, output } => {
            let answer = handle_batch(&network, input)?;
            if let Some(path) = output {
                fs::write(path, &answer)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("batch answer written to {}", path.display());
                return Ok(());
            }
            answer
        }
    };

    print!("{output}");
    Ok(())
}

fn load(cli: &Cli) -> Result<Network> {
    let paths = match (&cli.locations, &cli.distances) {
        (Some(locations), Some(distances)) => DatasetPaths {
            locations: locations.clone(),
            distances: distances.clone(),
        },
        _ => resolve_dataset(cli.data_dir.as_deref())
            .context("failed to locate the Locations.csv / Distances.csv dataset")?,
    };
    load_network(&paths).with_context(|| {
        format!(
            "failed to load dataset from {} and {}",
            paths.locations.display(),
            paths.distances.display()
        )
    })
}

fn resolve_endpoints(network: &Network, args: &Endpoints) -> Result<(LocationId, LocationId)> {
    Ok((network.resolve(&args.from)?, network.resolve(&args.to)?))
}

fn handle_network(network: &Network, format: OutputFormat, renderer: TextRenderer) -> Result<String> {
    let listing = NetworkListing::from_network(network);
    match format {
        OutputFormat::Json => to_json(&listing),
        OutputFormat::Text => Ok(renderer.network(&listing, network)),
    }
}

fn handle_route(
    network: &Network,
    args: &Endpoints,
    format: OutputFormat,
    renderer: TextRenderer,
) -> Result<String> {
    let (source, target) = resolve_endpoints(network, args)?;
    let route = plan_independent_route(network, source, target)?;
    let summary = IndependentSummary::from_route(network, &route);
    match format {
        OutputFormat::Json => to_json(&summary),
        OutputFormat::Text => Ok(renderer.independent(&summary)),
    }
}

fn handle_restricted(
    network: &Network,
    args: &Endpoints,
    avoid: &Avoid,
    include_node: Option<&str>,
    format: OutputFormat,
    renderer: TextRenderer,
) -> Result<String> {
    let (source, target) = resolve_endpoints(network, args)?;
    let mut request = RestrictedRequest::new(source, target).with_exclusions(avoid.resolve(network)?);
    if let Some(waypoint) = include_node {
        request = request.through(network.resolve(waypoint)?);
    }

    let path = plan_restricted_route(network, &request)?;
    let summary = RouteSummary::from_path(RouteOutputKind::Restricted, network, &path);
    match format {
        OutputFormat::Json => to_json(&summary),
        OutputFormat::Text => Ok(renderer.route(&summary)),
    }
}

fn handle_eco(
    network: &Network,
    args: &Endpoints,
    avoid: &Avoid,
    max_walk: u64,
    format: OutputFormat,
    renderer: TextRenderer,
) -> Result<String> {
    let (source, target) = resolve_endpoints(network, args)?;
    let request =
        ParkAndWalkRequest::new(source, target, max_walk).with_exclusions(avoid.resolve(network)?);

    let report = match plan_park_and_walk(network, &request) {
        Ok(route) => EcoReport::Route {
            route: ParkAndWalkSummary::from_route(network, &route),
        },
        Err(RouteError::NoParkAndWalkRoute { reason }) => {
            let alternatives = if reason == NoRouteReason::WalkingLimitExceeded {
                match plan_park_and_walk_alternatives(network, &request) {
                    Ok(routes) => routes
                        .iter()
                        .map(|route| ParkAndWalkSummary::from_route(network, route))
                        .collect(),
                    Err(RouteError::NoAlternativeRoutes { .. }) => Vec::new(),
                    Err(err) => return Err(err.into()),
                }
            } else {
                Vec::new()
            };
            EcoReport::Approximate {
                reason,
                alternatives,
            }
        }
        Err(err) => return Err(err.into()),
    };

    match format {
        OutputFormat::Json => to_json(&report),
        OutputFormat::Text => Ok(renderer.eco(&report)),
    }
}

fn handle_batch(network: &Network, input: &Path) -> Result<String> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read batch input {}", input.display()))?;
    let query = BatchQuery::parse(&text)
        .with_context(|| format!("invalid batch input {}", input.display()))?;
    run_query(network, &query)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
