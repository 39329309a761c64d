use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use heatspot::{schedule, AreaScope, Config, FilterSpec, FirmsSource, Heatspot, HeatspotError};
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot root, overrides `data_dir` from the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// GeoJSON boundary file, overrides `regions_path`
    #[arg(long, global = true)]
    regions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download FIRMS hotspots and store them
    FetchFirms {
        #[arg(long)]
        source: Option<FirmsSource>,
        /// `world`, a country code such as `THA`, or `west,south,east,north`
        #[arg(long)]
        area: Option<AreaScope>,
        /// Number of trailing days, 1 to 10
        #[arg(long)]
        days: Option<u8>,
    },
    /// Fetch the current weather for a city and store it
    FetchWeather {
        #[arg(long)]
        city: Option<String>,
    },
    /// Show the transaction budget of the FIRMS map key
    KeyStatus,
    /// Show the date ranges FIRMS has data for
    Availability {
        #[arg(long)]
        source: Option<FirmsSource>,
    },
    /// List the country codes FIRMS accepts
    Countries,
    /// Fetch and store on the configured interval until interrupted
    Run,
    /// Aggregate stored hotspots and write the map layers
    Map {
        /// Single acquisition date
        #[arg(long, conflicts_with_all = ["from", "to"], required_unless_present = "from")]
        date: Option<NaiveDate>,
        /// First date of an inclusive range
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last date of an inclusive range
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// Output directory for the layer files
        #[arg(long, default_value = "map")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), HeatspotError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(path) = cli.regions {
        config.regions_path = Some(path);
    }
    let client = Heatspot::new(config).await?;

    match cli.command {
        Commands::FetchFirms { source, area, days } => {
            let written = client
                .fetch_hotspots()
                .maybe_source(source)
                .maybe_area(area)
                .maybe_day_range(days)
                .call()
                .await?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::FetchWeather { city } => {
            let record = client
                .fetch_weather()
                .maybe_city(city.as_deref())
                .call()
                .await?;
            println!(
                "{} {} {}: {} {:?} K, humidity {:?}%",
                record.name.as_deref().unwrap_or("-"),
                record.acq_date,
                record.acq_time,
                record.weather_description.as_deref().unwrap_or("-"),
                record.temp,
                record.humidity
            );
        }
        Commands::KeyStatus => {
            let status = client.key_status().await?;
            println!(
                "{} of {} transactions used per {} ({} remaining)",
                status.current_transactions,
                status.transaction_limit,
                status.transaction_interval,
                status.remaining()
            );
        }
        Commands::Availability { source } => {
            println!("{}", client.firms().data_availability(source).await?);
        }
        Commands::Countries => {
            println!("{}", client.firms().countries().await?);
        }
        Commands::Run => schedule::run(&client).await,
        Commands::Map {
            date,
            from,
            to,
            out,
        } => {
            let spec = match (date, from, to) {
                (Some(date), _, _) => FilterSpec::exact(date),
                (None, Some(start), Some(end)) => FilterSpec::range(start, end),
                _ => Cli::command()
                    .error(
                        ErrorKind::MissingRequiredArgument,
                        "either --date or --from and --to is required",
                    )
                    .exit(),
            };
            if spec.is_inverted() {
                warn!("Range {} is inverted and selects no observations", spec);
            }

            let snapshot = client.reload().await?;
            if !snapshot.skipped().is_empty() {
                warn!("{} partition file(s) skipped", snapshot.skipped().len());
            }
            let counts = snapshot.region_counts(&spec)?;
            for entry in counts.iter() {
                println!("{}\t{}", entry.id, entry.count);
            }
            info!(
                "{} observations in regions, {} outside",
                counts.total(),
                counts.unassigned()
            );
            let (choropleth, heat) = client.render(&snapshot, &spec, &out)?;
            println!("{}", choropleth.display());
            println!("{}", heat.display());
        }
    }
    Ok(())
}
