mod verbose;

use std::path::Path;

use clap::{FromArgMatches as _, IntoApp as _, Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use twelf::Layer;

use ratecard_common::{models::StreamRequest, Conf};

const JSON_CONF: &str = "ratecard.json";
const TOML_CONF: &str = "ratecard.toml";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(flatten)]
    verbose: verbose::Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the add-on web server
    Serve,
    /// Look up a single title and print the stream response
    Stream {
        /// Media type, `movie` or `series`
        kind: String,
        /// IMDb title id, optionally with a `:season:episode` suffix
        id: String,
        /// Print only the ratings card instead of the JSON response
        #[clap(long)]
        card: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), ratecard_common::Report> {
    ratecard_common::install()?;

    let matches = Cli::command().args(&Conf::clap_args()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let mut layers = Vec::with_capacity(4);
    if Path::new(JSON_CONF).exists() {
        layers.push(Layer::Json(JSON_CONF.into()));
    }
    if Path::new(TOML_CONF).exists() {
        layers.push(Layer::Toml(TOML_CONF.into()));
    }
    layers.push(Layer::Env(Some("RATECARD_".to_string())));
    layers.push(Layer::Clap(matches));

    let conf = Conf::with_layers(&layers)?;

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(cli.verbose.log_level_filter().into()));

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Serve => ratecard_command_serve::run(&conf).await?,
        Commands::Stream { kind, id, card } => {
            let handler = ratecard_stream::handler_from_conf(&conf);
            let response = handler.handle(&StreamRequest { kind, id }).await;

            if card {
                for stream in &response.streams {
                    println!("{}", stream.description);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
    }

    Ok(())
}
