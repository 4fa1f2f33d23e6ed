use crate::assess::{run_assess, run_weights, AssessArgs, WeightsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use preflight_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Preflight Risk",
    about = "Score preflight risk assessments from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one assessment from flags
    Assess(AssessArgs),
    /// Print the standard weight table grouped by category
    Weights(WeightsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Weights(args) => run_weights(args),
    }
}
