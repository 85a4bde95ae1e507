use crate::demo::{run_demo, run_feed_query, DemoArgs, FeedQueryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use homeshare::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HomeShare Marketplace",
    about = "Run the HomeShare marketplace service and demo tooling from the command line",
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
    /// Query a listing feed from the terminal
    Feed {
        #[command(subcommand)]
        command: FeedCommand,
    },
    /// Run an end-to-end CLI demo covering login, publishing, and billing
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FeedCommand {
    /// Filter and sort a listing feed, from a CSV export or the demo seed
    Query(FeedQueryArgs),
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
        Command::Feed {
            command: FeedCommand::Query(args),
        } => run_feed_query(args),
        Command::Demo(args) => run_demo(args),
    }
}
