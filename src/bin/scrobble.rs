use clap::Parser;
use scrobble::{commands, config, Commands, Console};

/// Last.fm scrobbler
#[derive(Parser)]
#[command(
    name = "scrobble",
    version,
    about = "Scrobble tracks, albums and track lists to Last.fm",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let token_path = config::token_path_from_env();
    log::debug!("Token file: {}", token_path.display());

    if let Err(e) = commands::run(args.command, token_path, args.verbose, Console::stdio()).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
