use clap::Parser;
use std::io;
use teavision::{cli, commands, config, error, storage};
use cli::{Cli, Commands};
use commands::Context;
use config::Config;
use error::Result;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let store = storage::FileStore::open(&Config::storage_path()?);
    let backend_override = cli.backend_url.clone().or_else(Config::backend_override);
    let mut ctx = Context::new(config, store, backend_override);

    ctx.authorize(cli.command.route())?;

    match cli.command {
        Commands::Register { email, password } => commands::register(&mut ctx, email, password)?,
        Commands::Login { email, password } => commands::login(&mut ctx, email, password)?,
        Commands::Logout => commands::logout(&mut ctx)?,
        Commands::Status => commands::status(&ctx),
        Commands::Predict { image, image_type } => {
            commands::predict(&ctx, image, image_type).await?
        }
        Commands::Multi { paths, format, output } => {
            commands::multi(&ctx, &paths, &format, output.as_deref()).await?
        }
        Commands::Compare { paths, image_type, format, output } => {
            commands::compare(&ctx, &paths, image_type, &format, output.as_deref()).await?
        }
        Commands::Crop { paths, predict, zip, output } => {
            commands::crop(&ctx, &paths, predict, zip, output.as_deref()).await?
        }
        Commands::Polyphenol { csv, rows, format, output } => {
            commands::polyphenol(&ctx, csv.as_deref(), &rows, &format, output.as_deref()).await?
        }
        Commands::Settings { url, reset } => commands::settings(&mut ctx, url, reset)?,
        Commands::Health { watch, interval } => commands::health(&ctx, watch, interval).await?,
        Commands::Shell { url } => commands::shell(&ctx, url)?,
    }

    Ok(())
}
