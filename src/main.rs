use std::process;

use blocksite::{
    application::error::AppError,
    cache::CacheFile,
    config::{self, CacheArgs, CacheCommand, Command, Settings},
    infra::{site, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain().join(": caused by: ");

    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Some(Command::Cache(args)) => run_cache(settings, args).await,
        Some(Command::Build(_)) | None => run_build(settings).await,
    }
}

async fn run_build(settings: Settings) -> Result<(), AppError> {
    site::build_site(&settings).await?;
    Ok(())
}

async fn run_cache(settings: Settings, args: CacheArgs) -> Result<(), AppError> {
    match args.command {
        CacheCommand::Clear(_) => {
            let cache_file = CacheFile::new(&settings.cache.path);
            let removed = cache_file.clear().await?;
            info!(
                target = "blocksite::cache",
                path = %cache_file.path().display(),
                removed,
                "render cache cleared"
            );
            Ok(())
        }
    }
}
