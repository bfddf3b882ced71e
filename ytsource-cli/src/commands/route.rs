//! Route command - classify identifiers.

use anyhow::Result;
use clap::Args;
use futures::future::join_all;
use tracing::debug;
use ytsource_manager::{Classification, YoutubeSourceManager};
use ytsource_store::SourceConfig;

use crate::output::{JsonFormatter, RouteOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the route command.
#[derive(Args)]
pub struct RouteArgs {
    /// Identifiers to classify.
    #[arg(required = true)]
    pub identifiers: Vec<String>,

    /// Probe watch_videos links over the network and route the redirect.
    #[arg(long)]
    pub resolve: bool,

    /// Treat search prefixes as unroutable.
    #[arg(long)]
    pub no_search: bool,

    /// Ignore bare video ids.
    #[arg(long)]
    pub no_direct_video_ids: bool,

    /// Ignore bare playlist ids.
    #[arg(long)]
    pub no_direct_playlist_ids: bool,
}

/// Runs the route command.
pub async fn run(args: &RouteArgs, cli: &Cli) -> Result<ExitCode> {
    let config = SourceConfig::load_from(&cli.config_path()).await?;

    let mut options = config.source_options();
    if args.no_search {
        options.allow_search = false;
    }
    if args.no_direct_video_ids {
        options.allow_direct_video_ids = false;
    }
    if args.no_direct_playlist_ids {
        options.allow_direct_playlist_ids = false;
    }

    let manager = YoutubeSourceManager::builder()
        .options(options)
        .transport(config.transport_config())
        .build()?;
    config.apply_to(&manager);

    debug!(count = args.identifiers.len(), resolve = args.resolve, "Routing identifiers");

    let outputs: Vec<RouteOutput> = if args.resolve {
        join_all(
            args.identifiers
                .iter()
                .map(|identifier| resolve_one(&manager, identifier)),
        )
        .await
    } else {
        args.identifiers
            .iter()
            .map(|identifier| classify_one(&manager, identifier))
            .collect()
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for output in &outputs {
                println!("{}", formatter.format_route(output));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            if outputs.len() == 1 {
                println!("{}", formatter.format(&outputs[0])?);
            } else {
                println!("{}", formatter.format(&outputs)?);
            }
        }
    }

    if outputs.iter().any(RouteOutput::is_error) {
        Ok(ExitCode::RouteFailed)
    } else {
        Ok(ExitCode::Success)
    }
}

fn classify_one(manager: &YoutubeSourceManager, identifier: &str) -> RouteOutput {
    match manager.router().classify(identifier) {
        Ok(Classification::Route(route)) => RouteOutput::routed(identifier, route),
        Ok(Classification::FollowRedirect { url }) => RouteOutput::probe(identifier, url.as_str()),
        Err(e) => RouteOutput::failed(identifier, &e),
    }
}

async fn resolve_one(manager: &YoutubeSourceManager, identifier: &str) -> RouteOutput {
    let mut http = manager.interface();
    match manager.router().route(&mut http, identifier).await {
        Ok(route) => RouteOutput::routed(identifier, route),
        Err(e) => RouteOutput::failed(identifier, &e),
    }
}
