use clap::Parser;
use pushnav::{Fetch, Launch, LinkActivation, NavigationOutcome};
use serde::Serialize;

mod args;
use args::{Args, Step, convert_fetcher_type, convert_mode};

#[derive(Serialize)]
struct Report {
    location: String,
    history: pushnav::SessionHistory,
    document: pushnav::document::DocumentSnapshot,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    ::log::info!("Starting navigation replay at {}", args.url);

    let mut launch = Launch::new(&args.url, convert_fetcher_type(args.fetcher));
    if let Some(path) = &args.config {
        launch = launch.with_config_file(path)?;
    }
    if let Some(mode) = args.mode {
        launch = launch.with_render_mode(convert_mode(mode));
    }

    let navigator = launch.open().await?;

    for (i, step) in args.steps.iter().enumerate() {
        let outcome = match step {
            Step::Link(href) => navigator.activate_link(&LinkActivation::new(href)).await,
            Step::Click(n) => match navigator.links().await.get(*n) {
                Some(href) => navigator.activate_link(&LinkActivation::new(href)).await,
                None => {
                    ::log::warn!("Step {}: no link #{} on the current page", i + 1, n);
                    continue;
                }
            },
            Step::Back => navigator.back().await,
            Step::Forward => navigator.forward().await,
        };
        ::log::info!("Step {} ({:?}): {:?}", i + 1, step, outcome);

        // Nobody animates here, so handoffs finish through their timeout
        if navigator.settled().await.is_some() {
            ::log::debug!("Step {} handoff settled", i + 1);
        }

        match outcome {
            NavigationOutcome::FullNavigation { url } => {
                println!("Full navigation requested to {}", url);
                break;
            }
            NavigationOutcome::Passthrough { href } => {
                println!("Link {:?} left to the browser", href);
            }
            _ => {}
        }
    }

    let report = Report {
        location: navigator.location().await.to_string(),
        history: navigator.inspect(|s| s.history().clone()).await,
        document: navigator.snapshot().await,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    navigator.fetcher().shutdown().await;
    Ok(())
}
