use clap::{Parser, ValueEnum};
use pushnav::{FetcherType, RenderMode};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "pushnav")]
#[command(about = "Replays in-page navigation over a site and reports history and document state")]
#[command(version)]
pub struct Args {
    /// Start page URL
    pub url: String,

    /// How pages are fetched
    #[arg(short, long, value_enum, default_value_t = FetcherArg::Http)]
    pub fetcher: FetcherArg,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the configured render mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Steps to replay in order: link:<href>, click:<n>, back, forward
    #[arg(short, long = "step")]
    pub steps: Vec<Step>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FetcherArg {
    Http,
    Webdriver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Direct,
    Animated,
}

/// One replayed user action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Activate a link with this href
    Link(String),
    /// Activate the n-th link (from zero) of the content on screen
    Click(usize),
    Back,
    Forward,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "back" => return Ok(Step::Back),
            "forward" => return Ok(Step::Forward),
            _ => {}
        }
        if let Some(href) = s.strip_prefix("link:") {
            return Ok(Step::Link(href.to_string()));
        }
        if let Some(n) = s.strip_prefix("click:") {
            return n
                .parse()
                .map(Step::Click)
                .map_err(|e| format!("invalid link index {:?}: {}", n, e));
        }
        Err(format!(
            "unknown step {:?}, expected link:<href>, click:<n>, back or forward",
            s
        ))
    }
}

/// Convert from CLI argument fetcher type to internal fetcher type
pub fn convert_fetcher_type(arg: FetcherArg) -> FetcherType {
    match arg {
        FetcherArg::Http => FetcherType::Http,
        FetcherArg::Webdriver => FetcherType::WebDriver,
    }
}

pub fn convert_mode(arg: ModeArg) -> RenderMode {
    match arg {
        ModeArg::Direct => RenderMode::Direct,
        ModeArg::Animated => RenderMode::Animated,
    }
}
