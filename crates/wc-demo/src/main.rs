//! wc demo - renders the translated demo page to stdout

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wc_demo::{DemoConfig, Page};
use wc_i18n::{FilePhrases, StaticPhrases};

#[derive(Debug, Parser)]
#[command(name = "wc-demo", version, about = "Render the translated demo page")]
struct Args {
    /// Preferred language, repeat in order of preference (overrides the config)
    #[arg(short, long = "lang", value_name = "LOCALE")]
    languages: Vec<String>,

    /// JSON phrase file; the built-in phrases are used when absent
    #[arg(short, long, value_name = "FILE")]
    phrases: Option<PathBuf>,

    /// JSON demo configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// After rendering, switch to these languages and render again
    #[arg(long = "then", value_name = "LOCALE")]
    then: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("starting wc demo");

    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if !args.languages.is_empty() {
        config.languages = args.languages.clone();
    }

    let mut page = smol::block_on(async {
        match &args.phrases {
            Some(path) => Page::render(&config, &FilePhrases::new(path)).await,
            None => Page::render(&config, &StaticPhrases).await,
        }
    })
    .context("rendering demo page")?;

    tracing::info!(locale = page.locale().unwrap_or("none"), "page rendered");
    println!("{}", page.html());

    if !args.then.is_empty() {
        page.set_languages(&args.then).context("switching languages")?;
        tracing::info!(locale = page.locale().unwrap_or("none"), "page re-rendered");
        println!("{}", page.html());
    }
    Ok(())
}
