use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use archivist::render::DiskRenderer;
use archivist::{build_site, SiteContext};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Builds the taxonomy pages, feeds and sitemaps for a blog.
#[derive(Parser, Debug)]
#[command(name = "blog")]
struct Args {
    /// Path to the TOML site description.
    #[arg(default_value = "demos/blog/site.toml")]
    site: PathBuf,

    /// Directory the pages are written to.
    #[arg(short, long, default_value = "demos/blog/public")]
    output: PathBuf,

    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose);

    let text = fs::read_to_string(&args.site)
        .with_context(|| format!("failed to read {}", args.site.display()))?;
    let site = SiteContext::from_toml_str(&text)?;

    info!(posts = site.posts.len(), "loaded {}", args.site.display());

    let report = build_site(&site, &DiskRenderer::new(args.output.clone()))?;

    for (generator, pages) in &report.generated {
        println!("{generator:?}: {pages} page(s)");
    }
    for generator in &report.skipped {
        println!("{generator:?}: skipped, layout missing");
    }
    println!("Wrote pages to {:?}", args.output);

    Ok(())
}

fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("archivist=info,warn"),
        1 => EnvFilter::new("archivist=debug,info"),
        _ => EnvFilter::new("archivist=trace,debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
