use anyhow::{Context, Result};
use clap::Parser;

mod args;
mod error;
mod format;
mod href;
mod listing;
mod model;
mod pagination;
mod query;
mod render;
mod sanitize;
mod server;
mod site;
mod sitemap;
mod store;
mod suggest;
mod trending;

use args::{Args, Command};
use site::Site;
use store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .format_timestamp(None)
        .filter_module("start_open_source", args.log_level)
        .init();

    let site = Site::new(&args.site_url, args.google_verification);
    log::debug!("Site URL: {}", site.url);

    match args.command {
        Command::Serve(serve_args) => {
            let store = Store::new(
                args.supabase_url.as_deref(),
                args.supabase_key.as_deref(),
            )
            .context("Failed building the HTTP client of the data store")?;
            server::command(site, store, serve_args).await
        }
        Command::Sitemap => sitemap::command(&site),
    }
}
