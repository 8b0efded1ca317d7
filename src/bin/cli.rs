// src/bin/cli.rs
use twin_scrape::cli;

fn main() -> color_eyre::Result<()> {
    cli::run()
}
