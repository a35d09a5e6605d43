//! tola-embed - sanitize SVGs and format embeddable HTML fragments.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use tola_embed::{config::EmbedConfig, debug, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = EmbedConfig::load(&cli.config)?;
    debug!("config"; "loaded {}", cli.config.display());

    match &cli.command {
        Commands::Svg { args } => cli::svg::run(args, &config.svg),
        Commands::Video {
            url,
            title,
            privacy,
        } => print(cli::format::video(url, title, *privacy, &config.video)),
        Commands::Range { start, end, html } => {
            print(cli::format::range(start, end.as_deref(), *html, &config.date))
        }
        Commands::Tel { number, text } => print(cli::format::tel(number, text.as_deref())),
    }
}

fn print(fragment: Result<String>) -> Result<()> {
    println!("{}", fragment?);
    Ok(())
}
