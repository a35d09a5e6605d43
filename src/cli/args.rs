//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use tola_embed::config::CONFIG_FILE;

/// Inline-embedding helpers for SVG, links, dates and videos
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: embed.toml)
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sanitize SVG files for inline embedding
    #[command(visible_alias = "s")]
    Svg {
        #[command(flatten)]
        args: SvgArgs,
    },

    /// Print iframe markup for a YouTube or Vimeo link
    #[command(visible_alias = "v")]
    Video {
        /// Video URL or iframe embed code
        url: String,

        /// iframe title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Privacy-enhanced embed URL (overrides [video] config)
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        privacy: Option<bool>,
    },

    /// Format a date range
    #[command(visible_alias = "r")]
    Range {
        /// Start date (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS][Z])
        start: String,

        /// End date, defaults to the start
        end: Option<String>,

        /// Wrap both ends in <time> elements
        #[arg(long)]
        html: bool,
    },

    /// Print a telephone link
    #[command(visible_alias = "t")]
    Tel {
        /// Phone number as written
        number: String,

        /// Link text, defaults to the number
        text: Option<String>,
    },
}

/// Svg command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SvgArgs {
    /// SVG files to sanitize
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Write `<stem>.svg` files into this directory instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Title text (overrides [svg] config)
    #[arg(long)]
    pub title: Option<String>,

    /// Root fill color (overrides [svg] config)
    #[arg(long)]
    pub fill: Option<String>,

    /// Root attributes to remove (comma-separated)
    #[arg(long = "remove-attr", value_delimiter = ',')]
    pub remove_attributes: Vec<String>,

    /// Style properties to remove everywhere (comma-separated)
    #[arg(long = "remove-style", value_delimiter = ',')]
    pub remove_styles: Vec<String>,

    /// Extra root attribute, `key=value` (repeatable)
    #[arg(long = "attr", value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,

    /// Print the unsanitized document instead
    #[arg(long)]
    pub source: bool,
}

/// Parse `key=value`.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty attribute name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tola-embed").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_svg_args() {
        let cli = parse(&[
            "svg",
            "a.svg",
            "b.svg",
            "-o",
            "out",
            "--remove-attr",
            "width,height",
            "--remove-style=fill",
            "--attr",
            "role=img",
            "--attr",
            "data-x=a=b",
            "--title",
            "Logo",
        ]);
        let Commands::Svg { args } = cli.command else {
            panic!("expected svg command");
        };
        assert_eq!(args.paths, [PathBuf::from("a.svg"), PathBuf::from("b.svg")]);
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.remove_attributes, ["width", "height"]);
        assert_eq!(args.remove_styles, ["fill"]);
        assert_eq!(
            args.attributes,
            [
                ("role".to_string(), "img".to_string()),
                ("data-x".to_string(), "a=b".to_string())
            ]
        );
        assert_eq!(args.title.as_deref(), Some("Logo"));
        assert!(!args.source);
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["tel", "555-0100", "-v", "-C", "site/embed.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site/embed.toml"));
        assert!(matches!(cli.command, Commands::Tel { text: None, .. }));
    }

    #[test]
    fn test_default_config_path() {
        let cli = parse(&["range", "2024-06-15"]);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));
        assert!(matches!(cli.command, Commands::Range { end: None, html: false, .. }));
    }

    #[test]
    fn test_video_privacy_flag() {
        let cli = parse(&["video", "https://youtu.be/dQw4w9WgXcQ", "--privacy"]);
        assert!(matches!(cli.command, Commands::Video { privacy: Some(true), .. }));
        let cli = parse(&["video", "https://youtu.be/dQw4w9WgXcQ", "--privacy", "false"]);
        assert!(matches!(cli.command, Commands::Video { privacy: Some(false), .. }));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["tola-embed", "svg"]).is_err());
        assert!(Cli::try_parse_from(["tola-embed", "svg", "a.svg", "--attr", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["tola-embed", "svg", "a.svg", "--attr", "=x"]).is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("aria-hidden=true"),
            Ok(("aria-hidden".to_string(), "true".to_string()))
        );
        assert_eq!(parse_key_value("k="), Ok(("k".to_string(), String::new())));
        assert!(parse_key_value("k").is_err());
    }
}
