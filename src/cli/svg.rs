//! `svg` subcommand: sanitize files for inline embedding.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tola_embed::{
    config::SvgConfig,
    debug, log,
    logger::ProgressLine,
    svg::ScalableVectorGraphic,
    utils::text::count_noun,
};

use super::SvgArgs;

/// Fold command-line overrides into the `[svg]` config.
///
/// Scalars replace config values; lists and attributes extend them.
pub fn merge_args(base: &SvgConfig, args: &SvgArgs) -> SvgConfig {
    let mut config = base.clone();
    config
        .remove_attributes
        .extend(args.remove_attributes.iter().cloned());
    config.remove_styles.extend(args.remove_styles.iter().cloned());
    config.attributes.extend(args.attributes.iter().cloned());
    if args.title.is_some() {
        config.title.clone_from(&args.title);
    }
    if args.fill.is_some() {
        config.fill.clone_from(&args.fill);
    }
    config
}

/// Load and sanitize one file, returning the markup to emit.
pub fn render(path: &Path, config: &SvgConfig, source: bool) -> Result<String> {
    let mut svg = ScalableVectorGraphic::new();
    svg.load(path)?;
    if source {
        return Ok(svg.embed_source_dom()?);
    }
    config.apply(&mut svg)?;
    Ok(svg.embed()?)
}

/// Output path for `input` inside `dir`.
fn output_path(dir: &Path, input: &Path) -> PathBuf {
    // `b.icon.svg` -> `b.icon.svg`, not `b.svg`
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".svg");
    dir.join(name)
}

/// Run the `svg` subcommand.
pub fn run(args: &SvgArgs, base: &SvgConfig) -> Result<()> {
    let config = merge_args(base, args);
    debug!("svg"; "effective config: {:?}", config);

    let Some(dir) = &args.output else {
        if let [path] = args.paths.as_slice() {
            let markup = render(path, &config, args.source)
                .with_context(|| format!("failed to sanitize `{}`", path.display()))?;
            println!("{markup}");
            return Ok(());
        }
        bail!("multiple inputs need an output directory (-o)");
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create `{}`", dir.display()))?;

    let total = args.paths.len();
    let progress = ProgressLine::new("svg", &[("svg", total)]);
    let failed = AtomicBool::new(false);

    args.paths.par_iter().for_each(|path| {
        let written = render(path, &config, args.source).and_then(|markup| {
            let out = output_path(dir, path);
            fs::write(&out, markup)
                .with_context(|| format!("failed to write `{}`", out.display()))
        });
        match written {
            Ok(()) => progress.inc("svg"),
            Err(e) => {
                failed.store(true, Ordering::Relaxed);
                log!("error"; "{}: {:#}", path.display(), e);
            }
        }
    });

    let done = progress.get("svg").unwrap_or_default();
    progress.finish();
    log!("svg"; "wrote {} to {}", count_noun(done, "file"), dir.display());

    if failed.load(Ordering::Relaxed) {
        bail!("{} failed", count_noun(total - done, "file"));
    }
    Ok(())
}
