mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod render;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use audio::analysis::{analyze, AnalysisParams};
use audio::decode::{decode_audio, AudioData};
use audio::features::AnalysisReport;
use cli::Cli;
use config::Config;
use render::plot::render_flux_chart;
use render::text::TextOverlay;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => {
            let cfg = config::load_config(&path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => Config::default(),
    };

    let params = resolve_params(&cli, &config);
    params.validate().context("Invalid analysis parameters")?;
    let max_duration = resolve_max_duration(&cli, &config);

    log::info!("introflux - spectral change detection");
    log::info!("Input: {}", cli.input.display());
    match max_duration {
        Some(secs) => log::info!("Analysing at most {:.1}s", secs),
        None => log::info!("Analysing the whole file"),
    }

    // 1. Decode audio
    let audio = decode_with_spinner(&cli, max_duration)?;

    // 2. Analyze
    let outcome = analyze(&audio, &params)?;

    // 3. Report
    if cli.json {
        let json = report::to_json(&cli.input, audio.duration(), &params, &outcome, cli.print_flux)?;
        println!("{}", json);
    } else {
        if cli.print_flux {
            print!("{}", report::flux_table(&outcome));
        }
        println!("{}", report::summary(&outcome));
    }

    // 4. Plot
    if let Some(ref plot_path) = cli.plot {
        plot(&cli, &config, &outcome, plot_path)
            .with_context(|| format!("Failed to render plot to {}", plot_path.display()))?;
    }

    Ok(())
}

/// CLI flag, then config file, then built-in default.
fn resolve_params(cli: &Cli, config: &Config) -> AnalysisParams {
    let cfg = &config.analysis;
    AnalysisParams {
        n_fft: cli.n_fft.unwrap_or(cfg.n_fft),
        hop_length: cli.hop_length.unwrap_or(cfg.hop_length),
        freq_cutoff: cli.freq_cutoff.unwrap_or(cfg.freq_cutoff),
        smoothing_window: cli.window.unwrap_or(cfg.smoothing_window),
        alpha: cli.alpha.unwrap_or(cfg.alpha),
        center: cfg.center && !cli.no_center,
    }
}

/// `None` means decode everything; a non-positive limit also disables it.
fn resolve_max_duration(cli: &Cli, config: &Config) -> Option<f64> {
    if cli.full {
        return None;
    }
    cli.duration
        .or(config.input.max_duration)
        .filter(|&secs| secs > 0.0)
}

fn decode_with_spinner(cli: &Cli, max_duration: Option<f64>) -> Result<AudioData> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Decoding {}", cli.input.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let decoded = decode_audio(&cli.input, max_duration);
    spinner.finish_and_clear();
    Ok(decoded?)
}

fn plot(cli: &Cli, config: &Config, report: &AnalysisReport, path: &std::path::Path) -> Result<()> {
    let (width, height) = (config.plot.width, config.plot.height);
    if width < 32 || height < 32 {
        anyhow::bail!("Plot size {}x{} is too small", width, height);
    }

    let font_path = cli.font.as_deref().or(config.plot.font.as_deref());
    let font_size = (height as f32 / 24.0).max(11.0);
    let labels = TextOverlay::locate(font_path, font_size);
    if labels.is_none() {
        log::warn!("No usable font found; plot will have no text labels (set --font)");
    }

    let canvas = render_flux_chart(
        &report.smoothed_flux,
        &report.detection,
        width,
        height,
        labels.as_ref(),
    );
    encode::ffmpeg::write_image(path, &canvas.pixels, canvas.width, canvas.height)
}
