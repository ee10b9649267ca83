use clap::Parser;
use std::path::PathBuf;

/// Unset flags fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug)]
#[command(
    name = "introflux",
    about = "Find the moment an audio recording changes abruptly (intro/outro transitions)"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Config file (defaults to ./introflux.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// FFT window size in samples [default: 2048]
    #[arg(long)]
    pub n_fft: Option<usize>,

    /// Hop length between frames in samples [default: 512]
    #[arg(long)]
    pub hop_length: Option<usize>,

    /// Highest frequency kept for analysis, in Hz [default: 1000]
    #[arg(long)]
    pub freq_cutoff: Option<f64>,

    /// Moving-average window in frames [default: 5]
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Standard deviations above the mean needed to flag a change [default: 2.0]
    #[arg(short, long, allow_negative_numbers = true)]
    pub alpha: Option<f64>,

    /// Do not zero-pad the signal to centre frames
    #[arg(long)]
    pub no_center: bool,

    /// Only analyse the first N seconds [default: 60]
    #[arg(short, long, conflicts_with = "full")]
    pub duration: Option<f64>,

    /// Analyse the whole file regardless of length
    #[arg(long)]
    pub full: bool,

    /// Render the smoothed flux to an image (e.g. flux.png)
    #[arg(short, long)]
    pub plot: Option<PathBuf>,

    /// TrueType font for plot labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Print every smoothed flux value
    #[arg(long)]
    pub print_flux: bool,

    /// Emit the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "introflux",
            "song.mp3",
            "--n-fft",
            "4096",
            "-w",
            "3",
            "-a",
            "1.5",
            "--plot",
            "flux.png",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("song.mp3"));
        assert_eq!(cli.n_fft, Some(4096));
        assert_eq!(cli.window, Some(3));
        assert_eq!(cli.alpha, Some(1.5));
        assert_eq!(cli.plot, Some(PathBuf::from("flux.png")));
        assert!(cli.json);
        assert!(cli.hop_length.is_none());
    }

    #[test]
    fn duration_conflicts_with_full() {
        assert!(Cli::try_parse_from(["introflux", "a.wav", "-d", "30", "--full"]).is_err());
    }
}
