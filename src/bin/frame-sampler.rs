use std::{error::Error, io, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use frame_sampler::{
    FfmpegLogLevel, FrameSampler, ImageFormat, ProgressCallback, ProgressInfo, RunConfig,
    VideoInfo,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  frame-sampler --video cctv.mp4\n  frame-sampler --video cctv.mp4 --output frames --skip 15 --img_size 416 --format png\n  frame-sampler --video cctv.mp4 --keep-size --max-frames 1000 --save-timestamps --images-subdir images\n  frame-sampler --config camera_1.json --progress\n  frame-sampler --completions zsh > _frame-sampler";

#[derive(Debug, Parser)]
#[command(
    name = "frame-sampler",
    version,
    about = "Save every Nth frame of a video as an image",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the input video.
    #[arg(long, required_unless_present_any = ["config", "completions"])]
    video: Option<PathBuf>,

    /// Output directory [default: extracted_frames].
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save every Nth frame [default: 10].
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    skip: Option<u64>,

    /// Resize frames to SIZE x SIZE [default: 640].
    #[arg(
        long = "img_size",
        visible_alias = "img-size",
        value_name = "SIZE",
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with = "keep_size"
    )]
    img_size: Option<u32>,

    /// Keep the source resolution instead of resizing.
    #[arg(long)]
    keep_size: bool,

    /// Output image format: jpg | png [default: jpg].
    #[arg(long, value_parser = parse_image_format)]
    format: Option<ImageFormat>,

    /// Stop after reading this many frames (kept or skipped).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_frames: Option<u64>,

    /// Write timestamps.csv with the presentation time of every saved frame.
    #[arg(long)]
    save_timestamps: bool,

    /// Write images into this sub-directory of the output directory.
    #[arg(long)]
    images_subdir: Option<PathBuf>,

    /// Load settings from a JSON run configuration; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,

    /// Log every saved frame.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, value_parser = parse_log_level)]
    log_level: Option<FfmpegLogLevel>,

    /// Print shell completions and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn parse_image_format(value: &str) -> Result<ImageFormat, String> {
    value.parse().map_err(|error: frame_sampler::SamplerError| error.to_string())
}

fn parse_log_level(value: &str) -> Result<FfmpegLogLevel, String> {
    value.parse()
}

/// Merge the configuration file (or command-line defaults) with explicit flags.
fn resolve_run_config(cli: &Cli) -> Result<RunConfig, Box<dyn Error>> {
    let mut run = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::command_line_defaults(),
    };

    if let Some(video) = &cli.video {
        run.video = Some(video.clone());
    }
    if let Some(output) = &cli.output {
        run.output = output.clone();
    }
    if let Some(skip) = cli.skip {
        run.frame_skip = skip;
    }
    if let Some(size) = cli.img_size {
        run.img_size = Some(size);
    }
    if cli.keep_size {
        run.img_size = None;
    }
    if let Some(format) = cli.format {
        run.image_format = format;
    }
    if let Some(max_frames) = cli.max_frames {
        run.max_frames = Some(max_frames);
    }
    if cli.save_timestamps {
        run.save_timestamps = true;
    }
    if let Some(subdirectory) = &cli.images_subdir {
        run.images_subdir = Some(subdirectory.clone());
    }

    Ok(run)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
    bar_style: ProgressStyle,
    spinner_style: ProgressStyle,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn Error>> {
        let bar_style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} frames read, {msg} ({eta})",
        )?
        .progress_chars("##-");
        let spinner_style =
            ProgressStyle::with_template("{spinner:.green} {pos} frames read, {msg}")?;
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style.clone());
        Ok(Self {
            bar,
            bar_style,
            spinner_style,
        })
    }

    /// Switch to a bounded bar once the number of frames to read is known.
    fn set_total(&self, total: Option<u64>) {
        match total {
            Some(total) => {
                self.bar.set_length(total);
                self.bar.set_style(self.bar_style.clone());
            }
            None => self.bar.set_style(self.spinner_style.clone()),
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        self.bar.set_message(format!("{} saved", info.saved));
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "frame-sampler", &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);
    if let Some(level) = cli.log_level {
        frame_sampler::set_ffmpeg_log_level(level);
    }

    let run_config = resolve_run_config(&cli)?;
    let video = run_config
        .video
        .clone()
        .ok_or("no input video: pass --video or set \"video\" in the configuration file")?;
    let output = run_config.output.clone();

    let mut sample_config = run_config.to_sample_config();
    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        sample_config = sample_config
            .with_progress(progress.clone())
            .with_batch_size(10);
        Some(progress)
    } else {
        None
    };

    let sampler = FrameSampler::new(sample_config)?;
    let mut opened: Option<VideoInfo> = None;
    let result = sampler.run_inspecting(&video, &output, |info| {
        if !cli.json {
            println!("{} {info}", "Video Info:".cyan().bold());
        }
        if let Some(progress) = &progress {
            progress.set_total(
                info.known_frame_count()
                    .map(|count| run_config.max_frames.map_or(count, |cap| count.min(cap))),
            );
        }
        opened = Some(info.clone());
    })?;

    if let Some(progress) = &progress {
        progress.bar.finish_with_message(format!("{} saved", result.saved_count));
    }

    if cli.json {
        let payload = json!({
            "video": video,
            "info": opened,
            "saved_count": result.saved_count,
            "read_count": result.read_count,
            "total_frames": result.total_frames,
            "output_dir": result.output_dir,
            "image_dir": result.image_dir,
            "timestamp_log": result.timestamp_log,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", result.to_string().green().bold());
        if result.total_frames > 0 {
            println!(
                "{} saved {}/{} frames, read {}",
                "summary:".dimmed(),
                result.saved_count,
                result.total_frames,
                result.read_count,
            );
        }
        if let Some(log) = &result.timestamp_log {
            println!("{} {}", "timestamps:".dimmed(), log.display());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
