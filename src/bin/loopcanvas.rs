use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use loopcanvas::{
    CancelToken, ExportKind, FfmpegSink, FfmpegSinkOpts, GifSink, GifSinkOpts, LoopSettings,
    Phase, Preset, RenderSession, WallClockPacer, render_preset, render_scene,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loopcanvas", version, about = "Seamless 9:16 image loops")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export one loop as an animated GIF.
    Gif(GifArgs),
    /// Capture one loop in real time into a video (requires `ffmpeg` on PATH).
    Video(VideoArgs),
}

#[derive(Args, Debug)]
struct LoopArgs {
    /// Source image (PNG, JPEG, GIF or WebP).
    #[arg(long)]
    image: PathBuf,

    /// Settings JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset name (none, drift, slices, melt, warp, scanline).
    #[arg(long)]
    preset: Option<String>,

    /// Motion intensity; negative values mirror the motion.
    #[arg(long, allow_negative_numbers = true)]
    intensity: Option<f32>,

    /// Loop length in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Export frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Render the warp on a single thread.
    #[arg(long, default_value_t = false)]
    no_parallel: bool,
}

impl LoopArgs {
    fn settings(&self) -> anyhow::Result<LoopSettings> {
        let mut s = match &self.config {
            Some(path) => LoopSettings::from_path(path)
                .with_context(|| format!("load settings '{}'", path.display()))?,
            None => LoopSettings::default(),
        };
        if let Some(name) = &self.preset {
            s.preset = Preset::parse(name)
                .with_context(|| format!("unknown preset '{name}'"))?;
        }
        if let Some(i) = self.intensity {
            s.intensity = i;
        }
        if let Some(d) = self.duration {
            s.loop_cfg.duration_secs = d;
        }
        if let Some(fps) = self.fps {
            s.loop_cfg.frame_rate = fps;
        }
        if self.threads.is_some() {
            s.threads = self.threads;
        }
        if self.no_parallel {
            s.parallel = false;
        }
        s.validate()?;
        Ok(s)
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: LoopArgs,

    /// Loop phase in [0, 1).
    #[arg(long, default_value_t = 0.0)]
    phase: f64,

    /// Skip the vignette.
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct GifArgs {
    #[command(flatten)]
    common: LoopArgs,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct VideoArgs {
    #[command(flatten)]
    common: LoopArgs,

    /// Output path; the extension follows the codec ffmpeg supports.
    #[arg(long)]
    out: PathBuf,

    /// Seconds to wait for ffmpeg to finalize the file.
    #[arg(long, default_value_t = 30)]
    finalize_timeout: u64,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Gif(args) => cmd_gif(args),
        Command::Video(args) => cmd_video(args),
    }
}

fn open_session(common: &LoopArgs) -> anyhow::Result<(RenderSession, LoopSettings)> {
    let settings = common.settings()?;
    if let Some(n) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configure rayon thread pool")?;
    }
    let now = Instant::now();
    let mut session = RenderSession::new(
        settings.canvas,
        settings.loop_cfg,
        settings.render_opts(),
        now,
    )?;
    session
        .load_image_path(&common.image, now)
        .with_context(|| format!("load image '{}'", common.image.display()))?;
    session.set_params(settings.render_params());
    Ok((session, settings))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (session, settings) = open_session(&args.common)?;
    let image = session
        .image()
        .context("no working image after load (unexpected)")?;

    let phase = Phase::new(args.phase);
    let params = session.params();
    let frame = if args.raw {
        render_preset(image, phase, &params, settings.render_opts())
    } else {
        render_scene(image, phase, &params, settings.render_opts())
    };

    loopcanvas::ensure_parent_dir(&args.out)?;
    frame
        .to_straight_rgba_image()
        .context("frame buffer does not match its size")?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gif(args: GifArgs) -> anyhow::Result<()> {
    let (mut session, _) = open_session(&args.common)?;
    let job = session.begin_export(ExportKind::Frames)?;
    let mut sink = GifSink::new(GifSinkOpts::new(&args.out));

    let outcome = job.run_frames(&mut sink, &CancelToken::new());
    session.record_export_outcome(&outcome);
    eprintln!("{}", session.status());
    outcome?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let (mut session, _) = open_session(&args.common)?;
    let job = session.begin_export(ExportKind::Capture)?;
    let finalize = Duration::from_secs(args.finalize_timeout);
    let mut opts = FfmpegSinkOpts::new(&args.out);
    opts.finalize_timeout = finalize;
    let sink = FfmpegSink::new(opts);

    let (sink, outcome) = job.with_finalize_grace(finalize).run_capture(
        sink,
        &mut WallClockPacer,
        &CancelToken::new(),
    );
    session.record_export_outcome(&outcome);
    eprintln!("{}", session.status());
    outcome?;
    if let Some((path, codec)) = sink.as_ref().and_then(|s| s.out_path().zip(s.codec())) {
        eprintln!("wrote {} ({})", path.display(), codec.label);
    }
    Ok(())
}
