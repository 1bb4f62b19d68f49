use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    fps: u32,
    seconds: u32,
    warmup: u32,
    repeats: u32,
    intensity: f32,
    presets: Vec<loopcanvas::Preset>,
    image: Option<PathBuf>,
    parallel: bool,
    threads: Option<usize>,
    json_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    render_total: Duration,
    slowest_frame: Duration,
    wall_total: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.fps == 0 || args.seconds == 0 {
        anyhow::bail!("--fps and --seconds must be > 0");
    }
    if args.repeats == 0 {
        anyhow::bail!("--repeats must be >= 1");
    }
    if let Some(n) = args.threads {
        if n == 0 {
            anyhow::bail!("--threads must be >= 1 when set");
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configure rayon thread pool")?;
    }

    let canvas = loopcanvas::Canvas::new(args.width, args.width * 16 / 9)
        .context("--width must produce an exact 9:16 canvas (use a multiple of 9)")?;
    let loop_cfg = loopcanvas::LoopConfig::new(f64::from(args.seconds), args.fps)?;
    let opts = loopcanvas::RenderOpts {
        parallel: args.parallel,
    };

    let image = match &args.image {
        Some(path) => loopcanvas::load_working_image(path, canvas)
            .with_context(|| format!("load bench image '{}'", path.display()))?,
        None => synthetic_image(canvas),
    };

    eprintln!(
        "canvas {}x{}  loop {}s@{}fps ({} frames)  intensity {}  parallel {}",
        canvas.width,
        canvas.height,
        args.seconds,
        args.fps,
        loop_cfg.total_frames(),
        args.intensity,
        args.parallel
    );

    let mut report = Vec::with_capacity(args.presets.len());
    for &preset in &args.presets {
        let params = loopcanvas::RenderParams::new(preset, args.intensity);

        for _ in 0..args.warmup {
            run_once(&image, &params, loop_cfg, opts)?;
        }

        let mut runs = Vec::with_capacity(args.repeats as usize);
        let mut digest = String::new();
        for run_idx in 0..args.repeats {
            let (m, d) = run_once(&image, &params, loop_cfg, opts)?;
            if run_idx == 0 {
                digest = d;
            } else if d != digest {
                anyhow::bail!("preset {preset}: output digest changed between runs");
            }
            runs.push(m);
        }

        eprintln!("\n{preset}:");
        report_percentiles(&runs);
        report.push(json!({
            "preset": preset.name(),
            "frames": loop_cfg.total_frames(),
            "sha256": digest,
            "render_ms_p50": percentile(&runs, |m| m.render_total, 0.50).as_secs_f64() * 1000.0,
            "render_ms_p90": percentile(&runs, |m| m.render_total, 0.90).as_secs_f64() * 1000.0,
            "slowest_frame_ms": percentile(&runs, |m| m.slowest_frame, 1.0).as_secs_f64() * 1000.0,
        }));
    }

    let doc = json!({
        "canvas": { "width": canvas.width, "height": canvas.height },
        "loop": { "duration_secs": loop_cfg.duration_secs, "frame_rate": loop_cfg.frame_rate },
        "intensity": args.intensity,
        "parallel": args.parallel,
        "repeats": args.repeats,
        "presets": report,
    });
    let text = serde_json::to_string_pretty(&doc)?;
    match &args.json_out {
        Some(path) => {
            loopcanvas::ensure_parent_dir(path)?;
            std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("\nwrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: loopcanvas::Canvas::CANONICAL.width,
        fps: 16,
        seconds: 4,
        warmup: 1,
        repeats: 5,
        intensity: 0.6,
        presets: loopcanvas::Preset::ALL.to_vec(),
        image: None,
        parallel: true,
        threads: None,
        json_out: None,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_num(args.next(), "--width")?,
            "--fps" => out.fps = parse_num(args.next(), "--fps")?,
            "--seconds" => out.seconds = parse_num(args.next(), "--seconds")?,
            "--warmup" => out.warmup = parse_num(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_num(args.next(), "--repeats")?,
            "--intensity" => out.intensity = parse_num(args.next(), "--intensity")?,
            "--threads" => out.threads = Some(parse_num(args.next(), "--threads")?),
            "--preset" => {
                let v = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("missing value for --preset"))?;
                let mut presets = Vec::new();
                for name in v.split(',') {
                    presets.push(
                        loopcanvas::Preset::parse(name)
                            .ok_or_else(|| anyhow::anyhow!("unknown --preset '{name}'"))?,
                    );
                }
                out.presets = presets;
            }
            "--image" => {
                out.image = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --image (expected a path)")
                })?))
            }
            "--json-out" => {
                out.json_out = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --json-out (expected a path)")
                })?))
            }
            "--serial" => out.parallel = false,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn parse_num<T>(v: Option<String>, flag: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<T>()
        .with_context(|| format!("invalid value for {flag}: '{v}'"))
}

fn print_help() {
    eprintln!(
        "loopcanvas-bench\n\n\
         Renders every frame of one loop per preset and reports timings plus a SHA-256 of the\n\
         rendered bytes.\n\n\
         options:\n\
           --width N        canvas width, height is width*16/9 (default 540)\n\
           --fps N          export frame rate (default 16)\n\
           --seconds N      loop length (default 4)\n\
           --warmup N       untimed runs per preset (default 1)\n\
           --repeats N      timed runs per preset (default 5)\n\
           --intensity F    preset intensity (default 0.6)\n\
           --preset a,b     presets to run (default all)\n\
           --image PATH     source image (default synthetic gradient)\n\
           --threads N      rayon pool size\n\
           --serial         disable parallel warp rows\n\
           --json-out PATH  write the JSON report to PATH instead of stdout"
    );
}

/// Diagonal color ramp with a checker overlay, so every preset has structure to move.
fn synthetic_image(canvas: loopcanvas::Canvas) -> loopcanvas::WorkingImage {
    let (w, h) = (canvas.width, canvas.height);
    let mut data = Vec::with_capacity(canvas.rgba_len());
    for y in 0..h {
        for x in 0..w {
            let checker = if ((x / 24) + (y / 24)) % 2 == 0 { 40 } else { 0 };
            let r = (x * 215 / w.max(1)) as u8 + checker;
            let g = (y * 215 / h.max(1)) as u8 + checker;
            let b = ((x + y) * 120 / (w + h).max(1)) as u8 + 60;
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    loopcanvas::WorkingImage::from_straight(w, h, data)
        .unwrap_or_else(|| loopcanvas::WorkingImage::solid(w, h, [128, 96, 64, 255]))
}

fn run_once(
    image: &loopcanvas::WorkingImage,
    params: &loopcanvas::RenderParams,
    loop_cfg: loopcanvas::LoopConfig,
    opts: loopcanvas::RenderOpts,
) -> anyhow::Result<(RunMetrics, String)> {
    let wall = Instant::now();
    let total = loop_cfg.total_frames();
    let mut renderer = loopcanvas::SceneRenderer::new(opts);
    let mut hasher = sha2::Sha256::new();
    let mut m = RunMetrics::default();

    for i in 0..total {
        let phase = loopcanvas::PhaseSource::Export {
            index: loopcanvas::FrameIndex(i),
            total_frames: total,
        }
        .phase();
        let t0 = Instant::now();
        let frame = renderer.render(image, phase, params);
        let dt = t0.elapsed();
        m.render_total += dt;
        m.slowest_frame = m.slowest_frame.max(dt);
        hasher.update(&frame.data);
    }

    m.wall_total = wall.elapsed();
    Ok((m, hex(&hasher.finalize())))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn percentile(runs: &[RunMetrics], f: fn(&RunMetrics) -> Duration, p: f64) -> Duration {
    let mut v = runs.iter().map(f).collect::<Vec<_>>();
    v.sort_by_key(|d| d.as_nanos());
    if v.is_empty() {
        return Duration::ZERO;
    }
    let n = v.len();
    let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
    v[rank - 1]
}

fn report_percentiles(runs: &[RunMetrics]) {
    type Field = (&'static str, fn(&RunMetrics) -> Duration);

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("render_total", |m| m.render_total),
        ("slowest_frame", |m| m.slowest_frame),
        ("wall_total", |m| m.wall_total),
    ];

    for (name, getter) in fields {
        eprintln!(
            "  {name:14} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(percentile(runs, *getter, 0.50)),
            p90 = fmt_ms(percentile(runs, *getter, 0.90)),
            p99 = fmt_ms(percentile(runs, *getter, 0.99)),
        );
    }
}
