use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storyreel::{
    FfmpegEngine, FrameCompositor, JobId, JobManager, MediaEngine as _, OpenAiClient,
    PipelineConfig, Script, StoryPipeline, StoryWriter as _,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    /// Pipeline configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a script into a video (needs an API key and `ffmpeg`).
    Render(RenderArgs),
    /// Compose one captioned frame from a local image.
    Frame(FrameArgs),
    /// Print the duration of an audio file in seconds.
    Probe(ProbeArgs),
    /// Write a short children's story from an idea.
    Story(StoryArgs),
    /// Print the output path of an existing job.
    Output(OutputArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Script JSON: `[{"visual": "...", "narration": "..."}, ...]`.
    #[arg(long)]
    script: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Source image (any format the `image` crate decodes).
    #[arg(long)]
    image: PathBuf,

    /// Caption text to burn in.
    #[arg(long)]
    caption: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    #[arg(long)]
    audio: PathBuf,
}

#[derive(Parser, Debug)]
struct StoryArgs {
    /// 10 to 200 characters.
    #[arg(long)]
    idea: String,
}

#[derive(Parser, Debug)]
struct OutputArgs {
    #[arg(long)]
    job: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = PipelineConfig::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&cfg, args),
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Probe(args) => cmd_probe(&cfg, args),
        Command::Story(args) => cmd_story(&cfg, args),
        Command::Output(args) => cmd_output(&cfg, args),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storyreel=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(cfg: &PipelineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let script = Script::from_path(&args.script)?;
    let mut pipeline = StoryPipeline::from_config(cfg)?;
    let report = pipeline.render_video_report(&script.segments)?;

    println!("job {}", report.job_id);
    println!("{}", report.output_path.display());
    Ok(())
}

fn cmd_frame(cfg: &PipelineConfig, args: FrameArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let mut compositor = FrameCompositor::new(cfg.frame.clone())?;
    let png = compositor.compose(&bytes, &args.caption)?;

    ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(cfg: &PipelineConfig, args: ProbeArgs) -> anyhow::Result<()> {
    let engine = FfmpegEngine::new(cfg.encode.clone());
    let duration = engine.probe_duration(&args.audio)?;
    println!("{duration:.6}");
    Ok(())
}

fn cmd_story(cfg: &PipelineConfig, args: StoryArgs) -> anyhow::Result<()> {
    let client = OpenAiClient::from_config(&cfg.openai)?;
    println!("{}", client.write_story(&args.idea)?);
    Ok(())
}

fn cmd_output(cfg: &PipelineConfig, args: OutputArgs) -> anyhow::Result<()> {
    let id = JobId::parse(&args.job)?;
    let workspace = JobManager::new(&cfg.workspace_root).open_workspace(&id)?;
    let output = workspace.output_path();
    if !output.is_file() {
        anyhow::bail!("job {id} has no rendered output at '{}'", output.display());
    }
    println!("{}", output.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
