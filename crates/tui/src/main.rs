mod renderer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser, Subcommand};
use lifeline_core::controller::MAX_SLIDE;
use lifeline_core::svg::render_svg;
use lifeline_core::{SceneController, Story, StoryConfig};
use tracing::{Level, info};

#[derive(Parser, Debug)]
#[command(name = "lifeline", version, about = "A narrative tour of life expectancy since 1960")]
struct Cli {
    /// Raise the log level (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Step through the story in the terminal.
    View(ViewArgs),
    /// Write every scene as an SVG file.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct ViewArgs {
    /// Dataset (CSV or JSON).
    data: PathBuf,

    /// Story configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where log output goes while the terminal is taken over.
    #[arg(long, default_value = "lifeline.log")]
    log_file: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Dataset (CSV or JSON).
    data: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Story configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the dark palette.
    #[arg(long, default_value_t = false)]
    dark: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    match cli.cmd {
        Command::View(args) => cmd_view(args, level),
        Command::Export(args) => cmd_export(args, level),
    }
}

fn cmd_view(args: ViewArgs, level: Level) -> Result<()> {
    // stdout belongs to the terminal UI.
    let log = File::create(&args.log_file)
        .with_context(|| format!("create log file '{}'", args.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(log))
        .init();

    let story = load_story(&args.data, args.config.as_deref())?;
    let mut controller = SceneController::new(story);
    renderer::run(&mut controller)
}

fn cmd_export(args: ExportArgs, level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let story = load_story(&args.data, args.config.as_deref())?;
    let viewport = story.viewport();
    let mut controller = SceneController::new(story);
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    for slide in 0..=MAX_SLIDE {
        let nav = controller.render(slide)?;
        let svg = render_svg(
            &controller.commands(),
            viewport.width,
            viewport.height,
            args.dark,
        );
        let path = args.out.join(format!("scene-{slide}.svg"));
        std::fs::write(&path, svg).with_context(|| format!("write svg '{}'", path.display()))?;
        info!(slide, title = %nav.title, path = %path.display(), "wrote scene");
    }
    Ok(())
}

fn load_story(data: &Path, config: Option<&Path>) -> Result<Arc<Story>> {
    let config = match config {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
            StoryConfig::from_json(&bytes)
                .with_context(|| format!("load config '{}'", path.display()))?
        }
        None => StoryConfig::default(),
    };
    let bytes = std::fs::read(data).with_context(|| format!("read dataset '{}'", data.display()))?;
    let story = Story::from_bytes(&bytes, config)
        .with_context(|| format!("load dataset '{}'", data.display()))?;
    Ok(Arc::new(story))
}
