use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canvas_stage::stage::config::ENV_ASSETS_ROOT;
use canvas_stage::stage::export::png_from_data_uri;
use canvas_stage::{
    AssetRequest, CoreEvent, CpuBackend, CpuBackendOpts, DefaultFetcher, ExportRequest,
    HostMessage, RawOperation, StageConfig, StageHandle, StageService, SurfaceId,
};

#[derive(Parser, Debug)]
#[command(name = "canvas-stage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON array of host messages and print the resulting events.
    Run(RunArgs),
    /// Render one operation batch onto a fresh surface and save it as PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON file holding an array of host messages.
    #[arg(long)]
    script: PathBuf,

    /// Directory exports are written to as `<surface>-<n>.png`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Base directory for relative asset urls (defaults to the script's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Extra directory of font files.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Surface width in pixels.
    #[arg(long, default_value_t = 300)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 150)]
    height: u32,

    /// JSON file holding an array of operations.
    #[arg(long)]
    ops: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Assets to load first, as `id=url` (repeatable).
    #[arg(long = "assets", value_parser = parse_asset)]
    assets: Vec<AssetRequest>,

    /// Base directory for relative asset urls (defaults to the ops file's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Extra directory of font files.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn parse_asset(s: &str) -> Result<AssetRequest, String> {
    let (id, url) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=url, got '{s}'"))?;
    if id.is_empty() || url.is_empty() {
        return Err(format!("expected id=url, got '{s}'"));
    }
    Ok(AssetRequest::new(id, url))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Render(args) => cmd_render(args).await,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse {what} JSON"))
}

fn start_service(
    input: &Path,
    assets_root: Option<PathBuf>,
    fonts_dir: Option<PathBuf>,
) -> StageHandle {
    let mut config = StageConfig::from_env();
    if let Some(root) = assets_root {
        config.fetch.assets_root = root;
    } else if std::env::var_os(ENV_ASSETS_ROOT).is_none() {
        config.fetch.assets_root = input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    }

    let mut opts = CpuBackendOpts::default();
    if let Some(dir) = fonts_dir {
        opts = opts.with_fonts_dir(dir);
    }
    let fetcher = Arc::new(DefaultFetcher::new(config.fetch.clone()));
    StageService::spawn(CpuBackend::new(opts), config, fetcher)
}

async fn next_event(handle: &mut StageHandle) -> anyhow::Result<CoreEvent> {
    handle
        .next_event()
        .await
        .context("stage service stopped unexpectedly")
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let messages: Vec<HostMessage> = read_json(&args.script, "script")?;
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }

    let mut handle = start_service(&args.script, args.assets_root, args.fonts_dir);
    let mut export_count = 0usize;

    // Messages are replayed one at a time: each waits for its own event, so the output order is
    // the script order.
    for msg in messages {
        let expects_event = !matches!(msg, HostMessage::Unregister { .. });
        handle.send(msg).await?;
        if !expects_event {
            continue;
        }

        let event = next_event(&mut handle).await?;
        let mut written = None;
        if let (
            Some(dir),
            CoreEvent::Exported {
                surface_id,
                encoded_image,
                ..
            },
        ) = (&args.out_dir, &event)
        {
            let path = dir.join(format!("{surface_id}-{export_count}.png"));
            write_png_data_uri(&path, encoded_image)?;
            written = Some(path);
        }
        if matches!(event, CoreEvent::Exported { .. }) {
            export_count += 1;
        }
        println!("{}", event_line(&event, written.as_deref())?);
    }

    handle.shutdown().await?;
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let operations: Vec<RawOperation> = read_json(&args.ops, "operations")?;
    let id = SurfaceId::from("main");
    let mut handle = start_service(&args.ops, args.assets_root, args.fonts_dir);

    handle
        .register(id.clone(), Some(args.width), Some(args.height), args.assets)
        .await?;
    match next_event(&mut handle).await? {
        CoreEvent::Ready { .. } => {}
        other => anyhow::bail!("surface did not become ready: {}", event_line(&other, None)?),
    }

    handle
        .send(HostMessage::Render {
            surface_id: id.clone(),
            operations,
        })
        .await?;
    match next_event(&mut handle).await? {
        CoreEvent::Rendered { .. } => {}
        CoreEvent::RenderFailed { reason, .. } => anyhow::bail!("render failed: {reason}"),
        other => anyhow::bail!("unexpected event: {}", event_line(&other, None)?),
    }

    handle
        .export(ExportRequest {
            surface_id: id,
            x: 0.0,
            y: 0.0,
            width: args.width,
            height: args.height,
        })
        .await?;
    match next_event(&mut handle).await? {
        CoreEvent::Exported { encoded_image, .. } => {
            if let Some(parent) = args.out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            write_png_data_uri(&args.out, &encoded_image)?;
        }
        CoreEvent::ExportFailed { reason, .. } => anyhow::bail!("export failed: {reason}"),
        other => anyhow::bail!("unexpected event: {}", event_line(&other, None)?),
    }

    handle.shutdown().await?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png_data_uri(path: &Path, uri: &str) -> anyhow::Result<()> {
    let png = png_from_data_uri(uri)?;
    std::fs::write(path, png).with_context(|| format!("write png '{}'", path.display()))
}

/// One JSON line per event, with the bulky export payload replaced by its size.
fn event_line(event: &CoreEvent, written: Option<&Path>) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(event).context("serialize event")?;
    if let (CoreEvent::Exported { pixels, .. }, Some(obj)) = (event, value.as_object_mut()) {
        obj.remove("encodedImage");
        obj.insert("pixels".to_owned(), serde_json::json!(pixels.len()));
        if let Some(path) = written {
            obj.insert(
                "file".to_owned(),
                serde_json::json!(path.display().to_string()),
            );
        }
    }
    Ok(value.to_string())
}
