use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "svgraph", version)]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document (or one element of it) to PNG.
    Render(RenderArgs),
    /// Print node counts, registered identifiers and unresolved references.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render only the element with this id.
    #[arg(long)]
    id: Option<String>,

    /// Options JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable resource limits. Only for trusted input.
    #[arg(long, default_value_t = false)]
    unlimited: bool,

    /// Resolution used for absolute units.
    #[arg(long)]
    dpi: Option<f64>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input SVG document.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "svgraph=debug" } else { "svgraph=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(args: &RenderArgs) -> anyhow::Result<svgraph::Options> {
    let mut opts = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            svgraph::Options::from_json_str(&text)?
        }
        None => svgraph::Options::default(),
    }
    .with_env_overrides();
    if let Some(dpi) = args.dpi {
        anyhow::ensure!(dpi.is_finite() && dpi > 0.0, "--dpi must be positive");
        opts.dpi_x = dpi;
        opts.dpi_y = dpi;
    }
    if args.unlimited {
        opts.limits = svgraph::Limits::unlimited();
    }
    if opts.base_dir.is_none() {
        opts.base_dir = Some(input_dir(&args.in_path));
    }
    Ok(opts)
}

fn input_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn read_document(path: &Path, opts: &svgraph::Options) -> anyhow::Result<svgraph::Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    let doc = svgraph::Document::from_str(&text, opts)
        .with_context(|| format!("parse document '{}'", path.display()))?;
    Ok(doc)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = load_options(&args)?;
    let doc = read_document(&args.in_path, &opts)?;

    let mut rasterizer = svgraph::VelloRasterizer::new();
    let (surface, stats) =
        svgraph::render_with_stats(&doc, args.id.as_deref(), &mut rasterizer, &opts)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &surface.to_rgba8_straight(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    tracing::info!(
        layers = stats.layers_pushed,
        max_depth = stats.max_layer_depth,
        broken_refs = stats.references_broken,
        instances = stats.reference_instances,
        filters = stats.filters_applied,
        "render stats"
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let opts = svgraph::Options::default().with_base_dir(input_dir(&args.in_path));
    let doc = read_document(&args.in_path, &opts)?;

    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (_, node) in doc.nodes() {
        *kinds.entry(node.kind.name()).or_default() += 1;
    }

    println!("nodes: {}", doc.len());
    for (kind, n) in &kinds {
        println!("  {kind:<18} {n}");
    }
    if let Some((w, h)) = doc.intrinsic_size() {
        println!("size: {w} x {h}");
    }

    let ids = doc.registry().ids();
    println!("ids: {}", ids.len());
    for id in ids {
        println!("  {id}");
    }

    let pending = doc.pending_references();
    println!("unresolved references: {}", pending.len());
    for &node in pending {
        if let svgraph::NodeKind::Reference(r) = &doc.node(node).kind {
            println!("  #{}", r.href.as_deref().unwrap_or(""));
        }
    }
    Ok(())
}
