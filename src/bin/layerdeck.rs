use std::path::PathBuf;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Convert a layered Inkscape SVG into slides, one page per layer combination.
///
/// Layers are read bottom to top. `_name` layers are shown under every later slide, `+name`
/// layers add to the current slide, `.name` layers are never shown. Text containing
/// `${slide}` receives the slide number.
#[derive(Parser, Debug)]
#[command(name = "layerdeck", version)]
struct Cli {
    /// Layered SVG document.
    input: Option<PathBuf>,

    /// Render only the last frame of each `+` build-up (for printouts).
    #[arg(long)]
    flatten: bool,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Inkscape)]
    backend: BackendChoice,

    /// Output path (default: the input with its extension replaced).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory for the temporary document and page files.
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Inkscape executable.
    #[arg(long, default_value = "inkscape")]
    inkscape: PathBuf,

    /// pdftk executable.
    #[arg(long, default_value = "pdftk")]
    pdftk: PathBuf,

    /// Print the composed pages as JSON and exit without rendering.
    #[arg(long)]
    plan: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    /// PDF pages with inkscape, merged with pdftk.
    Inkscape,
    /// PNG pages rendered in-process, collected into a directory.
    Cpu,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(input) = cli.input.clone() else {
        println!("missing input document");
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };

    let mut doc = layerdeck::SvgDocument::open(&input)?;
    let compose = layerdeck::ComposeOpts {
        flatten: cli.flatten,
    };

    if cli.plan {
        let plan = layerdeck::plan_deck(&doc, compose);
        let stdout = std::io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &plan).with_context(|| "write plan json")?;
        println!();
        return Ok(());
    }

    let kind = match cli.backend {
        BackendChoice::Inkscape => layerdeck::BackendKind::Inkscape,
        BackendChoice::Cpu => layerdeck::BackendKind::Cpu,
    };
    let tools = layerdeck::ToolPaths {
        inkscape: cli.inkscape,
        pdftk: cli.pdftk,
    };
    let (mut rasterizer, mut merger) = layerdeck::create_backend(kind, &tools);

    let out = cli
        .out
        .unwrap_or_else(|| layerdeck::default_output_path(&input, kind.output_extension()));
    let workspace = layerdeck::Workspace::new(cli.work_dir);

    let report = layerdeck::build_deck(
        &mut doc,
        &workspace,
        rasterizer.as_mut(),
        merger.as_mut(),
        &out,
        &layerdeck::DeckOpts { compose },
    )?;

    if let Some(path) = &report.output {
        eprintln!("wrote {} ({} pages)", path.display(), report.pages);
    }
    if !report.failed_pages.is_empty() {
        let pages: Vec<String> = report
            .failed_pages
            .iter()
            .map(|p| p.0.to_string())
            .collect();
        anyhow::bail!(
            "{} page(s) failed to render: {}",
            pages.len(),
            pages.join(", ")
        );
    }
    Ok(())
}
