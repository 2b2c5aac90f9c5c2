//! cover-validator - Book cover layout checker
//!
//! CLI entry point

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn, Level};

use cover_validator::{
    exit_codes,
    // Analysis
    AnalysisReport, CoverAnalyzer, DebugRenderer, TesseractDetector, TesseractOptions,
    // CLI
    CheckArgs, Cli, Commands,
    // Config
    CliOverrides, Config, ResolvedConfig,
    // Input
    CoverLoader, InputError, PdftoppmRasterizer,
};

#[cfg(feature = "web")]
use cover_validator::{ServeArgs, ServerConfig, WebServer};

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Check(args) => args.verbose,
        Commands::Info => 0,
        #[cfg(feature = "web")]
        Commands::Serve(args) => args.verbose.max(1),
    };
    init_logging(verbose);

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Info => run_info().map(|()| exit_codes::SUCCESS),
        #[cfg(feature = "web")]
        Commands::Serve(args) => run_serve(&args).map(|()| exit_codes::SUCCESS),
    };

    std::process::exit(match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

/// Install the stderr log subscriber; stdout carries only the report
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Use `--config` when given, else the first config file found
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Config::load().context("failed to load config"),
    }
}

// ============ Check Command ============

/// Report as printed by `check`
#[derive(Debug, Serialize)]
struct CheckOutput {
    #[serde(flatten)]
    report: AnalysisReport,
    filename: String,
    sha256: String,
    analyzed_at: DateTime<Utc>,
}

fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let start_time = Instant::now();

    let config = load_config(args.config.as_deref())?;
    let resolved = config.merge_with_cli(&args.overrides());
    debug!(?resolved, "resolved configuration");

    let loader = CoverLoader::with_rasterizer(
        Box::new(PdftoppmRasterizer::new(resolved.pdftoppm_path.clone())),
        resolved.analysis.dpi,
    );

    let cover = match loader.load(&args.input) {
        Ok(cover) => cover,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(input_error_code(&e));
        }
    };
    info!(filename = %cover.filename, sha256 = %cover.sha256, "cover loaded");

    let analyzer = CoverAnalyzer::new(
        resolved.analysis.clone(),
        TesseractDetector::new(resolved.tesseract.clone()),
    );
    let outcome = match analyzer.analyze_detailed(&cover.image) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(exit_codes::PROCESSING_FAILED);
        }
    };

    if let Some(dir) = &args.save_debug {
        match DebugRenderer::save(&outcome, analyzer.options(), dir) {
            Ok(paths) => info!(count = paths.len(), dir = %dir.display(), "debug images written"),
            Err(e) => warn!(error = %e, "failed to write debug images"),
        }
    }

    let passed = outcome.report.passed();
    let output = CheckOutput {
        report: outcome.report,
        filename: cover.filename,
        sha256: cover.sha256,
        analyzed_at: Utc::now(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "check finished");

    Ok(if passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::REVIEW_NEEDED
    })
}

fn input_error_code(err: &InputError) -> i32 {
    if err.is_bad_input() {
        exit_codes::INVALID_INPUT
    } else {
        exit_codes::PROCESSING_FAILED
    }
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("cover-validator v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let resolved: ResolvedConfig = load_config(None)
        .unwrap_or_else(|e| {
            eprintln!("Warning: {:#}", e);
            Config::default()
        })
        .merge_with_cli(&CliOverrides::new());

    println!("Tools:");
    print_tool("tesseract", tesseract_path(&resolved.tesseract));
    print_tool(
        "pdftoppm",
        PdftoppmRasterizer::new(resolved.pdftoppm_path.clone())
            .resolve_command()
            .ok(),
    );
    println!();

    println!("Config files (first found wins):");
    for path in Config::search_paths() {
        let marker = if path.is_file() { "found" } else { "-" };
        println!("  [{:>5}] {}", marker, path.display());
    }
    println!();

    println!("Analysis:");
    println!("  DPI:            {}", resolved.analysis.dpi);
    println!("  Award zone:     {}%", resolved.analysis.award_zone_percent);
    println!("  Safe margin:    {}%", resolved.analysis.safe_margin_percent);
    println!("  Min confidence: {}", resolved.analysis.min_confidence);
    println!("  CPU cores:      {}", num_cpus::get());

    Ok(())
}

fn tesseract_path(options: &TesseractOptions) -> Option<std::path::PathBuf> {
    TesseractDetector::new(options.clone()).resolve_command().ok()
}

fn print_tool(name: &str, path: Option<std::path::PathBuf>) {
    match path {
        Some(path) => println!("  {:<10} {}", name, path.display()),
        None => println!("  {:<10} not found", name),
    }
}

// ============ Serve Command (Web Server) ============

#[cfg(feature = "web")]
fn run_serve(args: &ServeArgs) -> anyhow::Result<()> {
    use cover_validator::{AppState, TextDetector};

    let config = load_config(args.config.as_deref())?;
    let resolved = config.merge_with_cli(&CliOverrides::new());

    let detector = TesseractDetector::new(resolved.tesseract.clone());
    if !detector.is_available() {
        warn!("tesseract not found; validation requests will fail");
    }

    let loader = CoverLoader::with_rasterizer(
        Box::new(PdftoppmRasterizer::new(resolved.pdftoppm_path.clone())),
        resolved.analysis.dpi,
    );
    let detector: Box<dyn TextDetector> = Box::new(detector);
    let analyzer = CoverAnalyzer::new(resolved.analysis, detector);

    let server_config = ServerConfig::default()
        .with_port(args.port)
        .with_bind(&args.bind)
        .with_upload_limit(args.upload_limit * 1024 * 1024);
    let upload_dir = server_config.upload_dir.clone();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(server_config.workers)
        .enable_all()
        .build()?;
    rt.block_on(async {
        let server = WebServer::new(server_config, AppState::new(analyzer, loader, upload_dir));
        server.run().await.map_err(|e| anyhow::anyhow!(e))
    })?;

    Ok(())
}
