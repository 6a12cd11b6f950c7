//! # Yin-Yang 命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use yin_yang::commands;
use yin_yang::error::AppError;
use yin_yang::image_handler::ImageProcessor;
use yin_yang::settings;

#[derive(Parser, Debug)]
#[command(
    name = "yin-yang",
    version,
    about = "Classify page images as screenshots or photos and invert the ones that clash with their background"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan every image of a page manifest
    Scan(ScanArgs),
    /// Classify a single image file against a background color
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Page manifest (JSON)
    manifest: PathBuf,
    /// Scan settings (JSON with `sampling` and `lightnessThreshold`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write an inverted PNG for every image that ends up inverted
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Image file
    image: PathBuf,
    /// Opaque background behind the image (CSS color)
    #[arg(long, default_value = "white")]
    background: String,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("运行失败: {err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => command_scan(args),
        Commands::Classify(args) => command_classify(args),
    }
}

fn command_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = settings::resolve_scan_config(args.config.as_deref())?;
    let processor = ImageProcessor::new(config)?;

    let mut run = commands::scan_manifest(&processor, &args.manifest)?;
    for line in run.report.summary_lines() {
        eprintln!("{line}");
    }

    let json = serde_json::to_string_pretty(&run.report)
        .map_err(|e| AppError::Output(format!("序列化报告失败: {}", e)))?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("📝 报告已写入 {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(dir) = &args.export_dir {
        commands::export_inverted(&mut run.page, &mut run.entries, dir)?;
    }

    Ok(())
}

fn command_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let config = settings::resolve_scan_config(args.config.as_deref())?;
    let processor = ImageProcessor::new(config)?;

    let report = commands::classify_file(&processor, &args.image, &args.background)?;

    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::Output(format!("序列化结果失败: {}", e)))?;
    println!("{text}");
    Ok(())
}
