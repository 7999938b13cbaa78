use std::{env, fs, path::PathBuf};

use captcha_kit::{decode_raster, slide::CannyParams, slide::DiffMatchParams};
use serde::{Deserialize, Serialize};

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::info;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    #[default]
    Match,
    Comparison,
}

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    target_path: String,
    background_path: String,
    #[serde(default)]
    mode: Mode,
    #[serde(default)]
    simple_target: bool,
    #[serde(default)]
    canny: CannyParams,
    #[serde(default)]
    diff: DiffMatchParams,
    #[serde(default)]
    output_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExampleReport {
    target_path: String,
    background_path: String,
    mode: Mode,
    result: serde_json::Value,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: solve_slide <config.json>")?;
    let cfg: ExampleConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;

    let target = decode_raster(&fs::read(&cfg.target_path)?)?;
    let background = decode_raster(&fs::read(&cfg.background_path)?)?;
    info!(
        "target {}x{}, background {}x{}",
        target.width(),
        target.height(),
        background.width(),
        background.height()
    );

    let result = match cfg.mode {
        Mode::Match => serde_json::to_value(captcha_kit::slide::slide_match_with(
            &target,
            &background,
            cfg.simple_target,
            &cfg.canny,
        ))?,
        Mode::Comparison => serde_json::to_value(captcha_kit::slide::slide_comparison_with(
            &target,
            &background,
            &cfg.diff,
        ))?,
    };
    info!("result: {result}");

    let report = ExampleReport {
        target_path: cfg.target_path,
        background_path: cfg.background_path,
        mode: cfg.mode,
        result,
    };
    let out_path = cfg
        .output_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tmpdata/solve_slide_report.json"));
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, serde_json::to_string_pretty(&report)?)?;
    println!("wrote report JSON to {}", out_path.display());
    Ok(())
}

#[cfg(not(feature = "tracing"))]
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    captcha_kit::core::init_with_level(LevelFilter::Info)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    captcha_kit::core::init_tracing(false);
    Ok(())
}
