//! # Stand Host
//!
//! 立绘系统的 headless 宿主：读取立绘配置和剧本，逐帧驱动 Overlay，
//! 并把所有渲染指令打印到日志。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli -- --config stand_overlay.json --scenario demo.json
//! cargo run -p host-cli -- --scenario demo.json --image-size 480x720 --verbose
//! ```

mod renderer;
mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use stand_runtime::{ImageSize, OverlayConfig, SlotId};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use renderer::LoggingRenderer;
use scenario::{Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "stand-host")]
#[command(about = "立绘系统 headless 宿主 - 按剧本驱动立绘并打印渲染指令")]
#[command(version)]
struct Cli {
    /// 立绘配置文件（不存在时使用默认配置）
    #[arg(short, long, default_value = "stand_overlay.json")]
    config: PathBuf,

    /// 剧本文件
    #[arg(short, long)]
    scenario: PathBuf,

    /// 模拟加载出的图片尺寸（宽x高）
    #[arg(long, default_value = "400x600", value_parser = parse_image_size)]
    image_size: ImageSize,

    /// 输出逐帧的 move/load 指令
    #[arg(short, long)]
    verbose: bool,
}

fn parse_image_size(value: &str) -> Result<ImageSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("尺寸格式应为 宽x高: {}", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| format!("无效的尺寸 {}: {}", s, e))
    };
    Ok(ImageSize::new(parse(width)?, parse(height)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = OverlayConfig::load(&cli.config);
    if let Err(e) = config.validate() {
        warn!(error = %e, "配置存在无效条目，将被跳过");
    }
    let scenario = Scenario::load(&cli.scenario)?;

    let mut runner = ScenarioRunner::new(
        config.build(),
        scenario.state.clone(),
        LoggingRenderer::new(cli.image_size),
    );
    let summary = runner.run(&scenario.steps).clone();

    info!(
        frames = summary.frames,
        messages = summary.messages.len(),
        tone = ?runner.tone().to_array(),
        "剧本执行完成"
    );
    for (kind, count) in runner.renderer().counts() {
        info!(kind, count, "渲染指令统计");
    }
    for id in [SlotId::Primary, SlotId::Secondary] {
        let slot = runner.overlay().dialogue().slot(id);
        info!(slot = ?id, phase = ?slot.phase(), opacity = slot.opacity(), "槽位最终状态");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_size() {
        assert_eq!(parse_image_size("400x600"), Ok(ImageSize::new(400, 600)));
        assert_eq!(parse_image_size("32X48"), Ok(ImageSize::new(32, 48)));
        assert!(parse_image_size("400").is_err());
        assert!(parse_image_size("ax600").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["stand-host", "--scenario", "demo.json", "-v"]).unwrap();
        assert_eq!(cli.scenario, PathBuf::from("demo.json"));
        assert_eq!(cli.config, PathBuf::from("stand_overlay.json"));
        assert_eq!(cli.image_size, ImageSize::new(400, 600));
        assert!(cli.verbose);
    }
}
