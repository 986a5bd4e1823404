//! 自定义前台循环演示
//!
//! 应用自己掌控循环时逐 tick 调用 `tick()`，在回调里做视觉分析
//! （这里算平均亮度），并按自己的条件退出。

mod common;

use clap::Parser;
use common::{GradientDecoder, LoggingCommander, SyntheticVideo};
use droneb_sdk::prelude::*;
use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "custom_loop")]
#[command(about = "自定义循环演示 - 每 30 帧输出一次平均亮度")]
struct Args {
    /// 运行时长（秒）
    #[arg(long, default_value = "3")]
    duration_sec: u64,

    /// tick 周期（毫秒）
    #[arg(long, default_value = "10")]
    tick_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let args = Args::parse();

    println!("🚁 DroneB SDK - 自定义循环演示");
    println!("==============================\n");

    let (_input_tx, input) = InputChannel::pair();
    let mut harness = HarnessBuilder::new()
        .tick_period(Duration::from_millis(args.tick_ms))
        .build(LoggingCommander, input)?;
    harness.start_video(SyntheticVideo::new(), GradientDecoder);

    let exit = harness.exit_signal();
    let deadline = Instant::now() + Duration::from_secs(args.duration_sec);
    let sleeper = SpinSleeper::default();
    let mut frame_count: u64 = 0;

    while !exit.is_set() && Instant::now() < deadline {
        harness.tick(&mut |frame| {
            frame_count += 1;
            // 每 30 帧分析一次就够了（与视频帧率解耦）
            if frame_count % 30 == 0 {
                let sum: u64 = frame.data.iter().map(|&b| b as u64).sum();
                let mean = sum / frame.data.len().max(1) as u64;
                println!(
                    "📷 帧 #{}: {}x{}，平均亮度 {}",
                    frame_count, frame.width, frame.height, mean
                );
            }
        });
        sleeper.sleep(Duration::from_millis(args.tick_ms));
    }

    exit.set();
    harness.shutdown()?;
    println!("\n✅ 共消费 {} 个 tick 帧", frame_count);
    Ok(())
}
