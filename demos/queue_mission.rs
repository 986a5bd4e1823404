//! 脚本命令队列演示
//!
//! 预先装入一段飞行脚本（起飞 → 12 轮偏航/右移/前进 → 降落），
//! 启用调度后队列逐条回放：激活时合成按键按下，到期时合成松开，
//! 与操作员手动控制走同一条分发路径。

mod common;

use clap::Parser;
use common::{GradientDecoder, LoggingCommander, SyntheticVideo};
use droneb_sdk::prelude::*;
use spin_sleep::SpinSleeper;
use std::time::Duration;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "queue_mission")]
#[command(about = "命令队列演示 - 回放一段定时飞行脚本")]
struct Args {
    /// 巡航段的循环次数
    #[arg(long, default_value = "12")]
    laps: u32,

    /// 按下幅值（速度）
    #[arg(long, default_value = "50")]
    speed: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let args = Args::parse();

    println!("🚁 DroneB SDK - 命令队列演示");
    println!("============================\n");

    let (_input_tx, input) = InputChannel::pair();
    let mut harness = HarnessBuilder::new().speed(args.speed).build(LoggingCommander, input)?;
    harness.start_video(SyntheticVideo::new(), GradientDecoder);

    // 装入飞行脚本
    harness.enqueue("takeoff", 2000);
    for _ in 0..args.laps {
        harness.enqueue("yaw_left", 500);
        harness.enqueue("right", 500);
        harness.enqueue("forward", 300);
    }
    harness.enqueue("land", 1000);
    println!("📜 脚本就绪：{} 条命令，启用调度\n", harness.queue_len());
    harness.set_queue_enabled(true);

    let exit = harness.exit_signal();
    let sleeper = SpinSleeper::default();
    while !exit.is_set() && (harness.queue_len() > 0 || harness.is_queue_item_active()) {
        harness.tick(&mut |_frame| {});
        sleeper.sleep(Duration::from_millis(10));
    }

    println!("\n✅ 脚本回放完毕");
    harness.shutdown()?;
    Ok(())
}
