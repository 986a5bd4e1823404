//! 最小用法演示
//!
//! 装配 harness、启动视频、跑打包好的前台循环。没有真实键盘，
//! 用一个脚本线程模拟操作员：按住 W 前进一秒，然后按取消键结束。

mod common;

use common::{GradientDecoder, LoggingCommander, SyntheticVideo};
use droneb_sdk::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    println!("🚁 DroneB SDK - 基础演示");
    println!("========================\n");

    let (input_tx, input) = InputChannel::pair();
    let mut harness = HarnessBuilder::new().speed(50).build(LoggingCommander, input)?;
    harness.start_video(SyntheticVideo::new(), GradientDecoder);

    // 模拟操作员按键
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        input_tx.press("w");
        thread::sleep(Duration::from_secs(1));
        input_tx.release("w");
        thread::sleep(Duration::from_millis(200));
        input_tx.press("escape");
    });

    let mut frames: u64 = 0;
    harness.run(|_frame| frames += 1);

    println!("\n✅ 会话结束，共消费 {} 个 tick 帧", frames);
    harness.shutdown()?;
    Ok(())
}
