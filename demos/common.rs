//! 演示共用的模拟协作者
//!
//! 真实部署里命令通道接机体 UDP 协议、视频源接 H.264 流、输入源
//! 接窗口层回调；演示里用合成实现替代，让例子可以离线运行。

#![allow(dead_code)]

use droneb_sdk::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;

/// 把每个命令打到日志的命令通道
pub struct LoggingCommander;

impl DroneCommander for LoggingCommander {
    fn forward(&mut self, speed: u8) {
        info!(speed, "cmd: forward");
    }
    fn backward(&mut self, speed: u8) {
        info!(speed, "cmd: backward");
    }
    fn left(&mut self, speed: u8) {
        info!(speed, "cmd: left");
    }
    fn right(&mut self, speed: u8) {
        info!(speed, "cmd: right");
    }
    fn up(&mut self, speed: u8) {
        info!(speed, "cmd: up");
    }
    fn down(&mut self, speed: u8) {
        info!(speed, "cmd: down");
    }
    fn clockwise(&mut self, speed: u8) {
        info!(speed, "cmd: clockwise");
    }
    fn counter_clockwise(&mut self, speed: u8) {
        info!(speed, "cmd: counter_clockwise");
    }
    fn takeoff(&mut self) {
        info!("cmd: takeoff");
    }
    fn land(&mut self) {
        info!("cmd: land");
    }
    fn palm_land(&mut self) {
        info!("cmd: palm_land");
    }
    fn take_picture(&mut self) {
        info!("cmd: take_picture");
    }
}

/// 约 30fps 出包的合成视频源
pub struct SyntheticVideo {
    started: Instant,
    seq: u64,
}

impl SyntheticVideo {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            seq: 0,
        }
    }
}

impl VideoSource for SyntheticVideo {
    fn next_packet(&mut self) -> Result<VideoPacket, VideoError> {
        std::thread::sleep(Duration::from_millis(33));
        self.seq += 1;
        Ok(VideoPacket {
            data: vec![(self.seq % 256) as u8],
            timestamp_us: self.started.elapsed().as_micros() as u64,
        })
    }
}

/// 把包首字节铺成 64x48 灰度渐变帧的解码器
pub struct GradientDecoder;

impl FrameDecoder for GradientDecoder {
    fn decode(&mut self, packet: &VideoPacket) -> Result<Vec<VideoFrame>, VideoError> {
        let base = *packet
            .data
            .first()
            .ok_or_else(|| VideoError::Decode("empty packet".to_string()))?;
        let (w, h) = (64u32, 48u32);
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for _ in 0..w {
                let v = base.wrapping_add(y as u8);
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Ok(vec![VideoFrame::rgb24(w, h, data, packet.timestamp_us)])
    }
}

/// 初始化日志（RUST_LOG 可覆盖级别）
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
