//! 视频帧生产者模块
//!
//! 后台线程：从 [`VideoSource`] 拉原始包，经 [`FrameDecoder`] 解码，
//! 把每一帧发布进 [`SharedFrame`]，直到退出信号置位或失败预算耗尽。
//! 生产线程独立于控制循环的节拍运行，阻塞在传输层 IO 上。

use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

use crate::error::HarnessError;
use crate::shared::{ExitSignal, SharedFrame};
use crate::transport::{FrameDecoder, VideoError, VideoSource};

/// 生产者配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    /// 连续失败预算
    ///
    /// 单包错误（解码失败、传输错误）非致命：记日志、跳过、继续。
    /// 连续失败达到该值时升级为关停：置位退出信号并结束线程。
    /// 任何一次成功解码都会清零计数。
    pub retry_budget: u32,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self { retry_budget: 30 }
    }
}

/// 视频帧生产者句柄
///
/// # Example
///
/// ```ignore
/// let producer = FrameProducer::spawn(source, decoder, shared, exit, ProducerConfig::default());
/// // ... 前台控制循环 ...
/// exit.set();
/// producer.join()?;
/// ```
pub struct FrameProducer {
    handle: JoinHandle<()>,
}

impl FrameProducer {
    /// 启动生产线程
    pub fn spawn<V, D>(
        source: V,
        decoder: D,
        shared: SharedFrame,
        exit: ExitSignal,
        config: ProducerConfig,
    ) -> Self
    where
        V: VideoSource + 'static,
        D: FrameDecoder + 'static,
    {
        let handle = thread::spawn(move || {
            producer_loop(source, decoder, &shared, &exit, &config);
        });
        Self { handle }
    }

    /// 线程是否已结束
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 等待线程退出
    pub fn join(self) -> Result<(), HarnessError> {
        self.handle.join().map_err(|_| HarnessError::ProducerPanicked)
    }
}

/// 生产者主循环
///
/// 退出条件：退出信号置位，或连续失败达到预算（此时同时置位退出信号，
/// 控制循环在下一个 tick 观察到并结束会话）。
fn producer_loop(
    mut source: impl VideoSource,
    mut decoder: impl FrameDecoder,
    shared: &SharedFrame,
    exit: &ExitSignal,
    config: &ProducerConfig,
) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if exit.is_set() {
            break;
        }

        // 1. 拉取下一个原始包
        let packet = match source.next_packet() {
            Ok(packet) => packet,
            Err(VideoError::Timeout) => {
                // 超时是正常情况，不计入失败预算
                continue;
            },
            Err(e) => {
                consecutive_failures += 1;
                warn!(
                    "Video packet error ({}/{}): {}",
                    consecutive_failures, config.retry_budget, e
                );
                if consecutive_failures >= config.retry_budget {
                    error!("Video retry budget exhausted, requesting shutdown");
                    exit.set();
                    break;
                }
                continue;
            },
        };

        // 2. 解码（一个包可能产出零到多帧）
        match decoder.decode(&packet) {
            Ok(frames) => {
                consecutive_failures = 0;
                for frame in frames {
                    // 发布失败（锁争用超时）＝跳过本帧，set 内部已记日志
                    shared.set(frame);
                }
            },
            Err(e) => {
                consecutive_failures += 1;
                warn!(
                    "Frame decode error ({}/{}): {}",
                    consecutive_failures, config.retry_budget, e
                );
                if consecutive_failures >= config.retry_budget {
                    error!("Video retry budget exhausted, requesting shutdown");
                    exit.set();
                    break;
                }
            },
        }
    }

    debug!("Frame producer thread exiting");
}
