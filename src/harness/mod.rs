//! Harness 门面模块
//!
//! 把视频生产者与前台控制循环装配成一个会话对象。大多数应用
//! 从 [`HarnessBuilder`] 出发：
//!
//! ```ignore
//! let mut harness = HarnessBuilder::new()
//!     .speed(50)
//!     .build(commander, input)?;
//! harness.start_video(source, decoder);
//! harness.run(|frame| { /* 视觉分析 */ });
//! harness.shutdown()?;
//! ```

mod builder;

pub use builder::HarnessBuilder;

use std::time::Instant;
use tracing::warn;

use crate::control::ControlLoop;
use crate::error::HarnessError;
use crate::shared::{ExitSignal, SharedFrame, VideoFrame};
use crate::transport::{DroneCommander, FrameDecoder, InputSource, VideoSource};
use crate::video::{FrameProducer, ProducerConfig};

/// 遥控会话门面
pub struct Harness<C: DroneCommander, I: InputSource> {
    control: ControlLoop<C, I>,
    producer: Option<FrameProducer>,
    retry_budget: u32,
}

impl<C: DroneCommander, I: InputSource> std::fmt::Debug for Harness<C, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("retry_budget", &self.retry_budget)
            .field("has_producer", &self.producer.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: DroneCommander, I: InputSource> Harness<C, I> {
    pub(crate) fn new(control: ControlLoop<C, I>, retry_budget: u32) -> Self {
        Self {
            control,
            producer: None,
            retry_budget,
        }
    }

    /// 启动后台视频生产线程
    ///
    /// 已有生产者在跑时忽略（记警告日志）。
    pub fn start_video<V, D>(&mut self, source: V, decoder: D)
    where
        V: VideoSource + 'static,
        D: FrameDecoder + 'static,
    {
        if self.producer.is_some() {
            warn!("Video producer already running, ignored");
            return;
        }
        self.producer = Some(FrameProducer::spawn(
            source,
            decoder,
            self.control.shared_frame(),
            self.control.exit_signal(),
            ProducerConfig {
                retry_budget: self.retry_budget,
            },
        ));
    }

    /// 按动作名入队定时命令（见 [`ControlLoop::enqueue`]）
    pub fn enqueue(&mut self, action: &str, duration_ms: u64) -> bool {
        self.control.enqueue(action, duration_ms)
    }

    /// 启用/停用队列调度
    pub fn set_queue_enabled(&mut self, enabled: bool) {
        self.control.set_queue_enabled(enabled);
    }

    /// 翻转队列调度开关（键盘上由队列开关键触发同一语义）
    pub fn toggle_queue_enabled(&mut self) {
        self.control.toggle_queue_enabled();
    }

    /// 队列调度是否启用
    pub fn is_queue_enabled(&self) -> bool {
        self.control.is_queue_enabled()
    }

    /// 是否存在激活的队列条目
    pub fn is_queue_item_active(&self) -> bool {
        self.control.is_queue_item_active()
    }

    /// 队列长度
    pub fn queue_len(&self) -> usize {
        self.control.queue_len()
    }

    /// 退出信号句柄（交给 Ctrl-C 处理器等外部停止路径）
    pub fn exit_signal(&self) -> ExitSignal {
        self.control.exit_signal()
    }

    /// 帧信箱句柄
    pub fn shared_frame(&self) -> SharedFrame {
        self.control.shared_frame()
    }

    /// 命令通道直接访问
    pub fn commander_mut(&mut self) -> &mut C {
        self.control.commander_mut()
    }

    /// 执行一个 tick（自定义循环用）
    pub fn tick<F: FnMut(&VideoFrame)>(&mut self, on_frame: &mut F) {
        self.control.tick(on_frame);
    }

    /// 以给定时刻执行一个 tick（测试用确定性时钟入口）
    pub fn tick_at<F: FnMut(&VideoFrame)>(&mut self, now: Instant, on_frame: &mut F) {
        self.control.tick_at(now, on_frame);
    }

    /// 打包好的前台循环，直到退出信号置位
    pub fn run<F: FnMut(&VideoFrame)>(&mut self, on_frame: F) {
        self.control.run(on_frame);
    }

    /// 结束会话：置位退出信号并等待生产线程退出
    pub fn shutdown(mut self) -> Result<(), HarnessError> {
        self.control.exit_signal().set();
        if let Some(producer) = self.producer.take() {
            producer.join()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::VideoFrame;
    use crate::transport::{InputChannel, VideoError, VideoPacket};

    struct NullCommander;

    impl DroneCommander for NullCommander {
        fn forward(&mut self, _speed: u8) {}
        fn backward(&mut self, _speed: u8) {}
        fn left(&mut self, _speed: u8) {}
        fn right(&mut self, _speed: u8) {}
        fn up(&mut self, _speed: u8) {}
        fn down(&mut self, _speed: u8) {}
        fn clockwise(&mut self, _speed: u8) {}
        fn counter_clockwise(&mut self, _speed: u8) {}
        fn takeoff(&mut self) {}
        fn land(&mut self) {}
        fn palm_land(&mut self) {}
        fn take_picture(&mut self) {}
    }

    struct OnePacketSource {
        sent: bool,
    }

    impl VideoSource for OnePacketSource {
        fn next_packet(&mut self) -> Result<VideoPacket, VideoError> {
            if self.sent {
                std::thread::sleep(std::time::Duration::from_millis(1));
                return Err(VideoError::Timeout);
            }
            self.sent = true;
            Ok(VideoPacket {
                data: vec![42],
                timestamp_us: 1,
            })
        }
    }

    struct PassDecoder;

    impl FrameDecoder for PassDecoder {
        fn decode(&mut self, packet: &VideoPacket) -> Result<Vec<VideoFrame>, VideoError> {
            Ok(vec![VideoFrame::rgb24(1, 1, packet.data.clone(), packet.timestamp_us)])
        }
    }

    #[test]
    fn test_harness_video_roundtrip_and_shutdown() {
        let (_sender, input) = InputChannel::pair();
        let mut harness = HarnessBuilder::new().build(NullCommander, input).unwrap();
        let shared = harness.shared_frame();

        harness.start_video(OnePacketSource { sent: false }, PassDecoder);

        // 等生产者发布第一帧
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while shared.get().is_none() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(shared.get().map(|f| f.timestamp_us), Some(1));

        harness.shutdown().unwrap();
    }

    #[test]
    fn test_queue_surface_delegates() {
        let (_sender, input) = InputChannel::pair();
        let mut harness = HarnessBuilder::new().build(NullCommander, input).unwrap();

        assert!(harness.enqueue("takeoff", 100));
        assert!(!harness.enqueue("warp", 100));
        assert_eq!(harness.queue_len(), 1);
        assert!(!harness.is_queue_item_active());

        harness.set_queue_enabled(true);
        harness.tick_at(Instant::now(), &mut |_| {});
        assert!(harness.is_queue_item_active());
    }
}
