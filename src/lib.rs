//! DroneB SDK - Tello 级四旋翼实时遥控 harness
//!
//! 后台生产者持续解码视频流，前台 tick 循环消费最新帧并把操作员
//! 按键换算成运动命令；可选的脚本命令队列按时长逐条回放动作序列。
//! 本 crate 只定义并发与命令排程核心，机体协议、视频解码、窗口
//! 渲染都作为外部协作者经 trait 接入。
//!
//! # 架构设计
//!
//! 按功能分层，从底到高：
//!
//! - **共享状态** (`shared`): 帧信箱与退出信号，线程边界上仅有的共享对象
//! - **接口层** (`transport`): 机体命令通道、视频传输/解码、输入源的 trait
//! - **视频层** (`video`): 后台帧生产线程（解码 → 发布，带失败预算）
//! - **控制层** (`control`): 键位绑定、事件分发、定时命令队列、tick 循环
//! - **门面层** (`harness`): 装配与启动（Builder 入口）
//!
//! # 快速开始
//!
//! ```ignore
//! use droneb_sdk::prelude::*;
//!
//! let (input_tx, input) = InputChannel::pair();   // 发送端交给窗口层
//! let mut harness = HarnessBuilder::new()
//!     .speed(50)
//!     .build(commander, input)?;
//! harness.start_video(source, decoder);
//!
//! harness.enqueue("takeoff", 2000);
//! harness.enqueue("forward", 500);
//! harness.set_queue_enabled(true);
//!
//! harness.run(|frame| {
//!     // frame 是独立拷贝，可自由分析/改动
//! });
//! harness.shutdown()?;
//! ```

pub mod control;
pub mod error;
pub mod harness;
pub mod shared;
pub mod transport;
pub mod video;

// Prelude 模块
pub mod prelude;

// --- 常用类型的顶层导出 ---

pub use control::{Binding, CommandQueue, ControlBindings, ControlLoop, DroneAction, LoopConfig};
pub use error::HarnessError;
pub use harness::{Harness, HarnessBuilder};
pub use shared::{ExitSignal, SharedFrame, VideoFrame};
pub use transport::{
    DroneCommander, FrameDecoder, InputChannel, InputSender, InputSource, Key, KeyEvent, KeyPhase,
    VideoError, VideoPacket, VideoSource,
};
pub use video::{FrameProducer, ProducerConfig};
