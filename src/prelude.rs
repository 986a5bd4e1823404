//! 一站式导入
//!
//! ```ignore
//! use droneb_sdk::prelude::*;
//! ```

pub use crate::control::{CommandQueue, ControlBindings, ControlLoop, DroneAction, LoopConfig};
pub use crate::error::HarnessError;
pub use crate::harness::{Harness, HarnessBuilder};
pub use crate::shared::{ExitSignal, SharedFrame, VideoFrame};
pub use crate::transport::{
    DroneCommander, FrameDecoder, InputChannel, InputSender, InputSource, Key, KeyEvent, KeyPhase,
    VideoError, VideoPacket, VideoSource,
};
pub use crate::video::{FrameProducer, ProducerConfig};
