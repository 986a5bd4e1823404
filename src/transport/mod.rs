//! 外部协作者接口层
//!
//! 核心只定义并发与命令排程契约，机体协议、视频解码、窗口系统
//! 都是外部协作者，通过这里的 trait 接入：
//!
//! - [`DroneCommander`]: 机体命令通道（具名原语，发后不理）
//! - [`VideoSource`] / [`FrameDecoder`]: 阻塞的原始视频包迭代器与逐包解码器
//! - [`InputSource`]: 可排空的按键事件队列（键标识视为不透明字符串）
//!
//! [`InputChannel`] 提供基于 crossbeam-channel 的 `InputSource` 实现，
//! 发送端交给窗口/输入层持有。

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use std::fmt;
use thiserror::Error;
use tracing::trace;

use crate::shared::VideoFrame;

/// 平台按键标识（不透明字符串，如 `"w"`、`"escape"`、`"tab"`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// 从任意字符串构造键标识
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 键名
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 按键事件相位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    /// 按下
    Press,
    /// 松开
    Release,
}

/// 按键事件
///
/// 由真实输入产生，或由命令队列合成；两条路径走同一个分发函数，
/// 下游动作处理器无法区分来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// 键标识
    pub key: Key,
    /// 相位（按下/松开）
    pub phase: KeyPhase,
}

impl KeyEvent {
    /// 构造按下事件
    pub fn press(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Press,
        }
    }

    /// 构造松开事件
    pub fn release(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Release,
        }
    }
}

/// 机体命令通道
///
/// 每个调用都是发后不理的；幅值为 0 的重复调用必须幂等
/// （"停止"可以安全地发多次）。离散动作（起飞/降落等）不带幅值。
pub trait DroneCommander: Send {
    /// 前进（speed: 0 表示停止）
    fn forward(&mut self, speed: u8);
    /// 后退
    fn backward(&mut self, speed: u8);
    /// 左平移
    fn left(&mut self, speed: u8);
    /// 右平移
    fn right(&mut self, speed: u8);
    /// 上升
    fn up(&mut self, speed: u8);
    /// 下降
    fn down(&mut self, speed: u8);
    /// 顺时针偏航
    fn clockwise(&mut self, speed: u8);
    /// 逆时针偏航
    fn counter_clockwise(&mut self, speed: u8);
    /// 起飞
    fn takeoff(&mut self);
    /// 降落
    fn land(&mut self);
    /// 手掌降落
    fn palm_land(&mut self);
    /// 拍照
    fn take_picture(&mut self);
}

/// 原始视频包（未解码）
#[derive(Debug, Clone)]
pub struct VideoPacket {
    /// 包数据
    pub data: Vec<u8>,
    /// 传输层时间戳（微秒，相对时间）
    pub timestamp_us: u64,
}

/// 视频传输/解码错误
#[derive(Error, Debug)]
pub enum VideoError {
    /// 读超时（正常情况，生产者直接重试，不计入失败预算）
    #[error("Read timeout")]
    Timeout,

    /// 单包解码失败（非致命，跳过该包）
    #[error("Decode error: {0}")]
    Decode(String),

    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(String),

    /// 连接断开
    ///
    /// 传输层必须把断连上报为错误而不是挂起，否则基于退出信号的
    /// 协作式关停无法生效。
    #[error("Video transport disconnected")]
    Disconnected,
}

/// 视频传输：阻塞的原始包迭代器
pub trait VideoSource: Send {
    /// 拉取下一个原始包（阻塞，超时返回 [`VideoError::Timeout`]）
    fn next_packet(&mut self) -> Result<VideoPacket, VideoError>;
}

/// 逐包解码器
pub trait FrameDecoder: Send {
    /// 解码一个包，可能产出零到多帧
    fn decode(&mut self, packet: &VideoPacket) -> Result<Vec<VideoFrame>, VideoError>;
}

/// 输入源：可排空的按键事件队列（非阻塞）
pub trait InputSource {
    /// 取出一个待处理事件，队列为空时返回 `None`
    fn poll(&mut self) -> Option<KeyEvent>;
}

/// 输入事件发送端
///
/// 交给窗口/输入层持有，在平台回调里转发按键事件。
#[derive(Clone)]
pub struct InputSender {
    tx: Sender<KeyEvent>,
}

impl InputSender {
    /// 发送一个事件
    ///
    /// 接收端已销毁时静默丢弃（控制循环已结束，事件无处可去）。
    pub fn send(&self, event: KeyEvent) {
        if self.tx.send(event).is_err() {
            trace!("Input receiver gone, event dropped");
        }
    }

    /// 发送按下事件
    pub fn press(&self, key: impl Into<Key>) {
        self.send(KeyEvent::press(key.into()));
    }

    /// 发送松开事件
    pub fn release(&self, key: impl Into<Key>) {
        self.send(KeyEvent::release(key.into()));
    }
}

/// 基于 crossbeam-channel 的输入源实现
///
/// # Example
///
/// ```
/// use droneb_sdk::transport::{InputChannel, InputSource};
///
/// let (sender, mut input) = InputChannel::pair();
/// sender.press("w");
/// sender.release("w");
///
/// assert_eq!(input.poll().map(|e| e.key.as_str().to_string()), Some("w".to_string()));
/// assert!(input.poll().is_some());
/// assert!(input.poll().is_none());
/// ```
pub struct InputChannel {
    rx: Receiver<KeyEvent>,
}

impl InputChannel {
    /// 创建一对（发送端，输入源）
    pub fn pair() -> (InputSender, InputChannel) {
        let (tx, rx) = unbounded();
        (InputSender { tx }, InputChannel { rx })
    }
}

impl InputSource for InputChannel {
    fn poll(&mut self) -> Option<KeyEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
