//! 跨线程共享状态模块
//!
//! 线程边界上只有两个共享对象：最新视频帧的单槽信箱（[`SharedFrame`]）
//! 与退出信号（[`ExitSignal`]）。两者都是句柄类型（内部 `Arc`），
//! 在构造时克隆后分别交给视频生产者线程与前台控制循环，不经过任何全局变量。
//!
//! # 同步机制
//!
//! - `SharedFrame`: `parking_lot::Mutex`，写入端限时获取锁（拿不到则丢弃本帧）
//! - `ExitSignal`: `AtomicBool`，置位后在会话内不再复位

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// 发布端获取锁的最长等待时间
///
/// 超时即放弃本次发布。帧投递是尽力而为、以最新为准的语义，
/// 丢弃一帧不是错误。
const SET_LOCK_TIMEOUT: Duration = Duration::from_millis(100);

/// 解码后的视频帧（RGB24）
///
/// `Clone` 产生完全独立的拷贝：消费者拿到的帧不会被生产者的
/// 后续写入改动。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// 宽度（像素）
    pub width: u32,
    /// 高度（像素）
    pub height: u32,
    /// 像素数据（RGB24 按行排列，长度 = width * height * 3）
    pub data: Vec<u8>,
    /// 解码时间戳（微秒，来自传输层的相对时间，不是 UNIX 时间戳）
    pub timestamp_us: u64,
}

impl VideoFrame {
    /// 从 RGB24 像素数据构造一帧
    pub fn rgb24(width: u32, height: u32, data: Vec<u8>, timestamp_us: u64) -> Self {
        Self {
            width,
            height,
            data,
            timestamp_us,
        }
    }
}

/// 最新视频帧的单槽信箱
///
/// 生产者每解出一帧就覆盖槽内旧值；未被消费的旧帧直接丢弃
/// （有界陈旧、无界丢弃）。消费者读到的是独立克隆，慢消费者
/// 不会观察到"写了一半"的帧。
///
/// # Example
///
/// ```
/// use droneb_sdk::shared::{SharedFrame, VideoFrame};
///
/// let shared = SharedFrame::new();
/// assert!(shared.get().is_none());
///
/// shared.set(VideoFrame::rgb24(2, 2, vec![0; 12], 1000));
/// assert_eq!(shared.get().map(|f| f.timestamp_us), Some(1000));
/// ```
#[derive(Clone)]
pub struct SharedFrame {
    slot: Arc<Mutex<Option<VideoFrame>>>,
}

impl SharedFrame {
    /// 创建空信箱（首次发布前 `get()` 返回 `None`）
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// 发布一帧（尽力而为）
    ///
    /// 与并发的 `get()`/`set()` 互斥。在 [`SET_LOCK_TIMEOUT`] 内拿不到锁
    /// 则跳过本次更新并返回 `false`，绝不让生产者无限期阻塞。
    pub fn set(&self, frame: VideoFrame) -> bool {
        match self.slot.try_lock_for(SET_LOCK_TIMEOUT) {
            Some(mut slot) => {
                *slot = Some(frame);
                true
            },
            None => {
                warn!("SharedFrame lock contended, frame dropped");
                false
            },
        }
    }

    /// 读取最新帧的独立拷贝
    ///
    /// 返回最近一次发布的帧，或首次发布前的 `None`。
    /// 锁只在克隆期间持有，不跨越整个 tick。
    pub fn get(&self) -> Option<VideoFrame> {
        self.slot.lock().clone()
    }
}

impl Default for SharedFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// 跨线程退出信号
///
/// 默认 `false`。由关停路径置位（致命传输错误、操作员取消键、
/// 外部停止请求），两个循环在各自的下一次迭代内观察到。
/// 一经置位，会话内不再复位。
#[derive(Clone)]
pub struct ExitSignal {
    flag: Arc<AtomicBool>,
}

impl ExitSignal {
    /// 创建未置位的信号
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 置位退出信号（幂等）
    pub fn set(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            debug!("Exit signal set");
        }
    }

    /// 读取当前状态
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Default for ExitSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_frame_empty_before_first_set() {
        let shared = SharedFrame::new();
        assert!(shared.get().is_none());
    }

    #[test]
    fn test_shared_frame_latest_wins() {
        let shared = SharedFrame::new();
        assert!(shared.set(VideoFrame::rgb24(1, 1, vec![1, 2, 3], 1)));
        assert!(shared.set(VideoFrame::rgb24(1, 1, vec![4, 5, 6], 2)));

        let frame = shared.get().unwrap();
        assert_eq!(frame.timestamp_us, 2);
        assert_eq!(frame.data, vec![4, 5, 6]);
    }

    #[test]
    fn test_shared_frame_get_is_independent_copy() {
        let shared = SharedFrame::new();
        shared.set(VideoFrame::rgb24(1, 1, vec![7, 7, 7], 1));

        let mut copy = shared.get().unwrap();
        copy.data[0] = 0;

        // 消费者改动自己的拷贝，不影响槽内的值
        assert_eq!(shared.get().unwrap().data, vec![7, 7, 7]);
    }

    #[test]
    fn test_shared_frame_handles_share_one_slot() {
        let a = SharedFrame::new();
        let b = a.clone();
        a.set(VideoFrame::rgb24(1, 1, vec![9, 9, 9], 42));
        assert_eq!(b.get().unwrap().timestamp_us, 42);
    }

    #[test]
    fn test_exit_signal_default_false() {
        let exit = ExitSignal::new();
        assert!(!exit.is_set());
    }

    #[test]
    fn test_exit_signal_set_visible_through_clone() {
        let exit = ExitSignal::new();
        let handle = exit.clone();
        exit.set();
        assert!(handle.is_set());
        // 重复置位是幂等的
        exit.set();
        assert!(handle.is_set());
    }
}
