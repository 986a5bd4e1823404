//! 定时命令队列调度模块
//!
//! 有序的定时动作序列。调度器每 tick 推进一次，任意时刻至多一个
//! 条目处于激活态：激活时合成该条目按键的按下事件，到期时合成
//! 匹配的松开事件并出队。合成事件由调用方路由进与真实输入相同的
//! 分发路径。
//!
//! # 状态机
//!
//! - `idle`: 队列为空或调度停用
//! - `item-pending-activation`: 队首存在，尚未激活
//! - `item-active`: 已发按下事件，松开未到期
//! - `item-expiring`: 本 tick 发出松开事件，条目随即出队

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::transport::{Key, KeyEvent};

/// 队列条目：按键 + 激活时长
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    key: Key,
    duration: Duration,
}

impl QueueItem {
    /// 条目按键
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// 激活时长
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// 定时命令队列
///
/// 单线程使用，归控制循环独占，无需加锁。队列变动相对调度器自身的
/// tick 是原子的。
///
/// # Example
///
/// ```
/// use droneb_sdk::control::CommandQueue;
/// use std::time::Instant;
///
/// let mut queue = CommandQueue::new();
/// queue.enqueue("w".into(), 500);
/// queue.set_enabled(true);
///
/// let now = Instant::now();
/// let press = queue.advance(now).unwrap();
/// assert_eq!(press.key.as_str(), "w");
/// assert!(queue.is_item_active());
/// ```
#[derive(Debug, Default)]
pub struct CommandQueue {
    items: VecDeque<QueueItem>,
    enabled: bool,
    /// 激活条目的到期时刻；`Some` 当且仅当存在激活条目
    deadline: Option<Instant>,
}

impl CommandQueue {
    /// 创建空队列（调度默认停用）
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个条目到队尾
    ///
    /// 激活中的队列照常可追加。时长必须为正的整毫秒数：
    /// 0 在入队时静默拒绝（记警告日志，队列不变），返回 `false`。
    pub fn enqueue(&mut self, key: Key, duration_ms: u64) -> bool {
        if duration_ms == 0 {
            warn!(key = %key, "Rejected queue item with non-positive duration");
            return false;
        }
        self.items.push_back(QueueItem {
            key,
            duration: Duration::from_millis(duration_ms),
        });
        true
    }

    /// 启用/停用调度
    ///
    /// 停用时立即清除到期状态而不合成松开事件：被打断的条目原样
    /// 弃置在队首，对应原语可能保持按下幅值——这是调用方停用时
    /// 接受的字面语义。重新启用后从未变的队首重新开始完整计时。
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled && self.deadline.take().is_some() {
            warn!("Queue disabled mid-item; no release synthesized");
        }
        debug!(enabled, "Queue scheduling toggled");
    }

    /// 翻转调度开关（操作员切换键用）
    pub fn toggle_enabled(&mut self) {
        self.set_enabled(!self.enabled);
    }

    /// 调度是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 是否存在激活条目（已按下、未松开）
    pub fn is_item_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// 队列长度（含激活中的队首）
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 推进调度状态机一步，至多返回一个合成事件
    ///
    /// 每 tick 调用一次。转移规则：
    /// 1. 无激活条目且队列非空 → 观察队首（不出队），记录到期时刻
    ///    `now + duration`，返回按下事件
    /// 2. 有激活条目且 `now >= deadline` → 清除激活标记、队首出队，
    ///    返回松开事件（空出的槽位下一 tick 走规则 1）
    /// 3. 有激活条目且未到期 → 本 tick 无动作
    /// 4. 调度停用 → 清除到期状态，不合成松开事件
    pub fn advance(&mut self, now: Instant) -> Option<KeyEvent> {
        if !self.enabled {
            self.deadline = None;
            return None;
        }

        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                // deadline 存在则队首必然存在
                let item = self.items.pop_front()?;
                debug!(key = %item.key, "Queue item released");
                Some(KeyEvent::release(item.key))
            },
            Some(_) => None,
            None => {
                let head = self.items.front()?;
                self.deadline = Some(now + head.duration);
                debug!(key = %head.key, duration_ms = head.duration.as_millis() as u64,
                       "Queue item activated");
                Some(KeyEvent::press(head.key.clone()))
            },
        }
    }
}
