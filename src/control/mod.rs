//! 前台控制循环模块
//!
//! 每 tick 按固定顺序执行：排空并分发输入事件 → 读取最新帧交给
//! 应用层分析 → 推进命令队列调度器。固定顺序是契约：队列合成的
//! 事件必须和真实键盘事件走同一条分发路径，下游动作处理器才无法
//! 区分脚本驱动与操作员驱动的控制。
//!
//! 循环在退出信号置位后结束；排空期间观察到取消键即中止本 tick，
//! 不再读帧、不再推进队列。tick 内的所有操作都是非阻塞的
//! （输入轮询与帧读取都是尽力而为）。

pub mod bindings;
pub mod dispatch;
pub mod queue;

pub use bindings::{Binding, ControlBindings, DroneAction};
pub use dispatch::KeyboardDispatcher;
pub use queue::{CommandQueue, QueueItem};

use spin_sleep::SpinSleeper;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::shared::{ExitSignal, SharedFrame, VideoFrame};
use crate::transport::{DroneCommander, InputSource, Key};

/// 控制循环配置
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// tick 周期（默认 10ms）
    pub tick_period: Duration,
    /// 按下事件的幅值（"速度"，默认 50）
    pub speed: u8,
    /// 取消键（默认 `"escape"`，独立于绑定表）
    pub cancel_key: Key,
    /// 队列调度开关键（默认 `"c"`，独立于绑定表；`None` 禁用该键）
    pub queue_toggle_key: Option<Key>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(10),
            speed: 50,
            cancel_key: Key::from("escape"),
            queue_toggle_key: Some(Key::from("c")),
        }
    }
}

/// 前台控制循环
///
/// 单线程持有绑定表、分发器与命令队列；跨线程共享的只有
/// [`SharedFrame`] 与 [`ExitSignal`] 两个句柄。
pub struct ControlLoop<C: DroneCommander, I: InputSource> {
    commander: C,
    input: I,
    dispatcher: KeyboardDispatcher,
    queue: CommandQueue,
    shared: SharedFrame,
    exit: ExitSignal,
    tick_period: Duration,
}

impl<C: DroneCommander, I: InputSource> ControlLoop<C, I> {
    /// 组装控制循环
    pub fn new(
        commander: C,
        input: I,
        bindings: ControlBindings,
        config: LoopConfig,
        shared: SharedFrame,
        exit: ExitSignal,
    ) -> Self {
        Self {
            commander,
            input,
            dispatcher: KeyboardDispatcher::new(
                bindings,
                config.cancel_key,
                config.queue_toggle_key,
                config.speed,
            ),
            queue: CommandQueue::new(),
            shared,
            exit,
            tick_period: config.tick_period,
        }
    }

    /// 按动作名入队一个定时命令
    ///
    /// 动作名必须出现在绑定表的队列动作表里，否则静默拒绝
    /// （记警告日志，队列不变）。时长为 0 同样拒绝。
    /// 返回是否入队成功。
    pub fn enqueue(&mut self, action: &str, duration_ms: u64) -> bool {
        let Some(key) = self.dispatcher.bindings().queue_key(action) else {
            warn!(action, "Unknown queue action, ignored");
            return false;
        };
        let key = key.clone();
        self.queue.enqueue(key, duration_ms)
    }

    /// 启用/停用队列调度（语义见 [`CommandQueue::set_enabled`]）
    pub fn set_queue_enabled(&mut self, enabled: bool) {
        self.queue.set_enabled(enabled);
    }

    /// 翻转队列调度开关
    pub fn toggle_queue_enabled(&mut self) {
        self.queue.toggle_enabled();
    }

    /// 队列调度是否启用
    pub fn is_queue_enabled(&self) -> bool {
        self.queue.is_enabled()
    }

    /// 是否存在激活的队列条目
    pub fn is_queue_item_active(&self) -> bool {
        self.queue.is_item_active()
    }

    /// 队列长度
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// 退出信号句柄
    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }

    /// 帧信箱句柄
    pub fn shared_frame(&self) -> SharedFrame {
        self.shared.clone()
    }

    /// 命令通道（绑定表之外的直接调用）
    pub fn commander_mut(&mut self) -> &mut C {
        &mut self.commander
    }

    /// 执行一个 tick
    ///
    /// 顺序固定：输入分发 → 帧回调 → 队列推进。`on_frame` 在有最新帧时
    /// 以独立拷贝调用，供应用层做视觉分析。
    pub fn tick<F: FnMut(&VideoFrame)>(&mut self, on_frame: &mut F) {
        self.tick_at(Instant::now(), on_frame);
    }

    /// 以给定时刻执行一个 tick（测试用确定性时钟入口）
    pub fn tick_at<F: FnMut(&VideoFrame)>(&mut self, now: Instant, on_frame: &mut F) {
        // 1. 排空并分发真实输入（取消键置位退出信号后立即停止）
        self.dispatcher.drain(&mut self.input, &mut self.commander, &self.exit);
        for _ in 0..self.dispatcher.take_toggle_presses() {
            self.queue.toggle_enabled();
        }

        // 取消后本 tick 立即结束：退出信号之后不再有任何命令发出
        if self.exit.is_set() {
            return;
        }

        // 2. 最新帧交给应用层
        if let Some(frame) = self.shared.get() {
            on_frame(&frame);
        }

        // 3. 推进队列调度器，合成事件走同一条分发路径
        if let Some(event) = self.queue.advance(now) {
            self.dispatcher.dispatch(&event, &mut self.commander, &self.exit);
        }
    }

    /// 打包好的前台循环
    ///
    /// 以配置周期持续 tick，直到退出信号置位。需要自己掌控循环的
    /// 应用（自定义分析频率、旁路输出等）直接调用 [`ControlLoop::tick`]。
    pub fn run<F: FnMut(&VideoFrame)>(&mut self, mut on_frame: F) {
        let sleeper = SpinSleeper::default();
        while !self.exit.is_set() {
            self.tick(&mut on_frame);
            sleeper.sleep(self.tick_period);
        }
        debug!("Control loop exited");
    }
}
