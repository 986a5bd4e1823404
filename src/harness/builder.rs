//! Harness 构建器
//!
//! 启动前的全部可调项都集中在这里：速度、tick 周期、取消键、
//! 键位绑定、视频失败预算。`build()` 做结构性校验——运行中的
//! 脚本笔误静默拒绝，但构建期的非法配置是编程错误，返回
//! [`HarnessError::Config`]。

use std::time::Duration;

use crate::control::{ControlBindings, ControlLoop, LoopConfig};
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::shared::{ExitSignal, SharedFrame};
use crate::transport::{DroneCommander, InputSource, Key};

/// [`Harness`] 构建器
#[derive(Debug)]
pub struct HarnessBuilder {
    speed: u8,
    tick_period: Duration,
    cancel_key: Key,
    queue_toggle_key: Option<Key>,
    bindings: Option<ControlBindings>,
    retry_budget: u32,
}

impl HarnessBuilder {
    /// 默认配置：速度 50、tick 10ms、取消键 `"escape"`、队列开关键 `"c"`、
    /// Tello 默认键位、失败预算 30
    pub fn new() -> Self {
        Self {
            speed: 50,
            tick_period: Duration::from_millis(10),
            cancel_key: Key::from("escape"),
            queue_toggle_key: Some(Key::from("c")),
            bindings: None,
            retry_budget: 30,
        }
    }

    /// 按下事件的幅值（必须非零）
    pub fn speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    /// tick 周期（必须非零）
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// 取消键
    pub fn cancel_key(mut self, key: impl Into<Key>) -> Self {
        self.cancel_key = key.into();
        self
    }

    /// 队列调度开关键（`None` 禁用该键）
    pub fn queue_toggle_key(mut self, key: Option<Key>) -> Self {
        self.queue_toggle_key = key;
        self
    }

    /// 自定义键位绑定（缺省为 [`ControlBindings::tello_default`]）
    pub fn bindings(mut self, bindings: ControlBindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// 视频连续失败预算（必须非零）
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// 校验配置并装配 [`Harness`]
    pub fn build<C, I>(self, commander: C, input: I) -> Result<Harness<C, I>, HarnessError>
    where
        C: DroneCommander,
        I: InputSource,
    {
        if self.speed == 0 {
            return Err(HarnessError::Config("speed must be nonzero".to_string()));
        }
        if self.tick_period.is_zero() {
            return Err(HarnessError::Config("tick period must be nonzero".to_string()));
        }
        if self.retry_budget == 0 {
            return Err(HarnessError::Config("retry budget must be nonzero".to_string()));
        }

        let bindings = self.bindings.unwrap_or_else(ControlBindings::tello_default);
        let config = LoopConfig {
            tick_period: self.tick_period,
            speed: self.speed,
            cancel_key: self.cancel_key,
            queue_toggle_key: self.queue_toggle_key,
        };
        let control = ControlLoop::new(
            commander,
            input,
            bindings,
            config,
            SharedFrame::new(),
            ExitSignal::new(),
        );
        Ok(Harness::new(control, self.retry_budget))
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
