//! 键盘事件分发模块
//!
//! 每 tick 把输入源里积压的事件按到达顺序排空，经绑定表换算成
//! 带幅值的动作调用：按下 → 配置速度，松开 → 0。这个按下/松开
//! 协议让一个绑定用离散的键沿表达连续控制通道（"以速度 S 移动
//! 直到另行通知" / "停止"），无需额外定时器。
//!
//! 队列合成的事件与真实输入走同一个 [`KeyboardDispatcher::dispatch`]，
//! 下游动作处理器无法区分两种来源。

use tracing::{debug, info, trace};

use crate::control::bindings::ControlBindings;
use crate::shared::ExitSignal;
use crate::transport::{DroneCommander, InputSource, Key, KeyEvent, KeyPhase};

/// 键盘事件分发器
pub struct KeyboardDispatcher {
    bindings: ControlBindings,
    cancel_key: Key,
    queue_toggle_key: Option<Key>,
    speed: u8,
    /// 本次排空期间累计的队列开关按键次数，由控制循环取走后生效
    toggle_presses: u32,
}

impl KeyboardDispatcher {
    /// 创建分发器
    ///
    /// `cancel_key` 与 `queue_toggle_key` 独立于绑定表：前者按下即置位
    /// 退出信号结束会话，后者按下翻转队列调度开关。
    pub fn new(
        bindings: ControlBindings,
        cancel_key: Key,
        queue_toggle_key: Option<Key>,
        speed: u8,
    ) -> Self {
        Self {
            bindings,
            cancel_key,
            queue_toggle_key,
            speed,
            toggle_presses: 0,
        }
    }

    /// 绑定表（队列动作名解析用）
    pub fn bindings(&self) -> &ControlBindings {
        &self.bindings
    }

    /// 配置速度（按下事件的幅值）
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// 分发单个事件
    ///
    /// 未绑定的按键静默忽略（不是错误）。
    pub fn dispatch(
        &mut self,
        event: &KeyEvent,
        commander: &mut dyn DroneCommander,
        exit: &ExitSignal,
    ) {
        if event.phase == KeyPhase::Press {
            if event.key == self.cancel_key {
                info!("Cancel key pressed, ending session");
                exit.set();
                return;
            }
            if self.queue_toggle_key.as_ref() == Some(&event.key) {
                debug!("Queue toggle key pressed");
                self.toggle_presses += 1;
                return;
            }
        }

        let Some(binding) = self.bindings.lookup_mut(&event.key) else {
            trace!(key = %event.key, "Unbound key ignored");
            return;
        };

        let magnitude = match event.phase {
            KeyPhase::Press => self.speed,
            KeyPhase::Release => 0,
        };
        binding.invoke(commander, magnitude);
    }

    /// 取走累计的队列开关按键次数（计数随之清零）
    pub fn take_toggle_presses(&mut self) -> u32 {
        std::mem::take(&mut self.toggle_presses)
    }

    /// 排空输入源并按到达顺序分发事件
    ///
    /// 退出信号一经置位立即停止排空：取消之后不再有任何命令发出，
    /// 剩余事件弃置。
    pub fn drain(
        &mut self,
        input: &mut dyn InputSource,
        commander: &mut dyn DroneCommander,
        exit: &ExitSignal,
    ) {
        while !exit.is_set() {
            let Some(event) = input.poll() else {
                break;
            };
            self.dispatch(&event, commander, exit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::bindings::DroneAction;
    use crate::transport::InputChannel;

    #[derive(Default)]
    struct RecordingCommander {
        calls: Vec<(String, u8)>,
    }

    impl RecordingCommander {
        fn record(&mut self, name: &str, speed: u8) {
            self.calls.push((name.to_string(), speed));
        }
    }

    impl DroneCommander for RecordingCommander {
        fn forward(&mut self, speed: u8) {
            self.record("forward", speed);
        }
        fn backward(&mut self, speed: u8) {
            self.record("backward", speed);
        }
        fn left(&mut self, speed: u8) {
            self.record("left", speed);
        }
        fn right(&mut self, speed: u8) {
            self.record("right", speed);
        }
        fn up(&mut self, speed: u8) {
            self.record("up", speed);
        }
        fn down(&mut self, speed: u8) {
            self.record("down", speed);
        }
        fn clockwise(&mut self, speed: u8) {
            self.record("clockwise", speed);
        }
        fn counter_clockwise(&mut self, speed: u8) {
            self.record("counter_clockwise", speed);
        }
        fn takeoff(&mut self) {
            self.record("takeoff", 0);
        }
        fn land(&mut self) {
            self.record("land", 0);
        }
        fn palm_land(&mut self) {
            self.record("palm_land", 0);
        }
        fn take_picture(&mut self) {
            self.record("take_picture", 0);
        }
    }

    fn dispatcher() -> KeyboardDispatcher {
        KeyboardDispatcher::new(
            ControlBindings::tello_default(),
            "escape".into(),
            Some("c".into()),
            50,
        )
    }

    #[test]
    fn test_press_release_magnitudes() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        dispatcher.dispatch(&KeyEvent::press("w".into()), &mut commander, &exit);
        dispatcher.dispatch(&KeyEvent::release("w".into()), &mut commander, &exit);

        assert_eq!(
            commander.calls,
            vec![("forward".to_string(), 50), ("forward".to_string(), 0)]
        );
        assert!(!exit.is_set());
    }

    #[test]
    fn test_unbound_key_is_silently_ignored() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        dispatcher.dispatch(&KeyEvent::press("z".into()), &mut commander, &exit);
        dispatcher.dispatch(&KeyEvent::release("z".into()), &mut commander, &exit);

        assert!(commander.calls.is_empty());
        assert!(!exit.is_set());
    }

    #[test]
    fn test_cancel_key_sets_exit_signal() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        // 松开沿不触发取消
        dispatcher.dispatch(&KeyEvent::release("escape".into()), &mut commander, &exit);
        assert!(!exit.is_set());

        dispatcher.dispatch(&KeyEvent::press("escape".into()), &mut commander, &exit);
        assert!(exit.is_set());
        assert!(commander.calls.is_empty());
    }

    #[test]
    fn test_cancel_key_wins_over_binding() {
        // 取消键即使出现在绑定表里也优先触发取消
        let mut bindings = ControlBindings::empty();
        bindings.bind("x", DroneAction::Land);
        let mut dispatcher = KeyboardDispatcher::new(bindings, "x".into(), None, 50);
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        dispatcher.dispatch(&KeyEvent::press("x".into()), &mut commander, &exit);
        assert!(exit.is_set());
        assert!(commander.calls.is_empty());
    }

    #[test]
    fn test_drain_preserves_arrival_order() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();
        let (sender, mut input) = InputChannel::pair();

        sender.press("w");
        sender.press("q");
        sender.release("w");
        dispatcher.drain(&mut input, &mut commander, &exit);

        assert_eq!(
            commander.calls,
            vec![
                ("forward".to_string(), 50),
                ("counter_clockwise".to_string(), 50),
                ("forward".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_drain_stops_at_cancel_key() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();
        let (sender, mut input) = InputChannel::pair();

        sender.press("w");
        sender.press("escape");
        sender.press("s");
        dispatcher.drain(&mut input, &mut commander, &exit);

        assert!(exit.is_set());
        // 取消之前的事件照常分发，取消之后的弃置
        assert_eq!(commander.calls, vec![("forward".to_string(), 50)]);
    }

    #[test]
    fn test_toggle_key_is_counted_not_dispatched() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        dispatcher.dispatch(&KeyEvent::press("c".into()), &mut commander, &exit);
        dispatcher.dispatch(&KeyEvent::release("c".into()), &mut commander, &exit);
        dispatcher.dispatch(&KeyEvent::press("c".into()), &mut commander, &exit);

        // 只有按下沿计数；计数取走后清零
        assert_eq!(dispatcher.take_toggle_presses(), 2);
        assert_eq!(dispatcher.take_toggle_presses(), 0);
        assert!(commander.calls.is_empty());
        assert!(!exit.is_set());
    }

    #[test]
    fn test_discrete_binding_release_is_noop() {
        let mut dispatcher = dispatcher();
        let mut commander = RecordingCommander::default();
        let exit = ExitSignal::new();

        dispatcher.dispatch(&KeyEvent::press("tab".into()), &mut commander, &exit);
        dispatcher.dispatch(&KeyEvent::release("tab".into()), &mut commander, &exit);

        assert_eq!(commander.calls, vec![("takeoff".to_string(), 0)]);
    }
}
