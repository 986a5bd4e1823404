//! 键位绑定表模块
//!
//! 声明式的"按键 → 动作"映射。动作是带标签的变体：具名机体原语
//! （[`DroneAction`]）或自定义回调，二者都以幅值参数调用
//! （按下为配置速度，松开为 0）。表在 harness 启动后不再变动，
//! 应用层在启动前完成定制。
//!
//! 另维护一张队列动作表（动作名 → 按键），命令队列用它把脚本里的
//! 动作名换算成合成按键事件。

use std::collections::HashMap;
use std::fmt;

use crate::transport::{DroneCommander, Key};

/// 具名机体原语
///
/// 连续通道（前后/平移/升降/偏航）把幅值原样传给命令通道；
/// 离散动作（起飞/降落/手掌降落/拍照）只在按下沿（幅值非零）触发，
/// 松开沿忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneAction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    YawLeft,
    YawRight,
    Takeoff,
    Land,
    PalmLand,
    TakePicture,
}

impl DroneAction {
    /// 以给定幅值调用对应的机体原语
    pub fn invoke(self, commander: &mut dyn DroneCommander, speed: u8) {
        match self {
            DroneAction::Forward => commander.forward(speed),
            DroneAction::Backward => commander.backward(speed),
            DroneAction::Left => commander.left(speed),
            DroneAction::Right => commander.right(speed),
            DroneAction::Up => commander.up(speed),
            DroneAction::Down => commander.down(speed),
            DroneAction::YawLeft => commander.counter_clockwise(speed),
            DroneAction::YawRight => commander.clockwise(speed),
            DroneAction::Takeoff => {
                if speed > 0 {
                    commander.takeoff();
                }
            },
            DroneAction::Land => {
                if speed > 0 {
                    commander.land();
                }
            },
            DroneAction::PalmLand => {
                if speed > 0 {
                    commander.palm_land();
                }
            },
            DroneAction::TakePicture => {
                if speed > 0 {
                    commander.take_picture();
                }
            },
        }
    }
}

/// 绑定到按键的动作
pub enum Binding {
    /// 具名机体原语
    Primitive(DroneAction),
    /// 自定义回调（同样以幅值调用；回调自行决定如何使用幅值）
    Callback(Box<dyn FnMut(&mut dyn DroneCommander, u8) + Send>),
}

impl Binding {
    /// 以给定幅值触发绑定
    pub fn invoke(&mut self, commander: &mut dyn DroneCommander, speed: u8) {
        match self {
            Binding::Primitive(action) => action.invoke(commander, speed),
            Binding::Callback(callback) => callback(commander, speed),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Primitive(action) => f.debug_tuple("Primitive").field(action).finish(),
            Binding::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// 键位绑定表 + 队列动作表
///
/// # Example
///
/// ```
/// use droneb_sdk::control::{ControlBindings, DroneAction};
///
/// let mut bindings = ControlBindings::empty();
/// bindings.bind("w", DroneAction::Forward);
/// bindings.bind_queue_action("forward", "w");
///
/// assert!(bindings.is_bound(&"w".into()));
/// assert_eq!(bindings.queue_key("forward"), Some(&"w".into()));
/// assert_eq!(bindings.queue_key("warp"), None);
/// ```
#[derive(Debug, Default)]
pub struct ControlBindings {
    bindings: HashMap<Key, Binding>,
    queue_actions: HashMap<String, Key>,
}

impl ControlBindings {
    /// 空表（应用层完全自定义时使用）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 默认 Tello 键位布局
    ///
    /// - WASD: 前进 / 左移 / 后退 / 右移
    /// - Q / E: 慢速偏航
    /// - 左右方向键: 双倍速偏航（回调）
    /// - 上下方向键: 上升 / 下降
    /// - tab: 起飞，backspace: 降落，p: 手掌降落，return: 拍照
    ///
    /// 队列动作表覆盖 forward/backward/left/right/yaw_left/yaw_right/
    /// up/down/takeoff/land。
    pub fn tello_default() -> Self {
        let mut b = Self::empty();

        b.bind("w", DroneAction::Forward);
        b.bind("s", DroneAction::Backward);
        b.bind("a", DroneAction::Left);
        b.bind("d", DroneAction::Right);
        b.bind("q", DroneAction::YawLeft);
        b.bind("e", DroneAction::YawRight);
        // 方向键：双倍速偏航与升降
        b.bind_callback("left", |drone, speed| {
            drone.counter_clockwise(speed.saturating_mul(2))
        });
        b.bind_callback("right", |drone, speed| {
            drone.clockwise(speed.saturating_mul(2))
        });
        b.bind("up", DroneAction::Up);
        b.bind("down", DroneAction::Down);
        b.bind("tab", DroneAction::Takeoff);
        b.bind("backspace", DroneAction::Land);
        b.bind("p", DroneAction::PalmLand);
        b.bind("return", DroneAction::TakePicture);

        b.bind_queue_action("forward", "w");
        b.bind_queue_action("backward", "s");
        b.bind_queue_action("left", "a");
        b.bind_queue_action("right", "d");
        b.bind_queue_action("yaw_left", "left");
        b.bind_queue_action("yaw_right", "right");
        b.bind_queue_action("up", "up");
        b.bind_queue_action("down", "down");
        b.bind_queue_action("takeoff", "tab");
        b.bind_queue_action("land", "backspace");

        b
    }

    /// 绑定具名原语到按键（覆盖旧绑定）
    pub fn bind(&mut self, key: impl Into<Key>, action: DroneAction) {
        self.bindings.insert(key.into(), Binding::Primitive(action));
    }

    /// 绑定自定义回调到按键（覆盖旧绑定）
    pub fn bind_callback(
        &mut self,
        key: impl Into<Key>,
        callback: impl FnMut(&mut dyn DroneCommander, u8) + Send + 'static,
    ) {
        self.bindings.insert(key.into(), Binding::Callback(Box::new(callback)));
    }

    /// 登记队列动作名到按键的映射
    pub fn bind_queue_action(&mut self, action: impl Into<String>, key: impl Into<Key>) {
        self.queue_actions.insert(action.into(), key.into());
    }

    /// 按键是否有绑定
    pub fn is_bound(&self, key: &Key) -> bool {
        self.bindings.contains_key(key)
    }

    /// 查找按键绑定（可变引用：回调需要 `FnMut`）
    pub fn lookup_mut(&mut self, key: &Key) -> Option<&mut Binding> {
        self.bindings.get_mut(key)
    }

    /// 队列动作名对应的按键
    pub fn queue_key(&self, action: &str) -> Option<&Key> {
        self.queue_actions.get(action)
    }
}
