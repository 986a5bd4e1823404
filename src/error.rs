//! 错误类型定义
//!
//! 运行中的配置失误（未知动作名、非法时长、未绑定按键）在调用点
//! 静默拒绝并记日志，不会作为错误传播——飞行会话不能因脚本笔误中断。
//! 这里的错误类型只覆盖结构性失败：构建期非法配置、视频错误升级、
//! 生产线程异常。

use thiserror::Error;

use crate::transport::VideoError;

/// Harness 级错误
#[derive(Error, Debug)]
pub enum HarnessError {
    /// 构建期配置非法（速度为 0、tick 周期为 0 等）
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 视频传输/解码错误
    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    /// 生产线程 panic
    #[error("Frame producer thread panicked")]
    ProducerPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarnessError::Config("speed must be nonzero".to_string());
        assert!(format!("{}", err).contains("speed must be nonzero"));

        let err = HarnessError::ProducerPanicked;
        assert_eq!(format!("{}", err), "Frame producer thread panicked");
    }

    #[test]
    fn test_from_video_error() {
        let err: HarnessError = VideoError::Disconnected.into();
        match err {
            HarnessError::Video(VideoError::Disconnected) => {},
            other => panic!("Expected Video variant, got {:?}", other),
        }
    }
}
