//! 错误类型
//!
//! 数据不足、均值为零这类情况属于数据状态，统一返回 `None` 或中性默认值。
//! 这里只收录调用方的编程错误 (窗口参数、平滑系数) 以及配置 / 输入读取失败。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid window: short window {short} must be smaller than long window {long}")]
    InvalidWindow { short: usize, long: usize },

    #[error("Invalid EWMA alpha {0}: must be within (0, 1]")]
    InvalidAlpha(f64),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window_display() {
        let error = AnalyticsError::InvalidWindow { short: 30, long: 7 };
        assert_eq!(
            error.to_string(),
            "Invalid window: short window 30 must be smaller than long window 7"
        );
    }

    #[test]
    fn test_invalid_alpha_display() {
        let error = AnalyticsError::InvalidAlpha(1.5);
        assert_eq!(error.to_string(), "Invalid EWMA alpha 1.5: must be within (0, 1]");
    }

    #[test]
    fn test_yaml_error_converts() {
        let parse_err = serde_yaml::from_str::<Vec<u32>>("{not: a list").unwrap_err();
        let error: AnalyticsError = parse_err.into();
        assert!(matches!(error, AnalyticsError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalyticsError>();
    }
}
