//! 统一错误类型定义.
//!
//! 所有 Lyra crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Lyra 统一错误类型
#[derive(Debug, Error)]
pub enum LyraError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的特性 (floor 0, 超过 8 声道等)
    #[error("不支持的特性: {0}")]
    Unsupported(String),

    /// 编解码器错误
    #[error("编解码器错误: {0}")]
    Codec(String),

    /// 容器格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 无效数据 (损坏的音频包, 位流越界等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 头包结构错误
    #[error("头包格式错误: {0}")]
    MalformedHeader(String),

    /// setup 表结构错误
    #[error("setup 表格式错误: {0}")]
    MalformedSetup(String),

    /// 码字在 codebook 中不存在
    #[error("无效码字: {0}")]
    InvalidCodeword(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

impl LyraError {
    /// 是否可通过补充输入恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NeedMoreData)
    }
}

/// Lyra 统一 Result 类型
pub type LyraResult<T> = Result<T, LyraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_仅数据不足可恢复() {
        assert!(LyraError::NeedMoreData.is_recoverable());
        assert!(!LyraError::Eof.is_recoverable());
        assert!(!LyraError::MalformedSetup("x".into()).is_recoverable());
        assert!(!LyraError::InvalidCodeword("x".into()).is_recoverable());
    }

    #[test]
    fn test_错误信息() {
        let e = LyraError::Unsupported("floor 类型 0".into());
        assert_eq!(e.to_string(), "不支持的特性: floor 类型 0");
    }
}
