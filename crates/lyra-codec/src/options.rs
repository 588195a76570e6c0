//! 解码器配置.

use lyra_core::SampleFormat;
use serde::{Deserialize, Serialize};

/// 解码器选项
///
/// 可从游戏客户端的配置文件中反序列化, 未给出的字段取默认值.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DecoderOptions {
    /// 输出采样格式
    #[serde(default)]
    pub sample_format: SampleFormat,
}
