//! 压缩数据包 (Packet).
//!
//! 表示从 Ogg 页面中重组出的一个完整逻辑包.

use bytes::Bytes;
use lyra_core::NOPTS_VALUE;

/// 压缩数据包
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 粒度位置 (Vorbis 中为累计采样数), 未知时为 [`NOPTS_VALUE`]
    pub pts: i64,
    /// 所属逻辑流的序列号
    pub serial: u32,
    /// 是否为逻辑流的最后一个包
    pub end_of_stream: bool,
}

impl Packet {
    /// 创建空数据包
    pub fn empty() -> Self {
        Self {
            data: Bytes::new(),
            pts: NOPTS_VALUE,
            serial: 0,
            end_of_stream: false,
        }
    }

    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Self::empty()
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包 (flush packet)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
