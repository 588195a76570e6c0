//! # lyra-core
//!
//! Lyra 音频解码器核心库, 提供基础类型定义、错误处理和位流工具.
//!
//! Vorbis 码流按 LSB 优先的位序打包, 本 crate 的 [`BitReader`] / [`BitWriter`]
//! 都遵循这一位序; Ogg 页面校验使用的 CRC-32 也在这里实现.

pub mod bitreader;
pub mod bitwriter;
pub mod channel_layout;
pub mod crc;
pub mod error;
pub mod sample_format;

// 重导出常用类型
pub use bitreader::{BitReader, ilog};
pub use bitwriter::BitWriter;
pub use channel_layout::{ChannelLayout, ChannelMask};
pub use error::{LyraError, LyraResult};
pub use sample_format::SampleFormat;

/// 未知时间戳
pub const NOPTS_VALUE: i64 = i64::MIN;
