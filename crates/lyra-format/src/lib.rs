//! # lyra-format
//!
//! Lyra 音频解码器容器格式库.
//!
//! 目前只实现 Ogg: 把物理页面重组为逻辑包, 交给 `lyra-codec` 的解码器.
//! 提供两种驱动方式:
//! - [`ogg::OggPushReader`]: 调用方逐块推入字节 (网络/流式资源)
//! - [`ogg::OggReader`]: 从任意 `std::io::Read` 拉取

pub mod ogg;

pub use ogg::{OggPage, OggPushReader, OggReader, PacketAssembler};
