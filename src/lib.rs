//! # Lyra
//!
//! 纯 Rust 实现的嵌入式 Ogg/Vorbis 音频解码器, 面向游戏客户端的实时音频播放.
//!
//! - **容器**: Ogg 页面解析与逻辑包重组
//! - **解码**: Vorbis I (floor1, residue 0/1/2, 多声道耦合)
//! - **输出**: 交错 PCM, 16 位整数或 32 位浮点
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use lyra::OggVorbisStream;
//!
//! let bytes = std::fs::read("assets/bgm.ogg").unwrap();
//! let mut stream = OggVorbisStream::new();
//! stream.push_bytes(&bytes);
//! while let Some(frame) = stream.next_frame() {
//!     println!("{} 个样本, pts={}", frame.nb_samples, frame.pts);
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `lyra-core` | 错误类型, 位流读写, Ogg CRC |
//! | `lyra-codec` | Vorbis 解码器 |
//! | `lyra-format` | Ogg 页面与包重组 |

/// 核心类型与工具
pub use lyra_core as core;

/// 解码器
pub use lyra_codec as codec;

/// 容器格式
pub use lyra_format as format;

pub mod logging;
pub mod stream;

pub use stream::{DecodedAudio, OggVorbisStream, StreamState, decode_file, decode_reader};

/// 获取 Lyra 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
