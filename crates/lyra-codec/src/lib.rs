//! # lyra-codec
//!
//! Lyra 音频解码器编解码库, 提供 Packet/Frame 抽象与 Vorbis I 解码器.
//!
//! ## 使用示例
//!
//! ```rust
//! use lyra_codec::decoders::vorbis::{DecoderStage, VorbisDecoder};
//!
//! let decoder = VorbisDecoder::new();
//! assert_eq!(decoder.stage(), DecoderStage::AwaitingIdentification);
//! ```

pub mod decoder;
pub mod decoders;
pub mod frame;
pub mod options;
pub mod packet;

// 重导出常用类型
pub use decoder::Decoder;
pub use decoders::vorbis::VorbisDecoder;
pub use frame::{AudioFrame, PcmBuffer};
pub use options::DecoderOptions;
pub use packet::Packet;
