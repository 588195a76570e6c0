//! 内置解码器.

pub mod vorbis;
