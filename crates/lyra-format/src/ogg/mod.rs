//! Ogg 容器.
//!
//! # Ogg 页面结构
//! ```text
//! Capture pattern: "OggS" (4 bytes)
//! Version:         1 byte (always 0)
//! Header type:     1 byte (flags: continued=0x01, BOS=0x02, EOS=0x04)
//! Granule pos:     8 bytes (little-endian, codec-specific)
//! Serial number:   4 bytes (identifies logical stream)
//! Page seq no:     4 bytes
//! CRC checksum:    4 bytes
//! Num segments:    1 byte
//! Segment table:   N bytes (each 1 byte, packet sizes)
//! Page data:       sum(segment_table) bytes
//! ```
//!
//! 段值 255 表示包在下一段继续, 小于 255 的段结束一个包.

mod assembler;
mod page;
mod reader;

pub use assembler::PacketAssembler;
pub use page::{
    FLAG_BOS, FLAG_CONTINUED, FLAG_EOS, OGG_SYNC, OggPage, build_page, lacing_values,
    page_with_packets,
};
pub use reader::{OggPushReader, OggReader};
