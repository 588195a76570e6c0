//! identification 与 comment 头包解析.

use log::warn;
use lyra_core::{LyraError, LyraResult};

pub(crate) const PACKET_TYPE_IDENTIFICATION: u8 = 0x01;
pub(crate) const PACKET_TYPE_COMMENT: u8 = 0x03;
pub(crate) const PACKET_TYPE_SETUP: u8 = 0x05;
pub(crate) const VORBIS_MAGIC: &[u8; 6] = b"vorbis";

/// 支持的最大声道数
pub const MAX_CHANNELS: u8 = 8;

const MIN_BLOCKSIZE_EXP: u8 = 6;
const MAX_BLOCKSIZE_EXP: u8 = 13;

/// identification 头包内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationHeader {
    /// 声道数 (1..=8)
    pub channels: u8,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 最大码率 (0 表示未指定)
    pub bitrate_maximum: i32,
    /// 标称码率
    pub bitrate_nominal: i32,
    /// 最小码率
    pub bitrate_minimum: i32,
    /// 短块大小
    pub blocksize_short: usize,
    /// 长块大小
    pub blocksize_long: usize,
}

/// comment 头包内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentHeader {
    /// 编码器标识
    pub vendor: String,
    /// 用户注释 (键, 值), 保持码流中的顺序
    pub comments: Vec<(String, String)>,
}

impl CommentHeader {
    /// 按键名 (不区分大小写) 查找第一个注释值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 校验头包的类型字节与 "vorbis" 标识
pub(crate) fn check_header_prefix(packet: &[u8], packet_type: u8, what: &str) -> LyraResult<()> {
    if packet.len() < 7 {
        return Err(LyraError::MalformedHeader(format!(
            "Vorbis {} 头包长度不足: {}",
            what,
            packet.len(),
        )));
    }
    if packet[0] != packet_type || &packet[1..7] != VORBIS_MAGIC {
        return Err(LyraError::MalformedHeader(format!(
            "Vorbis {} 头包标识无效: type=0x{:02X}",
            what, packet[0],
        )));
    }
    Ok(())
}

pub(crate) fn parse_identification_header(packet: &[u8]) -> LyraResult<IdentificationHeader> {
    check_header_prefix(packet, PACKET_TYPE_IDENTIFICATION, "identification")?;
    if packet.len() < 30 {
        return Err(LyraError::MalformedHeader(format!(
            "Vorbis identification 头包长度不足: {}",
            packet.len(),
        )));
    }

    let mut pos = 7usize;
    let version = read_le_u32(packet, &mut pos)?;
    if version != 0 {
        return Err(LyraError::MalformedHeader(format!(
            "Vorbis 版本不支持: {}",
            version,
        )));
    }

    let channels = packet[11];
    if channels == 0 {
        return Err(LyraError::MalformedHeader("Vorbis 声道数不能为 0".into()));
    }
    if channels > MAX_CHANNELS {
        return Err(LyraError::Unsupported(format!(
            "Vorbis 声道数 {} 超过上限 {}",
            channels, MAX_CHANNELS,
        )));
    }

    pos = 12;
    let sample_rate = read_le_u32(packet, &mut pos)?;
    if sample_rate == 0 {
        return Err(LyraError::MalformedHeader("Vorbis 采样率不能为 0".into()));
    }
    let bitrate_maximum = read_le_u32(packet, &mut pos)? as i32;
    let bitrate_nominal = read_le_u32(packet, &mut pos)? as i32;
    let bitrate_minimum = read_le_u32(packet, &mut pos)? as i32;

    let bs = packet[28];
    let short_exp = bs & 0x0F;
    let long_exp = bs >> 4;
    let exp_range = MIN_BLOCKSIZE_EXP..=MAX_BLOCKSIZE_EXP;
    if !exp_range.contains(&short_exp) || !exp_range.contains(&long_exp) || short_exp > long_exp {
        return Err(LyraError::MalformedHeader(format!(
            "Vorbis blocksize 非法: short_exp={}, long_exp={}",
            short_exp, long_exp,
        )));
    }

    if packet[29] & 0x01 == 0 {
        return Err(LyraError::MalformedHeader(
            "Vorbis identification 头包 framing_flag 非法".into(),
        ));
    }

    Ok(IdentificationHeader {
        channels,
        sample_rate,
        bitrate_maximum,
        bitrate_nominal,
        bitrate_minimum,
        blocksize_short: 1usize << short_exp,
        blocksize_long: 1usize << long_exp,
    })
}

pub(crate) fn parse_comment_header(packet: &[u8]) -> LyraResult<CommentHeader> {
    check_header_prefix(packet, PACKET_TYPE_COMMENT, "comment")?;

    let mut pos = 7usize;
    let vendor_len = read_le_u32(packet, &mut pos)? as usize;
    ensure_left(packet, pos, vendor_len, "Vorbis vendor 字段")?;
    let vendor = String::from_utf8_lossy(&packet[pos..pos + vendor_len]).into_owned();
    pos += vendor_len;

    let comment_count = read_le_u32(packet, &mut pos)? as usize;
    // 每条注释至少占 4 字节长度字段
    ensure_left(packet, pos, comment_count.saturating_mul(4), "Vorbis comment 列表")?;
    let mut comments = Vec::with_capacity(comment_count);
    for _ in 0..comment_count {
        let comment_len = read_le_u32(packet, &mut pos)? as usize;
        ensure_left(packet, pos, comment_len, "Vorbis comment 项")?;
        let raw = String::from_utf8_lossy(&packet[pos..pos + comment_len]);
        pos += comment_len;
        match raw.split_once('=') {
            Some((key, value)) => comments.push((key.to_string(), value.to_string())),
            None => warn!("Vorbis comment 缺少 '=' 分隔符, 已忽略: {}", raw),
        }
    }

    ensure_left(packet, pos, 1, "Vorbis comment framing_flag")?;
    if packet[pos] & 0x01 == 0 {
        return Err(LyraError::MalformedHeader(
            "Vorbis comment 头包 framing_flag 非法".into(),
        ));
    }

    Ok(CommentHeader { vendor, comments })
}

fn ensure_left(data: &[u8], pos: usize, need: usize, what: &str) -> LyraResult<()> {
    if pos.saturating_add(need) > data.len() {
        return Err(LyraError::MalformedHeader(format!(
            "{} 读取越界: pos={}, need={}, len={}",
            what,
            pos,
            need,
            data.len(),
        )));
    }
    Ok(())
}

fn read_le_u32(data: &[u8], pos: &mut usize) -> LyraResult<u32> {
    ensure_left(data, *pos, 4, "Vorbis u32")?;
    let v = u32::from_le_bytes([data[*pos], data[*pos + 1], data[*pos + 2], data[*pos + 3]]);
    *pos += 4;
    Ok(v)
}
