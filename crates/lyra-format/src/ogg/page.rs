//! Ogg 页面解析与构建.

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use lyra_core::crc::ogg_crc32_update;
use lyra_core::{LyraError, LyraResult};

/// Ogg 同步字 (capture pattern)
pub const OGG_SYNC: &[u8; 4] = b"OggS";

/// 页面头部标志
pub const FLAG_CONTINUED: u8 = 0x01;
pub const FLAG_BOS: u8 = 0x02;
pub const FLAG_EOS: u8 = 0x04;

/// 固定头部长度 (不含段表)
const HEADER_LEN: usize = 27;
const CRC_OFFSET: usize = 22;
const MAX_SEGMENTS: usize = 255;

/// 已解析的 Ogg 页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPage {
    /// 头部标志
    pub header_type: u8,
    /// 粒度位置, -1 表示本页没有完成的包
    pub granule_position: i64,
    /// 逻辑流序列号
    pub serial_number: u32,
    /// 页面序号
    pub page_sequence: u32,
    /// 段表
    pub segment_table: Vec<u8>,
    /// 页面数据
    pub data: Bytes,
}

impl OggPage {
    /// 从字节切片开头解析一个页面, 返回页面与消耗的字节数
    ///
    /// 切片只含页面的一部分时返回 [`LyraError::NeedMoreData`].
    pub fn parse(data: &[u8]) -> LyraResult<(Self, usize)> {
        if data.len() >= 3 && &data[..3] == b"ID3" {
            return Err(LyraError::Unsupported(
                "检测到 ID3 标签, 输入不是 Ogg 流".into(),
            ));
        }
        let sync_len = data.len().min(OGG_SYNC.len());
        if data[..sync_len] != OGG_SYNC[..sync_len] {
            return Err(LyraError::Format("无效的 Ogg 同步字".into()));
        }
        if data.len() < HEADER_LEN {
            return Err(LyraError::NeedMoreData);
        }

        let version = data[4];
        if version != 0 {
            return Err(LyraError::Format(format!(
                "不支持的 Ogg 版本: {}",
                version,
            )));
        }
        let header_type = data[5];
        if header_type & !(FLAG_CONTINUED | FLAG_BOS | FLAG_EOS) != 0 {
            return Err(LyraError::Format(format!(
                "Ogg 页面标志非法: 0x{:02X}",
                header_type,
            )));
        }

        let num_segments = data[26] as usize;
        let body_start = HEADER_LEN + num_segments;
        if data.len() < body_start {
            return Err(LyraError::NeedMoreData);
        }
        let segment_table = &data[HEADER_LEN..body_start];
        let body_len: usize = segment_table.iter().map(|&s| s as usize).sum();
        let total = body_start + body_len;
        if data.len() < total {
            return Err(LyraError::NeedMoreData);
        }

        // CRC 覆盖整个页面, 其中 CRC 字段本身按 0 参与计算
        let crc = LittleEndian::read_u32(&data[CRC_OFFSET..CRC_OFFSET + 4]);
        let mut crc_calc = ogg_crc32_update(0, &data[..CRC_OFFSET]);
        crc_calc = ogg_crc32_update(crc_calc, &[0; 4]);
        crc_calc = ogg_crc32_update(crc_calc, &data[CRC_OFFSET + 4..total]);
        if crc != crc_calc {
            return Err(LyraError::Format(format!(
                "Ogg 页面 CRC 校验失败: 读取=0x{crc:08X}, 计算=0x{crc_calc:08X}",
            )));
        }

        let page = Self {
            header_type,
            granule_position: LittleEndian::read_i64(&data[6..14]),
            serial_number: LittleEndian::read_u32(&data[14..18]),
            page_sequence: LittleEndian::read_u32(&data[18..22]),
            segment_table: segment_table.to_vec(),
            data: Bytes::copy_from_slice(&data[body_start..total]),
        };
        Ok((page, total))
    }

    /// 是否为 BOS (beginning of stream) 页面
    pub fn is_bos(&self) -> bool {
        self.header_type & FLAG_BOS != 0
    }

    /// 是否为 EOS (end of stream) 页面
    pub fn is_eos(&self) -> bool {
        self.header_type & FLAG_EOS != 0
    }

    /// 是否为续延页面 (首段延续前一页未完成的包)
    pub fn is_continued(&self) -> bool {
        self.header_type & FLAG_CONTINUED != 0
    }

    /// 按段表切分出的包片段: (offset, length, is_complete)
    ///
    /// 最后一个片段以 255 结尾时未完成, 在下一页继续.
    pub fn packet_spans(&self) -> Vec<(usize, usize, bool)> {
        let mut spans = Vec::new();
        let mut offset = 0usize;
        let mut current_len = 0usize;
        let mut open = false;

        for &seg_size in &self.segment_table {
            current_len += seg_size as usize;
            open = true;
            if seg_size < 255 {
                spans.push((offset, current_len, true));
                offset += current_len;
                current_len = 0;
                open = false;
            }
        }
        if open {
            spans.push((offset, current_len, false));
        }
        spans
    }
}

/// 长度为 `len` 的包对应的段值
///
/// `complete` 为 false 时包在下一页继续, `len` 应为 255 的整数倍.
pub fn lacing_values(len: usize, complete: bool) -> Vec<u8> {
    let mut lacing = vec![255u8; len / 255];
    if complete {
        lacing.push((len % 255) as u8);
    }
    lacing
}

/// 由段表与数据构建一个完整页面 (含 CRC)
pub fn build_page(
    header_type: u8,
    granule_position: i64,
    serial_number: u32,
    page_sequence: u32,
    segment_table: &[u8],
    payload: &[u8],
) -> LyraResult<Vec<u8>> {
    if segment_table.len() > MAX_SEGMENTS {
        return Err(LyraError::InvalidArgument(format!(
            "Ogg 页面段数过多: {}",
            segment_table.len(),
        )));
    }
    let body_len: usize = segment_table.iter().map(|&s| s as usize).sum();
    if body_len != payload.len() {
        return Err(LyraError::InvalidArgument(format!(
            "段表总长 {} 与数据长度 {} 不一致",
            body_len,
            payload.len(),
        )));
    }

    let mut page = vec![0u8; HEADER_LEN];
    page[..4].copy_from_slice(OGG_SYNC);
    page[5] = header_type;
    LittleEndian::write_i64(&mut page[6..14], granule_position);
    LittleEndian::write_u32(&mut page[14..18], serial_number);
    LittleEndian::write_u32(&mut page[18..22], page_sequence);
    page[26] = segment_table.len() as u8;
    page.extend_from_slice(segment_table);
    page.extend_from_slice(payload);

    let crc = ogg_crc32_update(0, &page);
    LittleEndian::write_u32(&mut page[CRC_OFFSET..CRC_OFFSET + 4], crc);
    Ok(page)
}

/// 把若干完整包放进同一个页面
pub fn page_with_packets(
    header_type: u8,
    granule_position: i64,
    serial_number: u32,
    page_sequence: u32,
    packets: &[&[u8]],
) -> LyraResult<Vec<u8>> {
    let mut segments = Vec::new();
    let mut payload = Vec::new();
    for packet in packets {
        segments.extend(lacing_values(packet.len(), true));
        payload.extend_from_slice(packet);
    }
    build_page(
        header_type,
        granule_position,
        serial_number,
        page_sequence,
        &segments,
        &payload,
    )
}
