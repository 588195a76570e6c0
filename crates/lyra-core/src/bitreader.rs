//! 比特流读取器.
//!
//! Vorbis 将所有字段按 LSB 优先打包: 字节内先读最低位, 多位字段的低位先出现.
//!
//! 越界读取统一报告为 [`LyraError::InvalidData`], 不做补零. 需要区分
//! "输入尚未到齐" 的调用方使用 [`BitReader::try_read_bits`].

use crate::{LyraError, LyraResult};

/// 比特流读取器 (LSB first)
///
/// # 示例
/// ```
/// use lyra_core::bitreader::BitReader;
///
/// let data = [0b1011_0010];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(1).unwrap(), 0);
/// assert_eq!(br.read_bits(3).unwrap(), 0b001);
/// assert_eq!(br.read_bits(4).unwrap(), 0b1011);
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 已消费的位数
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// 当前位置 (已读取的总位数)
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// 剩余可读位数
    pub fn bits_left(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.bits_left() == 0
    }

    /// 读取 1 个位并作为标志返回
    pub fn read_flag(&mut self) -> LyraResult<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// 读取 N 个位 (最多 32 位)
    pub fn read_bits(&mut self, n: u32) -> LyraResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(LyraError::InvalidArgument(format!(
                "read_bits: n={} 超过 32 位",
                n,
            )));
        }
        let left = self.bits_left();
        if n as usize > left {
            return Err(LyraError::InvalidData(format!(
                "位流读取越界: 需要 {} 位, 剩余 {} 位 (bit={})",
                n, left, self.bit_pos,
            )));
        }
        let value = self.gather(n);
        self.bit_pos += n as usize;
        Ok(value)
    }

    /// 读取 N 个位, 不足时返回 [`LyraError::NeedMoreData`] 且不移动位置
    pub fn try_read_bits(&mut self, n: u32) -> LyraResult<u32> {
        if n as usize > self.bits_left() {
            return Err(LyraError::NeedMoreData);
        }
        self.read_bits(n)
    }

    /// 窥视 N 个位 (不移动位置), 末尾之后按 0 补齐
    ///
    /// 供 codebook 查表使用, 调用方需自行用 [`bits_left`](Self::bits_left) 校验实际码长.
    pub fn peek_bits(&self, n: u32) -> u32 {
        debug_assert!(n <= 32, "peek_bits: n={} 超过 32 位", n);
        self.gather(n.min(32))
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: u32) -> LyraResult<()> {
        let left = self.bits_left();
        if n as usize > left {
            return Err(LyraError::InvalidData(format!(
                "位流跳过越界: 需要 {} 位, 剩余 {} 位",
                n, left,
            )));
        }
        self.bit_pos += n as usize;
        Ok(())
    }

    /// 对齐到下一个字节边界
    ///
    /// 如果当前已在字节边界, 则不做任何事.
    pub fn align_to_byte(&mut self) {
        let aligned = (self.bit_pos + 7) & !7;
        self.bit_pos = aligned.min(self.data.len() * 8);
    }

    /// 从当前位置按字节收集最多 32 位, 越界部分视为 0
    fn gather(&self, n: u32) -> u32 {
        let mut value = 0u64;
        let mut got = 0u32;
        let mut pos = self.bit_pos;
        while got < n {
            let byte = self.data.get(pos / 8).copied().unwrap_or(0);
            let offset = (pos % 8) as u32;
            let take = (8 - offset).min(n - got);
            let bits = (u64::from(byte) >> offset) & ((1u64 << take) - 1);
            value |= bits << got;
            got += take;
            pos += take as usize;
        }
        value as u32
    }
}

/// Vorbis `ilog`: 表示 `v` 所需的最少位数, `ilog(0) == 0`
pub fn ilog(v: u32) -> u32 {
    32 - v.leading_zeros()
}
