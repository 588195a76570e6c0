//! Vorbis codebook: 码长表解析、规范 Huffman 构建与标量/向量解码.
//!
//! 码字按 Vorbis 规则分配: 按条目顺序, 每个条目取当前可用的最小码字.
//! 位流中码字先出现的是最高位, 而读取器按 LSB 优先取位, 因此查表使用
//! 位反转后的码字.

use lyra_core::{BitReader, LyraError, LyraResult, ilog};

const CODEBOOK_SYNC: u32 = 0x564342;

/// 快速查表覆盖的码长
pub(crate) const FAST_BITS: u32 = 10;
const FAST_SIZE: usize = 1 << FAST_BITS;

const MAX_CODEWORD_LEN: u8 = 32;

/// 快速表项, `len == 0` 表示该前缀需要走慢路径
#[derive(Debug, Clone, Copy, Default)]
struct FastEntry {
    symbol: u32,
    len: u8,
}

/// 超出快速表长度的码字
#[derive(Debug, Clone, Copy)]
struct LongCode {
    /// 位反转后的码字 (与 LSB 优先读取的位序一致)
    reversed: u32,
    len: u8,
    symbol: u32,
}

/// 由码长表构建的前缀码解码表
#[derive(Debug, Clone)]
pub(crate) struct HuffmanTable {
    fast: Vec<FastEntry>,
    long_codes: Vec<LongCode>,
    /// 只有一个有效条目时的 (符号, 码长)
    single: Option<(u32, u8)>,
}

impl HuffmanTable {
    /// 由码长表构建, 码长 0 表示条目未使用
    ///
    /// 过度指定 (某长度下的码字超出可用空间) 与欠指定 (码字空间未用尽) 均视为错误,
    /// 仅有一个有效条目的 codebook 除外.
    pub(crate) fn build(lengths: &[u8]) -> LyraResult<Self> {
        let mut table = Self {
            fast: vec![FastEntry::default(); FAST_SIZE],
            long_codes: Vec::new(),
            single: None,
        };

        let mut counts = [0u64; MAX_CODEWORD_LEN as usize + 1];
        let mut used = 0usize;
        let mut first_used = None;
        for (sym, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            if len > MAX_CODEWORD_LEN {
                return Err(LyraError::MalformedSetup(format!(
                    "codebook 码长 {} 超过 32",
                    len,
                )));
            }
            counts[len as usize] += 1;
            used += 1;
            first_used.get_or_insert(sym);
        }
        for (len, &count) in counts.iter().enumerate().skip(1) {
            if count > 1u64 << len {
                return Err(LyraError::MalformedSetup(format!(
                    "codebook 码长 {} 的条目数 {} 超出码字空间",
                    len, count,
                )));
            }
        }

        let Some(first) = first_used else {
            return Ok(table);
        };
        if used == 1 {
            table.single = Some((first as u32, lengths[first]));
            return Ok(table);
        }

        // available[d]: 深度 d 上尚未分配的最小码字 (左对齐到 32 位), 0 表示无
        let mut available = [0u32; MAX_CODEWORD_LEN as usize + 1];
        let first_len = lengths[first];
        table.insert(0, first_len, first as u32);
        for depth in 1..=first_len {
            available[depth as usize] = 1u32 << (32 - depth as u32);
        }

        for (sym, &len) in lengths.iter().enumerate().skip(first + 1) {
            if len == 0 {
                continue;
            }
            let mut depth = len as usize;
            while depth > 0 && available[depth] == 0 {
                depth -= 1;
            }
            if depth == 0 {
                return Err(LyraError::MalformedSetup(
                    "codebook Huffman 长度表过度指定".into(),
                ));
            }
            let code = available[depth];
            available[depth] = 0;
            table.insert(code, len, sym as u32);
            for d in (depth + 1..=len as usize).rev() {
                available[d] = code + (1u32 << (32 - d as u32));
            }
        }

        if available.iter().any(|&a| a != 0) {
            return Err(LyraError::MalformedSetup(
                "codebook Huffman 长度表欠指定".into(),
            ));
        }

        table.long_codes.sort_by_key(|c| c.len);
        Ok(table)
    }

    /// 登记一个左对齐的码字
    fn insert(&mut self, code: u32, len: u8, symbol: u32) {
        let reversed = code.reverse_bits();
        if u32::from(len) <= FAST_BITS {
            let step = 1usize << len;
            let mut idx = reversed as usize;
            while idx < FAST_SIZE {
                self.fast[idx] = FastEntry { symbol, len };
                idx += step;
            }
        } else {
            self.long_codes.push(LongCode {
                reversed,
                len,
                symbol,
            });
        }
    }

    /// 解码一个符号
    pub(crate) fn decode(&self, br: &mut BitReader<'_>) -> LyraResult<u32> {
        if let Some((symbol, len)) = self.single {
            br.skip_bits(u32::from(len))?;
            return Ok(symbol);
        }

        let entry = self.fast[br.peek_bits(FAST_BITS) as usize];
        if entry.len > 0 {
            return self.consume(br, entry.len, entry.symbol);
        }

        let bits = br.peek_bits(32);
        for code in &self.long_codes {
            let mask = if code.len >= 32 {
                u32::MAX
            } else {
                (1u32 << code.len) - 1
            };
            if bits & mask == code.reversed {
                return self.consume(br, code.len, code.symbol);
            }
        }

        if br.is_eof() {
            return Err(LyraError::InvalidData("codebook 解码时位流耗尽".into()));
        }
        Err(LyraError::InvalidCodeword(format!(
            "codebook 中不存在匹配码字 (bit={})",
            br.bit_position(),
        )))
    }

    fn consume(&self, br: &mut BitReader<'_>, len: u8, symbol: u32) -> LyraResult<u32> {
        if len as usize > br.bits_left() {
            return Err(LyraError::InvalidData(format!(
                "codebook 码字超出包末尾: len={}, 剩余 {} 位",
                len,
                br.bits_left(),
            )));
        }
        br.skip_bits(u32::from(len))?;
        Ok(symbol)
    }
}

/// VQ 查找表
#[derive(Debug, Clone)]
pub(crate) struct VqLookup {
    lookup_type: u8,
    minimum: f32,
    /// 预乘 delta 后的 multiplicand
    scaled: Vec<f32>,
    sequence_p: bool,
    /// lookup type 1 的每维取值个数
    lookup_values: usize,
}

/// 一个 codebook
#[derive(Debug, Clone)]
pub(crate) struct Codebook {
    pub(crate) dimensions: usize,
    pub(crate) entries: u32,
    huffman: HuffmanTable,
    lookup: Option<VqLookup>,
}

impl Codebook {
    pub(crate) fn read(br: &mut BitReader<'_>) -> LyraResult<Self> {
        let sync = br.read_bits(24)?;
        if sync != CODEBOOK_SYNC {
            return Err(LyraError::MalformedSetup(format!(
                "codebook 同步字错误: 0x{sync:06X}",
            )));
        }

        let dimensions = br.read_bits(16)? as usize;
        let entries = br.read_bits(24)?;
        if dimensions == 0 || entries == 0 {
            return Err(LyraError::MalformedSetup(format!(
                "codebook 尺寸非法: dimensions={}, entries={}",
                dimensions, entries,
            )));
        }

        let lengths = read_codeword_lengths(br, entries)?;
        let huffman = HuffmanTable::build(&lengths)?;

        let lookup_type = br.read_bits(4)? as u8;
        let lookup = match lookup_type {
            0 => None,
            1 | 2 => Some(read_vq_lookup(br, lookup_type, entries, dimensions)?),
            other => {
                return Err(LyraError::MalformedSetup(format!(
                    "codebook lookup_type 非法: {}",
                    other,
                )));
            }
        };

        Ok(Self {
            dimensions,
            entries,
            huffman,
            lookup,
        })
    }

    pub(crate) fn has_lookup(&self) -> bool {
        self.lookup.is_some()
    }

    /// 解码一个标量 (条目号)
    pub(crate) fn decode_scalar(&self, br: &mut BitReader<'_>) -> LyraResult<u32> {
        let sym = self.huffman.decode(br)?;
        if sym >= self.entries {
            return Err(LyraError::InvalidCodeword(format!(
                "codebook 符号 {} 超出 entries {}",
                sym, self.entries,
            )));
        }
        Ok(sym)
    }

    /// 解码一个向量并累加到 `out[offset + i * stride]`
    pub(crate) fn decode_vector_add(
        &self,
        br: &mut BitReader<'_>,
        out: &mut [f32],
        offset: usize,
        stride: usize,
    ) -> LyraResult<()> {
        let lookup = self
            .lookup
            .as_ref()
            .ok_or_else(|| LyraError::InvalidData("向量 codebook 缺少 VQ 查找表".into()))?;
        let last_idx = offset + (self.dimensions - 1) * stride;
        if last_idx >= out.len() {
            return Err(LyraError::InvalidData(format!(
                "codebook 向量写入越界: 末位 {} >= {}",
                last_idx,
                out.len(),
            )));
        }

        let sym = self.decode_scalar(br)? as usize;
        let mut last = 0.0f32;
        let mut divisor = 1usize;
        for i in 0..self.dimensions {
            let m_idx = if lookup.lookup_type == 1 {
                let idx = (sym / divisor) % lookup.lookup_values;
                divisor = divisor.saturating_mul(lookup.lookup_values);
                idx
            } else {
                sym * self.dimensions + i
            };
            let value = lookup.scaled[m_idx] + lookup.minimum + last;
            if lookup.sequence_p {
                last = value;
            }
            out[offset + i * stride] += value;
        }
        Ok(())
    }
}

fn read_codeword_lengths(br: &mut BitReader<'_>, entries: u32) -> LyraResult<Vec<u8>> {
    let entries = entries as usize;
    let ordered = br.read_flag()?;
    if !ordered && entries > br.bits_left() {
        // 无序模式下每个条目至少占 1 位
        return Err(LyraError::MalformedSetup(format!(
            "codebook entries {} 超出剩余位流",
            entries,
        )));
    }

    let mut lengths = vec![0u8; entries];
    if ordered {
        let mut current_entry = 0usize;
        let mut current_length = br.read_bits(5)? + 1;
        while current_entry < entries {
            let left = (entries - current_entry) as u32;
            let number = br.read_bits(ilog(left))? as usize;
            if number > entries - current_entry {
                return Err(LyraError::MalformedSetup(
                    "codebook ordered 长度组越界".into(),
                ));
            }
            if number > 0 && current_length > u32::from(MAX_CODEWORD_LEN) {
                return Err(LyraError::MalformedSetup(format!(
                    "codebook 码长 {} 超过 32",
                    current_length,
                )));
            }
            lengths[current_entry..current_entry + number].fill(current_length as u8);
            current_entry += number;
            current_length += 1;
        }
    } else {
        let sparse = br.read_flag()?;
        for len in lengths.iter_mut() {
            let used = if sparse { br.read_flag()? } else { true };
            if used {
                *len = br.read_bits(5)? as u8 + 1;
            }
        }
    }
    Ok(lengths)
}

fn read_vq_lookup(
    br: &mut BitReader<'_>,
    lookup_type: u8,
    entries: u32,
    dimensions: usize,
) -> LyraResult<VqLookup> {
    let minimum = float32_unpack(br.read_bits(32)?);
    let delta = float32_unpack(br.read_bits(32)?);
    let value_bits = br.read_bits(4)? + 1;
    let sequence_p = br.read_flag()?;

    let lookup_values = if lookup_type == 1 {
        lookup1_values(entries, dimensions as u32) as usize
    } else {
        (entries as usize).checked_mul(dimensions).ok_or_else(|| {
            LyraError::MalformedSetup("codebook multiplicand 数量溢出".into())
        })?
    };
    if lookup_values.saturating_mul(value_bits as usize) > br.bits_left() {
        return Err(LyraError::MalformedSetup(format!(
            "codebook multiplicand 超出剩余位流: count={}, bits={}",
            lookup_values, value_bits,
        )));
    }

    let mut scaled = Vec::with_capacity(lookup_values);
    for _ in 0..lookup_values {
        scaled.push(br.read_bits(value_bits)? as f32 * delta);
    }

    Ok(VqLookup {
        lookup_type,
        minimum,
        scaled,
        sequence_p,
        lookup_values: if lookup_type == 1 { lookup_values } else { 0 },
    })
}

/// Vorbis 32 位打包浮点解码
pub(crate) fn float32_unpack(x: u32) -> f32 {
    let mantissa = f64::from(x & 0x001F_FFFF);
    let exponent = ((x & 0x7FE0_0000) >> 21) as i32;
    let value = mantissa * 2f64.powi(exponent - 788);
    if x & 0x8000_0000 != 0 {
        -value as f32
    } else {
        value as f32
    }
}

/// 满足 `r^dimensions <= entries` 的最大整数 r
pub(crate) fn lookup1_values(entries: u32, dimensions: u32) -> u32 {
    if entries == 0 || dimensions == 0 {
        return 0;
    }
    let mut lo = 1u32;
    let mut hi = entries;
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if pow_le(mid, dimensions, entries) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn pow_le(base: u32, exp: u32, limit: u32) -> bool {
    let mut acc = 1u64;
    for _ in 0..exp {
        acc *= u64::from(base);
        if acc > u64::from(limit) {
            return false;
        }
    }
    true
}
