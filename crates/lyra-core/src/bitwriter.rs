//! 比特流写入器.
//!
//! 按 LSB 优先写入, 与 [`BitReader`](crate::bitreader::BitReader) 对应.
//! 主要用于构造 Vorbis 头包与音频包 (测试与基准中的合成码流).

/// 比特流写入器 (LSB first)
///
/// # 示例
/// ```
/// use lyra_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0b0010, 4);
/// bw.write_bits(0b1011, 4);
/// assert_eq!(bw.finish(), vec![0b1011_0010]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// 输出缓冲区 (最后一个字节可能未填满)
    data: Vec<u8>,
    /// 已写入的总位数
    bit_count: usize,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定容量 (字节) 创建比特流写入器
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            bit_count: 0,
        }
    }

    /// 获取已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.bit_count
    }

    /// 写入 N 个位 (最多 32 位), 值的低位先写
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);
        for i in 0..n.min(32) {
            let offset = self.bit_count % 8;
            if offset == 0 {
                self.data.push(0);
            }
            if (value >> i) & 1 != 0 {
                let last = self.data.len() - 1;
                self.data[last] |= 1 << offset;
            }
            self.bit_count += 1;
        }
    }

    /// 写入 1 个标志位
    pub fn write_flag(&mut self, flag: bool) {
        self.write_bits(u32::from(flag), 1);
    }

    /// 写入完整字节
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.bit_count % 8 == 0 {
            // 快速路径: 已对齐
            self.data.extend_from_slice(bytes);
            self.bit_count += bytes.len() * 8;
        } else {
            for &b in bytes {
                self.write_bits(u32::from(b), 8);
            }
        }
    }

    /// 对齐到字节边界 (用 0 填充)
    pub fn align_to_byte(&mut self) {
        self.bit_count = self.data.len() * 8;
    }

    /// 完成写入, 返回字节数据
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitreader::BitReader;

    #[test]
    fn test_写入位序() {
        let mut bw = BitWriter::new();
        bw.write_bits(0, 1);
        bw.write_bits(0b001, 3);
        bw.write_bits(0b1011, 4);
        assert_eq!(bw.bits_written(), 8);
        assert_eq!(bw.finish(), vec![0b1011_0010]);
    }

    #[test]
    fn test_与读取器往返() {
        let mut bw = BitWriter::with_capacity(16);
        bw.write_bits(0x564342, 24);
        bw.write_flag(true);
        bw.write_bits(0x1F, 5);
        bw.write_bits(0xDEAD_BEEF, 32);
        bw.align_to_byte();
        bw.write_bytes(b"vorbis");
        let data = bw.finish();

        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(24).unwrap(), 0x564342);
        assert!(br.read_flag().unwrap());
        assert_eq!(br.read_bits(5).unwrap(), 0x1F);
        assert_eq!(br.read_bits(32).unwrap(), 0xDEAD_BEEF);
        br.align_to_byte();
        for &b in b"vorbis" {
            assert_eq!(br.read_bits(8).unwrap(), u32::from(b));
        }
        assert!(br.is_eof());
    }

    #[test]
    fn test_非对齐写入字节() {
        let mut bw = BitWriter::new();
        bw.write_bits(1, 1);
        bw.write_bytes(&[0xFF]);
        assert_eq!(bw.finish(), vec![0xFF, 0x01]);
    }
}
