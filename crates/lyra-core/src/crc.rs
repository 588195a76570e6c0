//! CRC 校验和计算.
//!
//! Ogg 页面使用 CRC-32 (多项式 0x04C11DB7, 初始值 0, 不反射, 无最终异或).

/// Ogg CRC-32 多项式
pub const OGG_CRC_POLY: u32 = 0x04C1_1DB7;

/// CRC-32 查找表 (多项式 0x04C11DB7)
const OGG_CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ OGG_CRC_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// 在已有 CRC 上继续累加数据
///
/// 用于分段计算页面校验 (CRC 字段本身需按 0 参与计算).
pub fn ogg_crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut crc = crc;
    for &byte in data {
        crc = (crc << 8) ^ OGG_CRC_TABLE[((crc >> 24) as u8 ^ byte) as usize];
    }
    crc
}

/// 计算 Ogg CRC-32
pub fn ogg_crc32(data: &[u8]) -> u32 {
    ogg_crc32_update(0, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 逐位计算, 作为查表实现的对照
    fn crc32_bitwise(data: &[u8]) -> u32 {
        let mut crc = 0u32;
        for &byte in data {
            crc ^= u32::from(byte) << 24;
            for _ in 0..8 {
                if crc & 0x8000_0000 != 0 {
                    crc = (crc << 1) ^ OGG_CRC_POLY;
                } else {
                    crc <<= 1;
                }
            }
        }
        crc
    }

    #[test]
    fn test_crc32_空数据() {
        assert_eq!(ogg_crc32(&[]), 0);
    }

    #[test]
    fn test_crc32_查表与逐位一致() {
        let data: Vec<u8> = (0..=255u8).chain(b"OggS vorbis".iter().copied()).collect();
        assert_eq!(ogg_crc32(&data), crc32_bitwise(&data));
        assert_eq!(ogg_crc32(&[0x01]), OGG_CRC_POLY);
    }

    #[test]
    fn test_crc32_分段累加() {
        let data = b"OggS\x00\x02 segment payload";
        let (a, b) = data.split_at(7);
        assert_eq!(ogg_crc32_update(ogg_crc32(a), b), ogg_crc32(data));
    }
}
