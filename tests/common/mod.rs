//! 集成测试共用的合成 Ogg/Vorbis 码流构造工具.
//!
//! 这里用 `BitWriter` 按 Vorbis I 位格式手写头包与音频包,
//! 不依赖任何外部音频样本.

#![allow(dead_code)]

use lyra::core::BitWriter;
use lyra::format::ogg::{FLAG_BOS, FLAG_EOS, page_with_packets};

pub const SERIAL: u32 = 0x4C59_5241;

const CODEBOOK_SYNC: u32 = 0x564342;

/// 块长指数编码: 低 4 位短块, 高 4 位长块
pub fn blocksize_byte(short: usize, long: usize) -> u8 {
    ((long.trailing_zeros() as u8) << 4) | short.trailing_zeros() as u8
}

pub fn ident_packet(channels: u8, sample_rate: u32, short: usize, long: usize) -> Vec<u8> {
    let mut v = vec![0x01];
    v.extend_from_slice(b"vorbis");
    v.extend_from_slice(&0u32.to_le_bytes());
    v.push(channels);
    v.extend_from_slice(&sample_rate.to_le_bytes());
    v.extend_from_slice(&0i32.to_le_bytes());
    v.extend_from_slice(&128_000i32.to_le_bytes());
    v.extend_from_slice(&0i32.to_le_bytes());
    v.push(blocksize_byte(short, long));
    v.push(1);
    v
}

pub fn comment_packet(vendor: &str, tags: &[&str]) -> Vec<u8> {
    let mut v = vec![0x03];
    v.extend_from_slice(b"vorbis");
    v.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    v.extend_from_slice(vendor.as_bytes());
    v.extend_from_slice(&(tags.len() as u32).to_le_bytes());
    for tag in tags {
        v.extend_from_slice(&(tag.len() as u32).to_le_bytes());
        v.extend_from_slice(tag.as_bytes());
    }
    v.push(1);
    v
}

/// 打包浮点: 符号 1 位, 指数 10 位 (偏移 788), 尾数 21 位
fn float32_pack(value: f32) -> u32 {
    if value == 0.0 {
        return 0;
    }
    let sign = if value < 0.0 { 0x8000_0000 } else { 0 };
    let mut mantissa = f64::from(value.abs());
    let mut exp = 788i32;
    while mantissa < f64::from(1u32 << 20) {
        mantissa *= 2.0;
        exp -= 1;
    }
    sign | ((exp as u32) << 21) | (mantissa as u32 & 0x1F_FFFF)
}

/// 两个条目、码长均为 1 的标量 codebook
fn write_scalar_book(bw: &mut BitWriter) {
    bw.write_bits(CODEBOOK_SYNC, 24);
    bw.write_bits(1, 16);
    bw.write_bits(2, 24);
    bw.write_flag(false);
    bw.write_flag(false);
    bw.write_bits(0, 5);
    bw.write_bits(0, 5);
    bw.write_bits(0, 4);
}

/// 二维 VQ codebook: 条目 0 = (-1, 1), 条目 1 = (1, -1)
fn write_vq_book(bw: &mut BitWriter) {
    bw.write_bits(CODEBOOK_SYNC, 24);
    bw.write_bits(2, 16);
    bw.write_bits(2, 24);
    bw.write_flag(false);
    bw.write_flag(false);
    bw.write_bits(0, 5);
    bw.write_bits(0, 5);
    bw.write_bits(2, 4);
    bw.write_bits(float32_pack(-1.0), 32);
    bw.write_bits(float32_pack(1.0), 32);
    bw.write_bits(1, 4);
    bw.write_flag(false);
    for m in [0u32, 2, 2, 0] {
        bw.write_bits(m, 2);
    }
}

/// 合成码流用到的 residue 参数
pub const RESIDUE_END: usize = 64;
pub const RESIDUE_PARTITION: usize = 16;
/// floor Y 值位数 (multiplier 2, range 128)
pub const FLOOR_Y_BITS: u32 = 7;

/// 构造 setup 头包
///
/// - codebook 0: 标量, residue 分类用; codebook 1: 二维 VQ
/// - floor1: 无分区, 只有两个端点, multiplier 2, X 范围 256
/// - residue type 1: [0, 64), 分区 16, 单一分类, pass 0 使用 codebook 1
/// - mapping 0: 单子映射, 可选的声道 0/1 耦合
/// - mode 0 短块, mode 1 长块
pub fn setup_packet(channels: u8, coupled: bool) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.write_bits(0x05, 8);
    bw.write_bytes(b"vorbis");

    bw.write_bits(1, 8);
    write_scalar_book(&mut bw);
    write_vq_book(&mut bw);

    bw.write_bits(0, 6);
    bw.write_bits(0, 16);

    bw.write_bits(0, 6);
    bw.write_bits(1, 16);
    bw.write_bits(0, 5);
    bw.write_bits(1, 2);
    bw.write_bits(8, 4);

    bw.write_bits(0, 6);
    bw.write_bits(1, 16);
    bw.write_bits(0, 24);
    bw.write_bits(RESIDUE_END as u32, 24);
    bw.write_bits(RESIDUE_PARTITION as u32 - 1, 24);
    bw.write_bits(0, 6);
    bw.write_bits(0, 8);
    bw.write_bits(1, 3);
    bw.write_flag(false);
    bw.write_bits(1, 8);

    bw.write_bits(0, 6);
    bw.write_bits(0, 16);
    bw.write_flag(false);
    if coupled {
        // 一组耦合: magnitude=0, angle=1, 各占 ilog(channels-1) 位
        let bits = 32 - u32::from(channels - 1).leading_zeros();
        bw.write_flag(true);
        bw.write_bits(0, 8);
        bw.write_bits(0, bits);
        bw.write_bits(1, bits);
    } else {
        bw.write_flag(false);
    }
    bw.write_bits(0, 2);
    bw.write_bits(0, 8);
    bw.write_bits(0, 8);
    bw.write_bits(0, 8);

    bw.write_bits(1, 6);
    for long in [false, true] {
        bw.write_flag(long);
        bw.write_bits(0, 16);
        bw.write_bits(0, 16);
        bw.write_bits(0, 8);
    }

    bw.write_flag(true);
    bw.finish()
}

/// 全部声道 floor 未使用的音频包 (解码为静音)
pub fn silent_audio_packet(long: bool, channels: u8) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.write_flag(false);
    bw.write_flag(long);
    if long {
        bw.write_bits(0b11, 2);
    }
    for _ in 0..channels {
        bw.write_flag(false);
    }
    bw.finish()
}

/// 有能量的音频包: 每声道 floor 端点为 `level`, residue 条目按 `seed` 交替
pub fn tone_audio_packet(long: bool, channels: u8, level: u32, seed: u32) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.write_flag(false);
    bw.write_flag(long);
    if long {
        bw.write_bits(0b11, 2);
    }
    for _ in 0..channels {
        bw.write_flag(true);
        bw.write_bits(level, FLOOR_Y_BITS);
        bw.write_bits(level, FLOOR_Y_BITS);
    }

    let mut state = seed;
    let mut next_bit = move || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 16) & 1
    };
    let partitions = RESIDUE_END / RESIDUE_PARTITION;
    for _ in 0..partitions {
        // 每个声道一个分类码字 (单一分类, 取值无关)
        for _ in 0..channels {
            bw.write_bits(0, 1);
        }
        for _ in 0..channels {
            for _ in 0..RESIDUE_PARTITION / 2 {
                bw.write_bits(next_bit(), 1);
            }
        }
    }
    bw.finish()
}

/// 把包序列封装为 Ogg 页面: 三个头包各占一页, 每个音频包一页
pub fn ogg_stream(headers: &[Vec<u8>], audio: &[Vec<u8>], samples_per_packet: i64) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut sequence = 0u32;
    for (i, header) in headers.iter().enumerate() {
        let flags = if i == 0 { FLAG_BOS } else { 0 };
        bytes.extend(page_with_packets(flags, 0, SERIAL, sequence, &[header.as_slice()]).unwrap());
        sequence += 1;
    }
    for (i, packet) in audio.iter().enumerate() {
        let flags = if i + 1 == audio.len() { FLAG_EOS } else { 0 };
        let granule = samples_per_packet * i as i64;
        bytes.extend(
            page_with_packets(flags, granule, SERIAL, sequence, &[packet.as_slice()]).unwrap(),
        );
        sequence += 1;
    }
    bytes
}

/// 双声道 44100 Hz, 256/2048 块长的头包
pub fn stereo_headers(coupled: bool) -> Vec<Vec<u8>> {
    vec![
        ident_packet(2, 44100, 256, 2048),
        comment_packet("lyra-test", &["TITLE=synthetic", "ARTIST=lyra"]),
        setup_packet(2, coupled),
    ]
}
