//! setup 头包解析: codebook, floor, residue, mapping 与 mode 表.

use log::debug;
use lyra_core::{BitReader, LyraError, LyraResult};

use super::codebook::Codebook;
use super::floor::Floor1;
use super::headers::{PACKET_TYPE_SETUP, check_header_prefix};
use super::mapping::Mapping;
use super::residue::{Residue, ResidueKind};

/// 一个 mode: 块长选择与使用的 mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mode {
    pub(crate) long_block: bool,
    pub(crate) mapping: usize,
}

/// setup 头包中的全部解码表
#[derive(Debug, Clone)]
pub(crate) struct SetupTables {
    pub(crate) codebooks: Vec<Codebook>,
    pub(crate) floors: Vec<Floor1>,
    pub(crate) residues: Vec<Residue>,
    pub(crate) mappings: Vec<Mapping>,
    pub(crate) modes: Vec<Mode>,
}

impl SetupTables {
    /// 所有 floor 中最大的点数
    pub(crate) fn max_floor_points(&self) -> usize {
        self.floors.iter().map(Floor1::point_count).max().unwrap_or(2)
    }
}

pub(crate) fn parse_setup_header(packet: &[u8], channels: usize) -> LyraResult<SetupTables> {
    check_header_prefix(packet, PACKET_TYPE_SETUP, "setup")?;
    let mut br = BitReader::new(&packet[7..]);

    let codebooks =
        parse_codebooks(&mut br).map_err(|e| section_error("codebooks", &br, e))?;
    parse_time_domain_transforms(&mut br).map_err(|e| section_error("time", &br, e))?;
    let floors =
        parse_floors(&mut br, codebooks.len()).map_err(|e| section_error("floors", &br, e))?;
    let residues = parse_residues(&mut br, &codebooks)
        .map_err(|e| section_error("residues", &br, e))?;
    let mappings = parse_mappings(&mut br, channels, floors.len(), residues.len())
        .map_err(|e| section_error("mappings", &br, e))?;
    let modes =
        parse_modes(&mut br, mappings.len()).map_err(|e| section_error("modes", &br, e))?;

    let framing = br
        .read_flag()
        .map_err(|e| section_error("framing", &br, e))?;
    if !framing {
        return Err(LyraError::MalformedSetup(
            "Vorbis setup 头包 framing_flag 非法".into(),
        ));
    }

    debug!(
        "Vorbis setup: codebooks={}, floors={}, residues={}, mappings={}, modes={}",
        codebooks.len(),
        floors.len(),
        residues.len(),
        mappings.len(),
        modes.len(),
    );

    Ok(SetupTables {
        codebooks,
        floors,
        residues,
        mappings,
        modes,
    })
}

/// 为分段解析错误附加位置信息, 不支持的特性原样上报
fn section_error(section: &str, br: &BitReader<'_>, err: LyraError) -> LyraError {
    match err {
        LyraError::Unsupported(_) => err,
        other => LyraError::MalformedSetup(format!(
            "Vorbis setup {} 解析失败 (bit={}): {}",
            section,
            br.bit_position(),
            other,
        )),
    }
}

fn parse_codebooks(br: &mut BitReader<'_>) -> LyraResult<Vec<Codebook>> {
    let count = br.read_bits(8)? as usize + 1;
    let mut codebooks = Vec::with_capacity(count);
    for _ in 0..count {
        codebooks.push(Codebook::read(br)?);
    }
    Ok(codebooks)
}

fn parse_time_domain_transforms(br: &mut BitReader<'_>) -> LyraResult<()> {
    let count = br.read_bits(6)? + 1;
    for _ in 0..count {
        if br.read_bits(16)? != 0 {
            return Err(LyraError::MalformedSetup(
                "time domain transform 必须为 0".into(),
            ));
        }
    }
    Ok(())
}

fn parse_floors(br: &mut BitReader<'_>, codebook_count: usize) -> LyraResult<Vec<Floor1>> {
    let count = br.read_bits(6)? as usize + 1;
    let mut floors = Vec::with_capacity(count);
    for _ in 0..count {
        match br.read_bits(16)? {
            0 => return Err(LyraError::Unsupported("Vorbis floor type 0".into())),
            1 => floors.push(Floor1::read(br, codebook_count)?),
            other => {
                return Err(LyraError::MalformedSetup(format!(
                    "floor 类型非法: {}",
                    other,
                )));
            }
        }
    }
    Ok(floors)
}

fn parse_residues(br: &mut BitReader<'_>, codebooks: &[Codebook]) -> LyraResult<Vec<Residue>> {
    let count = br.read_bits(6)? as usize + 1;
    let mut residues = Vec::with_capacity(count);
    for _ in 0..count {
        let raw = br.read_bits(16)?;
        let kind = ResidueKind::from_u16(raw as u16)
            .ok_or_else(|| LyraError::MalformedSetup(format!("residue 类型非法: {}", raw)))?;
        let residue = Residue::read(br, kind, codebooks.len())?;
        residue.validate_books(codebooks)?;
        residues.push(residue);
    }
    Ok(residues)
}

fn parse_mappings(
    br: &mut BitReader<'_>,
    channels: usize,
    floor_count: usize,
    residue_count: usize,
) -> LyraResult<Vec<Mapping>> {
    let count = br.read_bits(6)? as usize + 1;
    let mut mappings = Vec::with_capacity(count);
    for _ in 0..count {
        let mapping_type = br.read_bits(16)?;
        if mapping_type != 0 {
            return Err(LyraError::MalformedSetup(format!(
                "mapping 类型非法: {}",
                mapping_type,
            )));
        }
        mappings.push(Mapping::read(br, channels, floor_count, residue_count)?);
    }
    Ok(mappings)
}

fn parse_modes(br: &mut BitReader<'_>, mapping_count: usize) -> LyraResult<Vec<Mode>> {
    let count = br.read_bits(6)? as usize + 1;
    let mut modes = Vec::with_capacity(count);
    for _ in 0..count {
        let long_block = br.read_flag()?;
        let window_type = br.read_bits(16)?;
        let transform_type = br.read_bits(16)?;
        if window_type != 0 || transform_type != 0 {
            return Err(LyraError::MalformedSetup(
                "mode window/transform 类型必须为 0".into(),
            ));
        }
        let mapping = br.read_bits(8)? as usize;
        if mapping >= mapping_count {
            return Err(LyraError::MalformedSetup(format!(
                "mode mapping 索引越界: {} >= {}",
                mapping, mapping_count,
            )));
        }
        modes.push(Mode {
            long_block,
            mapping,
        });
    }
    Ok(modes)
}
