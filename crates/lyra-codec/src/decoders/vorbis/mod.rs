//! Vorbis I 音频解码器.
//!
//! 解码流程:
//! 1. 依次解析 identification, comment, setup 三个头包
//! 2. 音频包: mode 选择, floor 解码, residue 解码, 逆耦合
//! 3. floor 曲线乘到频谱上, IMDCT 变换
//! 4. 与上一块重叠相加, 输出交错 PCM
//!
//! 除数据不足外的任何错误都会使解码器进入 [`DecoderStage::Failed`],
//! 之后只能调用 [`VorbisDecoder::reset`] 重新开始.

mod codebook;
mod floor;
mod headers;
pub mod imdct;
mod mapping;
mod residue;
mod setup;
mod synthesis;
pub mod window;

use std::collections::VecDeque;

use log::{debug, warn};
use lyra_core::{BitReader, ChannelLayout, LyraError, LyraResult, ilog};

use crate::decoder::Decoder;
use crate::frame::AudioFrame;
use crate::options::DecoderOptions;
use crate::packet::Packet;

pub use self::headers::{CommentHeader, IdentificationHeader, MAX_CHANNELS};

use self::headers::{parse_comment_header, parse_identification_header};
use self::imdct::Imdct;
use self::residue::ResidueScratch;
use self::setup::{SetupTables, parse_setup_header};
use self::synthesis::{build_frame, extend_s16};
use self::window::{OverlapAdd, WindowSet};

/// 解码器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStage {
    /// 等待 identification 头包
    AwaitingIdentification,
    /// 等待 comment 头包
    AwaitingComments,
    /// 等待 setup 头包
    AwaitingSetup,
    /// 可以解码音频包
    Ready,
    /// 出现不可恢复的错误
    Failed,
}

/// 流的基本参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// 声道数
    pub channels: u8,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 短块大小
    pub blocksize_short: usize,
    /// 长块大小
    pub blocksize_long: usize,
    /// 标称码率 (bps, 0 表示未指定)
    pub bitrate_nominal: i32,
    /// 最大码率
    pub bitrate_maximum: i32,
    /// 最小码率
    pub bitrate_minimum: i32,
}

impl From<&IdentificationHeader> for StreamInfo {
    fn from(ident: &IdentificationHeader) -> Self {
        Self {
            channels: ident.channels,
            sample_rate: ident.sample_rate,
            channel_layout: ChannelLayout::from_channels(u32::from(ident.channels)),
            blocksize_short: ident.blocksize_short,
            blocksize_long: ident.blocksize_long,
            bitrate_nominal: ident.bitrate_nominal,
            bitrate_maximum: ident.bitrate_maximum,
            bitrate_minimum: ident.bitrate_minimum,
        }
    }
}

/// 每个音频包复用的工作缓冲区, 按长块与声道数一次性分配
#[derive(Debug, Default)]
struct DecodeScratch {
    floor_y: Vec<Vec<i32>>,
    step2: Vec<bool>,
    floor_present: Vec<bool>,
    nonzero: Vec<bool>,
    submap_channels: Vec<usize>,
    do_not_decode: Vec<bool>,
    residue: ResidueScratch,
    /// 最近一个包输出的交错 PCM
    pcm: Vec<f32>,
}

/// setup 完成后建立的解码状态
struct DecodeState {
    channels: usize,
    blocksize_short: usize,
    blocksize_long: usize,
    setup: SetupTables,
    windows: WindowSet,
    imdct_short: Imdct,
    imdct_long: Imdct,
    overlap: OverlapAdd,
    scratch: DecodeScratch,
}

impl DecodeState {
    fn new(ident: &IdentificationHeader, setup: SetupTables) -> LyraResult<Self> {
        let channels = usize::from(ident.channels);
        let long = ident.blocksize_long;
        let max_points = setup.max_floor_points();
        let scratch = DecodeScratch {
            floor_y: vec![Vec::with_capacity(max_points); channels],
            step2: Vec::with_capacity(max_points),
            floor_present: vec![false; channels],
            nonzero: vec![false; channels],
            submap_channels: Vec::with_capacity(channels),
            do_not_decode: Vec::with_capacity(channels),
            residue: ResidueScratch::default(),
            pcm: Vec::with_capacity(long / 2 * channels),
        };
        Ok(Self {
            channels,
            blocksize_short: ident.blocksize_short,
            blocksize_long: long,
            windows: WindowSet::new(ident.blocksize_short, long),
            imdct_short: Imdct::new(ident.blocksize_short)?,
            imdct_long: Imdct::new(long)?,
            overlap: OverlapAdd::new(channels, long),
            setup,
            scratch,
        })
    }

    /// 解码一个音频包, 返回每声道输出的样本数
    fn decode_audio(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let Self {
            channels,
            blocksize_short,
            blocksize_long,
            setup,
            windows,
            imdct_short,
            imdct_long,
            overlap,
            scratch,
        } = self;
        let channels = *channels;

        let mut br = BitReader::new(packet);
        if br.read_flag()? {
            return Err(LyraError::InvalidData("Vorbis 音频包首位必须为 0".into()));
        }

        let mode_bits = ilog(setup.modes.len() as u32 - 1);
        let mode_number = br.read_bits(mode_bits)? as usize;
        let mode = *setup.modes.get(mode_number).ok_or_else(|| {
            LyraError::InvalidData(format!("Vorbis mode 索引越界: {}", mode_number))
        })?;
        let (n, imdct) = if mode.long_block {
            // 前后窗标志: 重叠长度直接由相邻块的实际块长决定
            br.read_bits(2)?;
            (*blocksize_long, imdct_long)
        } else {
            (*blocksize_short, imdct_short)
        };
        let n2 = n / 2;
        let mapping = &setup.mappings[mode.mapping];

        for ch in 0..channels {
            let floor = &setup.floors[mapping.channel_floor(ch)];
            scratch.floor_present[ch] =
                floor.decode_frame(&mut br, &setup.codebooks, &mut scratch.floor_y[ch])?;
        }

        scratch.nonzero.copy_from_slice(&scratch.floor_present);
        mapping.propagate_nonzero(&mut scratch.nonzero);

        let spectra = overlap.current_blocks_mut();
        for spectrum in spectra.iter_mut() {
            spectrum[..n2].fill(0.0);
        }

        for (submap, &residue_idx) in mapping.submap_residue.iter().enumerate() {
            scratch.submap_channels.clear();
            scratch.submap_channels.extend(mapping.submap_channels(submap));
            scratch.do_not_decode.clear();
            scratch.do_not_decode.extend(
                scratch
                    .submap_channels
                    .iter()
                    .map(|&ch| !scratch.nonzero[ch]),
            );
            setup.residues[residue_idx].decode(
                &mut br,
                &setup.codebooks,
                spectra,
                &scratch.submap_channels,
                &scratch.do_not_decode,
                n2,
                &mut scratch.residue,
            )?;
        }

        mapping.inverse_couple(spectra, n2);

        for (ch, spectrum) in spectra.iter_mut().enumerate() {
            if scratch.floor_present[ch] {
                let floor = &setup.floors[mapping.channel_floor(ch)];
                floor.synthesize(
                    &mut scratch.floor_y[ch],
                    &mut scratch.step2,
                    &mut spectrum[..n2],
                )?;
            } else {
                spectrum[..n2].fill(0.0);
            }
            imdct.transform(&mut spectrum[..n])?;
        }

        scratch.pcm.clear();
        Ok(overlap.finish_block(n, mode.long_block, windows, &mut scratch.pcm))
    }
}

/// Vorbis 解码器
pub struct VorbisDecoder {
    options: DecoderOptions,
    stage: DecoderStage,
    ident: Option<IdentificationHeader>,
    comments: Option<CommentHeader>,
    state: Option<DecodeState>,
    pending: VecDeque<AudioFrame>,
    /// 已输出的每声道样本数
    samples_out: i64,
    flushing: bool,
}

impl Default for VorbisDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VorbisDecoder {
    /// 创建使用默认选项的解码器
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    /// 创建使用指定选项的解码器
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            stage: DecoderStage::AwaitingIdentification,
            ident: None,
            comments: None,
            state: None,
            pending: VecDeque::new(),
            samples_out: 0,
            flushing: false,
        }
    }

    /// 创建 Vorbis 解码器 (工厂函数)
    pub fn create() -> LyraResult<Box<dyn Decoder>> {
        Ok(Box::new(Self::new()))
    }

    /// 当前阶段
    pub fn stage(&self) -> DecoderStage {
        self.stage
    }

    /// 流参数, identification 头包解析后可用
    pub fn info(&self) -> Option<StreamInfo> {
        self.ident.as_ref().map(StreamInfo::from)
    }

    /// comment 头包内容
    pub fn comments(&self) -> Option<&CommentHeader> {
        self.comments.as_ref()
    }

    /// 已输出的每声道样本总数
    pub fn samples_decoded(&self) -> i64 {
        self.samples_out
    }

    /// 最近一个音频包输出的交错浮点 PCM
    pub fn pcm_f32(&self) -> &[f32] {
        self.state
            .as_ref()
            .map(|s| s.scratch.pcm.as_slice())
            .unwrap_or(&[])
    }

    /// 把最近一个音频包的输出转为 16 位整数并追加到 `out`
    pub fn pcm_i16(&self, out: &mut Vec<i16>) {
        extend_s16(out, self.pcm_f32());
    }

    /// 解码一个包 (头包或音频包), 返回每声道输出的样本数
    ///
    /// 头包与首个音频包返回 0; 空音频包返回 0 且不是错误.
    pub fn decode_packet(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let result = match self.stage {
            DecoderStage::Failed => {
                return Err(LyraError::Codec(
                    "Vorbis 解码器处于失败状态, 需要 reset".into(),
                ));
            }
            DecoderStage::AwaitingIdentification => self.handle_identification(packet),
            DecoderStage::AwaitingComments => self.handle_comments(packet),
            DecoderStage::AwaitingSetup => self.handle_setup(packet),
            DecoderStage::Ready => self.handle_audio(packet),
        };
        if let Err(e) = &result {
            if !e.is_recoverable() {
                warn!("Vorbis 解码失败, 解码器停止工作: {}", e);
                self.stage = DecoderStage::Failed;
            }
        }
        result
    }

    /// 回到初始状态, 丢弃头信息与全部解码状态
    pub fn reset(&mut self) {
        *self = Self::with_options(self.options);
    }

    fn handle_identification(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let ident = parse_identification_header(packet)?;
        debug!(
            "Vorbis identification: {} 声道, {} Hz, blocksize={}/{}, 标称码率={}",
            ident.channels,
            ident.sample_rate,
            ident.blocksize_short,
            ident.blocksize_long,
            ident.bitrate_nominal,
        );
        self.ident = Some(ident);
        self.stage = DecoderStage::AwaitingComments;
        Ok(0)
    }

    fn handle_comments(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let comments = parse_comment_header(packet)?;
        debug!(
            "Vorbis comment: vendor={}, {} 条注释",
            comments.vendor,
            comments.comments.len(),
        );
        self.comments = Some(comments);
        self.stage = DecoderStage::AwaitingSetup;
        Ok(0)
    }

    fn handle_setup(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let ident = self.ident.as_ref().ok_or_else(|| {
            LyraError::Internal("Vorbis setup 前缺少 identification 头".into())
        })?;
        let setup = parse_setup_header(packet, usize::from(ident.channels))?;
        self.state = Some(DecodeState::new(ident, setup)?);
        self.stage = DecoderStage::Ready;
        Ok(0)
    }

    fn handle_audio(&mut self, packet: &[u8]) -> LyraResult<usize> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| LyraError::Internal("Vorbis 解码状态未建立".into()))?;
        state.scratch.pcm.clear();
        if packet.is_empty() {
            return Ok(0);
        }
        let produced = state.decode_audio(packet)?;
        self.samples_out += produced as i64;
        Ok(produced)
    }
}

impl Decoder for VorbisDecoder {
    fn name(&self) -> &str {
        "vorbis"
    }

    fn open(&mut self, options: &DecoderOptions) -> LyraResult<()> {
        self.options = *options;
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> LyraResult<()> {
        if packet.is_empty() {
            self.flushing = true;
            return Ok(());
        }

        let produced = self.decode_packet(&packet.data)?;
        if produced == 0 {
            return Ok(());
        }
        let info = self
            .info()
            .ok_or_else(|| LyraError::Internal("Vorbis 流参数缺失".into()))?;
        let frame = build_frame(
            self.pcm_f32(),
            info.sample_rate,
            info.channel_layout,
            self.options.sample_format,
            self.samples_out - produced as i64,
        );
        self.pending.push_back(frame);
        Ok(())
    }

    fn receive_frame(&mut self) -> LyraResult<AudioFrame> {
        if let Some(frame) = self.pending.pop_front() {
            return Ok(frame);
        }
        if self.flushing {
            return Err(LyraError::Eof);
        }
        Err(LyraError::NeedMoreData)
    }

    fn flush(&mut self) {
        self.flushing = false;
        self.pending.clear();
        if let Some(state) = self.state.as_mut() {
            state.overlap.reset();
            state.scratch.pcm.clear();
        }
    }
}
