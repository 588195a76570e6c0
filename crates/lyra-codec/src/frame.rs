//! 解码后的音频帧 (Frame).

use lyra_core::{ChannelLayout, NOPTS_VALUE, SampleFormat};

/// 交错排列的 PCM 采样
#[derive(Debug, Clone, PartialEq)]
pub enum PcmBuffer {
    /// 有符号 16 位整数
    S16(Vec<i16>),
    /// 32 位浮点
    F32(Vec<f32>),
}

impl PcmBuffer {
    /// 创建指定格式的空缓冲区
    pub fn new(format: SampleFormat) -> Self {
        match format {
            SampleFormat::S16 => Self::S16(Vec::new()),
            SampleFormat::F32 => Self::F32(Vec::new()),
        }
    }

    /// 采样格式
    pub fn sample_format(&self) -> SampleFormat {
        match self {
            Self::S16(_) => SampleFormat::S16,
            Self::F32(_) => SampleFormat::F32,
        }
    }

    /// 采样点总数 (所有声道)
    pub fn len(&self) -> usize {
        match self {
            Self::S16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 以 S16 视图访问
    pub fn as_s16(&self) -> Option<&[i16]> {
        match self {
            Self::S16(v) => Some(v),
            Self::F32(_) => None,
        }
    }

    /// 以 F32 视图访问
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::F32(v) => Some(v),
            Self::S16(_) => None,
        }
    }

    /// 追加另一个同格式缓冲区的内容, 格式不同时返回 false
    pub fn append(&mut self, other: &PcmBuffer) -> bool {
        match (self, other) {
            (Self::S16(dst), Self::S16(src)) => dst.extend_from_slice(src),
            (Self::F32(dst), Self::F32(src)) => dst.extend_from_slice(src),
            _ => return false,
        }
        true
    }
}

/// 音频帧
///
/// 一个音频包解码出的 PCM 数据, 各声道按 Vorbis 声道顺序交错排列.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// 采样数据
    pub samples: PcmBuffer,
    /// 本帧包含的采样数 (每声道)
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 首个采样的时间戳 (以采样为单位)
    pub pts: i64,
}

impl AudioFrame {
    /// 创建空的音频帧
    pub fn new(sample_rate: u32, sample_format: SampleFormat, channel_layout: ChannelLayout) -> Self {
        Self {
            samples: PcmBuffer::new(sample_format),
            nb_samples: 0,
            sample_rate,
            channel_layout,
            pts: NOPTS_VALUE,
        }
    }

    /// 采样格式
    pub fn sample_format(&self) -> SampleFormat {
        self.samples.sample_format()
    }
}
