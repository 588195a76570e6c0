//! PCM 输出转换与音频帧组装.

use lyra_core::{ChannelLayout, SampleFormat};

use crate::frame::{AudioFrame, PcmBuffer};

/// 浮点样本转为 16 位整数, 先钳位到 [-1, 1]
#[inline]
pub(crate) fn f32_to_s16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// 把交错浮点样本追加为 16 位整数
pub(crate) fn extend_s16(dst: &mut Vec<i16>, src: &[f32]) {
    dst.extend(src.iter().map(|&s| f32_to_s16(s)));
}

/// 由交错浮点样本构建音频帧
pub(crate) fn build_frame(
    interleaved: &[f32],
    sample_rate: u32,
    channel_layout: ChannelLayout,
    format: SampleFormat,
    pts: i64,
) -> AudioFrame {
    let channels = channel_layout.channels.max(1) as usize;
    let mut frame = AudioFrame::new(sample_rate, format, channel_layout);
    frame.nb_samples = (interleaved.len() / channels) as u32;
    frame.pts = pts;
    frame.samples = match format {
        SampleFormat::S16 => {
            let mut samples = Vec::with_capacity(interleaved.len());
            extend_s16(&mut samples, interleaved);
            PcmBuffer::S16(samples)
        }
        SampleFormat::F32 => PcmBuffer::F32(interleaved.to_vec()),
    };
    frame
}
