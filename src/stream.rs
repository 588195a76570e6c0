//! 端到端的 Ogg/Vorbis 流: 字节进, PCM 帧出.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use lyra_codec::decoders::vorbis::{CommentHeader, DecoderStage, StreamInfo, VorbisDecoder};
use lyra_codec::{AudioFrame, Decoder, DecoderOptions, Packet, PcmBuffer};
use lyra_core::{LyraError, LyraResult};
use lyra_format::{OggPushReader, OggReader};
use tracing::{debug, error};

/// 流的播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// 正常解码
    Playing,
    /// 逻辑流已结束, 所有帧已取出
    Finished,
    /// 解码失败, 该资源静音
    Silenced,
}

/// 由推入的字节驱动的 Ogg/Vorbis 解码流
///
/// 任何容器或解码错误都只记录日志并把流静音, 不会向调用方传播或 panic.
pub struct OggVorbisStream {
    reader: OggPushReader,
    decoder: VorbisDecoder,
    state: StreamState,
}

impl Default for OggVorbisStream {
    fn default() -> Self {
        Self::new()
    }
}

impl OggVorbisStream {
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            reader: OggPushReader::new(),
            decoder: VorbisDecoder::with_options(options),
            state: StreamState::Playing,
        }
    }

    /// 追加原始字节
    pub fn push_bytes(&mut self, data: &[u8]) {
        if self.state == StreamState::Playing {
            self.reader.push_bytes(data);
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// 流参数, 头包解析后可用
    pub fn info(&self) -> Option<StreamInfo> {
        self.decoder.info()
    }

    pub fn comments(&self) -> Option<&CommentHeader> {
        self.decoder.comments()
    }

    /// 取出下一帧 PCM; 返回 None 时需要更多字节, 或流已结束/静音
    pub fn next_frame(&mut self) -> Option<AudioFrame> {
        if self.state != StreamState::Playing {
            return None;
        }
        match self.pump() {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Ogg/Vorbis 流解码失败, 静音该资源");
                self.state = StreamState::Silenced;
                None
            }
        }
    }

    fn pump(&mut self) -> LyraResult<Option<AudioFrame>> {
        loop {
            match self.decoder.receive_frame() {
                Ok(frame) => return Ok(Some(frame)),
                Err(LyraError::NeedMoreData) => {}
                Err(LyraError::Eof) => {
                    debug!("Ogg/Vorbis 流结束, 共 {} 个样本", self.decoder.samples_decoded());
                    self.state = StreamState::Finished;
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }

            let Some(packet) = self.reader.next_packet()? else {
                return Ok(None);
            };
            self.decoder.send_packet(&packet)?;
            if packet.end_of_stream {
                self.decoder.send_packet(&Packet::empty())?;
            }
        }
    }
}

/// 一次性解码得到的完整音频
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub info: StreamInfo,
    pub comments: Option<CommentHeader>,
    /// 交错 PCM
    pub samples: PcmBuffer,
    /// 每声道样本数
    pub nb_samples: u64,
}

/// 从任意 reader 解码整个 Ogg/Vorbis 流
pub fn decode_reader<R: Read>(input: R, options: DecoderOptions) -> Result<DecodedAudio> {
    let mut reader = OggReader::new(input);
    let mut decoder = VorbisDecoder::with_options(options);
    let mut samples = PcmBuffer::new(options.sample_format);
    let mut nb_samples = 0u64;

    while let Some(packet) = reader.read_packet().context("读取 Ogg 页面失败")? {
        decoder
            .send_packet(&packet)
            .context("Vorbis 解码失败")?;
        loop {
            match decoder.receive_frame() {
                Ok(frame) => {
                    nb_samples += u64::from(frame.nb_samples);
                    samples.append(&frame.samples);
                }
                Err(LyraError::NeedMoreData) | Err(LyraError::Eof) => break,
                Err(e) => return Err(e).context("Vorbis 解码失败"),
            }
        }
        if packet.end_of_stream {
            break;
        }
    }

    if decoder.stage() != DecoderStage::Ready {
        bail!("Vorbis 头包不完整, 当前阶段 {:?}", decoder.stage());
    }
    let info = decoder
        .info()
        .context("流中缺少 Vorbis identification 头")?;
    debug!(
        "解码完成: {} 声道, {} Hz, {} 个样本, {} 个页面",
        info.channels,
        info.sample_rate,
        nb_samples,
        reader.pages_parsed(),
    );
    Ok(DecodedAudio {
        info,
        comments: decoder.comments().cloned(),
        samples,
        nb_samples,
    })
}

/// 解码 Ogg/Vorbis 文件
pub fn decode_file(path: impl AsRef<Path>, options: DecoderOptions) -> Result<DecodedAudio> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("打开音频文件失败, path={}", path.display()))?;
    decode_reader(BufReader::new(file), options)
        .with_context(|| format!("解码音频文件失败, path={}", path.display()))
}
