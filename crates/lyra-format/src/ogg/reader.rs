//! 推入式与拉取式的 Ogg 包读取器.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use log::warn;
use lyra_codec::Packet;
use lyra_core::{LyraError, LyraResult};

use super::assembler::PacketAssembler;
use super::page::OggPage;

/// 每次从底层 reader 读取的字节数
const READ_CHUNK_SIZE: usize = 4096;

/// 推入式读取器: 调用方逐块送入原始字节, 取出完整包
#[derive(Debug, Default)]
pub struct OggPushReader {
    buffer: BytesMut,
    assembler: PacketAssembler,
    pages: u64,
}

impl OggPushReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加原始字节
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// 取出下一个完整包
    ///
    /// 缓冲区内只剩不完整的页面时返回 `Ok(None)`, 容器错误原样返回.
    pub fn next_packet(&mut self) -> LyraResult<Option<Packet>> {
        loop {
            if let Some(packet) = self.assembler.next_packet() {
                return Ok(Some(packet));
            }
            if self.assembler.is_finished() {
                return Ok(None);
            }
            match OggPage::parse(&self.buffer) {
                Ok((page, used)) => {
                    self.buffer.advance(used);
                    self.pages += 1;
                    self.assembler.push_page(&page);
                }
                Err(LyraError::NeedMoreData) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    /// 逻辑流已结束且所有包都已取出
    pub fn is_finished(&self) -> bool {
        self.assembler.is_finished()
    }

    /// 尚未解析的缓冲字节数
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// 已解析的页面数
    pub fn pages_parsed(&self) -> u64 {
        self.pages
    }

    /// 清空缓冲与重组状态
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.assembler.reset();
        self.pages = 0;
    }
}

/// 拉取式读取器: 从任意 [`Read`] 读取页面并产出包
pub struct OggReader<R> {
    inner: R,
    push: OggPushReader,
    chunk: Vec<u8>,
    eof: bool,
}

impl<R: Read> OggReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            push: OggPushReader::new(),
            chunk: vec![0; READ_CHUNK_SIZE],
            eof: false,
        }
    }

    /// 读取下一个完整包, 输入结束时返回 `Ok(None)`
    pub fn read_packet(&mut self) -> LyraResult<Option<Packet>> {
        loop {
            if let Some(packet) = self.push.next_packet()? {
                return Ok(Some(packet));
            }
            if self.eof || self.push.is_finished() {
                let leftover = self.push.buffered_len();
                if leftover > 0 && !self.push.is_finished() {
                    warn!("Ogg: 输入结束时有 {} 字节不完整页面, 丢弃", leftover);
                    self.push.reset();
                }
                return Ok(None);
            }

            match self.inner.read(&mut self.chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.push.push_bytes(&self.chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 已解析的页面数
    pub fn pages_parsed(&self) -> u64 {
        self.push.pages_parsed()
    }

    /// 取回底层 reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::page::{FLAG_BOS, FLAG_EOS, page_with_packets};
    use std::io::Cursor;

    fn two_page_stream() -> Vec<u8> {
        let mut bytes = page_with_packets(FLAG_BOS, 0, 9, 0, &[b"head"]).unwrap();
        bytes.extend(page_with_packets(FLAG_EOS, 64, 9, 1, &[b"body", b"tail"]).unwrap());
        bytes
    }

    #[test]
    fn test_逐字节推入() {
        let stream = two_page_stream();
        let mut reader = OggPushReader::new();
        let mut packets = Vec::new();
        for &b in &stream {
            reader.push_bytes(&[b]);
            while let Some(p) = reader.next_packet().unwrap() {
                packets.push(p);
            }
        }
        let payloads: Vec<&[u8]> = packets.iter().map(|p| &p.data[..]).collect();
        assert_eq!(payloads, vec![&b"head"[..], &b"body"[..], &b"tail"[..]]);
        assert!(packets[2].end_of_stream);
        assert_eq!(packets[2].pts, 64);
        assert!(reader.is_finished());
        assert_eq!(reader.pages_parsed(), 2);
        assert_eq!(reader.buffered_len(), 0);
    }

    #[test]
    fn test_推入非法数据() {
        let mut reader = OggPushReader::new();
        reader.push_bytes(b"ID3\x03\x00");
        assert!(matches!(
            reader.next_packet(),
            Err(LyraError::Unsupported(_))
        ));
    }

    #[test]
    fn test_拉取读取() {
        let mut reader = OggReader::new(Cursor::new(two_page_stream()));
        let mut count = 0;
        while let Some(packet) = reader.read_packet().unwrap() {
            assert_eq!(packet.serial, 9);
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(reader.pages_parsed(), 2);
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn test_拉取截断输入() {
        let mut stream = two_page_stream();
        stream.truncate(stream.len() - 3);
        let mut reader = OggReader::new(Cursor::new(stream));
        let first = reader.read_packet().unwrap().unwrap();
        assert_eq!(&first.data[..], b"head");
        assert!(reader.read_packet().unwrap().is_none());
    }
}
