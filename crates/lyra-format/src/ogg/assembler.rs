//! 逻辑包重组.
//!
//! 只跟随第一个 BOS 页面所属的逻辑流, 其他序列号的页面直接跳过.

use std::collections::VecDeque;

use bytes::Bytes;
use log::{debug, warn};
use lyra_codec::Packet;
use lyra_core::NOPTS_VALUE;

use super::page::OggPage;

/// 把页面序列重组为完整逻辑包
#[derive(Debug, Default)]
pub struct PacketAssembler {
    /// 跟随的逻辑流序列号
    serial: Option<u32>,
    /// 跨页累积的未完成包
    partial: Vec<u8>,
    last_sequence: Option<u32>,
    queue: VecDeque<Packet>,
    ended: bool,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 跟随的逻辑流序列号, 遇到 BOS 页面之前为 None
    pub fn serial(&self) -> Option<u32> {
        self.serial
    }

    /// 已遇到 EOS 且所有包都已取出
    pub fn is_finished(&self) -> bool {
        self.ended && self.queue.is_empty()
    }

    /// 取出下一个完整包, None 表示需要更多页面
    pub fn next_packet(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    /// 丢弃全部状态, 重新等待 BOS 页面
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 送入一个页面
    pub fn push_page(&mut self, page: &OggPage) {
        match self.serial {
            None if page.is_bos() => {
                debug!("Ogg: 跟随逻辑流 serial=0x{:08X}", page.serial_number);
                self.serial = Some(page.serial_number);
            }
            None => {
                debug!(
                    "Ogg: 跳过 BOS 之前的页面 (serial=0x{:08X}, seq={})",
                    page.serial_number, page.page_sequence,
                );
                return;
            }
            Some(serial) if serial != page.serial_number => {
                debug!(
                    "Ogg: 跳过其他逻辑流的页面 (serial=0x{:08X})",
                    page.serial_number,
                );
                return;
            }
            Some(_) => {}
        }
        if self.ended {
            debug!("Ogg: 逻辑流已结束, 忽略页面 seq={}", page.page_sequence);
            return;
        }

        if let Some(prev) = self.last_sequence {
            if page.page_sequence != prev.wrapping_add(1) {
                warn!(
                    "Ogg: 页面序号不连续 ({} -> {}), 丢弃 {} 字节残包",
                    prev,
                    page.page_sequence,
                    self.partial.len(),
                );
                self.partial.clear();
            }
        }
        self.last_sequence = Some(page.page_sequence);

        if !page.is_continued() && !self.partial.is_empty() {
            warn!(
                "Ogg: 页面未标记续延, 丢弃 {} 字节未完成的包",
                self.partial.len(),
            );
            self.partial.clear();
        }

        let spans = page.packet_spans();
        let last_complete = spans.iter().rposition(|&(_, _, complete)| complete);

        for (i, &(offset, length, complete)) in spans.iter().enumerate() {
            let chunk = &page.data[offset..offset + length];

            if i == 0 && page.is_continued() && self.partial.is_empty() {
                debug!(
                    "Ogg: 丢弃缺少起始片段的续包 (len={}, complete={})",
                    length, complete,
                );
                continue;
            }

            if !complete {
                self.partial.extend_from_slice(chunk);
                continue;
            }

            let data = if self.partial.is_empty() {
                page.data.slice(offset..offset + length)
            } else {
                self.partial.extend_from_slice(chunk);
                Bytes::from(std::mem::take(&mut self.partial))
            };
            let pts = if Some(i) == last_complete && page.granule_position >= 0 {
                page.granule_position
            } else {
                NOPTS_VALUE
            };
            self.queue.push_back(Packet {
                data,
                pts,
                serial: page.serial_number,
                end_of_stream: false,
            });
        }

        if page.is_eos() {
            self.ended = true;
            if let Some(last) = self.queue.back_mut() {
                last.end_of_stream = true;
            }
            if !self.partial.is_empty() {
                warn!(
                    "Ogg: EOS 页面后仍有 {} 字节未完成的包, 丢弃",
                    self.partial.len(),
                );
                self.partial.clear();
            }
            debug!("Ogg: 逻辑流结束 (serial=0x{:08X})", page.serial_number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::page::{
        FLAG_BOS, FLAG_CONTINUED, FLAG_EOS, build_page, lacing_values, page_with_packets,
    };

    fn parse(bytes: &[u8]) -> OggPage {
        OggPage::parse(bytes).unwrap().0
    }

    fn drain(asm: &mut PacketAssembler) -> Vec<Packet> {
        std::iter::from_fn(|| asm.next_packet()).collect()
    }

    #[test]
    fn test_单页多包() {
        let mut asm = PacketAssembler::new();
        asm.push_page(&parse(
            &page_with_packets(FLAG_BOS, 0, 7, 0, &[b"one", b"two", b""]).unwrap(),
        ));
        let packets = drain(&mut asm);
        assert_eq!(packets.len(), 3);
        assert_eq!(&packets[0].data[..], b"one");
        assert_eq!(packets[0].pts, NOPTS_VALUE);
        assert!(packets[2].data.is_empty());
        assert_eq!(packets[2].pts, 0);
        assert_eq!(asm.serial(), Some(7));
        assert!(asm.next_packet().is_none());
    }

    #[test]
    fn test_跨页拼接() {
        let big: Vec<u8> = (0..700u32).map(|i| i as u8).collect();
        let mut asm = PacketAssembler::new();
        asm.push_page(&parse(
            &build_page(FLAG_BOS, -1, 1, 0, &lacing_values(510, false), &big[..510]).unwrap(),
        ));
        assert!(asm.next_packet().is_none());

        let mut tail = lacing_values(190, true);
        tail.extend(lacing_values(4, true));
        let mut payload = big[510..].to_vec();
        payload.extend_from_slice(b"next");
        asm.push_page(&parse(
            &build_page(FLAG_CONTINUED | FLAG_EOS, 4096, 1, 1, &tail, &payload).unwrap(),
        ));

        let packets = drain(&mut asm);
        assert_eq!(packets.len(), 2);
        assert_eq!(&packets[0].data[..], &big[..]);
        assert_eq!(packets[0].pts, NOPTS_VALUE);
        assert_eq!(&packets[1].data[..], b"next");
        assert_eq!(packets[1].pts, 4096);
        assert!(packets[1].end_of_stream);
        assert!(asm.is_finished());
    }

    #[test]
    fn test_只跟随第一个逻辑流() {
        let mut asm = PacketAssembler::new();
        // BOS 之前的页面被跳过
        asm.push_page(&parse(&page_with_packets(0, 0, 5, 0, &[b"early"]).unwrap()));
        asm.push_page(&parse(
            &page_with_packets(FLAG_BOS, 0, 1, 0, &[b"a-head"]).unwrap(),
        ));
        asm.push_page(&parse(
            &page_with_packets(FLAG_BOS, 0, 2, 0, &[b"b-head"]).unwrap(),
        ));
        asm.push_page(&parse(&page_with_packets(0, 0, 1, 1, &[b"a-1"]).unwrap()));
        let packets = drain(&mut asm);
        let payloads: Vec<&[u8]> = packets.iter().map(|p| &p.data[..]).collect();
        assert_eq!(payloads, vec![&b"a-head"[..], &b"a-1"[..]]);
    }

    #[test]
    fn test_无头续包被丢弃() {
        let mut asm = PacketAssembler::new();
        asm.push_page(&parse(&page_with_packets(FLAG_BOS, 0, 1, 0, &[b"h"]).unwrap()));
        let _ = drain(&mut asm);

        let mut segments = lacing_values(5, true);
        segments.extend(lacing_values(3, true));
        asm.push_page(&parse(
            &build_page(FLAG_CONTINUED, 100, 1, 1, &segments, b"orphaok!").unwrap(),
        ));
        let packets = drain(&mut asm);
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0].data[..], b"ok!");
    }

    #[test]
    fn test_未续延页面丢弃残包() {
        let mut asm = PacketAssembler::new();
        asm.push_page(&parse(
            &build_page(FLAG_BOS, -1, 1, 0, &lacing_values(255, false), &[1u8; 255]).unwrap(),
        ));
        asm.push_page(&parse(&page_with_packets(0, 10, 1, 1, &[b"fresh"]).unwrap()));
        let packets = drain(&mut asm);
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0].data[..], b"fresh");
    }

    #[test]
    fn test_eos_后忽略页面() {
        let mut asm = PacketAssembler::new();
        asm.push_page(&parse(
            &page_with_packets(FLAG_BOS | FLAG_EOS, 0, 1, 0, &[b"only"]).unwrap(),
        ));
        assert!(!asm.is_finished());
        assert!(asm.next_packet().unwrap().end_of_stream);
        assert!(asm.is_finished());
        asm.push_page(&parse(&page_with_packets(0, 0, 1, 1, &[b"late"]).unwrap()));
        assert!(asm.next_packet().is_none());

        asm.reset();
        assert!(asm.serial().is_none());
        assert!(!asm.is_finished());
    }
}
