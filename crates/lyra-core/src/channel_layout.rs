//! 音频声道布局定义.
//!
//! Vorbis I 为 1..=8 声道规定了固定的声道顺序, 解码输出保持这一顺序,
//! 这里的掩码只用于描述各声道对应的扬声器位置.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 声道位掩码, 每个位代表一个扬声器位置
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u32 {
        /// 前方左声道
        const FRONT_LEFT    = 1 << 0;
        /// 前方右声道
        const FRONT_RIGHT   = 1 << 1;
        /// 前方中央声道
        const FRONT_CENTER  = 1 << 2;
        /// 低频效果 (LFE)
        const LOW_FREQUENCY = 1 << 3;
        /// 后方左声道
        const BACK_LEFT     = 1 << 4;
        /// 后方右声道
        const BACK_RIGHT    = 1 << 5;
        /// 后方中央声道
        const BACK_CENTER   = 1 << 8;
        /// 侧方左声道
        const SIDE_LEFT     = 1 << 9;
        /// 侧方右声道
        const SIDE_RIGHT    = 1 << 10;
    }
}

/// 各声道数下 Vorbis 码流中的声道顺序
const VORBIS_CHANNEL_ORDER: [&[ChannelMask]; 8] = [
    &[ChannelMask::FRONT_CENTER],
    &[ChannelMask::FRONT_LEFT, ChannelMask::FRONT_RIGHT],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_CENTER,
        ChannelMask::FRONT_RIGHT,
    ],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_RIGHT,
        ChannelMask::BACK_LEFT,
        ChannelMask::BACK_RIGHT,
    ],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_CENTER,
        ChannelMask::FRONT_RIGHT,
        ChannelMask::BACK_LEFT,
        ChannelMask::BACK_RIGHT,
    ],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_CENTER,
        ChannelMask::FRONT_RIGHT,
        ChannelMask::BACK_LEFT,
        ChannelMask::BACK_RIGHT,
        ChannelMask::LOW_FREQUENCY,
    ],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_CENTER,
        ChannelMask::FRONT_RIGHT,
        ChannelMask::SIDE_LEFT,
        ChannelMask::SIDE_RIGHT,
        ChannelMask::BACK_CENTER,
        ChannelMask::LOW_FREQUENCY,
    ],
    &[
        ChannelMask::FRONT_LEFT,
        ChannelMask::FRONT_CENTER,
        ChannelMask::FRONT_RIGHT,
        ChannelMask::SIDE_LEFT,
        ChannelMask::SIDE_RIGHT,
        ChannelMask::BACK_LEFT,
        ChannelMask::BACK_RIGHT,
        ChannelMask::LOW_FREQUENCY,
    ],
];

/// 声道布局
///
/// 描述音频流中声道的数量和排列方式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    /// 声道数量
    pub channels: u32,
    /// 声道位掩码 (1..=8 声道时有效)
    pub mask: ChannelMask,
}

impl ChannelLayout {
    /// 单声道
    pub const MONO: Self = Self {
        channels: 1,
        mask: ChannelMask::FRONT_CENTER,
    };

    /// 立体声 (左右)
    pub const STEREO: Self = Self {
        channels: 2,
        mask: ChannelMask::FRONT_LEFT.union(ChannelMask::FRONT_RIGHT),
    };

    /// 根据声道数创建 Vorbis 默认布局
    pub fn from_channels(channels: u32) -> Self {
        let mask = Self::order_for(channels)
            .iter()
            .fold(ChannelMask::empty(), |acc, &m| acc | m);
        Self { channels, mask }
    }

    /// 第 `index` 个输出声道的扬声器位置
    pub fn position(&self, index: usize) -> Option<ChannelMask> {
        Self::order_for(self.channels).get(index).copied()
    }

    fn order_for(channels: u32) -> &'static [ChannelMask] {
        match channels {
            1..=8 => VORBIS_CHANNEL_ORDER[channels as usize - 1],
            _ => &[],
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.channels {
            1 => write!(f, "mono"),
            2 => write!(f, "stereo"),
            6 => write!(f, "5.1"),
            8 => write!(f, "7.1"),
            n => write!(f, "{n}ch"),
        }
    }
}
