//! Vorbis 窗函数与跨块重叠相加.
//!
//! 相邻两块的重叠区长度取两者较小块长的一半, 重叠区内前一块乘下降沿,
//! 当前块乘上升沿; 重叠区以外窗值为 1 (平坦段) 或 0.

use std::f64::consts::FRAC_PI_2;

/// 相邻块的长短组合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowShape {
    /// 长块接长块
    LongLong,
    /// 短块接长块
    ShortToLong,
    /// 长块接短块
    LongToShort,
    /// 短块接短块
    ShortShort,
}

impl WindowShape {
    /// 由前一块与当前块的长短确定过渡形状
    pub fn from_blocks(prev_long: bool, cur_long: bool) -> Self {
        match (prev_long, cur_long) {
            (true, true) => Self::LongLong,
            (false, true) => Self::ShortToLong,
            (true, false) => Self::LongToShort,
            (false, false) => Self::ShortShort,
        }
    }
}

/// 两种块长的窗斜坡表
#[derive(Debug, Clone)]
pub struct WindowSet {
    short: usize,
    long: usize,
    short_slope: Vec<f32>,
    long_slope: Vec<f32>,
}

impl WindowSet {
    pub fn new(short: usize, long: usize) -> Self {
        Self {
            short,
            long,
            short_slope: build_slope(short / 2),
            long_slope: build_slope(long / 2),
        }
    }

    /// 过渡区的上升沿, 长度即重叠长度
    pub fn slope(&self, shape: WindowShape) -> &[f32] {
        match shape {
            WindowShape::LongLong => &self.long_slope,
            _ => &self.short_slope,
        }
    }

    /// 重叠区长度
    pub fn overlap_len(&self, shape: WindowShape) -> usize {
        self.slope(shape).len()
    }

    /// (前一块右半部分平坦段长度, 当前块左半部分平坦段长度)
    pub fn flat_lengths(&self, shape: WindowShape) -> (usize, usize) {
        let half_overlap = self.overlap_len(shape) / 2;
        let (prev, cur) = match shape {
            WindowShape::LongLong => (self.long, self.long),
            WindowShape::ShortToLong => (self.short, self.long),
            WindowShape::LongToShort => (self.long, self.short),
            WindowShape::ShortShort => (self.short, self.short),
        };
        (prev / 4 - half_overlap, cur / 4 - half_overlap)
    }
}

/// `w(i) = sin(π/2 · sin²((i + 0.5) / len · π/2))`
fn build_slope(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let inner = ((i as f64 + 0.5) / len as f64 * FRAC_PI_2).sin();
            (FRAC_PI_2 * inner * inner).sin() as f32
        })
        .collect()
}

/// 双缓冲的逐声道时域块与重叠相加
#[derive(Debug, Clone)]
pub struct OverlapAdd {
    channels: usize,
    current: Vec<Vec<f32>>,
    previous: Vec<Vec<f32>>,
    /// 上一块的 (块长, 是否长块)
    prev_block: Option<(usize, bool)>,
}

impl OverlapAdd {
    /// 每个声道分配 `max_block` 长度的缓冲区
    pub fn new(channels: usize, max_block: usize) -> Self {
        Self {
            channels,
            current: vec![vec![0.0; max_block]; channels],
            previous: vec![vec![0.0; max_block]; channels],
            prev_block: None,
        }
    }

    /// 当前块第 `ch` 个声道的缓冲区
    pub fn current_mut(&mut self, ch: usize) -> &mut [f32] {
        &mut self.current[ch]
    }

    /// 全部声道的当前块缓冲区
    pub fn current_blocks_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.current
    }

    /// 把当前块与上一块重叠相加, 交错写入 `out` 末尾
    ///
    /// 返回每声道输出的样本数 (上一块长/4 + 当前块长/4), 首块返回 0.
    pub fn finish_block(
        &mut self,
        n: usize,
        long: bool,
        windows: &WindowSet,
        out: &mut Vec<f32>,
    ) -> usize {
        let produced = match self.prev_block {
            None => 0,
            Some((prev_n, prev_long)) => {
                let shape = WindowShape::from_blocks(prev_long, long);
                let rise = windows.slope(shape);
                let overlap = rise.len();
                let prev_q = prev_n / 4;
                let cur_q = n / 4;
                let half_overlap = overlap / 2;
                let count = prev_q + cur_q;

                let base = out.len();
                out.resize(base + count * self.channels, 0.0);
                for ch in 0..self.channels {
                    let prev = &self.previous[ch];
                    let cur = &self.current[ch];
                    let flat_prev = &prev[2 * prev_q..3 * prev_q - half_overlap];
                    let prev_tail = &prev[3 * prev_q - half_overlap..3 * prev_q + half_overlap];
                    let cur_head = &cur[cur_q - half_overlap..cur_q + half_overlap];
                    let flat_cur = &cur[cur_q + half_overlap..2 * cur_q];

                    let samples = flat_prev
                        .iter()
                        .copied()
                        .chain(
                            prev_tail
                                .iter()
                                .zip(cur_head)
                                .enumerate()
                                .map(|(i, (p, c))| p * rise[overlap - 1 - i] + c * rise[i]),
                        )
                        .chain(flat_cur.iter().copied());
                    for (i, s) in samples.enumerate() {
                        out[base + i * self.channels + ch] = s;
                    }
                }
                count
            }
        };

        std::mem::swap(&mut self.current, &mut self.previous);
        self.prev_block = Some((n, long));
        produced
    }

    /// 丢弃重叠状态, 下一块重新作为首块处理
    pub fn reset(&mut self) {
        self.prev_block = None;
        for buf in self.current.iter_mut().chain(self.previous.iter_mut()) {
            buf.fill(0.0);
        }
    }
}
