//! 快速 IMDCT.
//!
//! N 点 IMDCT 先转为 N/2 点 DCT-IV, 再用 N/4 点复数 FFT 计算 DCT-IV,
//! 最后按 MDCT 的奇偶对称展开为 N 个时域样本:
//!
//! `y[i] = Σ_k X[k] cos(2π/N (i + 1/2 + N/4)(k + 1/2))`

use std::f64::consts::PI;

use lyra_core::{LyraError, LyraResult};

#[derive(Debug, Clone, Copy, Default)]
struct Complex {
    re: f32,
    im: f32,
}

impl Complex {
    fn from_angle(theta: f64) -> Self {
        Self {
            re: theta.cos() as f32,
            im: theta.sin() as f32,
        }
    }

    #[inline]
    fn mul(self, o: Self) -> Self {
        Self {
            re: self.re * o.re - self.im * o.im,
            im: self.re * o.im + self.im * o.re,
        }
    }
}

/// 固定长度的 IMDCT 变换器, 持有预计算表与临时缓冲
#[derive(Debug, Clone)]
pub struct Imdct {
    n: usize,
    /// e^{-iπq/M}
    pre_twiddle: Vec<Complex>,
    /// e^{-iπ(p + 1/4)/M}
    post_twiddle: Vec<Complex>,
    /// e^{-2πij/K}, j < K/2
    fft_twiddle: Vec<Complex>,
    bit_reverse: Vec<usize>,
    fft_buf: Vec<Complex>,
    dct_buf: Vec<f32>,
}

impl Imdct {
    /// 创建 `n` 点 IMDCT, `n` 必须是不小于 16 的 2 的幂
    pub fn new(n: usize) -> LyraResult<Self> {
        if n < 16 || !n.is_power_of_two() {
            return Err(LyraError::InvalidArgument(format!(
                "IMDCT 长度必须是不小于 16 的 2 的幂: {}",
                n,
            )));
        }
        let m = n / 2;
        let k = n / 4;

        let pre_twiddle = (0..k)
            .map(|q| Complex::from_angle(-PI * q as f64 / m as f64))
            .collect();
        let post_twiddle = (0..k)
            .map(|p| Complex::from_angle(-PI * (p as f64 + 0.25) / m as f64))
            .collect();
        let fft_twiddle = (0..k / 2)
            .map(|j| Complex::from_angle(-2.0 * PI * j as f64 / k as f64))
            .collect();

        let bits = k.trailing_zeros();
        let bit_reverse = (0..k)
            .map(|i| i.reverse_bits() >> (usize::BITS - bits))
            .collect();

        Ok(Self {
            n,
            pre_twiddle,
            post_twiddle,
            fft_twiddle,
            bit_reverse,
            fft_buf: vec![Complex::default(); k],
            dct_buf: vec![0.0; m],
        })
    }

    /// 变换长度 N
    pub fn len(&self) -> usize {
        self.n
    }

    /// 始终为 false, 长度至少为 16
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 从 `buf[..n/2]` 读取频谱系数, 把 `n` 个时域样本写回 `buf[..n]`
    pub fn transform(&mut self, buf: &mut [f32]) -> LyraResult<()> {
        let n = self.n;
        if buf.len() < n {
            return Err(LyraError::InvalidArgument(format!(
                "IMDCT 缓冲区长度不足: {} < {}",
                buf.len(),
                n,
            )));
        }
        let m = n / 2;
        let k = n / 4;

        for q in 0..k {
            let v = Complex {
                re: buf[2 * q],
                im: buf[m - 1 - 2 * q],
            };
            self.fft_buf[self.bit_reverse[q]] = v.mul(self.pre_twiddle[q]);
        }

        let mut size = 2;
        while size <= k {
            let half = size / 2;
            let stride = k / size;
            for start in (0..k).step_by(size) {
                for j in 0..half {
                    let w = self.fft_twiddle[j * stride];
                    let a = self.fft_buf[start + j];
                    let b = self.fft_buf[start + j + half].mul(w);
                    self.fft_buf[start + j] = Complex {
                        re: a.re + b.re,
                        im: a.im + b.im,
                    };
                    self.fft_buf[start + j + half] = Complex {
                        re: a.re - b.re,
                        im: a.im - b.im,
                    };
                }
            }
            size *= 2;
        }

        for p in 0..k {
            let w = self.fft_buf[p].mul(self.post_twiddle[p]);
            self.dct_buf[2 * p] = w.re;
            self.dct_buf[m - 1 - 2 * p] = -w.im;
        }

        let quarter = n / 4;
        let three_quarter = 3 * n / 4;
        for (i, out) in buf[..n].iter_mut().enumerate() {
            *out = if i < quarter {
                self.dct_buf[i + quarter]
            } else if i < three_quarter {
                -self.dct_buf[three_quarter - 1 - i]
            } else {
                -self.dct_buf[i - three_quarter]
            };
        }
        Ok(())
    }
}

/// 按定义直接计算的 IMDCT, `out.len()` 为 N, 读取 `input[..N/2]`
pub fn imdct_naive(input: &[f32], out: &mut [f32]) {
    let n = out.len();
    let half = n / 2;
    for (i, y) in out.iter_mut().enumerate() {
        let mut acc = 0.0f64;
        for (k, &x) in input.iter().take(half).enumerate() {
            let angle =
                2.0 * PI / n as f64 * (i as f64 + 0.5 + n as f64 / 4.0) * (k as f64 + 0.5);
            acc += f64::from(x) * angle.cos();
        }
        *y = acc as f32;
    }
}
