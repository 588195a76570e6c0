//! Floor type 1: 分段线性频谱包络.
//!
//! 每帧先解出一组 Y 值, 再按 X 排序后用整数 Bresenham 画线,
//! 以 dB 表把线段高度映射为幅度并乘到频谱上.

use lyra_core::{BitReader, LyraError, LyraResult, ilog};

use super::codebook::Codebook;

/// X 列表的最大长度
const MAX_FLOOR1_POINTS: usize = 65;

/// floor1 的一个分区类
#[derive(Debug, Clone)]
pub(crate) struct Floor1Class {
    pub(crate) dimensions: usize,
    pub(crate) subclass_bits: u32,
    pub(crate) masterbook: Option<usize>,
    pub(crate) subclass_books: Vec<Option<usize>>,
}

/// floor1 配置
#[derive(Debug, Clone)]
pub(crate) struct Floor1 {
    pub(crate) partition_classes: Vec<u8>,
    pub(crate) classes: Vec<Floor1Class>,
    /// 1..=4
    pub(crate) multiplier: u8,
    pub(crate) x_list: Vec<u32>,
    /// 按 X 升序的点索引 (X 相同时保持原顺序)
    sorted_order: Vec<usize>,
    /// 每个点 (i >= 2) 的 (低邻居, 高邻居) 索引
    neighbors: Vec<(usize, usize)>,
}

impl Floor1 {
    pub(crate) fn read(br: &mut BitReader<'_>, codebook_count: usize) -> LyraResult<Self> {
        let partitions = br.read_bits(5)? as usize;
        let mut partition_classes = Vec::with_capacity(partitions);
        for _ in 0..partitions {
            partition_classes.push(br.read_bits(4)? as u8);
        }
        let class_count = partition_classes
            .iter()
            .max()
            .map_or(0, |&max| usize::from(max) + 1);

        let check_book = |book: usize| -> LyraResult<usize> {
            if book >= codebook_count {
                return Err(LyraError::MalformedSetup(format!(
                    "floor1 codebook 索引越界: {} >= {}",
                    book, codebook_count,
                )));
            }
            Ok(book)
        };

        let mut classes = Vec::with_capacity(class_count);
        for _ in 0..class_count {
            let dimensions = br.read_bits(3)? as usize + 1;
            let subclass_bits = br.read_bits(2)?;
            let masterbook = if subclass_bits > 0 {
                Some(check_book(br.read_bits(8)? as usize)?)
            } else {
                None
            };
            let mut subclass_books = Vec::with_capacity(1 << subclass_bits);
            for _ in 0..(1u32 << subclass_bits) {
                let raw = br.read_bits(8)? as usize;
                subclass_books.push(match raw {
                    0 => None,
                    b => Some(check_book(b - 1)?),
                });
            }
            classes.push(Floor1Class {
                dimensions,
                subclass_bits,
                masterbook,
                subclass_books,
            });
        }

        let multiplier = br.read_bits(2)? as u8 + 1;
        let range_bits = br.read_bits(4)?;

        let mut x_list = vec![0u32, 1u32 << range_bits];
        for &class in &partition_classes {
            let dims = classes[class as usize].dimensions;
            if x_list.len() + dims > MAX_FLOOR1_POINTS {
                return Err(LyraError::MalformedSetup(format!(
                    "floor1 点数超过上限 {}",
                    MAX_FLOOR1_POINTS,
                )));
            }
            for _ in 0..dims {
                x_list.push(br.read_bits(range_bits)?);
            }
        }

        let mut sorted_order: Vec<usize> = (0..x_list.len()).collect();
        sorted_order.sort_by_key(|&i| x_list[i]);
        let neighbors = (0..x_list.len())
            .map(|i| if i < 2 { (0, 0) } else { find_neighbors(&x_list, i) })
            .collect();

        Ok(Self {
            partition_classes,
            classes,
            multiplier,
            x_list,
            sorted_order,
            neighbors,
        })
    }

    /// Y 值的取值范围
    pub(crate) fn range(&self) -> i32 {
        match self.multiplier {
            1 => 256,
            2 => 128,
            3 => 86,
            _ => 64,
        }
    }

    /// 点数
    pub(crate) fn point_count(&self) -> usize {
        self.x_list.len()
    }

    /// 解码一帧的 Y 值, floor 未使用 (该声道静音) 时返回 false
    pub(crate) fn decode_frame(
        &self,
        br: &mut BitReader<'_>,
        codebooks: &[Codebook],
        y_out: &mut Vec<i32>,
    ) -> LyraResult<bool> {
        if !br.read_flag()? {
            return Ok(false);
        }

        let y_bits = ilog(self.range() as u32 - 1);
        y_out.clear();
        y_out.push(br.read_bits(y_bits)? as i32);
        y_out.push(br.read_bits(y_bits)? as i32);

        for &class_idx in &self.partition_classes {
            let class = &self.classes[class_idx as usize];
            let csub = (1u32 << class.subclass_bits) - 1;
            let mut cval = match class.masterbook {
                Some(book) => codebooks[book].decode_scalar(br)?,
                None => 0,
            };
            for _ in 0..class.dimensions {
                let book = class.subclass_books[(cval & csub) as usize];
                cval >>= class.subclass_bits;
                let y = match book {
                    Some(book) => codebooks[book].decode_scalar(br)? as i32,
                    None => 0,
                };
                y_out.push(y);
            }
        }
        Ok(true)
    }

    /// 由解码出的 Y 值重建包络并乘到频谱上
    ///
    /// `y` 会被原地替换为最终 Y 值, `spectrum` 长度即半块长度.
    pub(crate) fn synthesize(
        &self,
        y: &mut [i32],
        step2: &mut Vec<bool>,
        spectrum: &mut [f32],
    ) -> LyraResult<()> {
        let points = self.x_list.len();
        if y.len() != points {
            return Err(LyraError::InvalidData(format!(
                "floor1 Y 数量不匹配: {} != {}",
                y.len(),
                points,
            )));
        }
        let range = self.range();

        step2.clear();
        step2.resize(points, false);
        step2[0] = true;
        step2[1] = true;
        for i in 2..points {
            let (low, high) = self.neighbors[i];
            let predicted = render_point(
                self.x_list[low] as i32,
                y[low],
                self.x_list[high] as i32,
                y[high],
                self.x_list[i] as i32,
            );
            let val = y[i];
            if val != 0 {
                step2[low] = true;
                step2[high] = true;
                step2[i] = true;
                y[i] = unwrap_amplitude(val, predicted, range);
            } else {
                y[i] = predicted;
            }
        }
        for v in y.iter_mut() {
            *v = (*v).clamp(0, range - 1);
        }

        let mult = i32::from(self.multiplier);
        let n = spectrum.len() as i32;
        let first = self.sorted_order[0];
        let mut lx = 0i32;
        let mut ly = y[first] * mult;
        let mut hx = 0i32;
        let mut hy = 0i32;
        for &idx in &self.sorted_order[1..] {
            if !step2[idx] {
                continue;
            }
            hx = self.x_list[idx] as i32;
            hy = y[idx] * mult;
            render_line(lx, ly, hx, hy, spectrum);
            lx = hx;
            ly = hy;
        }
        if hx < n {
            render_line(hx, hy, n, hy, spectrum);
        }
        Ok(())
    }
}

fn find_neighbors(x_list: &[u32], i: usize) -> (usize, usize) {
    let xi = x_list[i];
    let mut low = 0usize;
    let mut high = 0usize;
    let mut low_x = None;
    let mut high_x = None;
    for (j, &xj) in x_list.iter().enumerate().take(i) {
        if xj < xi && low_x.is_none_or(|lx| xj > lx) {
            low_x = Some(xj);
            low = j;
        }
        if xj > xi && high_x.is_none_or(|hx| xj < hx) {
            high_x = Some(xj);
            high = j;
        }
    }
    (low, high)
}

/// 两点连线在 x 处的整数预测值
fn render_point(x0: i32, y0: i32, x1: i32, y1: i32, x: i32) -> i32 {
    let adx = x1 - x0;
    if adx == 0 {
        return y0;
    }
    let dy = y1 - y0;
    let off = dy.abs() * (x - x0) / adx;
    if dy < 0 { y0 - off } else { y0 + off }
}

/// 将残差值还原为绝对 Y 值 (非对称边界规则)
fn unwrap_amplitude(val: i32, predicted: i32, range: i32) -> i32 {
    let highroom = range - predicted;
    let lowroom = predicted;
    let room = 2 * highroom.min(lowroom);
    if val >= room {
        if highroom > lowroom {
            val - lowroom + predicted
        } else {
            predicted - val + highroom - 1
        }
    } else if val & 1 == 1 {
        predicted - (val + 1) / 2
    } else {
        predicted + val / 2
    }
}

/// 整数 Bresenham 画线, 把 [x0, x1) 区间的频谱乘以对应幅度
fn render_line(x0: i32, y0: i32, x1: i32, y1: i32, spectrum: &mut [f32]) {
    if x1 <= x0 {
        return;
    }
    let n = spectrum.len() as i32;
    let dy = y1 - y0;
    let adx = x1 - x0;
    let base = dy / adx;
    let sy = if dy < 0 { base - 1 } else { base + 1 };
    let ady = dy.abs() - base.abs() * adx;
    let mut y = y0;
    let mut err = 0;

    let end = x1.min(n);
    if x0 < end {
        spectrum[x0 as usize] *= FLOOR1_INVERSE_DB_TABLE[y as usize];
    }
    for x in (x0 + 1)..end {
        err += ady;
        if err >= adx {
            err -= adx;
            y += sy;
        } else {
            y += base;
        }
        spectrum[x as usize] *= FLOOR1_INVERSE_DB_TABLE[y as usize];
    }
}

/// floor1 幅度表: 下标为 Y * multiplier
pub(crate) const FLOOR1_INVERSE_DB_TABLE: [f32; 256] = [
    1.0649863e-07, 1.1341951e-07, 1.2079015e-07, 1.2863978e-07,
    1.3699951e-07, 1.4590251e-07, 1.5538408e-07, 1.6548181e-07,
    1.7623575e-07, 1.8768855e-07, 1.9988561e-07, 2.1287530e-07,
    2.2670913e-07, 2.4144197e-07, 2.5713223e-07, 2.7384213e-07,
    2.9163793e-07, 3.1059021e-07, 3.3077411e-07, 3.5226968e-07,
    3.7516214e-07, 3.9954229e-07, 4.2550680e-07, 4.5315863e-07,
    4.8260743e-07, 5.1396998e-07, 5.4737065e-07, 5.8294187e-07,
    6.2082472e-07, 6.6116941e-07, 7.0413592e-07, 7.4989464e-07,
    7.9862701e-07, 8.5052630e-07, 9.0579828e-07, 9.6466216e-07,
    1.0273513e-06, 1.0941144e-06, 1.1652161e-06, 1.2409384e-06,
    1.3215816e-06, 1.4074654e-06, 1.4989305e-06, 1.5963394e-06,
    1.7000785e-06, 1.8105592e-06, 1.9282195e-06, 2.0535261e-06,
    2.1869758e-06, 2.3290978e-06, 2.4804557e-06, 2.6416497e-06,
    2.8133190e-06, 2.9961443e-06, 3.1908506e-06, 3.3982101e-06,
    3.6190449e-06, 3.8542308e-06, 4.1047004e-06, 4.3714470e-06,
    4.6555282e-06, 4.9580707e-06, 5.2802740e-06, 5.6234160e-06,
    5.9888572e-06, 6.3780469e-06, 6.7925283e-06, 7.2339451e-06,
    7.7040476e-06, 8.2047000e-06, 8.7378876e-06, 9.3057248e-06,
    9.9104632e-06, 1.0554501e-05, 1.1240392e-05, 1.1970856e-05,
    1.2748789e-05, 1.3577278e-05, 1.4459606e-05, 1.5399272e-05,
    1.6400004e-05, 1.7465768e-05, 1.8600792e-05, 1.9809576e-05,
    2.1096914e-05, 2.2467911e-05, 2.3928002e-05, 2.5482978e-05,
    2.7139006e-05, 2.8902651e-05, 3.0780908e-05, 3.2781225e-05,
    3.4911534e-05, 3.7180282e-05, 3.9596466e-05, 4.2169667e-05,
    4.4910090e-05, 4.7828601e-05, 5.0936773e-05, 5.4246931e-05,
    5.7772202e-05, 6.1526565e-05, 6.5524908e-05, 6.9783085e-05,
    7.4317983e-05, 7.9147585e-05, 8.4291040e-05, 8.9768747e-05,
    9.5602426e-05, 1.0181521e-04, 1.0843174e-04, 1.1547824e-04,
    1.2298267e-04, 1.3097477e-04, 1.3948625e-04, 1.4855085e-04,
    1.5820453e-04, 1.6848555e-04, 1.7943469e-04, 1.9109536e-04,
    2.0351382e-04, 2.1673929e-04, 2.3082423e-04, 2.4582449e-04,
    2.6179955e-04, 2.7881275e-04, 2.9693158e-04, 3.1622787e-04,
    3.3677814e-04, 3.5866388e-04, 3.8197188e-04, 4.0679456e-04,
    4.3323036e-04, 4.6138411e-04, 4.9136745e-04, 5.2329927e-04,
    5.5730621e-04, 5.9352311e-04, 6.3209358e-04, 6.7317058e-04,
    7.1691700e-04, 7.6350630e-04, 8.1312324e-04, 8.6596457e-04,
    9.2223983e-04, 9.8217216e-04, 1.0459992e-03, 1.1139742e-03,
    1.1863665e-03, 1.2634633e-03, 1.3455702e-03, 1.4330129e-03,
    1.5261382e-03, 1.6253153e-03, 1.7309374e-03, 1.8434235e-03,
    1.9632195e-03, 2.0908006e-03, 2.2266726e-03, 2.3713743e-03,
    2.5254795e-03, 2.6895994e-03, 2.8643847e-03, 3.0505286e-03,
    3.2487691e-03, 3.4598925e-03, 3.6847358e-03, 3.9241906e-03,
    4.1792066e-03, 4.4507950e-03, 4.7400328e-03, 5.0480668e-03,
    5.3761186e-03, 5.7254891e-03, 6.0975636e-03, 6.4938176e-03,
    6.9158225e-03, 7.3652516e-03, 7.8438871e-03, 8.3536271e-03,
    8.8964928e-03, 9.4746370e-03, 1.0090352e-02, 1.0746080e-02,
    1.1444421e-02, 1.2188144e-02, 1.2980198e-02, 1.3823725e-02,
    1.4722068e-02, 1.5678791e-02, 1.6697687e-02, 1.7782797e-02,
    1.8938423e-02, 2.0169149e-02, 2.1479854e-02, 2.2875735e-02,
    2.4362330e-02, 2.5945531e-02, 2.7631618e-02, 2.9427276e-02,
    3.1339626e-02, 3.3376252e-02, 3.5545228e-02, 3.7855157e-02,
    4.0315199e-02, 4.2935108e-02, 4.5725273e-02, 4.8696758e-02,
    5.1861348e-02, 5.5231591e-02, 5.8820850e-02, 6.2643361e-02,
    6.6714279e-02, 7.1049749e-02, 7.5666962e-02, 8.0584227e-02,
    8.5821044e-02, 9.1398179e-02, 9.7337747e-02, 1.0366330e-01,
    1.1039993e-01, 1.1757434e-01, 1.2521498e-01, 1.3335215e-01,
    1.4201813e-01, 1.5124727e-01, 1.6107617e-01, 1.7154380e-01,
    1.8269168e-01, 1.9456402e-01, 2.0720788e-01, 2.2067342e-01,
    2.3501402e-01, 2.5028656e-01, 2.6655159e-01, 2.8387361e-01,
    3.0232132e-01, 3.2196786e-01, 3.4289114e-01, 3.6517414e-01,
    3.8890521e-01, 4.1417847e-01, 4.4109412e-01, 4.6975890e-01,
    5.0028648e-01, 5.3279791e-01, 5.6742212e-01, 6.0429640e-01,
    6.4356699e-01, 6.8538959e-01, 7.2993007e-01, 7.7736504e-01,
    8.2788260e-01, 8.8168307e-01, 9.3897980e-01, 1.0,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::vorbis::codebook::tests::write_scalar_codebook;
    use lyra_core::BitWriter;

    /// 写入 floor1 配置 (不含 floor 类型字段)
    fn write_floor1(
        bw: &mut BitWriter,
        partition_classes: &[u32],
        classes: &[(u32, u32, Option<u32>, Vec<i32>)],
        multiplier: u32,
        range_bits: u32,
        xs: &[u32],
    ) {
        bw.write_bits(partition_classes.len() as u32, 5);
        for &c in partition_classes {
            bw.write_bits(c, 4);
        }
        for (dims, sub_bits, master, books) in classes {
            bw.write_bits(dims - 1, 3);
            bw.write_bits(*sub_bits, 2);
            if let Some(m) = master {
                bw.write_bits(*m, 8);
            }
            for &b in books {
                bw.write_bits((b + 1) as u32, 8);
            }
        }
        bw.write_bits(multiplier - 1, 2);
        bw.write_bits(range_bits, 4);
        for &x in xs {
            bw.write_bits(x, range_bits);
        }
    }

    fn read_floor(data: &[u8], codebook_count: usize) -> LyraResult<Floor1> {
        let mut br = BitReader::new(data);
        Floor1::read(&mut br, codebook_count)
    }

    #[test]
    fn test_floor1_排序与邻居() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[0], &[(3, 0, None, vec![-1])], 2, 7, &[64, 32, 96]);
        let floor = read_floor(&bw.finish(), 1).expect("解析失败");
        assert_eq!(floor.x_list, vec![0, 128, 64, 32, 96]);
        assert_eq!(floor.sorted_order, vec![0, 3, 2, 4, 1]);
        assert_eq!(floor.neighbors[2], (0, 1));
        assert_eq!(floor.neighbors[3], (0, 2));
        assert_eq!(floor.neighbors[4], (2, 1));
        assert_eq!(floor.range(), 128);
    }

    #[test]
    fn test_floor1_相同_x_稳定排序() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[0], &[(2, 0, None, vec![-1])], 1, 4, &[5, 5]);
        let floor = read_floor(&bw.finish(), 1).expect("解析失败");
        assert_eq!(floor.sorted_order, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_floor1_codebook_索引越界() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[0], &[(1, 1, Some(3), vec![0, 1])], 1, 8, &[10]);
        assert!(matches!(
            read_floor(&bw.finish(), 2),
            Err(LyraError::MalformedSetup(_))
        ));
    }

    #[test]
    fn test_floor1_点数上限() {
        let mut bw = BitWriter::new();
        let classes = vec![0u32; 9];
        let xs: Vec<u32> = (1..=72).collect();
        write_floor1(&mut bw, &classes, &[(8, 0, None, vec![-1])], 1, 8, &xs);
        assert!(matches!(
            read_floor(&bw.finish(), 1),
            Err(LyraError::MalformedSetup(_))
        ));
    }

    #[test]
    fn test_floor1_未使用标志() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[], &[], 1, 8, &[]);
        let floor = read_floor(&bw.finish(), 0).expect("解析失败");

        let data = [0u8; 2];
        let mut br = BitReader::new(&data);
        let mut y = Vec::new();
        assert!(!floor.decode_frame(&mut br, &[], &mut y).unwrap());
        assert_eq!(br.bit_position(), 1);
    }

    #[test]
    fn test_floor1_解码_y_值() {
        // codebook 0: 4 个条目, 码长均为 2, 码字即条目号的二进制
        let mut bw = BitWriter::new();
        write_scalar_codebook(&mut bw, 1, &[2, 2, 2, 2]);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        let books = vec![Codebook::read(&mut br).unwrap()];

        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[0], &[(2, 0, None, vec![0])], 4, 6, &[16, 48]);
        let floor = read_floor(&bw.finish(), 1).expect("解析失败");

        let mut bw = BitWriter::new();
        bw.write_flag(true);
        bw.write_bits(40, 6);
        bw.write_bits(7, 6);
        // 条目 3 (码字 11), 条目 1 (码字 01)
        bw.write_bits(0b11, 2);
        bw.write_bits(0b10, 2);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        let mut y = Vec::new();
        assert!(floor.decode_frame(&mut br, &books, &mut y).unwrap());
        assert_eq!(y, vec![40, 7, 3, 1]);
        assert_eq!(br.bit_position(), 1 + 12 + 4);
    }

    #[test]
    fn test_floor1_平直包络() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[], &[], 2, 8, &[]);
        let floor = read_floor(&bw.finish(), 0).expect("解析失败");

        let mut y = vec![100, 100];
        let mut step2 = Vec::new();
        let mut spectrum = vec![1.0f32; 128];
        floor.synthesize(&mut y, &mut step2, &mut spectrum).unwrap();
        let expected = FLOOR1_INVERSE_DB_TABLE[200];
        assert!(spectrum.iter().all(|&v| v == expected));
    }

    #[test]
    fn test_floor1_斜线与钳位() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[], &[], 1, 4, &[]);
        let floor = read_floor(&bw.finish(), 0).expect("解析失败");

        // 超出范围的 Y 被钳位到 [0, 255]
        let mut y = vec![0, 300];
        let mut step2 = Vec::new();
        let mut spectrum = vec![1.0f32; 32];
        floor.synthesize(&mut y, &mut step2, &mut spectrum).unwrap();
        assert_eq!(y, vec![0, 255]);
        assert_eq!(spectrum[0], FLOOR1_INVERSE_DB_TABLE[0]);
        // 0..16 单调上升, 之后保持末端高度
        for w in spectrum[..16].windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(spectrum[16..].iter().all(|&v| v == FLOOR1_INVERSE_DB_TABLE[255]));
    }

    #[test]
    fn test_floor1_中间点还原() {
        let mut bw = BitWriter::new();
        write_floor1(&mut bw, &[0], &[(1, 0, None, vec![-1])], 1, 6, &[32]);
        let floor = read_floor(&bw.finish(), 0).expect("解析失败");

        // 预测值为 (10 + 30) / 2 = 20, 残差 3 (奇数) 还原为 20 - 2 = 18
        let mut y = vec![10, 30, 3];
        let mut step2 = Vec::new();
        let mut spectrum = vec![1.0f32; 64];
        floor.synthesize(&mut y, &mut step2, &mut spectrum).unwrap();
        assert_eq!(y, vec![10, 30, 18]);
        assert_eq!(step2, vec![true, true, true]);
        assert_eq!(spectrum[32], FLOOR1_INVERSE_DB_TABLE[18]);

        // 残差为 0 时取预测值且该点不参与画线
        let mut y = vec![10, 30, 0];
        let mut spectrum = vec![1.0f32; 64];
        floor.synthesize(&mut y, &mut step2, &mut spectrum).unwrap();
        assert_eq!(y[2], 20);
        assert!(!step2[2]);
        assert_eq!(spectrum[32], FLOOR1_INVERSE_DB_TABLE[20]);
    }

    #[test]
    fn test_还原规则() {
        // room = 2 * min(56, 200) = 112
        assert_eq!(unwrap_amplitude(4, 200, 256), 202);
        assert_eq!(unwrap_amplitude(5, 200, 256), 197);
        // val >= room 且 lowroom > highroom
        assert_eq!(unwrap_amplitude(120, 200, 256), 200 - 120 + 56 - 1);
        // val >= room 且 highroom > lowroom
        assert_eq!(unwrap_amplitude(30, 10, 256), 30 - 10 + 10);
    }

    #[test]
    fn test_render_point() {
        assert_eq!(render_point(0, 10, 100, 30, 50), 20);
        assert_eq!(render_point(0, 30, 100, 10, 25), 25);
        assert_eq!(render_point(5, 7, 5, 9, 5), 7);
    }

    #[test]
    fn test_render_line_斜率() {
        let mut spectrum = vec![1.0f32; 8];
        render_line(0, 0, 8, 4, &mut spectrum);
        let ys: Vec<usize> = spectrum
            .iter()
            .map(|v| FLOOR1_INVERSE_DB_TABLE.iter().position(|t| t == v).unwrap())
            .collect();
        assert_eq!(ys, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_幅度表单调() {
        assert_eq!(FLOOR1_INVERSE_DB_TABLE[255], 1.0);
        assert!(FLOOR1_INVERSE_DB_TABLE.windows(2).all(|w| w[0] < w[1]));
    }
}
