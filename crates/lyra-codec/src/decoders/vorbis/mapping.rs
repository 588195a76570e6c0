//! Mapping: 声道到 floor/residue 子映射的分配, 以及声道耦合.

use lyra_core::{BitReader, LyraError, LyraResult, ilog};

/// 一对耦合声道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CouplingStep {
    pub(crate) magnitude: usize,
    pub(crate) angle: usize,
}

/// mapping type 0 配置
#[derive(Debug, Clone)]
pub(crate) struct Mapping {
    pub(crate) coupling: Vec<CouplingStep>,
    /// 每个声道所属的子映射
    pub(crate) mux: Vec<usize>,
    pub(crate) submap_floor: Vec<usize>,
    pub(crate) submap_residue: Vec<usize>,
}

impl Mapping {
    /// 读取 mapping 配置 (不含 16 位 mapping 类型字段)
    pub(crate) fn read(
        br: &mut BitReader<'_>,
        channels: usize,
        floor_count: usize,
        residue_count: usize,
    ) -> LyraResult<Self> {
        let submaps = if br.read_flag()? {
            br.read_bits(4)? as usize + 1
        } else {
            1
        };

        let mut coupling = Vec::new();
        if br.read_flag()? {
            let steps = br.read_bits(8)? as usize + 1;
            let bits = ilog(channels as u32 - 1);
            for _ in 0..steps {
                let magnitude = br.read_bits(bits)? as usize;
                let angle = br.read_bits(bits)? as usize;
                if magnitude == angle || magnitude >= channels || angle >= channels {
                    return Err(LyraError::MalformedSetup(format!(
                        "mapping 耦合声道非法: magnitude={}, angle={}, channels={}",
                        magnitude, angle, channels,
                    )));
                }
                coupling.push(CouplingStep { magnitude, angle });
            }
        }

        if br.read_bits(2)? != 0 {
            return Err(LyraError::MalformedSetup(
                "mapping 保留位必须为 0".into(),
            ));
        }

        let mut mux = vec![0usize; channels];
        if submaps > 1 {
            for m in mux.iter_mut() {
                *m = br.read_bits(4)? as usize;
                if *m >= submaps {
                    return Err(LyraError::MalformedSetup(format!(
                        "mapping mux 越界: {} >= {}",
                        m, submaps,
                    )));
                }
            }
        }

        let mut submap_floor = Vec::with_capacity(submaps);
        let mut submap_residue = Vec::with_capacity(submaps);
        for _ in 0..submaps {
            // time 配置索引, 未使用
            br.read_bits(8)?;
            let floor = br.read_bits(8)? as usize;
            let residue = br.read_bits(8)? as usize;
            if floor >= floor_count || residue >= residue_count {
                return Err(LyraError::MalformedSetup(format!(
                    "mapping floor/residue 索引越界: floor={}, residue={}",
                    floor, residue,
                )));
            }
            submap_floor.push(floor);
            submap_residue.push(residue);
        }

        Ok(Self {
            coupling,
            mux,
            submap_floor,
            submap_residue,
        })
    }

    /// 声道使用的 floor 索引
    pub(crate) fn channel_floor(&self, ch: usize) -> usize {
        self.submap_floor[self.mux[ch]]
    }

    /// 属于子映射 `submap` 的声道
    pub(crate) fn submap_channels(&self, submap: usize) -> impl Iterator<Item = usize> + '_ {
        self.mux
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m == submap)
            .map(|(ch, _)| ch)
    }

    /// 耦合的两个声道只要有一个非零, 两者都需要解码 residue
    pub(crate) fn propagate_nonzero(&self, nonzero: &mut [bool]) {
        for step in &self.coupling {
            if nonzero[step.magnitude] || nonzero[step.angle] {
                nonzero[step.magnitude] = true;
                nonzero[step.angle] = true;
            }
        }
    }

    /// 逆声道耦合, 按声明的逆序处理
    pub(crate) fn inverse_couple(&self, spectra: &mut [Vec<f32>], n2: usize) {
        for step in self.coupling.iter().rev() {
            let (mag, ang) = pair_mut(spectra, step.magnitude, step.angle);
            for (m, a) in mag[..n2].iter_mut().zip(ang[..n2].iter_mut()) {
                let (new_m, new_a) = decouple(*m, *a);
                *m = new_m;
                *a = new_a;
            }
        }
    }
}

fn decouple(m: f32, a: f32) -> (f32, f32) {
    if m > 0.0 {
        if a > 0.0 { (m, m - a) } else { (m + a, m) }
    } else if a > 0.0 {
        (m, m + a)
    } else {
        (m - a, m)
    }
}

/// 同时可变借用两个不同的声道
fn pair_mut(spectra: &mut [Vec<f32>], i: usize, j: usize) -> (&mut [f32], &mut [f32]) {
    if i < j {
        let (lo, hi) = spectra.split_at_mut(j);
        (lo[i].as_mut_slice(), hi[0].as_mut_slice())
    } else {
        let (lo, hi) = spectra.split_at_mut(i);
        (hi[0].as_mut_slice(), lo[j].as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::BitWriter;

    fn stereo_mapping() -> Mapping {
        Mapping {
            coupling: vec![CouplingStep {
                magnitude: 0,
                angle: 1,
            }],
            mux: vec![0, 0],
            submap_floor: vec![0],
            submap_residue: vec![0],
        }
    }

    #[test]
    fn test_mapping_解析() {
        let mut bw = BitWriter::new();
        bw.write_flag(true);
        bw.write_bits(1, 4); // 2 个子映射
        bw.write_flag(true);
        bw.write_bits(0, 8); // 1 对耦合
        bw.write_bits(0, 2);
        bw.write_bits(2, 2);
        bw.write_bits(0, 2);
        for m in [0, 1, 1] {
            bw.write_bits(m, 4);
        }
        for (floor, residue) in [(0, 1), (1, 0)] {
            bw.write_bits(0, 8);
            bw.write_bits(floor, 8);
            bw.write_bits(residue, 8);
        }
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        let mapping = Mapping::read(&mut br, 3, 2, 2).expect("解析失败");
        assert_eq!(
            mapping.coupling,
            vec![CouplingStep {
                magnitude: 0,
                angle: 2
            }]
        );
        assert_eq!(mapping.mux, vec![0, 1, 1]);
        assert_eq!(mapping.channel_floor(2), 1);
        assert_eq!(mapping.submap_channels(1).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(mapping.submap_residue, vec![1, 0]);
    }

    #[test]
    fn test_mapping_非法耦合() {
        let mut bw = BitWriter::new();
        bw.write_flag(false);
        bw.write_flag(true);
        bw.write_bits(0, 8);
        bw.write_bits(1, 1);
        bw.write_bits(1, 1);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        assert!(matches!(
            Mapping::read(&mut br, 2, 1, 1),
            Err(LyraError::MalformedSetup(_))
        ));
    }

    #[test]
    fn test_mapping_保留位与索引() {
        let mut bw = BitWriter::new();
        bw.write_flag(false);
        bw.write_flag(false);
        bw.write_bits(1, 2);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        assert!(Mapping::read(&mut br, 1, 1, 1).is_err());

        let mut bw = BitWriter::new();
        bw.write_flag(false);
        bw.write_flag(false);
        bw.write_bits(0, 2);
        bw.write_bits(0, 8);
        bw.write_bits(3, 8);
        bw.write_bits(0, 8);
        let data = bw.finish();
        let mut br = BitReader::new(&data);
        assert!(matches!(
            Mapping::read(&mut br, 1, 1, 1),
            Err(LyraError::MalformedSetup(_))
        ));
    }

    #[test]
    fn test_非零标志传播() {
        let mapping = stereo_mapping();
        let mut flags = [false, true];
        mapping.propagate_nonzero(&mut flags);
        assert_eq!(flags, [true, true]);
        let mut flags = [false, false];
        mapping.propagate_nonzero(&mut flags);
        assert_eq!(flags, [false, false]);
    }

    #[test]
    fn test_逆耦合四种情况() {
        assert_eq!(decouple(3.0, 1.0), (3.0, 2.0));
        assert_eq!(decouple(3.0, -1.0), (2.0, 3.0));
        assert_eq!(decouple(-3.0, 1.0), (-3.0, -2.0));
        assert_eq!(decouple(-3.0, -1.0), (-2.0, -3.0));
        assert_eq!(decouple(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_逆耦合逆序处理() {
        // 先声明 (0, 1), 再声明 (1, 2); 逆序时先处理 (1, 2)
        let mapping = Mapping {
            coupling: vec![
                CouplingStep {
                    magnitude: 0,
                    angle: 1,
                },
                CouplingStep {
                    magnitude: 1,
                    angle: 2,
                },
            ],
            mux: vec![0; 3],
            submap_floor: vec![0],
            submap_residue: vec![0],
        };
        let mut spectra = vec![vec![4.0, 0.0], vec![2.0, 0.0], vec![1.0, 0.0]];
        mapping.inverse_couple(&mut spectra, 2);
        // (1, 2): m=2, a=1 -> (2, 1); (0, 1): m=4, a=2 -> (4, 2)
        assert_eq!(spectra[0], vec![4.0, 0.0]);
        assert_eq!(spectra[1], vec![2.0, 0.0]);
        assert_eq!(spectra[2], vec![1.0, 0.0]);

        let mut spectra = vec![vec![1.0], vec![-1.0], vec![0.5]];
        mapping.inverse_couple(&mut spectra, 1);
        // (1, 2): m=-1, a=0.5 -> (-1, -0.5); (0, 1): m=1, a=-1 -> (0, 1)
        assert_eq!(spectra[0], vec![0.0]);
        assert_eq!(spectra[1], vec![1.0]);
        assert_eq!(spectra[2], vec![-0.5]);
    }

    #[test]
    fn test_pair_mut_两个方向() {
        let mut spectra = vec![vec![1.0], vec![2.0]];
        let (a, b) = pair_mut(&mut spectra, 1, 0);
        assert_eq!((a[0], b[0]), (2.0, 1.0));
    }
}
