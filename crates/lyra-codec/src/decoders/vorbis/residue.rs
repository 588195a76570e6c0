//! Residue 解码 (type 0/1/2).
//!
//! residue 把频谱细节按固定大小的分区编码: 先为每个分区解出分类号,
//! 再按 8 个 pass 逐级用分类对应的 VQ codebook 累加向量.

use lyra_core::{BitReader, LyraError, LyraResult};

use super::codebook::Codebook;

/// residue 的向量排布方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResidueKind {
    /// 分区内按 `psize / dims` 步长交错
    Type0,
    /// 分区内连续
    Type1,
    /// 多声道先交错成一个向量, 再按 type 1 解码
    Type2,
}

impl ResidueKind {
    pub(crate) fn from_u16(kind: u16) -> Option<Self> {
        match kind {
            0 => Some(Self::Type0),
            1 => Some(Self::Type1),
            2 => Some(Self::Type2),
            _ => None,
        }
    }
}

/// residue 配置
#[derive(Debug, Clone)]
pub(crate) struct Residue {
    pub(crate) kind: ResidueKind,
    pub(crate) begin: usize,
    pub(crate) end: usize,
    pub(crate) partition_size: usize,
    pub(crate) classifications: usize,
    pub(crate) classbook: usize,
    /// 每个分类在 8 个 pass 上使用的 codebook
    pub(crate) books: Vec<[Option<usize>; 8]>,
}

/// residue 解码复用的临时缓冲
#[derive(Debug, Default)]
pub(crate) struct ResidueScratch {
    classes: Vec<u8>,
    interleaved: Vec<f32>,
}

impl Residue {
    pub(crate) fn read(
        br: &mut BitReader<'_>,
        kind: ResidueKind,
        codebook_count: usize,
    ) -> LyraResult<Self> {
        let begin = br.read_bits(24)? as usize;
        let end = br.read_bits(24)? as usize;
        let partition_size = br.read_bits(24)? as usize + 1;
        let classifications = br.read_bits(6)? as usize + 1;
        let classbook = br.read_bits(8)? as usize;
        if classbook >= codebook_count {
            return Err(LyraError::MalformedSetup(format!(
                "residue classbook 索引越界: {} >= {}",
                classbook, codebook_count,
            )));
        }

        let mut cascades = Vec::with_capacity(classifications);
        for _ in 0..classifications {
            let low = br.read_bits(3)?;
            let high = if br.read_flag()? { br.read_bits(5)? } else { 0 };
            cascades.push((high << 3) | low);
        }

        let mut books = Vec::with_capacity(classifications);
        for cascade in cascades {
            let mut slot = [None; 8];
            for (pass, book) in slot.iter_mut().enumerate() {
                if cascade & (1 << pass) == 0 {
                    continue;
                }
                let idx = br.read_bits(8)? as usize;
                if idx >= codebook_count {
                    return Err(LyraError::MalformedSetup(format!(
                        "residue codebook 索引越界: {} >= {}",
                        idx, codebook_count,
                    )));
                }
                *book = Some(idx);
            }
            books.push(slot);
        }

        Ok(Self {
            kind,
            begin,
            end,
            partition_size,
            classifications,
            classbook,
            books,
        })
    }

    /// 校验各 pass 使用的 codebook 都带有 VQ 查找表
    pub(crate) fn validate_books(&self, codebooks: &[Codebook]) -> LyraResult<()> {
        for book in self.books.iter().flatten().flatten() {
            if !codebooks[*book].has_lookup() {
                return Err(LyraError::MalformedSetup(format!(
                    "residue codebook {} 缺少 VQ 查找表",
                    book,
                )));
            }
        }
        Ok(())
    }

    /// 解码一个子映射的 residue 并累加到频谱
    ///
    /// `channels` 为该子映射包含的声道 (按声道号升序), `do_not_decode`
    /// 与之一一对应. `spectra` 为全部声道的频谱, 每个长度至少 `n2`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn decode(
        &self,
        br: &mut BitReader<'_>,
        codebooks: &[Codebook],
        spectra: &mut [Vec<f32>],
        channels: &[usize],
        do_not_decode: &[bool],
        n2: usize,
        scratch: &mut ResidueScratch,
    ) -> LyraResult<()> {
        if self.kind != ResidueKind::Type2 {
            let mut vectors: Vec<&mut [f32]> = Vec::with_capacity(channels.len());
            let mut decode_flags = Vec::with_capacity(channels.len());
            for (ch, spectrum) in spectra.iter_mut().enumerate() {
                if let Some(pos) = channels.iter().position(|&c| c == ch) {
                    vectors.push(&mut spectrum[..n2]);
                    decode_flags.push(!do_not_decode[pos]);
                }
            }
            return self.decode_vectors(br, codebooks, &mut vectors, &decode_flags, scratch);
        }

        if do_not_decode.iter().all(|&d| d) {
            return Ok(());
        }
        let count = channels.len();
        let mut interleaved = std::mem::take(&mut scratch.interleaved);
        interleaved.clear();
        interleaved.resize(n2 * count, 0.0);
        let result = self.decode_vectors(
            br,
            codebooks,
            &mut [interleaved.as_mut_slice()],
            &[true],
            scratch,
        );
        if result.is_ok() {
            for (j, &ch) in channels.iter().enumerate() {
                let spectrum = &mut spectra[ch];
                for (i, v) in spectrum[..n2].iter_mut().enumerate() {
                    *v = interleaved[i * count + j];
                }
            }
        }
        scratch.interleaved = interleaved;
        result
    }

    fn decode_vectors(
        &self,
        br: &mut BitReader<'_>,
        codebooks: &[Codebook],
        vectors: &mut [&mut [f32]],
        decode_flags: &[bool],
        scratch: &mut ResidueScratch,
    ) -> LyraResult<()> {
        if !decode_flags.iter().any(|&d| d) {
            return Ok(());
        }
        let actual_size = vectors.first().map_or(0, |v| v.len());
        let limit_begin = self.begin.min(actual_size);
        let limit_end = self.end.min(actual_size);
        if limit_end <= limit_begin {
            return Ok(());
        }
        let partitions = (limit_end - limit_begin) / self.partition_size;
        if partitions == 0 {
            return Ok(());
        }

        let classbook = &codebooks[self.classbook];
        let classwords = classbook.dimensions;
        let classes = &mut scratch.classes;
        classes.clear();
        classes.resize(vectors.len() * partitions, 0);

        for pass in 0..8 {
            let mut partition = 0usize;
            while partition < partitions {
                if pass == 0 {
                    for (j, _) in decode_flags.iter().enumerate().filter(|(_, d)| **d) {
                        let mut temp = classbook.decode_scalar(br)? as usize;
                        for i in (0..classwords).rev() {
                            let p = partition + i;
                            if p < partitions {
                                classes[j * partitions + p] = (temp % self.classifications) as u8;
                            }
                            temp /= self.classifications;
                        }
                    }
                }
                for _ in 0..classwords {
                    if partition >= partitions {
                        break;
                    }
                    for (j, vector) in vectors.iter_mut().enumerate() {
                        if !decode_flags[j] {
                            continue;
                        }
                        let class = classes[j * partitions + partition] as usize;
                        if let Some(book) = self.books[class][pass] {
                            let offset = limit_begin + partition * self.partition_size;
                            self.decode_partition(br, &codebooks[book], vector, offset)?;
                        }
                    }
                    partition += 1;
                }
            }
        }
        Ok(())
    }

    fn decode_partition(
        &self,
        br: &mut BitReader<'_>,
        book: &Codebook,
        vector: &mut [f32],
        offset: usize,
    ) -> LyraResult<()> {
        let dims = book.dimensions;
        match self.kind {
            ResidueKind::Type0 => {
                let step = self.partition_size / dims;
                for j in 0..step {
                    book.decode_vector_add(br, vector, offset + j, step)?;
                }
            }
            ResidueKind::Type1 | ResidueKind::Type2 => {
                let mut i = 0;
                while i < self.partition_size {
                    book.decode_vector_add(br, vector, offset + i, 1)?;
                    i += dims;
                }
            }
        }
        Ok(())
    }
}
