//! 内部行 1..=n をワーカー数分の連続ブロックに分割する。
//!
//! ブロックは行をまたがないので、`next` を `split_at_mut` で切り分ければ
//! 各ワーカーが排他的な `&mut` スライスを持てる (ロック不要)。

use std::mem;
use std::ops::RangeInclusive;

use crate::equation::Stencil;
use crate::grid::Grid;

/// 1ワーカーが担当する行範囲 (両端含む、1始まり)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBlock {
    pub index: usize,
    pub first: usize,
    pub last: usize,
}

impl RowBlock {
    pub fn len(&self) -> usize {
        self.last + 1 - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// 行 1..=n を min(workers, n) 個のブロックに分ける。
/// 先頭の n % w 個のブロックが1行多い。
pub fn partition_rows(n: usize, workers: usize) -> Vec<RowBlock> {
    let w = workers.clamp(1, n.max(1));
    let base = n / w;
    let extra = n % w;

    let mut blocks = Vec::with_capacity(w);
    let mut first = 1;
    for index in 0..w {
        let len = base + usize::from(index < extra);
        blocks.push(RowBlock {
            index,
            first,
            last: first + len - 1,
        });
        first += len;
    }
    blocks
}

/// 1ブロック分の書き込み先。`rows` は `next` の該当行 (境界列込み)、
/// `residuals` は行ごとの残差の格納先。
pub struct BlockJob<'a> {
    pub block: RowBlock,
    pub rows: &'a mut [f64],
    pub residuals: &'a mut [f64],
}

/// `next` の内部行と行残差ベクタをブロックごとの排他スライスに分割する
pub fn split_jobs<'a>(
    blocks: &[RowBlock],
    next: &'a mut Grid,
    residuals: &'a mut [f64],
) -> Vec<BlockJob<'a>> {
    let m = next.side();
    let n = next.n();
    debug_assert_eq!(residuals.len(), n);

    let mut rows_rest = &mut next.data_mut()[m..(n + 1) * m];
    let mut residuals_rest = residuals;

    let mut jobs = Vec::with_capacity(blocks.len());
    for block in blocks {
        let (rows, tail) = mem::take(&mut rows_rest).split_at_mut(block.len() * m);
        rows_rest = tail;
        let (block_residuals, tail) =
            mem::take(&mut residuals_rest).split_at_mut(block.len());
        residuals_rest = tail;
        jobs.push(BlockJob {
            block: *block,
            rows,
            residuals: block_residuals,
        });
    }
    jobs
}

/// ブロック内の全行を更新する。各ワーカーの本体。
pub fn run_block(stencil: &Stencil<'_>, job: BlockJob<'_>) -> RowBlock {
    let m = stencil.side();
    for ((i, dst_row), residual) in job
        .block
        .rows()
        .zip(job.rows.chunks_mut(m))
        .zip(job.residuals.iter_mut())
    {
        *residual = stencil.update_row(i, dst_row);
    }
    job.block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_cover_every_row_once() {
        for n in 1..=40 {
            for workers in [1, 2, 3, 7, 16, n, n + 5] {
                let blocks = partition_rows(n, workers);
                let mut hits = vec![0usize; n + 2];
                for block in &blocks {
                    for i in block.rows() {
                        hits[i] += 1;
                    }
                }
                assert_eq!(hits[0], 0);
                assert_eq!(hits[n + 1], 0);
                assert!(hits[1..=n].iter().all(|&h| h == 1), "n={n} workers={workers}");
            }
        }
    }

    #[test]
    fn blocks_are_contiguous_and_balanced() {
        let blocks = partition_rows(10, 4);
        let lens: Vec<usize> = blocks.iter().map(RowBlock::len).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].last + 1, pair[1].first);
        }
        assert_eq!(blocks.iter().map(|b| b.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn more_workers_than_rows_gives_one_row_each() {
        let blocks = partition_rows(3, 8);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn jobs_slice_interior_rows_only() {
        let mut next = Grid::new(5).unwrap();
        let mut residuals = vec![0.0; 5];
        let blocks = partition_rows(5, 2);

        let jobs = split_jobs(&blocks, &mut next, &mut residuals);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].rows.len(), 3 * 7);
        assert_eq!(jobs[1].rows.len(), 2 * 7);
        assert_eq!(jobs[0].residuals.len(), 3);
        assert_eq!(jobs[1].residuals.len(), 2);
    }
}
