use crate::equation::Stencil;
use crate::partition::{run_block, BlockJob, RowBlock};

// シングルスレッド版: ブロックを先頭から順に処理する (W に関わらず逐次)
pub fn sweep(stencil: &Stencil<'_>, jobs: Vec<BlockJob<'_>>) -> Vec<RowBlock> {
    jobs.into_iter().map(|job| run_block(stencil, job)).collect()
}
