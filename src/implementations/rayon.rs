use rayon::prelude::*;

use crate::equation::Stencil;
use crate::partition::{run_block, BlockJob, RowBlock};

/*
  Rayon版

  書き込み先のブロックはすでに排他的な &mut スライスなので、
  そのまま work-stealing プールに渡せる。collect が戻った時点で全ブロック完了。
  ブロック数 (= workers) がプールのスレッド数と違っても結果は変わらない。
*/
pub fn sweep(stencil: &Stencil<'_>, jobs: Vec<BlockJob<'_>>) -> Vec<RowBlock> {
    jobs.into_par_iter()
        .map(|job| run_block(stencil, job))
        .collect()
}
