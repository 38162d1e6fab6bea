use std::sync::mpsc;
use std::thread;

use crate::equation::Stencil;
use crate::partition::{run_block, BlockJob, RowBlock};

/*
  Channel版 (fork-join)

  1. next を split_at_mut で行ブロックに分割済み (コピーなし、ロックなし)
  2. ブロックごとに scoped thread を1本起動
  3. 各スレッドは担当行を書き終えたら自分のブロックをチャネルに送る
  4. 全送信側が drop されるまで受信 = 全ワーカー完了 (バリア)

  共有カウンタは使わない。完了通知はワーカーごとのメッセージを集約するだけ。
*/

pub fn sweep(stencil: &Stencil<'_>, jobs: Vec<BlockJob<'_>>) -> Vec<RowBlock> {
    let expected = jobs.len();
    let (tx, rx) = mpsc::channel::<RowBlock>();

    let mut done: Vec<RowBlock> = thread::scope(|scope| {
        for job in jobs {
            let tx = tx.clone();
            scope.spawn(move || {
                let block = run_block(stencil, job);
                // 受信側はスコープ内で生きているので失敗しない
                let _ = tx.send(block);
            });
        }
        // 手元の送信側を閉じないと受信ループが終わらない
        drop(tx);

        rx.iter().collect()
    });

    debug_assert_eq!(done.len(), expected);
    done.sort_by_key(|block| block.index);
    done
}
