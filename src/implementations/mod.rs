//! 1反復分の更新 (fork) と完了待ち (join) の実装。
//!
//! どの実装も同じ `BlockJob` を受け取り、同じカーネルで各行を計算するので
//! 結果の格子はビット単位で一致する。違うのはワーカーの起動と同期の方法だけ。

pub mod channel;
pub mod rayon;
pub mod single;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::equation::Stencil;
use crate::error::RelaxError;
use crate::partition::{BlockJob, RowBlock};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// 呼び出しスレッドでブロックを順に処理
    Single,
    /// ブロックごとに scoped thread を起動し、mpsc で完了を集約
    Channel,
    /// Rayon のスレッドプールに委譲
    #[default]
    Rayon,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Single, Backend::Channel, Backend::Rayon];

    /// 全ブロックを更新し、完了したブロックを index 順で返す。
    /// 戻った時点で全ワーカーの書き込みが終わっている (バリア)。
    pub fn sweep(self, stencil: &Stencil<'_>, jobs: Vec<BlockJob<'_>>) -> Vec<RowBlock> {
        match self {
            Backend::Single => single::sweep(stencil, jobs),
            Backend::Channel => channel::sweep(stencil, jobs),
            Backend::Rayon => rayon::sweep(stencil, jobs),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Single => "single",
            Backend::Channel => "channel",
            Backend::Rayon => "rayon",
        };
        f.write_str(name)
    }
}

impl FromStr for Backend {
    type Err = RelaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Backend::Single),
            "channel" => Ok(Backend::Channel),
            "rayon" => Ok(Backend::Rayon),
            other => Err(RelaxError::Config(format!("unknown backend: {other}"))),
        }
    }
}
