//! エラー型
//!
//! 入力検証の失敗 (`InvalidSize`) と座標の範囲外アクセス (`OutOfRange`) が中心。
//! 設定ファイル関連はドライバからのみ発生する。

use thiserror::Error;

/// クレート共通の Result 型
pub type Result<T> = std::result::Result<T, RelaxError>;

#[derive(Error, Debug)]
pub enum RelaxError {
    /// 格子サイズ・許容誤差・反復上限などが不正 (確保前に弾く)
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// 座標が [0, n+1] の外
    #[error("cell ({i}, {j}) is out of range for a grid of side {side}")]
    OutOfRange { i: usize, j: usize, side: usize },

    /// 設定ファイルの読み込み・解釈に失敗
    #[error("configuration error: {0}")]
    Config(String),

    /// バックエンド間で最終格子が一致しない
    #[error("backend mismatch: {0}")]
    Mismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for RelaxError {
    fn from(e: toml::de::Error) -> Self {
        RelaxError::Config(e.to_string())
    }
}
