//! 方程式ごとのステンシル更新
//!
//! カーネルは `current` (Wave のみ `prev` も) を読み、`next` の1行を書く。
//! 書き込み先以外は読み取り専用なので、行ごとに独立して並列計算できる。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelaxError;
use crate::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationKind {
    Laplace,
    Heat,
    Wave,
}

impl EquationKind {
    /// ドライバが解く順番
    pub const ALL: [EquationKind; 3] = [
        EquationKind::Laplace,
        EquationKind::Heat,
        EquationKind::Wave,
    ];

    /// 2つ前の時間レベル (prev) が必要か
    pub fn needs_previous_level(self) -> bool {
        matches!(self, EquationKind::Wave)
    }
}

impl fmt::Display for EquationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EquationKind::Laplace => "laplace",
            EquationKind::Heat => "heat",
            EquationKind::Wave => "wave",
        };
        f.write_str(name)
    }
}

impl FromStr for EquationKind {
    type Err = RelaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "laplace" => Ok(EquationKind::Laplace),
            "heat" => Ok(EquationKind::Heat),
            "wave" => Ok(EquationKind::Wave),
            other => Err(RelaxError::Config(format!("unknown equation: {other}"))),
        }
    }
}

/// 熱方程式カーネルの補正項の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatRule {
    /// 5点平均のみ
    #[default]
    Average,
    /// 平均に 0.25*(c - 4c + c) = -0.5c を加える旧来の更新式。
    /// 市松模様のモードを増幅するので、n によっては収束しない。
    HalfCenterDamping,
}

impl FromStr for HeatRule {
    type Err = RelaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(HeatRule::Average),
            "half-center-damping" => Ok(HeatRule::HalfCenterDamping),
            other => Err(RelaxError::Config(format!("unknown heat rule: {other}"))),
        }
    }
}

/// 1反復分のステンシル。読み取り専用のバッファだけを持つので
/// 複数スレッドから共有できる (`&Stencil` は `Send`)。
pub struct Stencil<'a> {
    equation: EquationKind,
    heat_rule: HeatRule,
    current: &'a Grid,
    prev: &'a Grid,
}

impl<'a> Stencil<'a> {
    /// `prev` は Wave 以外では参照されない
    pub fn new(
        equation: EquationKind,
        heat_rule: HeatRule,
        current: &'a Grid,
        prev: &'a Grid,
    ) -> Self {
        debug_assert_eq!(current.side(), prev.side());
        Stencil {
            equation,
            heat_rule,
            current,
            prev,
        }
    }

    pub fn side(&self) -> usize {
        self.current.side()
    }

    /// i 行目の内部セルを `dst_row` (境界列込みの1行) に書き込み、
    /// その行の |next - current| の総和を返す。境界列 (0, n+1) には触れない。
    pub fn update_row(&self, i: usize, dst_row: &mut [f64]) -> f64 {
        let m = self.side();
        let src = self.current.data();
        debug_assert_eq!(dst_row.len(), m);
        debug_assert!(i >= 1 && i < m - 1);

        let mut residual = 0.0;
        for j in 1..m - 1 {
            let idx = i * m + j;
            let average = 0.25 * (src[idx - m] + src[idx + m] + src[idx - 1] + src[idx + 1]);
            let value = match self.equation {
                EquationKind::Laplace => average,
                EquationKind::Heat => match self.heat_rule {
                    HeatRule::Average => average,
                    HeatRule::HalfCenterDamping => {
                        average + 0.25 * (src[idx] - 4.0 * src[idx] + src[idx])
                    }
                },
                EquationKind::Wave => {
                    let prev = self.prev.data();
                    let diagonal =
                        src[idx - m - 1] + src[idx + m - 1] + src[idx - m + 1] + src[idx + m + 1];
                    2.0 * src[idx] - prev[idx]
                        + 0.25
                            * (src[idx - m]
                                + src[idx + m]
                                + src[idx - 1]
                                + src[idx]
                                + 0.125 * diagonal
                                - src[idx])
                }
            };
            dst_row[j] = value;
            residual += (value - src[idx]).abs();
        }
        residual
    }
}
