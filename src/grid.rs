use std::io::{self, Write};
use std::mem;

use crate::error::{RelaxError, Result};

pub const N: usize = 1000; // 内部セル数 (一辺)
pub const TOLERANCE: f64 = 1e-4; // 収束判定の許容誤差
pub const MAX_ITERATIONS: usize = 100; // 反復回数の上限

pub const SIDE_VALUE: f64 = 1.0; // 左右の列の境界値
pub const CAP_VALUE: f64 = 0.0; // 上下の行の境界値

/// 内部セル数 n の格子が持つ全セル数 (n+2)²。
/// n が 0 のとき、またはバイト数が `isize::MAX` を超えるときは `InvalidSize`。
pub fn cell_count(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(RelaxError::InvalidSize("grid size must be positive".to_string()));
    }
    n.checked_add(2)
        .and_then(|side| side.checked_mul(side))
        .filter(|cells| {
            cells
                .checked_mul(mem::size_of::<f64>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| RelaxError::InvalidSize(format!("grid size {n} is too large")))
}

/// (n+2)×(n+2) の正方格子。行優先で `data[i * side + j]` に格納する。
/// 添字 0 と n+1 が境界、1..=n が内部セル。
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    n: usize,
    data: Vec<f64>,
}

impl Grid {
    /// 全セル 0.0 の格子を確保する
    pub fn new(n: usize) -> Result<Self> {
        let cells = cell_count(n)?;
        Ok(Grid {
            n,
            data: vec![0.0; cells],
        })
    }

    /// 境界条件を設定する。
    /// 列 0, n+1 を 1.0 にした後で行 0, n+1 を 0.0 にするので、四隅は 0.0 になる。
    pub fn set_boundary(&mut self) {
        let side = self.side();
        for i in 0..side {
            self.data[i * side] = SIDE_VALUE;
            self.data[i * side + side - 1] = SIDE_VALUE;
        }
        for j in 0..side {
            self.data[j] = CAP_VALUE;
            self.data[(side - 1) * side + j] = CAP_VALUE;
        }
    }

    pub fn at(&self, i: usize, j: usize) -> Result<f64> {
        let idx = self.index(i, j)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        let idx = self.index(i, j)?;
        self.data[idx] = value;
        Ok(())
    }

    fn index(&self, i: usize, j: usize) -> Result<usize> {
        let side = self.side();
        if i >= side || j >= side {
            return Err(RelaxError::OutOfRange { i, j, side });
        }
        Ok(i * side + j)
    }

    /// 内部セル数 (一辺)
    pub fn n(&self) -> usize {
        self.n
    }

    /// 境界込みの一辺の長さ (n+2)
    pub fn side(&self) -> usize {
        self.n + 2
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// i 行目 (境界列を含む) のスライス
    pub fn row(&self, i: usize) -> Result<&[f64]> {
        let side = self.side();
        if i >= side {
            return Err(RelaxError::OutOfRange { i, j: 0, side });
        }
        Ok(&self.data[i * side..(i + 1) * side])
    }

    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.n + 1 || j == self.n + 1
    }

    /// 内部セルを行優先で走査する
    pub fn interior_values(&self) -> impl Iterator<Item = f64> + '_ {
        let side = self.side();
        (1..=self.n).flat_map(move |i| self.data[i * side + 1..i * side + side - 1].iter().copied())
    }

    /// 格子の値をテキストで書き出す (1行に1行分)
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in self.data.chunks(self.side()) {
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(out, " ")?;
                }
                write!(out, "{:6.4}", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
