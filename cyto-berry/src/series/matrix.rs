use std::io::Write;

use crate::error::{RunError, RunResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 时间序列上的一个点 `(图像位置, 值)`.
pub type SeriesPoint = (usize, f64);

/// 逐细胞的时间序列矩阵.
///
/// 行对应细胞 (下标与 [`crate::cell::Cell::index`] 一致), 列对应按处理顺序
/// 排列的图像. 任何时刻所有行的长度都相同, 矩阵只能按列追加.
///
/// 条目为 `None` 代表该细胞在该图像上的采样异常.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSeriesMatrix {
    rows: Vec<Vec<Option<f64>>>,

    /// 每一列对应的图像名.
    columns: Vec<String>,
}

impl TimeSeriesMatrix {
    /// 为 `cells` 个细胞创建零列的矩阵.
    pub fn new(cells: usize) -> Self {
        Self {
            rows: vec![Vec::new(); cells],
            columns: Vec::new(),
        }
    }

    /// 细胞 (行) 数.
    #[inline]
    pub fn cells(&self) -> usize {
        self.rows.len()
    }

    /// 已追加的图像 (列) 数, 也就是每条时间序列的长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// 是否还没有任何一列.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 各列对应的图像名.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// 追加一列. `values` 的长度必须等于细胞数, 否则矩阵保持不变并返回 `Err`.
    pub fn push_column<S: Into<String>>(&mut self, name: S, values: Vec<Option<f64>>) -> RunResult<()> {
        if values.len() != self.rows.len() {
            return Err(RunError::InconsistentSeries {
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.push(v);
        }
        self.columns.push(name.into());
        Ok(())
    }

    /// 第 `cell` 个细胞的时间序列. 越界时返回 `None`.
    #[inline]
    pub fn row(&self, cell: usize) -> Option<&[Option<f64>]> {
        self.rows.get(cell).map(Vec::as_slice)
    }

    /// 按细胞下标迭代所有时间序列.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// 以 `split` (即 "pre" 图像个数) 为界, 将第 `cell` 个细胞的时间序列切分为绘图用的三段.
    ///
    /// 横坐标是图像位置. 值为 `None` 的点被略去. `split` 超过序列长度时视为全部是 "pre".
    /// 越界的 `cell` 返回 `None`.
    pub fn segments(&self, cell: usize, split: usize) -> Option<SeriesSegments> {
        let row = self.row(cell)?;
        let split = split.min(row.len());
        let points = |range: std::ops::Range<usize>| -> Vec<SeriesPoint> {
            range.filter_map(|i| row[i].map(|v| (i, v))).collect()
        };

        let bridge = if split > 0 && split < row.len() {
            match (row[split - 1], row[split]) {
                (Some(a), Some(b)) => Some([(split - 1, a), (split, b)]),
                _ => None,
            }
        } else {
            None
        };

        Some(SeriesSegments {
            pre: points(0..split),
            bridge,
            post: points(split..row.len()),
        })
    }

    /// 以 CSV 格式写出: 表头为 `cell` 与各图像名, 每个细胞一行, 异常条目留空.
    pub fn write_csv<W: Write>(&self, out: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(std::iter::once("cell").chain(self.columns.iter().map(String::as_str)))?;

        for (i, row) in self.rows.iter().enumerate() {
            let values = row.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default());
            wtr.write_record(std::iter::once(i.to_string()).chain(values))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// 单个细胞时间序列的三段绘图数据.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesSegments {
    /// "pre" 段.
    pub pre: Vec<SeriesPoint>,

    /// 最后一个 "pre" 点到第一个 "post" 点的连接线. 任一端缺失时为 `None`.
    pub bridge: Option<[SeriesPoint; 2]>,

    /// "post" 段.
    pub post: Vec<SeriesPoint>,
}

impl SeriesSegments {
    /// 所有段的值域 `(min, max)`. 没有任何点时返回 `None`.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.pre
            .iter()
            .chain(self.post.iter())
            .map(|&(_, v)| v)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
