//! 轮廓与圆形区域的几何工具.
//!
//! 轮廓点统一使用平面直角坐标 `(x, y)`, 其中 `x` 对应图像的列 (宽方向),
//! `y` 对应图像的行 (高方向). 这和 [`crate::Idx2d`] 的 `(高, 宽)` 顺序正好相反,
//! 互转时务必小心.

use crate::data::Mask;
use crate::{Idx2d, Point2dF};
use ndarray::Array2;

/// 一个实例 (细胞核或细胞质候选) 的有序边界多边形.
///
/// 轮廓一经生成即只读.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    /// 该轮廓来自的实例标签 id (> 0).
    label: u32,

    /// 有序边界点 `(x, y)`.
    points: Vec<Point2dF>,
}

impl Outline {
    /// 由实例 id 和有序边界点构建轮廓.
    #[inline]
    pub fn new(label: u32, points: Vec<Point2dF>) -> Self {
        Self { label, points }
    }

    /// 实例标签 id.
    #[inline]
    pub fn label(&self) -> u32 {
        self.label
    }

    /// 有序边界点.
    #[inline]
    pub fn points(&self) -> &[Point2dF] {
        &self.points
    }

    /// 轮廓点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 轮廓是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 轮廓质心. 见 [`centroid`].
    #[inline]
    pub fn centroid(&self) -> Option<Point2dF> {
        centroid(&self.points)
    }

    /// 轮廓离散度. 见 [`spread`].
    #[inline]
    pub fn spread(&self) -> Option<f64> {
        spread(&self.points)
    }
}

/// 计算点集所有 `x` 和所有 `y` 坐标的算术平均值.
///
/// 空点集没有质心, 返回 `None`.
pub fn centroid(points: &[Point2dF]) -> Option<Point2dF> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    Some((sx / n, sy / n))
}

/// 点集离散度: `x` 坐标 (总体) 标准差和 `y` 坐标 (总体) 标准差中较大的一个.
///
/// 没有可用细胞质时, 该值被用作代理半径. 空点集返回 `None`.
pub fn spread(points: &[Point2dF]) -> Option<f64> {
    let (cx, cy) = centroid(points)?;
    let n = points.len() as f64;
    let (vx, vy) = points.iter().fold((0.0, 0.0), |(vx, vy), &(x, y)| {
        (vx + (x - cx).powi(2), vy + (y - cy).powi(2))
    });
    Some((vx / n).sqrt().max((vy / n).sqrt()))
}

/// 默认圆心: 图像正中 `(w / 2, h / 2)`, 按整数除法取整.
#[inline]
fn default_center((h, w): Idx2d) -> Point2dF {
    ((w / 2) as f64, (h / 2) as f64)
}

/// 默认半径: 圆心到四面图像边界的最短距离.
#[inline]
fn default_radius((h, w): Idx2d, (cx, cy): Point2dF) -> f64 {
    cx.min(cy).min(w as f64 - cx).min(h as f64 - cy)
}

/// 在 `(h, w)` 大小的网格上生成圆形掩膜.
///
/// 像素 `(row, col)` 被选中, 当且仅当 `(col, row)` 到 `center` 的欧氏距离不大于
/// `radius` (闭区间).
///
/// - `center` 缺省时使用图像正中;
/// - `radius` 缺省时使用圆心到图像边界的最短距离.
pub fn circular_mask(shape: Idx2d, center: Option<Point2dF>, radius: Option<f64>) -> Mask {
    let center = center.unwrap_or_else(|| default_center(shape));
    let radius = radius.unwrap_or_else(|| default_radius(shape, center));
    let (cx, cy) = center;
    let data = Array2::from_shape_fn(shape, |(row, col)| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        (dx * dx + dy * dy).sqrt() <= radius
    });
    Mask::from_array(data)
}

#[cfg(test)]
mod tests {
    use super::{centroid, circular_mask, spread, Outline};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_centroid_square() {
        let square = [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)];
        assert_eq!(centroid(&square), Some((1.0, 1.0)));
    }

    #[test]
    fn test_centroid_is_arithmetic_mean() {
        // 一组不规则点, 逐个验证均值.
        for n in 1..=20usize {
            let points: Vec<_> = (0..n)
                .map(|i| ((i * i) as f64 * 0.5, (3 * i + 7) as f64))
                .collect();
            let (cx, cy) = centroid(&points).unwrap();
            let mx = points.iter().map(|p| p.0).sum::<f64>() / n as f64;
            let my = points.iter().map(|p| p.1).sum::<f64>() / n as f64;
            assert!(f64_eq(cx, mx));
            assert!(f64_eq(cy, my));
        }
    }

    #[test]
    fn test_empty_outline() {
        assert_eq!(centroid(&[]), None);
        assert_eq!(spread(&[]), None);
        let o = Outline::new(3, vec![]);
        assert!(o.is_empty());
        assert_eq!(o.centroid(), None);
    }

    #[test]
    fn test_spread_takes_larger_axis() {
        // x: {0, 4} -> std 2; y: {1, 1} -> std 0.
        let pts = [(0.0, 1.0), (4.0, 1.0)];
        assert!(f64_eq(spread(&pts).unwrap(), 2.0));

        // x: {0, 0, 0, 0}; y: {-3, 3, -3, 3} -> std 3.
        let pts = [(0.0, -3.0), (0.0, 3.0), (0.0, -3.0), (0.0, 3.0)];
        assert!(f64_eq(spread(&pts).unwrap(), 3.0));
    }

    #[test]
    fn test_circular_mask_boundary() {
        // 圆心 (5, 5), 半径 3: (x=8, y=5) 恰好在圆上.
        let m = circular_mask((11, 11), Some((5.0, 5.0)), Some(3.0));
        assert!(m.get((5, 8)));
        assert!(m.get((8, 5)));
        assert!(m.get((5, 5)));

        // 半径 3 - ε 时该点被排除, 等价于距离 = 半径 + ε.
        let m = circular_mask((11, 11), Some((5.0, 5.0)), Some(3.0 - 1e-9));
        assert!(!m.get((5, 8)));
        assert!(m.get((5, 7)));

        // (x=7, y=7) 距离 sqrt(8) ~ 2.83.
        let m = circular_mask((11, 11), Some((5.0, 5.0)), Some(2.8));
        assert!(!m.get((7, 7)));
    }

    #[test]
    fn test_circular_mask_defaults() {
        // 高 6 宽 10: 圆心 (5, 3), 半径 min(5, 3, 5, 3) = 3.
        let m = circular_mask((6, 10), None, None);
        assert_eq!(m.shape(), (6, 10));
        assert!(m.get((3, 5)));
        assert!(m.get((0, 5)));
        assert!(m.get((3, 2)));
        assert!(!m.get((3, 1)));
        assert!(!m.get((0, 0)));
    }
}
