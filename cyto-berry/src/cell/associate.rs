//! 细胞核与细胞质实例的关联.

use crate::geometry::Outline;
use crate::Point2dF;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个细胞核的关联结果.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Association {
    /// 关联到了给定 id 的细胞质实例.
    Matched(u32),

    /// 附近没有可用的细胞质实例, 应使用退化的圆形区域.
    Unmatched,
}

impl Association {
    /// 是否关联成功.
    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// 细胞质候选集合, 按检测顺序预先计算好质心.
///
/// 关联采用 **首个匹配** 策略: 按检测顺序扫描, 第一个质心距离严格小于
/// `threshold` 的候选即被选中, 即使后面还有更近的候选.
#[derive(Clone, Debug)]
pub struct MaskAssociator {
    threshold: f64,

    /// `(实例 id, 质心)`, 保持检测顺序.
    candidates: Vec<(u32, Point2dF)>,
}

impl MaskAssociator {
    /// 以细胞质轮廓 (检测顺序) 和距离上限构建关联器. 空轮廓不参与关联.
    pub fn new(cytoplasm: &[Outline], threshold: f64) -> Self {
        let candidates = cytoplasm
            .iter()
            .filter_map(|o| Some((o.label(), o.centroid()?)))
            .collect();
        Self {
            threshold,
            candidates,
        }
    }

    /// 距离上限 (开区间).
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 可参与关联的细胞质候选个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// 是否没有任何候选.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// 为质心位于 `center` 的细胞核寻找细胞质.
    pub fn associate_point(&self, (x, y): Point2dF) -> Association {
        self.candidates
            .iter()
            .find(|(_, (cx, cy))| (cx - x).hypot(cy - y) < self.threshold)
            .map_or(Association::Unmatched, |&(id, _)| Association::Matched(id))
    }

    /// 为细胞核轮廓 `nucleus` 寻找细胞质. 空轮廓总是 [`Association::Unmatched`].
    #[inline]
    pub fn associate(&self, nucleus: &Outline) -> Association {
        nucleus
            .centroid()
            .map_or(Association::Unmatched, |c| self.associate_point(c))
    }
}

#[cfg(test)]
mod tests {
    use super::{Association, MaskAssociator};
    use crate::geometry::Outline;

    /// 以 `(cx, cy)` 为中心, 边长 2 的正方形轮廓.
    fn square(label: u32, cx: f64, cy: f64) -> Outline {
        Outline::new(
            label,
            vec![
                (cx - 1.0, cy - 1.0),
                (cx - 1.0, cy + 1.0),
                (cx + 1.0, cy + 1.0),
                (cx + 1.0, cy - 1.0),
            ],
        )
    }

    #[test]
    fn test_first_match_not_nearest() {
        // 候选 7 距离 40, 候选 3 距离 1; 两者都在阈值内, 但 7 先出现.
        let cyto = [square(7, 140.0, 100.0), square(3, 101.0, 100.0)];
        let assoc = MaskAssociator::new(&cyto, 50.0);
        let nucleus = square(1, 100.0, 100.0);
        assert_eq!(assoc.associate(&nucleus), Association::Matched(7));

        // 顺序交换后选中 3.
        let cyto = [square(3, 101.0, 100.0), square(7, 140.0, 100.0)];
        let assoc = MaskAssociator::new(&cyto, 50.0);
        assert_eq!(assoc.associate(&nucleus), Association::Matched(3));
    }

    #[test]
    fn test_unmatched() {
        let cyto = [square(1, 0.0, 0.0), square(2, 300.0, 300.0)];
        let assoc = MaskAssociator::new(&cyto, 50.0);
        assert_eq!(assoc.associate_point((150.0, 150.0)), Association::Unmatched);
        assert!(!assoc.associate_point((150.0, 150.0)).is_matched());

        // 阈值是开区间: 恰好 50 不算.
        assert_eq!(assoc.associate_point((50.0, 0.0)), Association::Unmatched);
        assert_eq!(assoc.associate_point((49.9, 0.0)), Association::Matched(1));
    }

    #[test]
    fn test_empty_outlines_ignored() {
        let cyto = [Outline::new(4, vec![]), square(5, 10.0, 10.0)];
        let assoc = MaskAssociator::new(&cyto, 50.0);
        assert_eq!(assoc.len(), 1);
        assert_eq!(assoc.associate_point((10.0, 10.0)), Association::Matched(5));

        let empty_nucleus = Outline::new(9, vec![]);
        assert_eq!(assoc.associate(&empty_nucleus), Association::Unmatched);

        let none = MaskAssociator::new(&[], 50.0);
        assert!(none.is_empty());
        assert_eq!(none.associate_point((0.0, 0.0)), Association::Unmatched);
    }
}
