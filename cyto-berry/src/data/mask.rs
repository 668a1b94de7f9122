use crate::Idx2d;
use ndarray::{Array2, ArrayView2, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 与采样图像同尺寸的布尔掩膜. `true` 代表像素被选中.
///
/// 所有二元运算都要求两个掩膜尺寸相同, 否则程序 panic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mask {
    data: Array2<bool>,
}

impl Mask {
    /// 直接初始化.
    #[inline]
    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// 全不选中的掩膜.
    #[inline]
    pub fn empty(shape: Idx2d) -> Self {
        Self {
            data: Array2::from_elem(shape, false),
        }
    }

    /// 掩膜的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获取 `pos` 处是否被选中. 越界时 panic.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> bool {
        self.data[pos]
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView2<bool> {
        self.data.view()
    }

    /// 被选中的像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }

    /// 是否没有任何像素被选中.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&b| b)
    }

    /// `self = self AND NOT other`.
    pub fn subtract(&mut self, other: &Mask) {
        assert_eq!(self.shape(), other.shape(), "掩膜尺寸不符");
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a = *a && !b);
    }

    /// `self = self OR other`.
    pub fn union_with(&mut self, other: &Mask) {
        assert_eq!(self.shape(), other.shape(), "掩膜尺寸不符");
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a = *a || b);
    }

    /// 求 `masks` 的并集. `masks` 为空时返回 `shape` 大小的空掩膜.
    pub fn union<'a, I: IntoIterator<Item = &'a Mask>>(shape: Idx2d, masks: I) -> Mask {
        let mut ans = Mask::empty(shape);
        for m in masks {
            ans.union_with(m);
        }
        ans
    }

    /// 两个掩膜是否没有共同选中的像素.
    pub fn is_disjoint(&self, other: &Mask) -> bool {
        assert_eq!(self.shape(), other.shape(), "掩膜尺寸不符");
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(&a, &b)| !(a && b))
    }

    /// 以行优先规则迭代所有被选中像素的索引.
    #[inline]
    pub fn positions(&self) -> impl Iterator<Item = Idx2d> + '_ {
        self.data
            .indexed_iter()
            .filter_map(|(pos, &b)| b.then_some(pos))
    }
}
