//! 逐细胞采样区域的构建.

use super::Association;
use crate::error::SegmentError;
use crate::geometry::{circular_mask, Outline};
use crate::{InstanceLabels, Mask, Point2dF};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 采样区域的来源.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegionSource {
    /// 关联到的细胞质实例 id.
    Cytoplasm(u32),

    /// 退化的圆形区域, 以细胞核质心 `(x, y)` 为圆心.
    Fallback {
        /// 圆心 `(x, y)`.
        center: Point2dF,
        /// 半径.
        radius: f64,
    },
}

impl RegionSource {
    /// 是否是退化的圆形区域.
    #[inline]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// 被追踪的细胞. 创建后不再修改; 其时间序列保存在
/// [`crate::series::TimeSeriesMatrix`] 中下标相同的行.
#[derive(Clone, Debug)]
pub struct Cell {
    /// 在整个运行中稳定不变的下标 (细胞核检测顺序).
    index: usize,

    /// 细胞核轮廓.
    nucleus: Outline,

    /// 细胞核像素.
    nucleus_mask: Mask,

    /// 最终采样区域. 不含任何细胞核像素.
    region: Mask,

    /// 采样区域来源.
    source: RegionSource,
}

impl Cell {
    /// 细胞下标.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 细胞核轮廓.
    #[inline]
    pub fn nucleus(&self) -> &Outline {
        &self.nucleus
    }

    /// 细胞核像素掩膜.
    #[inline]
    pub fn nucleus_mask(&self) -> &Mask {
        &self.nucleus_mask
    }

    /// 采样区域掩膜.
    #[inline]
    pub fn region(&self) -> &Mask {
        &self.region
    }

    /// 采样区域来源.
    #[inline]
    pub fn source(&self) -> RegionSource {
        self.source
    }
}

/// 采样区域构建器.
///
/// 无论区域来自细胞质还是退化圆, 最后都要去掉 **所有** 细胞核的像素.
pub struct RegionBuilder<'a> {
    nuclei: &'a InstanceLabels,
    cytoplasm: &'a InstanceLabels,

    /// 所有细胞核像素的并集.
    all_nuclei: Mask,

    /// 退化圆半径 = `radius_scale` * 细胞核离散度.
    radius_scale: f64,
}

impl<'a> RegionBuilder<'a> {
    /// 初始化. 两张标签图尺寸不同时返回 `Err`.
    pub fn new(
        nuclei: &'a InstanceLabels,
        cytoplasm: &'a InstanceLabels,
        radius_scale: f64,
    ) -> Result<Self, SegmentError> {
        if nuclei.shape() != cytoplasm.shape() {
            return Err(SegmentError::ShapeMismatch {
                expected: nuclei.shape(),
                found: cytoplasm.shape(),
            });
        }
        Ok(Self {
            nuclei,
            cytoplasm,
            all_nuclei: nuclei.foreground(),
            radius_scale,
        })
    }

    /// 所有细胞核像素的并集.
    #[inline]
    pub fn all_nuclei(&self) -> &Mask {
        &self.all_nuclei
    }

    /// 为细胞核 `nucleus` 计算采样区域.
    ///
    /// 未关联且细胞核轮廓为空 (无法求质心) 时返回 `None`.
    pub fn region(&self, nucleus: &Outline, association: Association) -> Option<(Mask, RegionSource)> {
        let (mut mask, source) = match association {
            Association::Matched(id) => (self.cytoplasm.instance_mask(id), RegionSource::Cytoplasm(id)),
            Association::Unmatched => {
                let center = nucleus.centroid()?;
                let radius = self.radius_scale * nucleus.spread()?;
                let mask = circular_mask(self.nuclei.shape(), Some(center), Some(radius));
                (mask, RegionSource::Fallback { center, radius })
            }
        };
        mask.subtract(&self.all_nuclei);
        Some((mask, source))
    }

    /// 构建下标为 `index` 的细胞. 见 [`Self::region`].
    pub fn build(&self, index: usize, nucleus: Outline, association: Association) -> Option<Cell> {
        let (region, source) = self.region(&nucleus, association)?;
        let nucleus_mask = self.nuclei.instance_mask(nucleus.label());
        Some(Cell {
            index,
            nucleus,
            nucleus_mask,
            region,
            source,
        })
    }
}
