use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use ndarray::Array2;

use super::Mask;
use crate::consts::gray::*;
use crate::geometry::Outline;
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 实例标签图. 每个像素保存其所属实例的 id, `0` 代表背景.
///
/// 由外部分割模型产出, 对本 crate 而言是只读真值.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstanceLabels {
    data: Array2<u32>,
}

/// 闭区间包围盒 `(min_h, min_w, max_h, max_w)`.
type BoundingBox = (usize, usize, usize, usize);

impl InstanceLabels {
    /// 直接初始化.
    #[inline]
    pub fn from_array(data: Array2<u32>) -> Self {
        Self { data }
    }

    /// 标签图的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获取给定位置 (高, 宽) 的标签. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<u32> {
        self.data.get(pos).copied()
    }

    /// 升序排列的所有实例 id (不含背景).
    pub fn instance_ids(&self) -> Vec<u32> {
        self.bounding_boxes().into_keys().collect()
    }

    /// 实例个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounding_boxes().len()
    }

    /// 该图是否为全背景图?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.iter().copied().all(is_background)
    }

    /// 值等于 `id` 的像素组成的掩膜.
    pub fn instance_mask(&self, id: u32) -> Mask {
        Mask::from_array(self.data.mapv(|p| p == id))
    }

    /// 所有实例像素 (非背景像素) 组成的掩膜.
    pub fn foreground(&self) -> Mask {
        Mask::from_array(self.data.mapv(is_instance))
    }

    /// 以实例 id 升序, 计算每个实例的包围盒.
    fn bounding_boxes(&self) -> BTreeMap<u32, BoundingBox> {
        let mut ans: BTreeMap<u32, BoundingBox> = BTreeMap::new();
        for ((h, w), &id) in self.data.indexed_iter() {
            if is_background(id) {
                continue;
            }
            ans.entry(id)
                .and_modify(|b| {
                    b.0 = b.0.min(h);
                    b.1 = b.1.min(w);
                    b.2 = b.2.max(h);
                    b.3 = b.3.max(w);
                })
                .or_insert((h, w, h, w));
        }
        ans
    }

    /// 将标签图转换为轮廓序列: 每个实例一个, 按实例 id 升序排列.
    ///
    /// 每个实例在其包围盒 (外扩 1 像素) 内单独求取外轮廓, 有多个外轮廓时
    /// (实例不连通) 取点数最多的那个. 找不到轮廓的实例被跳过.
    pub fn outlines(&self) -> Vec<Outline> {
        self.bounding_boxes()
            .into_iter()
            .filter_map(|(id, bbox)| {
                let outline = self.outline_of(id, bbox);
                if outline.is_none() {
                    log::debug!("实例 {id} 没有外轮廓, 已跳过");
                }
                outline
            })
            .collect()
    }

    fn outline_of(&self, id: u32, (min_h, min_w, max_h, max_w): BoundingBox) -> Option<Outline> {
        // 外扩 1 像素, 保证轮廓不贴边.
        let crop_h = max_h - min_h + 3;
        let crop_w = max_w - min_w + 3;
        let mut crop = GrayImage::new(crop_w as u32, crop_h as u32);
        for h in min_h..=max_h {
            for w in min_w..=max_w {
                if self.data[(h, w)] == id {
                    let (x, y) = ((w - min_w + 1) as u32, (h - min_h + 1) as u32);
                    crop.put_pixel(x, y, Luma([WHITE]));
                }
            }
        }

        let contour: Contour<i32> = find_contours::<i32>(&crop)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .max_by_key(|c| c.points.len())?;

        let points = contour
            .points
            .iter()
            .map(|p| {
                (
                    (p.x - 1) as f64 + min_w as f64,
                    (p.y - 1) as f64 + min_h as f64,
                )
            })
            .collect();
        Some(Outline::new(id, points))
    }
}

#[cfg(test)]
mod tests {
    use super::InstanceLabels;
    use ndarray::Array2;

    /// 两个矩形实例: id 2 位于 `[1, 3] x [1, 4]`, id 5 位于 `[6, 8] x [6, 8]`.
    fn two_rectangles() -> InstanceLabels {
        let mut data = Array2::<u32>::zeros((10, 10));
        for h in 1..=3 {
            for w in 1..=4 {
                data[(h, w)] = 2;
            }
        }
        for h in 6..=8 {
            for w in 6..=8 {
                data[(h, w)] = 5;
            }
        }
        InstanceLabels::from_array(data)
    }

    #[test]
    fn test_instance_ids_and_masks() {
        let labels = two_rectangles();
        assert_eq!(labels.instance_ids(), vec![2, 5]);
        assert_eq!(labels.len(), 2);
        assert!(!labels.is_empty());
        assert_eq!(labels.instance_mask(2).count(), 12);
        assert_eq!(labels.instance_mask(5).count(), 9);
        assert_eq!(labels.instance_mask(7).count(), 0);
        assert_eq!(labels.foreground().count(), 21);
    }

    #[test]
    fn test_outlines_follow_id_order() {
        let labels = two_rectangles();
        let outlines = labels.outlines();
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[0].label(), 2);
        assert_eq!(outlines[1].label(), 5);

        // 轮廓点都落在实例上, 且位于原图坐标系 `(x, y)` 中.
        for o in outlines.iter() {
            assert!(!o.is_empty());
            for &(x, y) in o.points() {
                let pos = (y as usize, x as usize);
                assert_eq!(labels.get(pos), Some(o.label()));
            }
        }

        // 对称正方形的轮廓质心应接近其中心.
        let (cx, cy) = outlines[1].centroid().unwrap();
        assert!((cx - 7.0).abs() < 0.25);
        assert!((cy - 7.0).abs() < 0.25);
    }

    #[test]
    fn test_background_only() {
        let labels = InstanceLabels::from_array(Array2::zeros((4, 4)));
        assert!(labels.is_empty());
        assert!(labels.outlines().is_empty());
        assert!(labels.instance_ids().is_empty());
    }
}
