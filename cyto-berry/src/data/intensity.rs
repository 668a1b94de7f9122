use std::path::Path;

use image::{DynamicImage, ImageResult};
use ndarray::{Array2, ArrayView2, Zip};
use ordered_float::OrderedFloat;

use super::Mask;
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 多通道图像转换为单通道强度的方式.
///
/// 单通道 (灰度) 图像不受该选项影响, 总是直接使用其唯一通道.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityChannel {
    /// 所有通道 (含 alpha) 之和.
    ///
    /// 此时 [`IntensityImage::floor`] 是全图所有通道中最小的单个通道值, 而不是最小的像素和.
    #[default]
    Sum,

    /// 感知亮度 (luma).
    Luma,

    /// 仅红色通道.
    Red,

    /// 仅绿色通道.
    Green,

    /// 仅蓝色通道.
    Blue,
}

/// 一幅解码后的二维强度图像.
///
/// 像素值是 `[0, 1]` 区间的浮点数 (8-bit 与 16-bit 图像统一缩放),
/// 多通道图像按 [`IntensityChannel`] 合成单通道.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntensityImage {
    data: Array2<f32>,

    /// 按通道求和合成时, 解码前所有通道的最小值.
    channel_floor: Option<f32>,
}

impl IntensityImage {
    /// 直接初始化.
    #[inline]
    pub fn from_array(data: Array2<f32>) -> Self {
        Self {
            data,
            channel_floor: None,
        }
    }

    /// 打开并解码 `path` 处的图像.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P, channel: IntensityChannel) -> ImageResult<Self> {
        let img = image::open(path)?;
        Ok(Self::from_dynamic(&img, channel))
    }

    /// 从已解码的图像转换.
    pub fn from_dynamic(img: &DynamicImage, channel: IntensityChannel) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);

        let mut channel_floor = None;
        let raw: Vec<f32> = if !img.color().has_color() {
            img.to_luma32f().into_raw()
        } else {
            match channel {
                IntensityChannel::Luma => img.to_luma32f().into_raw(),
                IntensityChannel::Sum => {
                    let (raw, floor) = channel_sum(img);
                    channel_floor = floor;
                    raw
                }
                IntensityChannel::Red => pick_channel(img, 0),
                IntensityChannel::Green => pick_channel(img, 1),
                IntensityChannel::Blue => pick_channel(img, 2),
            }
        };

        // 该操作不会生成 `Err`: `raw` 恰好有 `h * w` 个元素.
        let data = Array2::from_shape_vec((h, w), raw).unwrap();
        Self { data, channel_floor }
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<f32> {
        self.data.view()
    }

    /// 获取给定位置 (高, 宽) 的强度. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<f32> {
        self.data.get(pos).copied()
    }

    /// 全图最小强度 (忽略 NaN). 空图像返回 `None`.
    pub fn min(&self) -> Option<f32> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .copied()
            .map(OrderedFloat)
            .min()
            .map(|v| v.0)
    }

    /// 全图最大强度 (忽略 NaN). 空图像返回 `None`.
    pub fn max(&self) -> Option<f32> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .copied()
            .map(OrderedFloat)
            .max()
            .map(|v| v.0)
    }

    /// 采样时减去的本底. 按通道求和合成的多通道图像为最小的单个通道值,
    /// 其余情况与 [`IntensityImage::min`] 相同.
    pub fn floor(&self) -> Option<f32> {
        self.channel_floor.or_else(|| self.min())
    }

    /// 计算 `mask` 选中像素的平均强度.
    ///
    /// `mask` 为空时返回 `None`. 若 `mask` 与图像尺寸不符, 则程序 panic.
    pub fn mean_in(&self, mask: &Mask) -> Option<f64> {
        assert_eq!(self.shape(), mask.shape(), "掩膜与图像尺寸不符");
        let (sum, count) = self
            .data
            .iter()
            .zip(mask.array_view().iter())
            .filter(|(_, &m)| m)
            .fold((0.0f64, 0u64), |(sum, count), (&v, _)| (sum + v as f64, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// 复制一份图像, 其中 `mask` 未选中的像素被置零. 结果不保留通道本底.
    pub fn masked(&self, mask: &Mask) -> IntensityImage {
        assert_eq!(self.shape(), mask.shape(), "掩膜与图像尺寸不符");
        let mut data = self.data.clone();
        Zip::from(&mut data)
            .and(mask.array_view())
            .for_each(|v, &m| {
                if !m {
                    *v = 0.0;
                }
            });
        Self::from_array(data)
    }
}

/// 逐像素对所有通道求和, 同时返回所有通道值中的最小值.
fn channel_sum(img: &DynamicImage) -> (Vec<f32>, Option<f32>) {
    let (values, n): (Vec<f32>, usize) = if img.color().has_alpha() {
        (img.to_rgba32f().into_raw(), 4)
    } else {
        (img.to_rgb32f().into_raw(), 3)
    };
    let floor = values
        .iter()
        .filter(|v| !v.is_nan())
        .copied()
        .map(OrderedFloat)
        .min()
        .map(|v| v.0);
    (values.chunks_exact(n).map(|p| p.iter().sum()).collect(), floor)
}

/// 取 RGB 图像的第 `index` 个通道.
fn pick_channel(img: &DynamicImage, index: usize) -> Vec<f32> {
    img.to_rgb32f().pixels().map(|p| p.0[index]).collect()
}
