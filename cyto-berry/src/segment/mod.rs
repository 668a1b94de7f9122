//! 实例分割接入.
//!
//! 分割模型本身 (训练、推理) 不在本 crate 的范围内. 任何能把一幅强度图像转换为
//! 实例标签图的东西都可以实现 [`Segmenter`]; 本 crate 自带的实现
//! [`PrecomputedMasks`] 直接读取事先保存好的标签.

mod precomputed;

pub use precomputed::PrecomputedMasks;

use crate::error::SegmentError;
use crate::{InstanceLabels, IntensityImage};

/// 实例分割器. 输出与输入图像同尺寸的实例标签图, `0` 为背景.
pub trait Segmenter {
    /// 对 `image` 做实例分割.
    fn segment(&self, image: &IntensityImage) -> Result<InstanceLabels, SegmentError>;
}

impl<S: Segmenter + ?Sized> Segmenter for &S {
    #[inline]
    fn segment(&self, image: &IntensityImage) -> Result<InstanceLabels, SegmentError> {
        (**self).segment(image)
    }
}

impl<S: Segmenter + ?Sized> Segmenter for Box<S> {
    #[inline]
    fn segment(&self, image: &IntensityImage) -> Result<InstanceLabels, SegmentError> {
        (**self).segment(image)
    }
}
