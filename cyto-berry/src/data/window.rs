use super::IntensityImage;

/// 强度显示窗口, 包含下限和上限.
///
/// 窗口用于把浮点强度映射为 8-bit 灰度值, 只影响可视化, 不影响定量.
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
}

impl IntensityWindow {
    /// 构建强度窗.
    ///
    /// `lower` 和 `upper` 必须是有限值且 `lower < upper`, 否则返回 `None`.
    pub fn new(lower: f32, upper: f32) -> Option<IntensityWindow> {
        if lower.is_finite() && upper.is_finite() && lower < upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// 以图像的最小/最大强度构建窗口.
    ///
    /// 对于空图像或常值图像, 返回 `[v, v + 1]` 的退化窗口, 保证总能得到一个窗口.
    pub fn from_image(img: &IntensityImage) -> IntensityWindow {
        let lower = img.min().filter(|v| v.is_finite()).unwrap_or(0.0);
        let upper = img.max().filter(|v| v.is_finite()).unwrap_or(lower);
        Self::new(lower, upper).unwrap_or(Self {
            lower,
            upper: lower + 1.0,
        })
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.lower
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.upper
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// 求在当前窗口设置下, 强度 `v` 对应的灰度图像素整数值 (0 <= value <= 255).
    ///
    /// 如果 `v` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, v: f32) -> Option<u8> {
        if !v.is_finite() {
            return None;
        }
        if v <= self.lower {
            Some(u8::MIN)
        } else if v >= self.upper {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some((((v - self.lower) / self.width()) * 255.0) as u8)
        }
    }
}
