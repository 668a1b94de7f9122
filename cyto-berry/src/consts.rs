//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 实例标签中, 背景的像素值.
    pub const LABEL_BACKGROUND: u32 = 0;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u32) -> bool {
        p == LABEL_BACKGROUND
    }

    /// 像素是否属于某个实例?
    #[inline]
    pub const fn is_instance(p: u32) -> bool {
        !is_background(p)
    }
}

/// 三通道颜色, 用于组合图的叠加层.
pub mod rgb {
    /// 细胞核轮廓颜色.
    pub const NUCLEUS_OUTLINE: [u8; 3] = [255, 0, 0];

    /// 退化圆形区域的轮廓颜色.
    pub const FALLBACK_CIRCLE: [u8; 3] = [0, 0, 255];
}

/// 细胞核质心与细胞质质心之间的默认关联距离上限 (像素, 开区间).
pub const ASSOCIATION_DISTANCE: f64 = 50.0;

/// 退化圆形区域半径相对细胞核离散度 (标准差) 的默认倍率.
pub const FALLBACK_RADIUS_SCALE: f64 = 2.0;

/// 组合图的文件名.
pub const COMBINED_IMAGE_NAME: &str = "masks.png";

/// 时间序列表格的文件名.
pub const SERIES_CSV_NAME: &str = "series.csv";

/// 采样区域堆叠数组的文件名.
pub const REGIONS_NPY_NAME: &str = "regions.npy";

/// 第 `index` 个细胞的折线图文件名.
#[inline]
pub fn plot_name(index: usize) -> String {
    format!("plot{index}.png")
}
