#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 基于细胞核/细胞质实例分割掩膜, 对显微荧光图像序列做逐细胞的强度时间序列定量.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 分割模型本身不在本 crate 的范围内. 所有分割结果都通过 [`segment::Segmenter`]
//!   接入, 并被视为真值.
//! 2. 整个运行过程是单线程、顺序执行的. 第一张 "pre" 图像决定了所有细胞的基线,
//!   因此图像顺序有语义.
//!
//! # 开发计划
//!
//! ### 几何工具 ✅
//!
//! 轮廓质心、轮廓离散度 (标准差) 以及圆形掩膜.
//!
//! 实现位于 `cyto-berry/src/geometry.rs`.
//!
//! ### 细胞核-细胞质关联 ✅
//!
//! 对每个细胞核, 按检测顺序寻找 **第一个** 质心距离足够近的细胞质实例.
//! 注意这是 "首个匹配" 而不是 "最近匹配".
//!
//! 实现位于 `cyto-berry/src/cell/associate.rs`.
//!
//! ### 采样区域构建 ✅
//!
//! 匹配成功时使用细胞质实例, 否则退化为以细胞核质心为圆心的圆.
//! 两种情况下都要去掉所有细胞核像素.
//!
//! 实现位于 `cyto-berry/src/cell/region.rs`.
//!
//! ### 强度采样与基线 ✅
//!
//! 区域平均强度减去整幅图像的本底 (按通道求和时为最小的单个通道值), 再除以该细胞第一张图像上的同一量.
//! 空区域和零基线都会被显式报告, 不会产生 NaN/Infinity.
//!
//! 实现位于 `cyto-berry/src/series`.
//!
//! ### 输出 ✅
//!
//! 1. 采样区域并集叠加在最后一张图像上的组合图, 细胞核质心处标有细胞下标 (需要 `plot` feature);
//! 2. 每个细胞一张时间序列折线图 (需要 `plot` feature);
//! 3. `series.csv` 与 `regions.npy`.
//!
//! 实现位于 `cyto-berry/src/render`.

/// 二维索引 `(高, 宽)`, 即 `(行, 列)`.
pub type Idx2d = (usize, usize);

/// 平面直角坐标 `(x, y)`. `x` 对应列, `y` 对应行.
pub type Point2dF = (f64, f64);

pub mod config;
pub mod consts;
pub mod error;
pub mod geometry;

/// 掩膜、实例标签、强度图像等基础数据结构.
mod data;

pub use data::{InstanceLabels, IntensityChannel, IntensityImage, IntensityWindow, Mask};

pub mod cell;
pub mod dataset;
pub mod pipeline;
pub mod render;
pub mod segment;
pub mod series;

pub mod prelude;
