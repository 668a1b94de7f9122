//! 强度采样与时间序列.
//!
//! 对每个细胞, 一张图像上的采样值为
//!
//! ```text
//! (区域平均强度 - 整幅图像最小强度) / 基线
//! ```
//!
//! 其中基线是第一张 "pre" 图像上的同一量 (不做除法). 因此基线有效的细胞,
//! 其时间序列的第一个值总是 `1.0`.

mod matrix;
mod sampler;

pub use matrix::{SeriesPoint, SeriesSegments, TimeSeriesMatrix};
pub use sampler::{normalized_intensity, CellAnomaly, RunState};
