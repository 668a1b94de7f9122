//! 输出: 组合图、采样区域数组、时间序列表格与折线图.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use itertools::Itertools;
use ndarray::{Array3, Axis};
use ndarray_npy::WriteNpyExt;

use crate::cell::{Cell, RegionSource};
use crate::consts::rgb::{FALLBACK_CIRCLE, NUCLEUS_OUTLINE};
use crate::data::windowed_gray;
use crate::error::{RunError, RunResult};
use crate::series::TimeSeriesMatrix;
use crate::{Idx2d, IntensityImage, IntensityWindow, Mask};

cfg_if::cfg_if! {
    if #[cfg(feature = "plot")] {
        mod plot;

        pub use plot::{draw_cell_indices, draw_series_plot};
    }
}

/// 所有细胞采样区域的并集.
pub fn union_mask(shape: Idx2d, cells: &[Cell]) -> Mask {
    Mask::union(shape, cells.iter().map(Cell::region))
}

/// 组合图: 只保留 `image` 在所有采样区域并集内的像素, 窗口映射为灰度,
/// 再叠加红色的细胞核轮廓与蓝色的退化圆.
pub fn combined_image(image: &IntensityImage, cells: &[Cell]) -> RgbImage {
    let masked = image.masked(&union_mask(image.shape(), cells));
    let gray = windowed_gray(&masked, &IntensityWindow::from_image(&masked));

    let mut canvas = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });

    for cell in cells {
        for (&(x0, y0), &(x1, y1)) in cell.nucleus().points().iter().circular_tuple_windows() {
            draw_line_segment_mut(
                &mut canvas,
                (x0 as f32, y0 as f32),
                (x1 as f32, y1 as f32),
                Rgb(NUCLEUS_OUTLINE),
            );
        }
        if let RegionSource::Fallback { center: (cx, cy), radius } = cell.source() {
            draw_hollow_circle_mut(
                &mut canvas,
                (cx.round() as i32, cy.round() as i32),
                radius.round() as i32,
                Rgb(FALLBACK_CIRCLE),
            );
        }
    }
    canvas
}

/// 保存组合图. 见 [`combined_image`].
///
/// 打开 `plot` feature 时, 还会在每个细胞核的质心处写上细胞下标.
pub fn save_combined_image<P: AsRef<Path>>(path: P, image: &IntensityImage, cells: &[Cell]) -> RunResult<()> {
    let path = path.as_ref();
    #[allow(unused_mut)]
    let mut canvas = combined_image(image, cells);
    #[cfg(feature = "plot")]
    draw_cell_indices(&mut canvas, cells).map_err(|e| RunError::Render {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;
    canvas
        .save(path)
        .map_err(|source| RunError::Image {
            path: path.to_owned(),
            source,
        })
}

/// 把所有采样区域堆叠为 `(细胞数, 高, 宽)` 的 `u8` 数组 (`1` 为选中).
pub fn stack_regions(shape: Idx2d, cells: &[Cell]) -> Array3<u8> {
    let (h, w) = shape;
    let mut ans = Array3::<u8>::zeros((cells.len(), h, w));
    for (mut layer, cell) in ans.axis_iter_mut(Axis(0)).zip(cells) {
        layer.assign(&cell.region().array_view().mapv(u8::from));
    }
    ans
}

/// 以 `.npy` 格式保存 [`stack_regions`] 的结果.
pub fn write_regions_npy<P: AsRef<Path>>(path: P, shape: Idx2d, cells: &[Cell]) -> RunResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| RunError::Io {
        path: path.to_owned(),
        source,
    })?;
    stack_regions(shape, cells)
        .write_npy(BufWriter::new(file))
        .map_err(|source| RunError::WriteNpy {
            path: path.to_owned(),
            source,
        })
}

/// 以 CSV 格式保存时间序列矩阵. 见 [`TimeSeriesMatrix::write_csv`].
pub fn write_series_csv<P: AsRef<Path>>(path: P, matrix: &TimeSeriesMatrix) -> RunResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| RunError::Io {
        path: path.to_owned(),
        source,
    })?;
    matrix
        .write_csv(BufWriter::new(file))
        .map_err(|source| RunError::Csv {
            path: path.to_owned(),
            source,
        })
}
