//! 逐细胞时间序列折线图, 以及组合图上的细胞编号.
//!
//! 文字使用系统中的 `sans-serif` 字体渲染.

use std::error::Error;
use std::path::Path;

use image::RgbImage;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::cell::Cell;
use crate::error::{RunError, RunResult};
use crate::series::{SeriesPoint, SeriesSegments};

/// 折线图分辨率 (宽, 高).
const PLOT_SIZE: (u32, u32) = (640, 480);

/// 数据点标记半径.
const MARKER_SIZE: i32 = 3;

/// 坐标轴刻度字号.
const LABEL_FONT_SIZE: u32 = 14;

/// 组合图上细胞编号的字号.
const INDEX_FONT_SIZE: u32 = 14;

/// 把一个细胞的时间序列画到 `path`.
///
/// 横坐标为图像位置 `0..len`, 纵坐标为归一化强度. "pre" 段为蓝色; 连接线与 "post" 段为红色.
pub fn draw_series_plot<P: AsRef<Path>>(path: P, segments: &SeriesSegments, len: usize) -> RunResult<()> {
    let path = path.as_ref();
    draw(path, segments, len).map_err(|e| RunError::Render {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn draw(path: &Path, segments: &SeriesSegments, len: usize) -> Result<(), Box<dyn Error>> {
    let x_max = len.saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = segments.value_range().unwrap_or((0.0, 1.0));
    let y_pad = ((y_max - y_min) * 0.05).max(1e-3);
    let (x0, x1) = (-0.5, x_max + 0.5);
    let (y0, y1) = (y_min - y_pad, y_max + y_pad);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    // 横坐标只标整数位置.
    let x_formatter = |v: &f64| {
        if v.fract() == 0.0 {
            format!("{v:.0}")
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("image")
        .y_desc("normalized intensity")
        .x_labels(len.clamp(2, 12))
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|v| format!("{v:.2}"))
        .x_label_style(("sans-serif", LABEL_FONT_SIZE).into_font())
        .y_label_style(("sans-serif", LABEL_FONT_SIZE).into_font())
        .draw()?;

    let to_xy = |&(i, v): &SeriesPoint| (i as f64, v);

    chart.draw_series(LineSeries::new(segments.pre.iter().map(to_xy), &BLUE))?;
    chart.draw_series(
        segments
            .pre
            .iter()
            .map(|p| Circle::new(to_xy(p), MARKER_SIZE, BLUE.filled())),
    )?;

    if let Some(bridge) = segments.bridge.as_ref() {
        chart.draw_series(LineSeries::new(bridge.iter().map(to_xy), &RED))?;
    }

    chart.draw_series(LineSeries::new(segments.post.iter().map(to_xy), &RED))?;
    chart.draw_series(
        segments
            .post
            .iter()
            .map(|p| Circle::new(to_xy(p), MARKER_SIZE, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// 在 `canvas` 上每个细胞核的质心处写上白色的细胞下标, 与 `plot{i}.png` 对应.
pub fn draw_cell_indices(canvas: &mut RgbImage, cells: &[Cell]) -> Result<(), Box<dyn Error>> {
    let size = canvas.dimensions();
    let root = BitMapBackend::with_buffer(&mut **canvas, size).into_drawing_area();
    let style = TextStyle::from(("sans-serif", INDEX_FONT_SIZE).into_font())
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for cell in cells {
        let Some((x, y)) = cell.nucleus().centroid() else {
            continue;
        };
        root.draw_text(
            &cell.index().to_string(),
            &style,
            (x.round() as i32, y.round() as i32),
        )?;
    }
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{draw_cell_indices, draw_series_plot, PLOT_SIZE};
    use crate::cell::build_cells;
    use crate::series::SeriesSegments;
    use crate::InstanceLabels;
    use image::RgbImage;
    use ndarray::Array2;

    #[test]
    fn test_draw_series_plot() {
        let dir = tempfile::tempdir().unwrap();
        let segments = SeriesSegments {
            pre: vec![(0, 1.0), (1, 1.2)],
            bridge: Some([(1, 1.2), (2, 0.7)]),
            post: vec![(2, 0.7), (3, 0.9)],
        };
        let p = dir.path().join("plot0.png");
        draw_series_plot(&p, &segments, 4).unwrap();
        let img = image::open(&p).unwrap();
        assert_eq!((img.width(), img.height()), PLOT_SIZE);

        // 没有任何有效点时仍然输出一张空图.
        let p = dir.path().join("plot1.png");
        draw_series_plot(&p, &SeriesSegments::default(), 4).unwrap();
        assert!(p.is_file());
    }

    #[test]
    fn test_draw_cell_indices() {
        // 两个孤立的细胞核, 质心分别在 (15, 15) 与 (45, 45).
        let mut nuc = Array2::<u32>::zeros((60, 60));
        for h in 13..=17 {
            for w in 13..=17 {
                nuc[(h, w)] = 1;
            }
        }
        for h in 43..=47 {
            for w in 43..=47 {
                nuc[(h, w)] = 2;
            }
        }
        let nuc = InstanceLabels::from_array(nuc);
        let cyto = InstanceLabels::from_array(Array2::zeros((60, 60)));
        let cells = build_cells(&nuc, &cyto, 10.0, 2.0).unwrap();

        let mut canvas = RgbImage::new(60, 60);
        draw_cell_indices(&mut canvas, &cells).unwrap();

        let bright_near = |cx: u32, cy: u32| {
            (cx - 8..=cx + 8).any(|x| {
                (cy - 8..=cy + 8).any(|y| canvas.get_pixel(x, y).0.iter().all(|&c| c > 64))
            })
        };
        assert!(bright_near(15, 15));
        assert!(bright_near(45, 45));

        // 编号之外的区域保持不变.
        assert_eq!(canvas.get_pixel(59, 0).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(0, 59).0, [0, 0, 0]);
    }
}
