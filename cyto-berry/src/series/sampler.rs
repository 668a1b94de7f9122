use log::{debug, warn};

use super::TimeSeriesMatrix;
use crate::cell::Cell;
use crate::error::{RunError, RunResult, SampleError};
use crate::{IntensityImage, Mask};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 区域 `region` 的平均强度减去 `floor` (通常是 [`IntensityImage::floor`]).
///
/// 空区域返回 [`SampleError::EmptyRegion`].
pub fn normalized_intensity(image: &IntensityImage, region: &Mask, floor: f32) -> Result<f64, SampleError> {
    let mean = image.mean_in(region).ok_or(SampleError::EmptyRegion)?;
    Ok(mean - floor as f64)
}

/// 一次单细胞采样异常.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellAnomaly {
    /// 细胞下标.
    pub cell: usize,

    /// 出现异常的图像名.
    pub image: String,

    /// 异常类型.
    pub kind: SampleError,
}

/// 一次运行的可变状态: 细胞、基线、时间序列矩阵和异常记录.
///
/// 使用方式:
///
/// 1. 用第一张 "pre" 图像调用且只调用一次 [`RunState::capture_baseline`];
/// 2. 按顺序对其余每张图像调用 [`RunState::sample`].
///
/// 每次调用都恰好为矩阵追加一列.
#[derive(Clone, Debug)]
pub struct RunState {
    cells: Vec<Cell>,

    /// 每个细胞的基线. 捕获之前为 `None`, 捕获之后不再修改.
    baselines: Option<Vec<Result<f64, SampleError>>>,

    matrix: TimeSeriesMatrix,
    anomalies: Vec<CellAnomaly>,
}

impl RunState {
    /// 初始化. 此时还没有基线, 矩阵为零列.
    pub fn new(cells: Vec<Cell>) -> Self {
        let matrix = TimeSeriesMatrix::new(cells.len());
        Self {
            cells,
            baselines: None,
            matrix,
            anomalies: Vec::new(),
        }
    }

    /// 所有细胞.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// 当前的时间序列矩阵.
    #[inline]
    pub fn matrix(&self) -> &TimeSeriesMatrix {
        &self.matrix
    }

    /// 到目前为止的所有异常, 按发生顺序排列.
    #[inline]
    pub fn anomalies(&self) -> &[CellAnomaly] {
        &self.anomalies
    }

    /// 基线. 尚未捕获时返回 `None`.
    #[inline]
    pub fn baselines(&self) -> Option<&[Result<f64, SampleError>]> {
        self.baselines.as_deref()
    }

    /// 是否已经捕获基线?
    #[inline]
    pub fn has_baseline(&self) -> bool {
        self.baselines.is_some()
    }

    /// 以 `image` 捕获所有细胞的基线, 并追加第一列.
    ///
    /// 基线有效的细胞在第一列上的值恰好是 `1.0`. 无法采样或为零的基线被记录为异常,
    /// 该细胞此后所有条目都是 `None`.
    ///
    /// 基线只能捕获一次, 重复调用返回 [`RunError::BaselineAlreadyCaptured`].
    pub fn capture_baseline(&mut self, image: &IntensityImage, name: &str) -> RunResult<()> {
        if self.baselines.is_some() {
            return Err(RunError::BaselineAlreadyCaptured);
        }
        self.check_shape(image, name)?;

        let floor = image.floor().unwrap_or(0.0);
        let mut baselines = Vec::with_capacity(self.cells.len());
        for cell in self.cells.iter() {
            let baseline = normalized_intensity(image, cell.region(), floor).and_then(|v| {
                if v != 0.0 && v.is_finite() {
                    Ok(v)
                } else {
                    Err(SampleError::ZeroBaseline)
                }
            });
            if let Err(kind) = baseline {
                record(&mut self.anomalies, cell.index(), name, kind);
            }
            baselines.push(baseline);
        }

        let column = baselines.iter().map(|b| b.as_ref().ok().map(|_| 1.0)).collect();
        self.baselines = Some(baselines);
        debug!("基线已由 `{name}` 捕获");
        self.matrix.push_column(name, column)
    }

    /// 对 `image` 采样, 为矩阵追加一列.
    ///
    /// 必须先调用 [`RunState::capture_baseline`], 否则返回 [`RunError::BaselineNotCaptured`].
    pub fn sample(&mut self, image: &IntensityImage, name: &str) -> RunResult<()> {
        let baselines = self.baselines.as_ref().ok_or(RunError::BaselineNotCaptured)?;
        self.check_shape(image, name)?;

        let floor = image.floor().unwrap_or(0.0);
        let mut column = Vec::with_capacity(self.cells.len());
        for (cell, baseline) in self.cells.iter().zip(baselines.iter()) {
            // 基线无效的细胞已经在捕获时报告过.
            let Ok(baseline) = baseline else {
                column.push(None);
                continue;
            };
            match normalized_intensity(image, cell.region(), floor) {
                Ok(v) => column.push(Some(v / baseline)),
                Err(kind) => {
                    record(&mut self.anomalies, cell.index(), name, kind);
                    column.push(None);
                }
            }
        }
        debug!("已采样 `{name}`");
        self.matrix.push_column(name, column)
    }

    /// 拆分为细胞、时间序列矩阵和异常记录.
    pub fn into_parts(self) -> (Vec<Cell>, TimeSeriesMatrix, Vec<CellAnomaly>) {
        (self.cells, self.matrix, self.anomalies)
    }

    fn check_shape(&self, image: &IntensityImage, name: &str) -> RunResult<()> {
        match self.cells.first() {
            Some(cell) if cell.region().shape() != image.shape() => Err(RunError::ShapeMismatch {
                image: name.to_string(),
                expected: cell.region().shape(),
                found: image.shape(),
            }),
            _ => Ok(()),
        }
    }
}

fn record(anomalies: &mut Vec<CellAnomaly>, cell: usize, image: &str, kind: SampleError) {
    warn!("细胞 {cell} 在图像 `{image}` 上采样异常: {kind}");
    anomalies.push(CellAnomaly {
        cell,
        image: image.to_string(),
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::{normalized_intensity, RunState};
    use crate::cell::build_cells;
    use crate::error::{RunError, SampleError};
    use crate::{IntensityChannel, IntensityImage, InstanceLabels, Mask};
    use image::{DynamicImage, Rgb, RgbImage};
    use ndarray::{array, Array2};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// 20 x 20: 细胞核 1 (`[4, 6]^2`) 在细胞质 1 (`[2, 8]^2`) 中;
    /// 细胞核 2 (`[14, 16]^2`) 在细胞质 2 (`[12, 18]^2`) 中.
    fn cells() -> Vec<crate::cell::Cell> {
        let mut nuc = Array2::<u32>::zeros((20, 20));
        let mut cyto = Array2::<u32>::zeros((20, 20));
        for (id, lo) in [(1u32, 2usize), (2, 12)] {
            for h in lo..=lo + 6 {
                for w in lo..=lo + 6 {
                    cyto[(h, w)] = id;
                }
            }
            for h in lo + 2..=lo + 4 {
                for w in lo + 2..=lo + 4 {
                    nuc[(h, w)] = id;
                }
            }
        }
        let nuc = InstanceLabels::from_array(nuc);
        let cyto = InstanceLabels::from_array(cyto);
        build_cells(&nuc, &cyto, 5.0, 2.0).unwrap()
    }

    /// 背景为 `floor`, 细胞 1 的细胞质为 `a`, 细胞 2 的细胞质为 `b`.
    fn image(floor: f32, a: f32, b: f32) -> IntensityImage {
        let mut data = Array2::from_elem((20, 20), floor);
        for h in 2..=8 {
            for w in 2..=8 {
                data[(h, w)] = a;
            }
        }
        for h in 12..=18 {
            for w in 12..=18 {
                data[(h, w)] = b;
            }
        }
        IntensityImage::from_array(data)
    }

    #[test]
    fn test_normalized_intensity() {
        let img = IntensityImage::from_array(array![[0.1, 0.5], [0.3, 0.7]]);
        let m = Mask::from_array(array![[false, true], [false, true]]);
        assert!(f64_eq(normalized_intensity(&img, &m, 0.1).unwrap(), 0.5));
        assert_eq!(
            normalized_intensity(&img, &Mask::empty((2, 2)), 0.1),
            Err(SampleError::EmptyRegion)
        );
    }

    #[test]
    fn test_rgb_floor_is_single_channel() {
        let mut buf = RgbImage::new(2, 1);
        buf.put_pixel(0, 0, Rgb([51, 51, 51]));
        buf.put_pixel(1, 0, Rgb([153, 153, 153]));
        let img = IntensityImage::from_dynamic(&DynamicImage::ImageRgb8(buf), IntensityChannel::Sum);
        let m = Mask::from_array(array![[false, true]]);

        // 像素和 1.8 减去最暗的单个通道值 0.2.
        let v = normalized_intensity(&img, &m, img.floor().unwrap()).unwrap();
        assert!(f64_eq(v, 1.6));
    }

    #[test]
    fn test_empty_region_at_baseline() {
        // 单像素细胞核没有细胞质, 退化圆去掉细胞核后为空.
        let mut nuc = Array2::<u32>::zeros((20, 20));
        nuc[(10, 10)] = 1;
        let nuc = InstanceLabels::from_array(nuc);
        let cyto = InstanceLabels::from_array(Array2::zeros((20, 20)));
        let cells = build_cells(&nuc, &cyto, 5.0, 2.0).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].region().count(), 0);

        let mut state = RunState::new(cells);
        state.capture_baseline(&image(0.1, 0.5, 0.3), "pre1").unwrap();
        state.sample(&image(0.1, 0.5, 0.3), "post1").unwrap();

        assert_eq!(state.matrix().row(0).unwrap(), [None, None]);
        assert_eq!(state.baselines().unwrap()[0], Err(SampleError::EmptyRegion));
        // 异常只在捕获基线时报告一次.
        assert_eq!(state.anomalies().len(), 1);
        assert_eq!(state.anomalies()[0].image, "pre1");
        assert_eq!(state.anomalies()[0].kind, SampleError::EmptyRegion);
    }

    #[test]
    fn test_baseline_and_samples() {
        let mut state = RunState::new(cells());
        assert_eq!(state.cells().len(), 2);

        state.capture_baseline(&image(0.1, 0.5, 0.3), "pre1").unwrap();
        state.sample(&image(0.1, 0.9, 0.5), "pre2").unwrap();
        state.sample(&image(0.2, 0.6, 0.2), "post1").unwrap();

        let m = state.matrix();
        assert_eq!(m.len(), 3);
        let r0 = m.row(0).unwrap();
        let r1 = m.row(1).unwrap();
        assert_eq!(r0[0], Some(1.0));
        assert_eq!(r1[0], Some(1.0));
        assert!(f64_eq(r0[1].unwrap(), 0.8 / 0.4));
        assert!(f64_eq(r1[1].unwrap(), 0.4 / 0.2));
        assert!(f64_eq(r0[2].unwrap(), 0.4 / 0.4));
        assert!(f64_eq(r1[2].unwrap(), 0.0));
        assert!(state.anomalies().is_empty());
    }

    #[test]
    fn test_zero_baseline_reported() {
        let mut state = RunState::new(cells());
        // 细胞 2 与背景一样暗, 基线为零.
        state.capture_baseline(&image(0.1, 0.5, 0.1), "pre1").unwrap();
        state.sample(&image(0.1, 0.5, 0.9), "post1").unwrap();

        let r1 = state.matrix().row(1).unwrap();
        assert_eq!(r1, [None, None]);
        assert!(state.matrix().rows().flatten().flatten().all(|v| v.is_finite()));

        let anomalies = state.anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].cell, 1);
        assert_eq!(anomalies[0].image, "pre1");
        assert_eq!(anomalies[0].kind, SampleError::ZeroBaseline);
        assert_eq!(state.baselines().unwrap()[1], Err(SampleError::ZeroBaseline));
    }

    #[test]
    fn test_baseline_once_only() {
        let mut state = RunState::new(cells());
        assert!(!state.has_baseline());
        assert!(matches!(
            state.sample(&image(0.1, 0.5, 0.3), "x"),
            Err(RunError::BaselineNotCaptured)
        ));
        state.capture_baseline(&image(0.1, 0.5, 0.3), "pre1").unwrap();
        assert!(matches!(
            state.capture_baseline(&image(0.1, 0.5, 0.3), "pre2"),
            Err(RunError::BaselineAlreadyCaptured)
        ));
        assert_eq!(state.matrix().len(), 1);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut state = RunState::new(cells());
        let small = IntensityImage::from_array(Array2::zeros((10, 10)));
        assert!(matches!(
            state.capture_baseline(&small, "small"),
            Err(RunError::ShapeMismatch { .. })
        ));
        assert!(!state.has_baseline());
    }
}
