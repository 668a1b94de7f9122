//! 端到端运行.
//!
//! 1. 列出 "pre" 与 "post" 目录中的图像 (各自自然排序);
//! 2. 以第一张 "pre" 图像做细胞核/细胞质分割, 构建所有细胞;
//! 3. 用同一张图像捕获基线, 再依次采样其余 "pre" 图像和所有 "post" 图像;
//! 4. 写出组合图、采样区域数组、时间序列表格和 (可选) 逐细胞折线图.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::cell::{build_cells, Cell};
use crate::config::Config;
use crate::consts::{COMBINED_IMAGE_NAME, REGIONS_NPY_NAME, SERIES_CSV_NAME};
use crate::dataset::{file_name, image_loader, list_images};
use crate::error::{RunError, RunResult};
use crate::render;
use crate::segment::Segmenter;
use crate::series::{CellAnomaly, RunState, TimeSeriesMatrix};
use crate::IntensityImage;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一次完整运行.
pub struct Pipeline<N: Segmenter, C: Segmenter> {
    config: Config,
    nuclei: N,
    cytoplasm: C,
}

impl<N: Segmenter, C: Segmenter> Pipeline<N, C> {
    /// 以配置和两个分割器初始化.
    pub fn new(config: Config, nuclei: N, cytoplasm: C) -> Self {
        Self {
            config,
            nuclei,
            cytoplasm,
        }
    }

    /// 运行配置.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 执行整个运行. 任何结构性错误都会立刻终止运行.
    pub fn run(&self) -> RunResult<RunReport> {
        let since = Instant::now();
        let cfg = &self.config;

        let pre = list_images(&cfg.pre_directory_location)?;
        let post = list_images(&cfg.post_directory_location)?;
        if pre.is_empty() {
            return Err(RunError::EmptySequence(cfg.pre_directory_location.clone()));
        }
        if post.is_empty() {
            warn!("`{}` 中没有 \"post\" 图像", cfg.post_directory_location.display());
        }
        let (pre_images, post_images) = (pre.len(), post.len());
        info!("共 {pre_images} 张 \"pre\" 图像, {post_images} 张 \"post\" 图像");

        let out_dir = cfg.output_directory.as_path();
        std::fs::create_dir_all(out_dir).map_err(|source| RunError::Io {
            path: out_dir.to_owned(),
            source,
        })?;

        let mut images = image_loader(pre.into_iter().chain(post), cfg.channel);
        let decode = |(path, data): (PathBuf, image::ImageResult<IntensityImage>)| {
            let name = file_name(&path);
            data.map(|img| (name, img))
                .map_err(|source| RunError::Image { path, source })
        };

        let (first_name, first) = match images.next() {
            Some(item) => decode(item)?,
            None => return Err(RunError::EmptySequence(cfg.pre_directory_location.clone())),
        };

        let nuclei = self.nuclei.segment(&first)?;
        let cytoplasm = self.cytoplasm.segment(&first)?;
        let cells = build_cells(
            &nuclei,
            &cytoplasm,
            cfg.association_distance,
            cfg.fallback_radius_scale,
        )?;
        let fallback = cells.iter().filter(|c| c.source().is_fallback()).count();
        info!(
            "由 `{first_name}` 检测到 {} 个细胞核、{} 个细胞质, 构建 {} 个细胞 ({fallback} 个使用退化圆)",
            nuclei.len(),
            cytoplasm.len(),
            cells.len()
        );

        let mut state = RunState::new(cells);
        state.capture_baseline(&first, &first_name)?;

        let mut last = first;
        for (i, item) in images.enumerate() {
            let (name, img) = decode(item)?;
            debug!("[{}/{}] 采样 `{name}`", i + 2, pre_images + post_images);
            state.sample(&img, &name)?;
            last = img;
        }

        let (cells, matrix, anomalies) = state.into_parts();
        let outputs = write_outputs(out_dir, &last, &cells, &matrix, pre_images)?;

        let elapsed = since.elapsed();
        info!(
            "运行结束: {} 个细胞, {} 张图像, {} 个异常, 用时 {:.3} s",
            cells.len(),
            matrix.len(),
            anomalies.len(),
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            cells: cells.len(),
            fallback_cells: fallback,
            pre_images,
            post_images,
            matrix,
            anomalies,
            outputs,
            elapsed,
        })
    }
}

/// 写出所有输出文件, 返回写出的路径.
fn write_outputs(
    out_dir: &Path,
    last: &IntensityImage,
    cells: &[Cell],
    matrix: &TimeSeriesMatrix,
    split: usize,
) -> RunResult<Vec<PathBuf>> {
    let mut outputs = Vec::new();

    let p = out_dir.join(COMBINED_IMAGE_NAME);
    render::save_combined_image(&p, last, cells)?;
    outputs.push(p);

    let p = out_dir.join(REGIONS_NPY_NAME);
    render::write_regions_npy(&p, last.shape(), cells)?;
    outputs.push(p);

    let p = out_dir.join(SERIES_CSV_NAME);
    render::write_series_csv(&p, matrix)?;
    outputs.push(p);

    #[cfg(feature = "plot")]
    for cell in cells {
        let Some(segments) = matrix.segments(cell.index(), split) else {
            continue;
        };
        let p = out_dir.join(crate::consts::plot_name(cell.index()));
        render::draw_series_plot(&p, &segments, matrix.len())?;
        outputs.push(p);
    }
    #[cfg(not(feature = "plot"))]
    let _ = split;

    for p in outputs.iter() {
        debug!("已写出 `{}`", p.display());
    }
    info!("已写出 {} 个文件到 `{}`", outputs.len(), out_dir.display());
    Ok(outputs)
}

/// 一次运行的结果摘要.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunReport {
    cells: usize,
    fallback_cells: usize,
    pre_images: usize,
    post_images: usize,
    matrix: TimeSeriesMatrix,
    anomalies: Vec<CellAnomaly>,
    outputs: Vec<PathBuf>,
    elapsed: Duration,
}

impl RunReport {
    /// 细胞个数.
    #[inline]
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// 关联到细胞质的细胞个数.
    #[inline]
    pub fn matched_cells(&self) -> usize {
        self.cells - self.fallback_cells
    }

    /// 使用退化圆的细胞个数.
    #[inline]
    pub fn fallback_cells(&self) -> usize {
        self.fallback_cells
    }

    /// "pre" 图像个数, 也是时间序列 "pre"/"post" 的分界位置.
    #[inline]
    pub fn pre_images(&self) -> usize {
        self.pre_images
    }

    /// "post" 图像个数.
    #[inline]
    pub fn post_images(&self) -> usize {
        self.post_images
    }

    /// 时间序列矩阵.
    #[inline]
    pub fn matrix(&self) -> &TimeSeriesMatrix {
        &self.matrix
    }

    /// 所有单细胞采样异常.
    #[inline]
    pub fn anomalies(&self) -> &[CellAnomaly] {
        &self.anomalies
    }

    /// 写出的文件.
    #[inline]
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// 运行用时 (墙钟时间).
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
