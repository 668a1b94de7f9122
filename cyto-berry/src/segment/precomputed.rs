use std::fmt::Display;
use std::fs::File;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use ndarray::Array2;
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};

use super::Segmenter;
use crate::error::SegmentError;
use crate::{InstanceLabels, IntensityImage};

/// 事先保存好的实例标签, 作为分割结果直接返回.
///
/// 支持两种格式:
///
/// 1. `.npy` 二维整数数组 (`u8`/`u16`/`u32`/`u64`/`i32`/`i64`), 不允许负值;
/// 2. 单通道 8-bit 或 16-bit 标签图像 (如 png, tiff).
#[derive(Clone, Debug)]
pub struct PrecomputedMasks {
    path: Option<PathBuf>,
    labels: InstanceLabels,
}

impl PrecomputedMasks {
    /// 读取 `path` 处的标签.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SegmentError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SegmentError::ModelUnavailable { path: path.to_owned() });
        }

        let is_npy = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("npy"));
        let data = if is_npy {
            read_npy_labels(path)?
        } else if ImageFormat::from_path(path).is_ok() {
            read_image_labels(path)?
        } else {
            return Err(SegmentError::UnsupportedModel { path: path.to_owned() });
        };

        Ok(Self {
            path: Some(path.to_owned()),
            labels: InstanceLabels::from_array(data),
        })
    }

    /// 直接使用内存中的标签.
    #[inline]
    pub fn from_labels(labels: InstanceLabels) -> Self {
        Self { path: None, labels }
    }

    /// 标签来源路径. 内存中的标签返回 `None`.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 保存的标签.
    #[inline]
    pub fn labels(&self) -> &InstanceLabels {
        &self.labels
    }
}

impl Segmenter for PrecomputedMasks {
    fn segment(&self, image: &IntensityImage) -> Result<InstanceLabels, SegmentError> {
        if self.labels.shape() != image.shape() {
            return Err(SegmentError::ShapeMismatch {
                expected: image.shape(),
                found: self.labels.shape(),
            });
        }
        Ok(self.labels.clone())
    }
}

/// 依次尝试各种整数 dtype. 只有 dtype 不符时才继续尝试下一种.
fn read_npy_labels(path: &Path) -> Result<Array2<u32>, SegmentError> {
    let readers: [fn(&Path) -> Result<Option<Array2<u32>>, String>; 6] = [
        read_as::<u32>,
        read_as::<u16>,
        read_as::<u8>,
        read_as::<i32>,
        read_as::<i64>,
        read_as::<u64>,
    ];
    for read in readers {
        match read(path) {
            Ok(Some(data)) => return Ok(data),
            Ok(None) => continue,
            Err(reason) => {
                return Err(SegmentError::ReadNpy {
                    path: path.to_owned(),
                    reason,
                })
            }
        }
    }
    Err(SegmentError::ReadNpy {
        path: path.to_owned(),
        reason: "数组元素不是整数类型".to_string(),
    })
}

/// `Ok(None)` 代表 dtype 不是 `T`.
fn read_as<T>(path: &Path) -> Result<Option<Array2<u32>>, String>
where
    T: ReadableElement + Copy + Display + TryInto<u32>,
{
    let file = File::open(path).map_err(|e| e.to_string())?;
    let data = match Array2::<T>::read_npy(file) {
        Ok(data) => data,
        Err(ReadNpyError::WrongDescriptor(_)) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let mut invalid = None;
    let labels: Array2<u32> = data.mapv(|v| {
        let id: Result<u32, _> = v.try_into();
        id.unwrap_or_else(|_| {
            invalid.get_or_insert_with(|| v.to_string());
            0
        })
    });
    match invalid {
        Some(v) => Err(format!("标签值 {v} 不是合法的实例 id")),
        None => Ok(Some(labels)),
    }
}

fn read_image_labels(path: &Path) -> Result<Array2<u32>, SegmentError> {
    let img = image::open(path).map_err(|source| SegmentError::Image {
        path: path.to_owned(),
        source,
    })?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    let raw: Vec<u32> = match img {
        DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(u32::from).collect(),
        DynamicImage::ImageLuma16(buf) => buf.into_raw().into_iter().map(u32::from).collect(),
        // 彩色或浮点图像无法无损还原实例 id.
        _ => return Err(SegmentError::UnsupportedModel { path: path.to_owned() }),
    };
    // 该操作不会生成 `Err`: `raw` 恰好有 `h * w` 个元素.
    Ok(Array2::from_shape_vec((h, w), raw).unwrap())
}
