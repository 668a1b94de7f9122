//! 图像序列数据集.
//!
//! 提供目录列举 (自然排序) 和迭代器风格的逐张加载模式.

mod natural;

pub use natural::natural_cmp;

use crate::error::{RunError, RunResult};
use crate::{IntensityChannel, IntensityImage};
use image::{ImageFormat, ImageResult};
use std::path::{Path, PathBuf};

/// 列出目录 `dir` 下所有可解码格式的图像文件, 按文件名自然排序.
///
/// 子目录、隐藏文件以及扩展名无法识别的文件都被忽略.
pub fn list_images<P: AsRef<Path>>(dir: P) -> RunResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_err = |source: std::io::Error| RunError::Io {
        path: dir.to_owned(),
        source,
    };

    let mut ans = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || ImageFormat::from_path(&path).is_err() {
            continue;
        }
        if file_name(&path).starts_with('.') {
            continue;
        }
        ans.push(path);
    }
    ans.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(ans)
}

/// 路径的文件名部分. 用于日志与时间序列的列名.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 从一组路径创建强度图像加载器. 图像在迭代时才被解码.
pub fn image_loader<I: IntoIterator<Item = PathBuf>>(paths: I, channel: IntensityChannel) -> ImageLoader {
    let mut paths: Vec<PathBuf> = paths.into_iter().collect();
    paths.reverse();
    ImageLoader {
        paths_rev: paths,
        channel,
    }
}

/// 强度图像加载器, 按给定顺序逐张产出 `(路径, 解码结果)`.
#[derive(Debug)]
pub struct ImageLoader {
    paths_rev: Vec<PathBuf>,
    channel: IntensityChannel,
}

impl Iterator for ImageLoader {
    type Item = (PathBuf, ImageResult<IntensityImage>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths_rev.pop()?;
        let data = IntensityImage::open(&path, self.channel);
        Some((path, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.paths_rev.len(), Some(self.paths_rev.len()))
    }
}

impl ExactSizeIterator for ImageLoader {
    #[inline]
    fn len(&self) -> usize {
        self.paths_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{file_name, image_loader, list_images};
    use crate::IntensityChannel;
    use image::{GrayImage, Luma};
    use std::fs;

    #[test]
    fn test_list_and_load() {
        let dir = tempfile::tempdir().unwrap();
        for (name, v) in [("img10.png", 10u8), ("img2.png", 2), ("img1.png", 1)] {
            GrayImage::from_pixel(2, 2, Luma([v])).save(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".hidden.png"), "x").unwrap();
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let paths = list_images(dir.path()).unwrap();
        let names: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, ["img1.png", "img2.png", "img10.png"]);

        let loader = image_loader(paths, IntensityChannel::Sum);
        assert_eq!(loader.len(), 3);
        let values: Vec<f32> = loader
            .map(|(_, img)| img.unwrap().get((0, 0)).unwrap())
            .collect();
        for (v, expected) in values.into_iter().zip([1.0f32, 2.0, 10.0]) {
            assert!((v - expected / 255.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_images(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_loader_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("broken.png");
        fs::write(&p, "not a png").unwrap();
        let mut loader = image_loader([p.clone()], IntensityChannel::Sum);
        let (path, data) = loader.next().unwrap();
        assert_eq!(path, p);
        assert!(data.is_err());
        assert!(loader.next().is_none());
    }
}
