//! 运行时错误.
//!
//! 错误分为两类:
//!
//! - 结构性错误 ([`RunError`], [`ConfigError`], [`SegmentError`]): 直接终止整个运行;
//! - 单细胞异常 ([`SampleError`]): 只影响对应细胞的对应采样, 由
//!   [`crate::series::CellAnomaly`] 记录, 不会终止运行.

use std::path::PathBuf;

use crate::Idx2d;

/// 配置错误. 在任何处理开始前发生, 总是致命的.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 配置文件无法读取.
    #[error("无法读取配置文件 `{path}`: {source}")]
    Io {
        /// 配置文件路径.
        path: PathBuf,
        /// 底层 I/O 错误.
        source: std::io::Error,
    },

    /// 配置文件格式错误或缺少必需字段. 字段名包含在 `source` 的信息中.
    #[error("配置文件 `{path}` 解析失败: {source}")]
    Parse {
        /// 配置文件路径.
        path: PathBuf,
        /// 底层解析错误.
        source: serde_json::Error,
    },

    /// 字段 `field` 应当是一个目录.
    #[error("配置字段 `{field}` 指向的 `{path}` 不是目录")]
    NotADirectory {
        /// 字段名.
        field: &'static str,
        /// 字段值.
        path: PathBuf,
    },

    /// 字段取值不合法.
    #[error("配置字段 `{field}` 取值不合法: {reason}")]
    InvalidValue {
        /// 字段名.
        field: &'static str,
        /// 原因.
        reason: String,
    },
}

/// 分割模型错误. 总是致命的.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    /// 模型文件不存在或不可读.
    #[error("分割模型 `{path}` 不可用")]
    ModelUnavailable {
        /// 模型路径.
        path: PathBuf,
    },

    /// 无法识别的模型格式.
    #[error("无法识别分割模型 `{path}` 的格式 (支持 `.npy` 标签数组或单通道 8/16-bit 标签图像)")]
    UnsupportedModel {
        /// 模型路径.
        path: PathBuf,
    },

    /// 读取 `.npy` 标签数组失败.
    #[error("读取标签数组 `{path}` 失败: {reason}")]
    ReadNpy {
        /// 数组路径.
        path: PathBuf,
        /// 最后一次尝试的错误信息.
        reason: String,
    },

    /// 读取标签图像失败.
    #[error("读取标签图像 `{path}` 失败: {source}")]
    Image {
        /// 图像路径.
        path: PathBuf,
        /// 底层解码错误.
        source: image::ImageError,
    },

    /// 标签尺寸与被分割图像不符.
    #[error("标签尺寸 {found:?} 与图像尺寸 {expected:?} 不符")]
    ShapeMismatch {
        /// 图像尺寸 `(高, 宽)`.
        expected: Idx2d,
        /// 标签尺寸 `(高, 宽)`.
        found: Idx2d,
    },
}

/// 单细胞采样异常. 只使对应的时间序列条目无效, 不终止运行.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleError {
    /// 采样区域不含任何像素, 无法求平均.
    #[error("采样区域为空")]
    EmptyRegion,

    /// 基线为零 (或非有限值), 无法作为除数.
    #[error("基线为零")]
    ZeroBaseline,
}

/// 致命运行错误.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 配置错误.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 分割错误.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// 文件系统错误.
    #[error("访问 `{path}` 失败: {source}")]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 底层 I/O 错误.
        source: std::io::Error,
    },

    /// 图像解码或编码错误.
    #[error("处理图像 `{path}` 失败: {source}")]
    Image {
        /// 出错路径.
        path: PathBuf,
        /// 底层图像错误.
        source: image::ImageError,
    },

    /// 写出 `.npy` 失败.
    #[error("写出 `{path}` 失败: {source}")]
    WriteNpy {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        source: ndarray_npy::WriteNpyError,
    },

    /// 写出 CSV 失败.
    #[error("写出 `{path}` 失败: {source}")]
    Csv {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        source: csv::Error,
    },

    /// 绘图失败.
    #[error("绘制 `{path}` 失败: {reason}")]
    Render {
        /// 出错路径.
        path: PathBuf,
        /// 绘图后端给出的原因.
        reason: String,
    },

    /// 目录中没有任何可用图像.
    #[error("目录 `{0}` 中没有图像")]
    EmptySequence(PathBuf),

    /// 采样图像尺寸与分割掩膜尺寸不符.
    #[error("图像 `{image}` 尺寸 {found:?} 与掩膜尺寸 {expected:?} 不符")]
    ShapeMismatch {
        /// 图像名.
        image: String,
        /// 掩膜尺寸 `(高, 宽)`.
        expected: Idx2d,
        /// 图像尺寸 `(高, 宽)`.
        found: Idx2d,
    },

    /// 基线已经被捕获过. 基线在整个运行中只允许捕获一次.
    #[error("基线已经被捕获过")]
    BaselineAlreadyCaptured,

    /// 在捕获基线之前进行了采样.
    #[error("尚未捕获基线")]
    BaselineNotCaptured,

    /// 新的一列时间序列长度与细胞数不符.
    #[error("时间序列列长度 {found} 与细胞数 {expected} 不符")]
    InconsistentSeries {
        /// 细胞数.
        expected: usize,
        /// 新列长度.
        found: usize,
    },
}

/// 运行结果.
pub type RunResult<T> = Result<T, RunError>;
