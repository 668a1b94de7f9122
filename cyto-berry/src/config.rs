//! 运行配置.
//!
//! 配置文件是一个 JSON 对象, 例如:
//!
//! ```json
//! {
//!     "pre_directory_location": "data/pre",
//!     "post_directory_location": "data/post",
//!     "nuclei_model_location": "models/nuclei.npy",
//!     "cyto_model_location": "models/cyto.npy",
//!     "output_directory": "out",
//!     "channel": "green"
//! }
//! ```
//!
//! 前四个字段是必需的, 其余字段都有默认值. 未知字段会被拒绝.
//! 相对路径相对于当前工作目录解析.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{ASSOCIATION_DISTANCE, FALLBACK_RADIUS_SCALE};
use crate::error::ConfigError;
use crate::IntensityChannel;

/// 运行配置. 只在运行开始时读取一次.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// "pre" 图像目录. 其中自然序第一张图像决定分割结果与基线.
    pub pre_directory_location: PathBuf,

    /// "post" 图像目录.
    pub post_directory_location: PathBuf,

    /// 细胞核分割结果的位置.
    pub nuclei_model_location: PathBuf,

    /// 细胞质分割结果的位置.
    pub cyto_model_location: PathBuf,

    /// 输出目录, 不存在时自动创建.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// 细胞核与细胞质质心的关联距离上限 (像素, 开区间).
    #[serde(default = "default_association_distance")]
    pub association_distance: f64,

    /// 退化圆半径相对细胞核离散度的倍率.
    #[serde(default = "default_fallback_radius_scale")]
    pub fallback_radius_scale: f64,

    /// 多通道图像的强度合成方式.
    #[serde(default)]
    pub channel: IntensityChannel,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_association_distance() -> f64 {
    ASSOCIATION_DISTANCE
}

fn default_fallback_radius_scale() -> f64 {
    FALLBACK_RADIUS_SCALE
}

/// 获取 `{用户配置目录}/cyto-berry/config.json`.
pub fn home_config_path() -> Option<PathBuf> {
    let mut ans = dirs::config_dir()?;
    ans.push("cyto-berry");
    ans.push("config.json");
    Some(ans)
}

impl Config {
    /// 读取、解析并检查 `path` 处的配置文件.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 检查配置: 两个图像目录必须存在, 数值参数必须是正的有限值.
    ///
    /// 分割结果的位置在打开时检查.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [
            ("pre_directory_location", &self.pre_directory_location),
            ("post_directory_location", &self.post_directory_location),
        ] {
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory {
                    field,
                    path: path.clone(),
                });
            }
        }
        for (field, value) in [
            ("association_distance", self.association_distance),
            ("fallback_radius_scale", self.fallback_radius_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} 不是正的有限值"),
                });
            }
        }
        Ok(())
    }
}
