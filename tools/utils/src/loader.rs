//! 对 `cyto-berry` 配置与分割结果加载的更一层封装.

use cyto_berry::config::{home_config_path, Config};
use cyto_berry::error::{ConfigError, SegmentError};
use cyto_berry::segment::PrecomputedMasks;
use std::env;
use std::path::PathBuf;

/// 指定配置文件路径的环境变量.
pub const CONFIG_ENV: &str = "CYTO_BERRY_CONFIG";

/// 当前目录下的默认配置文件名.
pub const DEFAULT_CONFIG: &str = "config.json";

/// 确定配置文件路径.
///
/// 1. 若 `arg` (命令行第一个参数) 非空, 则返回其值;
/// 2. 否则, 若 `env` (环境变量 `$CYTO_BERRY_CONFIG`) 非空, 则返回其值;
/// 3. 否则, 若当前目录下存在 `config.json`, 则返回它;
/// 4. 否则, 若 `{用户配置目录}/cyto-berry/config.json` 存在, 则返回它;
/// 5. 否则, 返回 `config.json` (随后的读取会报告它不存在).
pub fn resolve_config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    if let Some(p) = arg.filter(|s| !s.is_empty()) {
        return PathBuf::from(p);
    }
    if let Some(p) = env.filter(|s| !s.is_empty()) {
        return PathBuf::from(p);
    }
    let local = PathBuf::from(DEFAULT_CONFIG);
    if local.is_file() {
        return local;
    }
    home_config_path().filter(|p| p.is_file()).unwrap_or(local)
}

/// 从命令行参数与环境变量确定配置文件路径. 见 [`resolve_config_path`].
pub fn config_path_from_args_or_env() -> PathBuf {
    resolve_config_path(env::args().nth(1), env::var(CONFIG_ENV).ok())
}

/// 从命令行参数或环境变量指定的位置加载配置.
#[inline]
pub fn config_from_args_or_env() -> Result<(PathBuf, Config), ConfigError> {
    let path = config_path_from_args_or_env();
    let config = Config::load(&path)?;
    Ok((path, config))
}

/// 打开配置中的细胞核、细胞质分割结果.
pub fn open_models(config: &Config) -> Result<(PrecomputedMasks, PrecomputedMasks), SegmentError> {
    let nuclei = PrecomputedMasks::open(&config.nuclei_model_location)?;
    let cytoplasm = PrecomputedMasks::open(&config.cyto_model_location)?;
    Ok((nuclei, cytoplasm))
}
