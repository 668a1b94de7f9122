//! 程序运行函数.

use anyhow::Context;
use cyto_berry::pipeline::{Pipeline, RunReport};
use log::info;
use utils::loader;

/// 实际运行.
pub fn run() -> anyhow::Result<RunReport> {
    let (path, config) = loader::config_from_args_or_env().context("加载配置失败")?;
    info!("使用配置文件 `{}`", path.display());

    let (nuclei, cytoplasm) = loader::open_models(&config).context("打开分割结果失败")?;
    let report = Pipeline::new(config, nuclei, cytoplasm)
        .run()
        .context("运行失败")?;
    Ok(report)
}
