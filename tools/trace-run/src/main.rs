//! 对 "pre"/"post" 两组荧光图像做逐细胞强度时间序列定量.
//!
//! 用法: `trace-run [config.json]`.

mod result;
mod runner;

use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> anyhow::Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;

    let report = runner::run()?;
    result::RunSummary::new(report).analyze()?;
    Ok(())
}
