//! 运行结果.

use cyto_berry::pipeline::RunReport;
use std::io::{self, Write};

/// 将 `report` 的摘要写进 `w` 中.
fn describe_into<W: Write>(r: &RunReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Run summary:")?;
    writeln!(w, "{S4}Cells: {}", r.cells())?;
    writeln!(w, "{S4}Matched with cytoplasm: {}", r.matched_cells())?;
    writeln!(w, "{S4}Fallback circles: {}", r.fallback_cells())?;
    writeln!(w, "{S4}Images: {} pre + {} post", r.pre_images(), r.post_images())?;
    writeln!(w, "{S4}Anomalies: {}", r.anomalies().len())?;
    for a in r.anomalies() {
        writeln!(w, "{S4}{S4}cell {} @ `{}`: {}", a.cell, a.image, a.kind)?;
    }

    let m = r.matrix();
    for (i, row) in m.rows().enumerate() {
        let last = row.last().copied().flatten();
        writeln!(w, "{S4}Cell {i}: last value {}", f64_to_display(last))?;
    }

    writeln!(w, "{S4}Outputs:")?;
    for p in r.outputs() {
        writeln!(w, "{S4}{S4}{}", p.display())?;
    }
    write!(w, "{S4}Elapsed: {:.3} s", r.elapsed().as_secs_f64())?;
    Ok(())
}

/// 运行结果摘要.
pub struct RunSummary {
    report: RunReport,
}

impl RunSummary {
    pub fn new(report: RunReport) -> Self {
        Self { report }
    }

    /// 把运行结果输出到标准输出.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        utils::sep_to(&mut out)?;
        describe_into(&self.report, &mut out)?;
        writeln!(out)?;
        utils::sep_to(&mut out)
    }
}
