//! 细胞: 细胞核与细胞质的关联, 以及每个细胞的采样区域.
//!
//! 每个检测到的细胞核对应一个 [`Cell`]. 若能在距离上限内找到细胞质实例,
//! 采样区域取该细胞质; 否则以细胞核质心为圆心画一个退化圆. 两种情况下
//! 都要从区域中去掉所有细胞核像素.

mod associate;
mod region;

pub use associate::{Association, MaskAssociator};
pub use region::{Cell, RegionBuilder, RegionSource};

use crate::error::SegmentError;
use crate::InstanceLabels;
use log::debug;

/// 由细胞核与细胞质的实例标签构建所有细胞.
///
/// 细胞按细胞核检测顺序 (实例 id 升序) 编号. 无法提取轮廓的细胞核会被跳过.
pub fn build_cells(
    nuclei: &InstanceLabels,
    cytoplasm: &InstanceLabels,
    association_distance: f64,
    radius_scale: f64,
) -> Result<Vec<Cell>, SegmentError> {
    let builder = RegionBuilder::new(nuclei, cytoplasm, radius_scale)?;
    let associator = MaskAssociator::new(&cytoplasm.outlines(), association_distance);

    let mut cells = Vec::new();
    for outline in nuclei.outlines() {
        let label = outline.label();
        let association = associator.associate(&outline);
        match builder.build(cells.len(), outline, association) {
            Some(cell) => {
                if cell.source().is_fallback() {
                    debug!("细胞核 {label} 未关联到细胞质, 使用退化圆 {:?}", cell.source());
                }
                cells.push(cell);
            }
            None => debug!("细胞核 {label} 轮廓为空, 已跳过"),
        }
    }
    Ok(cells)
}
