//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Point2dF};

pub use crate::data::{InstanceLabels, IntensityChannel, IntensityImage, IntensityWindow, Mask};
pub use crate::geometry::{centroid, circular_mask, spread, Outline};

pub use crate::cell::{build_cells, Association, Cell, MaskAssociator, RegionBuilder, RegionSource};
pub use crate::series::{normalized_intensity, CellAnomaly, RunState, SeriesSegments, TimeSeriesMatrix};

pub use crate::config::Config;
pub use crate::dataset::{self, image_loader, list_images, natural_cmp};
pub use crate::error::{ConfigError, RunError, RunResult, SampleError, SegmentError};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::segment::{PrecomputedMasks, Segmenter};

#[cfg(feature = "plot")]
pub use crate::render::{draw_cell_indices, draw_series_plot};

pub use crate::consts::{ASSOCIATION_DISTANCE, FALLBACK_RADIUS_SCALE};
