mod intensity;
mod labels;
mod mask;
mod save;
mod window;

pub use intensity::{IntensityChannel, IntensityImage};
pub use labels::InstanceLabels;
pub use mask::Mask;
pub(crate) use save::windowed_gray;
pub use window::IntensityWindow;
