pub mod depth;
pub mod edges;
pub mod filter;
pub mod palette;
pub mod tint;

pub use depth::{DepthInput, depth, raw_depth, stereo_offset};
pub use edges::{EdgeMap, sobel_magnitude};
pub use filter::{ColorFilter, CropRegion};
pub use palette::extract_dominant_colors;
pub use tint::TintTable;
