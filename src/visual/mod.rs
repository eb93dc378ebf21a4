pub mod anchors;
pub mod blur;
pub mod lod;

pub use anchors::generate_anchors;
pub use blur::BlurDriver;
pub use lod::{EffectSink, LodLevel, VisualDriver, detail_key, local_key};
