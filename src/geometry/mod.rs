pub mod curve;
pub mod line;

pub use curve::{Arc, BoundaryCurve, Curve, Segment};
pub use line::Line;
