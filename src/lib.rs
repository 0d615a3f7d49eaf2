pub mod display;
pub mod error;
pub mod geometry;
pub mod math;
pub mod propagation;
pub mod ray;
pub mod region;
pub mod scene;
pub mod source;

pub use error::{OpticsError, Result};
pub use geometry::Line;
pub use math::{Point2, Tolerance, Vector2};
pub use propagation::TraceConfig;
pub use ray::{Part, Ray, RayStatus};
pub use region::Region;
pub use scene::{PropagationReport, RayId, RegionId, Scene, SourceId};
pub use source::{Beam, BeamParams};
