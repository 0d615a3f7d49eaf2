//! OPL tilt: a beam entering a block whose far face is a circular arc.
//!
//! Each ray is drawn up to the same optical path length, so the drawn
//! end points trace the wavefront tilted by the arc.
//!
//! Usage:
//! ```text
//! cargo run --example opl_tilt
//! RUST_LOG=geoptics=trace cargo run --example opl_tilt
//! ```

use geoptics::display::{DisplayLength, PathRegistry};
use geoptics::{Beam, BeamParams, Line, Point2, Region, Result, Scene, Vector2};
use tracing::info;

/// Optical path length drawn for every ray.
const OPL: f64 = 250.0;

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for geoptics and this demo.
    // Override with RUST_LOG env var (e.g. RUST_LOG=geoptics=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("opl_tilt=info".parse().unwrap_or_default())
        .add_directive("geoptics=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut scene = Scene::new();

    let mut block = Region::new(1.5)?;
    block.start(Point2::new(70.0, 60.0))?;
    block.add_line(Point2::new(70.0, 190.0))?;
    block.add_line(Point2::new(110.0, 190.0))?;
    block.add_arc(Point2::new(110.0, 60.0), Vector2::new(10.0, -20.0))?;
    block.close()?;
    scene.add_region(block)?;

    let beam = Beam::new(BeamParams::new(
        Line::new(Point2::new(10.0, 50.0), Vector2::new(108.0, 0.0))?,
        Line::new(Point2::new(10.0, 80.0), Vector2::new(108.0, 0.0))?,
        100.0,
        100.0,
        6,
    ))?;
    let source = scene.add_source(beam)?;
    scene.translate_source(source, Vector2::new(0.0, 40.0))?;

    let report = scene.propagate()?.into_result()?;

    let mut registry = PathRegistry::new(DisplayLength::OpticalPath(OPL));
    registry.sync(&scene, &report);

    for (id, ray) in scene.source_rays(source)? {
        let Some(path) = registry.path(id) else {
            continue;
        };
        let vertices: Vec<String> = path
            .iter()
            .map(|p| format!("({:.3}, {:.3})", p.x, p.y))
            .collect();
        info!(
            parts = ray.parts().len(),
            status = ?ray.status(),
            "path {}",
            vertices.join(" -> ")
        );
    }
    Ok(())
}
