//! Stand-in host engine: a few meshes, orbit cameras and a lit forward renderer.

mod camera;
mod programs;
mod renderer;
mod scene;

pub use camera::OrbitCamera;
pub use programs::DemoPrograms;
pub use renderer::SceneRenderer;
pub use scene::DemoScene;
