/// Simulation state storage: two 8-bit unorm channels (discrete, continuous)
pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg8Unorm;

/// The sim runs at 1/2 of the viewport resolution on each axis (75% fewer cells)
pub const STATE_RESOLUTION_DIVISOR: u32 = 2;

/// Compute shader workgroup size for the simulation step
pub const SIM_WORKGROUP_SIZE: [u32; 3] = [8, 8, 1];

/// Depth format used by the host scene and the resampled depth copy
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Views that haven't rendered for this many frames get their data dropped
pub const STALE_VIEW_FRAMES: u64 = 120;

// ============================================
// Output Slot Defaults
// ============================================

/// Below this neighbor aggregate a cell dies of underpopulation
pub const DEFAULT_THRESHOLD_TOO_FEW: f32 = 2.0;

/// At or above this aggregate (and not overpopulated) a dead cell comes alive
pub const DEFAULT_THRESHOLD_RESURRECT: f32 = 2.5;

/// Above this aggregate a cell dies of overpopulation
pub const DEFAULT_THRESHOLD_TOO_MANY: f32 = 3.0;

/// Mesh pass outputs when the mesh program leaves them unwired
pub const DEFAULT_MESH_DISCRETE: f32 = 0.5;
pub const DEFAULT_MESH_CONTINUOUS: f32 = 0.5;
pub const DEFAULT_MESH_ALPHA: f32 = 1.0;

/// Overlay opacity when the display program leaves it unwired
pub const DEFAULT_DISPLAY_OPACITY: f32 = 1.0;

/// Overlay depth when the display program leaves it unwired.
///
/// The near plane: the composite passes the depth test everywhere, so the
/// overlay covers scene geometry and writes near depth over its whole view
/// rect. Passes drawn after it in the same view are hidden there. Programs
/// that want geometry to occlude the overlay wire `gol_display_pixel_depth`.
pub const DEFAULT_DISPLAY_DEPTH: f32 = 0.0;

/// Ray-march effect: loop cutoff and step length defaults
pub const DEFAULT_RAY_MAX_LOOPS: f32 = 100.0;
pub const DEFAULT_RAY_STEP_LENGTH: f32 = 1.0;

// ============================================
// Demo Host
// ============================================

/// Initial window size (physical pixels)
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

/// How often the driving thread advances simulation time
pub const SIM_TICK_HZ: f32 = 15.0;

/// Scene clear color (linear)
pub const SCENE_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.55,
    g: 0.62,
    b: 0.72,
    a: 1.0,
};

/// Orbit camera defaults
pub const CAMERA_DISTANCE: f32 = 9.0;
pub const CAMERA_HEIGHT: f32 = 5.0;
pub const CAMERA_FOV_Y_DEGREES: f32 = 55.0;
pub const CAMERA_ORBIT_SPEED: f32 = 0.15;
