use thiserror::Error;

/// Failures while turning a user-authored program into a GPU pipeline.
///
/// These are never fatal: the pass that needed the program is skipped
/// for the frame and the failure is reported once.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program '{program}' does not define required output '{schema}.{slot}'")]
    MissingRequiredSlot {
        program: String,
        schema: &'static str,
        slot: &'static str,
    },

    #[error("program '{program}' failed to compile for {pass}: {message}")]
    Compile {
        program: String,
        pass: String,
        message: String,
    },
}

/// Failures while bringing up the GPU.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface not supported by adapter '{0}'")]
    SurfaceUnsupported(String),

    #[error("adapter '{0}' cannot write the simulation state format from compute shaders")]
    StateFormatUnsupported(String),
}
