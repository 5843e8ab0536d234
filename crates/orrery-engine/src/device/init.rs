/// Engine construction options.
///
/// Forwarded verbatim from the viewport props to [`crate::engine::GpuEngine`].
/// Two option records compare equal when every field does; a viewport
/// rebuilds its engine whenever the record changes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// FIFO paces the render loop to the display.
    pub present_mode: wgpu::PresentMode,

    /// Ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Frames the surface may queue ahead. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Sample count used when antialiasing is requested.
pub const MSAA_SAMPLES: u32 = 4;
