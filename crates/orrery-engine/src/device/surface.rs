use winit::dpi::PhysicalSize;

/// What the engine does after failing to acquire a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may succeed.
    Reconfigured,
    /// Transient; drop this frame only.
    SkipFrame,
    /// Out of memory; the engine cannot keep rendering.
    Fatal,
}

/// Size of the render target for a window of `physical` pixels.
///
/// Adapting to the device ratio renders at full physical resolution;
/// otherwise the target matches the logical size and the compositor scales it.
pub fn render_size(physical: PhysicalSize<u32>, scale_factor: f64, adapt_to_device_ratio: bool) -> PhysicalSize<u32> {
    if adapt_to_device_ratio || scale_factor <= 0.0 || !scale_factor.is_finite() {
        return physical;
    }

    let scale = |v: u32| -> u32 {
        if v == 0 {
            0
        } else {
            ((v as f64 / scale_factor).round() as u32).max(1)
        }
    };

    PhysicalSize::new(scale(physical.width), scale(physical.height))
}

/// First sRGB 8-bit format the surface offers when `prefer_srgb`, else its
/// first format.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    const SRGB: [wgpu::TextureFormat; 2] =
        [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb];

    SRGB.into_iter()
        .filter(|_| prefer_srgb)
        .find(|f| caps.formats.contains(f))
        .or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Falls back to single sampling when the adapter cannot multisample `format`.
pub(crate) fn choose_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    requested: u32,
) -> u32 {
    if requested <= 1 {
        return 1;
    }

    let flags = adapter.get_texture_format_features(format).flags;
    if flags.sample_count_supported(requested) {
        requested
    } else {
        log::warn!("{requested}x MSAA unsupported for {format:?}; rendering without antialiasing");
        1
    }
}

/// Configured surface plus the optional multisampled color buffer that
/// resolves into it.
pub(crate) struct RenderTarget {
    surface:      wgpu::Surface<'static>,
    config:       wgpu::SurfaceConfiguration,
    /// Last requested size; may be zero while the surface keeps its old one.
    size:         PhysicalSize<u32>,
    sample_count: u32,
    msaa:         Option<wgpu::TextureView>,
}

impl RenderTarget {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        device: &wgpu::Device,
        config: wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Self {
        surface.configure(device, &config);
        let size = PhysicalSize::new(config.width, config.height);
        let msaa = msaa_buffer(device, &config, sample_count);
        Self { surface, config, size, sample_count, msaa }
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub(crate) fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Zero sizes (minimized windows) are recorded but not configured.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        if size == self.size {
            return;
        }
        self.size = size;
        if size.width == 0 || size.height == 0 {
            log::trace!("zero-sized render target; keeping the current configuration");
            return;
        }

        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
        self.msaa = msaa_buffer(device, &self.config, self.sample_count);
    }

    pub(crate) fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Color attachment for a pass drawing into `image`: the MSAA buffer
    /// resolving into `image`, or `image` itself.
    pub(crate) fn attachment<'a>(
        &'a self,
        image: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa {
            Some(msaa) => (msaa, Some(image)),
            None => (image, None),
        }
    }

    pub(crate) fn recover(&self, device: &wgpu::Device, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(device, &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

fn msaa_buffer(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label:           Some("orrery msaa target"),
        size:            wgpu::Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count,
        dimension:       wgpu::TextureDimension::D2,
        format:          config.format,
        usage:           wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats:    &[],
    });
    Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapting_keeps_physical_size() {
        let size = PhysicalSize::new(2560, 1440);
        assert_eq!(render_size(size, 2.0, true), size);
    }

    #[test]
    fn logical_size_without_adapting() {
        assert_eq!(
            render_size(PhysicalSize::new(2560, 1440), 2.0, false),
            PhysicalSize::new(1280, 720)
        );
    }

    #[test]
    fn fractional_scale_rounds_and_never_hits_zero() {
        assert_eq!(
            render_size(PhysicalSize::new(1, 3), 1.5, false),
            PhysicalSize::new(1, 2)
        );
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(
            render_size(PhysicalSize::new(0, 0), 2.0, false),
            PhysicalSize::new(0, 0)
        );
    }

    #[test]
    fn bogus_scale_factor_is_ignored() {
        let size = PhysicalSize::new(800, 600);
        assert_eq!(render_size(size, 0.0, false), size);
        assert_eq!(render_size(size, f64::NAN, false), size);
    }
}
