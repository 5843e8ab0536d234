use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::paint::Color;

use super::surface::{self, RenderTarget, SurfaceErrorAction};
use super::EngineOptions;

/// Device, queue and render target for one window.
///
/// The surface keeps its own `Arc<Window>`, so a `Gpu` never borrows from
/// the host that created the window.
pub struct Gpu {
    device: wgpu::Device,
    queue:  wgpu::Queue,
    target: RenderTarget,
}

impl Gpu {
    /// Binds a new device to `window` and configures a `size` target with
    /// up to `sample_count` samples.
    pub async fn new(
        window: Arc<Window>,
        size: PhysicalSize<u32>,
        sample_count: u32,
        options: EngineOptions,
    ) -> Result<Self> {
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let wgpu_surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:       options.power_preference,
                compatible_surface:     Some(&wgpu_surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label:                 Some("orrery device"),
                required_features:     options.required_features,
                required_limits:       options.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints:          wgpu::MemoryHints::Performance,
                trace:                 wgpu::Trace::Off,
            })
            .await
            .context("failed to open GPU device")?;

        let caps = wgpu_surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, options.prefer_srgb)
            .context("surface reports no formats")?;
        let samples = surface::choose_sample_count(&adapter, format, sample_count);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: options.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, options.alpha_mode),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: options.desired_maximum_frame_latency,
        };
        let target = RenderTarget::new(wgpu_surface, &device, config, samples);

        log::debug!("gpu ready: {}x{} {format:?}, {samples} sample(s)", size.width, size.height);
        Ok(Self { device, queue, target })
    }

    /// Current render-target size in pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.target.size()
    }

    pub fn sample_count(&self) -> u32 {
        self.target.sample_count()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.target.resize(&self.device, size);
    }

    /// Clears the next swapchain image to `color` and presents it.
    pub fn present_clear(&self, color: Color) -> std::result::Result<(), SurfaceError> {
        let image = self.target.acquire()?;
        let image_view = image.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("orrery clear encoder"),
        });

        {
            let (view, resolve_target) = self.target.attachment(&image_view);
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orrery clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(to_wgpu(color)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(image_view);
        image.present();
        Ok(())
    }

    /// Reacts to a failed acquisition, reconfiguring the surface if that helps.
    pub fn recover(&self, err: SurfaceError) -> SurfaceErrorAction {
        self.target.recover(&self.device, err)
    }
}

fn to_wgpu(c: Color) -> wgpu::Color {
    wgpu::Color { r: f64::from(c.r), g: f64::from(c.g), b: f64::from(c.b), a: f64::from(c.a) }
}
