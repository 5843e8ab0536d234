mod config;

use anyhow::Result;

use orrery_engine::logging::{init_logging, LoggingConfig};
use orrery_ui::prelude::*;

use config::{SceneConfig, StudioConfig};

fn main() -> Result<()> {
    let config = match StudioConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(LoggingConfig::default());
            log::error!("{e:#}");
            return Err(e);
        }
    };

    let logging = match &config.debug.log_filter {
        Some(filter) => LoggingConfig::with_filter(filter.as_str()),
        None => LoggingConfig::default(),
    };
    init_logging(logging);
    log::info!("starting {}", config.window.title);

    Application::new()
        .title(config.window.title.clone())
        .size(config.window.width, config.window.height)
        .props(viewport_props(&config))
        .child(color_cycle(&config.scene))
        .child(with_engine_context(EngineReport::default()))
        .run()
}

fn viewport_props(config: &StudioConfig) -> ViewportProps<GpuScene> {
    let viewport = &config.viewport;
    let mut props = ViewportProps::new(|scene: &GpuScene| {
        scene.set_active_camera(Some(Camera::looking_at([0.0, 2.0, -6.0], [0.0; 3])));
        log::info!("scene '{}' ready", scene.label());
    })
    .adapt_to_device_ratio(viewport.adapt_to_device_ratio)
    .observe_canvas_resize(viewport.observe_canvas_resize)
    .render_children_when_ready(viewport.render_children_when_ready)
    .scene_options(SceneOptions {
        clear_color: straight(config.scene.clear_color),
        label:       Some("studio".to_string()),
        load_frames: config.scene.load_frames,
    });

    if let Some(on) = viewport.antialias {
        props = props.antialias(on);
    }
    props
}

fn straight([r, g, b, a]: [f32; 4]) -> Color {
    Color::from_straight(r, g, b, a)
}

/// Drifts the clear color between the configured start and accent colors.
fn color_cycle(config: &SceneConfig) -> RenderHook<GpuScene> {
    let from = straight(config.clear_color);
    let to = straight(config.accent_color);
    let speed = f64::from(config.cycle_speed);

    use_before_render(move |scene: &GpuScene, _: &mut EventState| {
        let elapsed = scene.engine().frame_time().map_or(0.0, |ft| ft.elapsed);
        let phase = (elapsed * speed).fract() as f32;
        let t = 0.5 - 0.5 * (phase * std::f32::consts::TAU).cos();
        scene.set_clear_color(from.lerp(to, t));
    })
}

/// Logs the render target whenever the viewport publishes a new engine.
#[derive(Default)]
struct EngineReport {
    engine:  Option<GpuEngine>,
    changed: bool,
}

impl EngineReport {
    fn report(&mut self) {
        if !std::mem::take(&mut self.changed) {
            return;
        }
        match &self.engine {
            Some(engine) => log::info!(
                "engine attached: {:?} at {} sample(s)",
                engine.render_size(),
                engine.sample_count().unwrap_or(1)
            ),
            None => log::info!("engine detached"),
        }
    }
}

impl Component<GpuScene> for EngineReport {
    fn mount(&mut self, _ctx: &ViewportCtx<GpuScene>) {
        self.report();
    }

    fn update(&mut self, _ctx: &ViewportCtx<GpuScene>) {
        self.report();
    }
}

impl EngineContextConsumer<GpuScene> for EngineReport {
    fn set_engine_context(&mut self, engine_context: EngineContext<GpuEngine>) {
        self.changed |= self.engine != engine_context.engine;
        self.engine = engine_context.engine;
    }
}
