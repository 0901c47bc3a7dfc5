use glutin::config::{Config as GlutinConfig, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::{c_void, CString};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use imgui::FontSource;
use imgui_glow_renderer::AutoRenderer;
use imgui_winit_support::{HiDpiMode, WinitPlatform};

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::backend::{GlRef, NativeGl};
use gl_wrapper::renderer::GlRenderer;

use crate::config::Config;
use crate::demo::{DemoContext, DemoError, DemoHost};
use crate::demos;

pub struct App {
    event_loop: EventLoop<()>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    imgui: imgui::Context,
    platform: WinitPlatform,
    imgui_renderer: AutoRenderer,
    renderer: GlRenderer,
    host: DemoHost,
}

impl App {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(config.width, config.height)))
            .with_title(&config.title);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|best, c| {
                        if c.num_samples() > best.num_samples() {
                            c
                        } else {
                            best
                        }
                    })
                    // glutin fails before picking when nothing matches the template
                    .expect("at least one matching config")
            })
            .map_err(|e| AppError::Window(e.to_string()))?;

        let window = window.ok_or(AppError::NoWindow)?;
        let handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(handle));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        let interval = if config.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_window.surface.set_swap_interval(&gl_context, interval) {
            log::warn!("Cannot set swap interval: {e}");
        }

        let loader = |s: &str| -> *const c_void {
            match CString::new(s) {
                Ok(s) => gl_display.get_proc_address(s.as_c_str()).cast(),
                Err(_) => std::ptr::null(),
            }
        };

        let gl: GlRef = Rc::new(NativeGl::load_with(loader));
        let glow = unsafe { glow::Context::from_loader_function(loader) };

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        imgui.style_mut().use_dark_colors();
        imgui
            .fonts()
            .add_font(&[FontSource::DefaultFontData { config: None }]);

        let mut platform = WinitPlatform::init(&mut imgui);
        platform.attach_window(imgui.io_mut(), &gl_window.window, HiDpiMode::Default);

        let imgui_renderer = AutoRenderer::initialize(glow, &mut imgui)
            .map_err(|e| AppError::ImGui(format!("{e:?}")))?;

        let renderer = GlRenderer::new(&gl);
        renderer.resize(config.width, config.height);

        let ctx = DemoContext {
            gl,
            resources: config.resources,
            width: config.width,
            height: config.height,
        };
        let mut host = DemoHost::new(ctx, demos::menu());

        log::info!(
            "Registered demos: {}",
            host.menu().names().collect::<Vec<_>>().join(", ")
        );

        if let Some(start) = config.start_demo {
            if let Err(DemoError::Unknown(name)) = host.activate(&start) {
                log::warn!("No demo named '{name}', showing the menu");
            }
        }

        Ok(Self {
            event_loop,
            gl_context,
            gl_window,
            imgui,
            platform,
            imgui_renderer,
            renderer,
            host,
        })
    }

    pub fn run(self) -> ! {
        let Self {
            event_loop,
            gl_context,
            gl_window,
            mut imgui,
            mut platform,
            mut imgui_renderer,
            renderer,
            mut host,
        } = self;

        let mut last_frame = Instant::now();

        event_loop.run(move |event, _window_target, control_flow| {
            control_flow.set_poll();
            platform.handle_event(imgui.io_mut(), &gl_window.window, &event);

            match event {
                Event::NewEvents(_) => {
                    let now = Instant::now();
                    imgui.io_mut().update_delta_time(now - last_frame);
                    last_frame = now;
                }
                Event::MainEventsCleared => {
                    if let Err(e) = platform.prepare_frame(imgui.io_mut(), &gl_window.window) {
                        log::error!("Cannot prepare ImGui frame: {e}");
                    }
                    gl_window.window.request_redraw();
                }
                Event::RedrawRequested(_) => {
                    let delta_time = imgui.io().delta_time;

                    renderer.set_clear_color(0.0, 0.0, 0.0, 1.0);
                    renderer.clear();

                    host.update(delta_time);
                    host.render(&renderer);

                    let ui = imgui.new_frame();
                    host.imgui(ui);
                    platform.prepare_render(ui, &gl_window.window);

                    let draw_data = imgui.render();
                    if let Err(e) = imgui_renderer.render(draw_data) {
                        log::error!("ImGui render failed: {e:?}");
                    }

                    if let Err(e) = gl_window.surface.swap_buffers(&gl_context) {
                        log::error!("Cannot swap buffers: {e}");
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let (Some(w), Some(h)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        {
                            gl_window.surface.resize(&gl_context, w, h);
                            renderer.resize(size.width, size.height);
                        }
                    }
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    _ => (),
                },
                Event::LoopDestroyed => {
                    // demo resources go while the context is still current
                    host.back();
                }
                _ => (),
            }
        })
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &GlutinConfig) -> Result<Self, AppError> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let raw_window_handle = window.raw_window_handle();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width).ok_or(AppError::ZeroSize)?,
            NonZeroU32::new(height).ok_or(AppError::ZeroSize)?,
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { surface, window })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot create window: {0}")]
    Window(String),
    #[error("Display did not create a window")]
    NoWindow,
    #[error("Window has zero size")]
    ZeroSize,
    #[error(transparent)]
    Gl(#[from] glutin::error::Error),
    #[error("Cannot set up ImGui renderer: {0}")]
    ImGui(String),
}
