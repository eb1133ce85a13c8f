// Window and event loop for Starfield-3D

use crate::assets::TextureLoader;
use crate::config::Config;
use crate::error::Result;
use crate::renderer::Renderer;
use crate::scroll::{PageScroll, ScrollInput};
use crate::showcase::Showcase;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{Window, WindowBuilder},
};

pub struct App {
    window: Arc<Window>,
    renderer: Renderer,
    showcase: Showcase,
    page: PageScroll,
    textures: TextureLoader,
    follow_resize: bool,
    occluded: bool,
}

impl App {
    /// Opens the window, builds the scene and draws it once.
    pub async fn new(event_loop: &EventLoop<()>, config: Config) -> Result<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title("Starfield-3D")
                .with_inner_size(LogicalSize::new(config.width, config.height))
                .build(event_loop)?,
        );

        // Aspect ratio is captured here once
        let size = window.inner_size();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut showcase = Showcase::build(&config, aspect, &mut rng);

        let viewport_height = size.to_logical::<f32>(window.scale_factor()).height;
        let page = PageScroll::new(config.page_height, viewport_height, config.line_height);

        let textures = TextureLoader::spawn(&showcase.scene.textures);
        log::info!("Loading {} textures from {}", textures.pending(), config.assets.display());

        let mut renderer = Renderer::new(window.clone(), &showcase.scene, &showcase.camera).await?;
        // The scroll handler also runs once at load with the initial offset
        showcase.start(page.top(), |s| renderer.render(&s.scene, &s.camera))?;

        Ok(Self {
            window,
            renderer,
            showcase,
            page,
            textures,
            follow_resize: config.follow_resize,
            occluded: false,
        })
    }

    /// Runs until the window is closed.
    pub fn run(mut self, event_loop: EventLoop<()>) -> Result<()> {
        event_loop.run(move |event, target| {
            match event {
                Event::WindowEvent { window_id, event } if window_id == self.window.id() => {
                    self.handle_window_event(event, target);
                }
                Event::AboutToWait => {
                    // Re-arm the frame driver; presentation is vsync paced
                    if !self.occluded {
                        self.window.request_redraw();
                    }
                }
                _ => {}
            }
        })?;
        Ok(())
    }

    fn handle_window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                target.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(physical_size);
            }
            WindowEvent::Occluded(occluded) => {
                log::debug!("Window occluded: {occluded}");
                self.occluded = occluded;
                target.set_control_flow(if occluded {
                    ControlFlow::Wait
                } else {
                    ControlFlow::Poll
                });
                if !occluded {
                    self.window.request_redraw();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(ScrollInput::from_wheel(delta, self.window.scale_factor()));
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Some(input) = ScrollInput::from_key(event.physical_key) {
                    self.scroll(input);
                }
            }
            WindowEvent::RedrawRequested => {
                if self.occluded {
                    return;
                }
                if let Err(e) = self.frame() {
                    log::error!("Rendering failed: {e}");
                    target.exit();
                }
            }
            _ => {}
        }
    }

    // One frame tick: pick up finished textures, animate, draw
    fn frame(&mut self) -> Result<()> {
        for loaded in self.textures.poll() {
            self.renderer.upload_texture(&self.showcase.scene, loaded);
        }
        self.showcase.frame_tick();
        self.renderer.render(&self.showcase.scene, &self.showcase.camera)
    }

    fn scroll(&mut self, input: ScrollInput) {
        if let Some(top) = self.page.apply(input) {
            self.showcase.scroll_tick(top);
        }
    }

    fn resize(&mut self, physical_size: PhysicalSize<u32>) {
        self.renderer.resize(physical_size);

        let logical = physical_size.to_logical::<f32>(self.window.scale_factor());
        self.page.set_viewport_height(logical.height);

        if self.follow_resize {
            let size = self.renderer.size();
            self.showcase
                .camera
                .set_aspect(size.width as f32 / size.height as f32);
            log::debug!("Camera aspect now {:.3}", self.showcase.camera.aspect());
        }
    }
}
