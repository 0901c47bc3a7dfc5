use std::path::PathBuf;

use gl_wrapper::backend::GlRef;
use gl_wrapper::program::ShaderError;
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::TextureError;
use gl_wrapper::vertex_array::VAError;

use thiserror::Error;

/// Everything a demo needs to build its GPU resources.
pub struct DemoContext {
    pub gl: GlRef,
    pub resources: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl DemoContext {
    /// Path of `name` inside the resource directory.
    pub fn resource(&self, name: &str) -> PathBuf {
        self.resources.join(name)
    }
}

/// Per-frame hooks of one demo.
///
/// Hooks are called in order update, render, UI. Rendering gets `&self`, so it
/// cannot change what the demo simulates.
pub trait Demo {
    fn on_update(&mut self, _delta_time: f32) {}

    fn on_render(&self, _renderer: &GlRenderer) {}

    fn on_imgui_render(&mut self, _ui: &imgui::Ui) {}
}

type DemoFactory = Box<dyn Fn(&DemoContext) -> Result<Box<dyn Demo>, DemoError>>;

struct MenuEntry {
    name: String,
    factory: DemoFactory,
}

/// Registered demos and the one picked from the menu, if any.
#[derive(Default)]
pub struct DemoMenu {
    entries: Vec<MenuEntry>,
    selected: Option<usize>,
}

impl DemoMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a demo under `name`. A second registration of a name replaces the
    /// factory and keeps the menu position.
    pub fn register<D, F>(&mut self, name: impl Into<String>, factory: F)
    where
        D: Demo + 'static,
        F: Fn(&DemoContext) -> Result<D, DemoError> + 'static,
    {
        let name = name.into();
        let factory: DemoFactory =
            Box::new(move |ctx| factory(ctx).map(|demo| Box::new(demo) as Box<dyn Demo>));

        match self.position(&name) {
            Some(i) => {
                log::warn!("Demo '{name}' registered twice, keeping the latest");
                self.entries[i].factory = factory;
            }
            None => self.entries.push(MenuEntry { name, factory }),
        }
    }

    pub fn with<D, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        D: Demo + 'static,
        F: Fn(&DemoContext) -> Result<D, DemoError> + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Marks `name` as picked. Returns false for unknown names.
    pub fn select(&mut self, name: &str) -> bool {
        self.selected = self.position(name);
        self.selected.is_some()
    }

    pub fn take_selection(&mut self) -> Option<usize> {
        self.selected.take()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn build(&self, index: usize, ctx: &DemoContext) -> Result<Box<dyn Demo>, DemoError> {
        (self.entries[index].factory)(ctx)
    }
}

impl Demo for DemoMenu {
    fn on_imgui_render(&mut self, ui: &imgui::Ui) {
        let mut picked = None;

        for entry in &self.entries {
            if ui.button(&entry.name) {
                picked = Some(entry.name.clone());
            }
        }

        if let Some(name) = picked {
            self.select(&name);
        }
    }
}

/// The single owner of whatever is on screen.
pub enum ActiveDemo {
    Menu,
    Demo { name: String, demo: Box<dyn Demo> },
}

/// Holds the menu for the whole run and at most one live demo.
pub struct DemoHost {
    ctx: DemoContext,
    menu: DemoMenu,
    active: ActiveDemo,
}

impl DemoHost {
    pub fn new(ctx: DemoContext, menu: DemoMenu) -> Self {
        Self {
            ctx,
            menu,
            active: ActiveDemo::Menu,
        }
    }

    pub fn menu(&self) -> &DemoMenu {
        &self.menu
    }

    pub fn is_menu_active(&self) -> bool {
        matches!(self.active, ActiveDemo::Menu)
    }

    pub fn active_name(&self) -> Option<&str> {
        match &self.active {
            ActiveDemo::Menu => None,
            ActiveDemo::Demo { name, .. } => Some(name),
        }
    }

    /// Builds the demo registered as `name` and makes it active.
    ///
    /// On failure the menu stays active.
    pub fn activate(&mut self, name: &str) -> Result<(), DemoError> {
        let index = self
            .menu
            .position(name)
            .ok_or_else(|| DemoError::Unknown(name.to_owned()))?;

        self.activate_index(index)
    }

    /// Drops the active demo and returns to the menu.
    pub fn back(&mut self) {
        if let ActiveDemo::Demo { name, demo } = std::mem::replace(&mut self.active, ActiveDemo::Menu)
        {
            drop(demo);
            log::info!("Left demo '{name}'");
        }
    }

    /// Starts the demo picked in the menu since the last call.
    pub fn apply_selection(&mut self) {
        if let Some(index) = self.menu.take_selection() {
            // the error is already logged, the menu stays up
            let _ = self.activate_index(index);
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        self.current_mut().on_update(delta_time);
    }

    pub fn render(&self, renderer: &GlRenderer) {
        self.current().on_render(renderer);
    }

    pub fn imgui(&mut self, ui: &imgui::Ui) {
        let mut go_back = false;

        ui.window("Demo")
            .always_auto_resize(true)
            .build(|| {
                if !self.is_menu_active() && ui.button("<--") {
                    go_back = true;
                }

                self.current_mut().on_imgui_render(ui);
            });

        if go_back {
            self.back();
        }

        self.apply_selection();
    }

    fn activate_index(&mut self, index: usize) -> Result<(), DemoError> {
        self.back();

        let name = self.menu.entries[index].name.clone();

        match self.menu.build(index, &self.ctx) {
            Ok(demo) => {
                log::info!("Entered demo '{name}'");
                self.active = ActiveDemo::Demo { name, demo };
                Ok(())
            }
            Err(e) => {
                log::error!("Cannot start demo '{name}': {e}");
                Err(e)
            }
        }
    }

    fn current(&self) -> &dyn Demo {
        match &self.active {
            ActiveDemo::Menu => &self.menu,
            ActiveDemo::Demo { demo, .. } => &**demo,
        }
    }

    fn current_mut(&mut self) -> &mut dyn Demo {
        match &mut self.active {
            ActiveDemo::Menu => &mut self.menu,
            ActiveDemo::Demo { demo, .. } => &mut **demo,
        }
    }
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("No demo named '{0}'")]
    Unknown(String),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    VertexArray(#[from] VAError),
}
