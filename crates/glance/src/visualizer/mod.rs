//! The viewer: geometry registry, utility overlays and the frame loop.

mod callback;
mod input;
mod registry;
mod utility;

use std::path::{Path, PathBuf};

use glance_core::{
    share, GeometryId, GlanceError, RenderOption, Result, SharedGeometry, Vec3, WindowConfig,
};
use glance_geometry::TriangleMesh;
use glance_render::{
    create_renderer, save_image, Canvas, CoordinateFrameRenderer, GeometryRenderer, RendererId,
    ViewControl, ViewParameters,
};

use crate::backend::{WindowBackend, WindowEvent, WinitBackend};
use callback::{invoke, CallbackSlot};
use registry::{GeometryEntry, GeometryRegistry};
use utility::{Utility, UtilityList};

pub use callback::AnimationCallback;
pub use input::MouseControl;
pub use utility::RenderOptionsMap;

/// Share of the bounding-box max extent used for the coordinate-frame size.
const COORDINATE_FRAME_SCALE: f32 = 0.2;
const COORDINATE_FRAME_MIN_SIZE: f32 = 0.01;

const HELP_TEXT: &str = "\
  -- Mouse view control --
    Left button + drag         : Rotate.
    Ctrl + left button + drag  : Translate.
    Middle button + drag       : Translate.
    Wheel                      : Zoom in/out.
    Shift + wheel              : Change field of view.
    [/]                        : Increase/decrease field of view.
    R                          : Reset view point.
    Ctrl + C / Ctrl + V        : Copy/paste view parameters.
  -- General control --
    Q, Esc                     : Exit window.
    H                          : Print help message.
    P                          : Take a screen capture.
  -- Render mode control --
    L                          : Turn on/off lighting.
    -/=                        : Decrease/increase point size.
    N                          : Turn on/off point cloud normal rendering.
    S                          : Toggle between flat and smooth mesh shading.
    W                          : Turn on/off mesh wireframe.
    Ctrl + B                   : Turn on/off back face rendering.
    I                          : Turn on/off image interpolation.
    T                          : Cycle image stretch mode.
    F                          : Turn on/off the coordinate frame.
    B                          : Toggle black/white background.
  -- Color control --
    0..5                       : Point color: default, color, X, Y, Z, normal.
    Ctrl + 0..5                : Mesh color: default, color, X, Y, Z, normal.";

/// Where a visualizer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No window has been created yet.
    Uninitialized,
    /// A window exists but the loop has not iterated.
    WindowCreated,
    /// The loop has iterated at least once.
    Running,
    /// The window has been destroyed.
    Closed,
}

/// An interactive geometry viewer.
///
/// Geometries are registered by identity: the viewer keeps a clone of the
/// [`SharedGeometry`] handle and binds exactly one renderer to it. Call
/// [`update_geometry`](Self::update_geometry) after mutating a registered
/// geometry; until then what is drawn for it is unspecified.
///
/// A redraw happens only when something marked the viewer dirty: a
/// registry mutation, a camera or option change, a resize or refresh
/// event, or an animation callback returning true. A redraw reuses each
/// renderer's batches; only `update_geometry` and a callback returning true
/// make renderers re-read their geometry.
///
/// Everything runs on the thread that created the window.
///
/// # Example
///
/// ```no_run
/// use glance::{share, PointCloud, SharedGeometry, Vec3, Visualizer, WindowConfig};
///
/// let mut vis = Visualizer::default();
/// vis.create_visualizer_window(WindowConfig::new("points", 800, 600))?;
/// let cloud: SharedGeometry = share(PointCloud::new(vec![Vec3::ZERO, Vec3::X]));
/// vis.add_geometry(cloud, true)?;
/// vis.run()?;
/// # Ok::<(), glance::GlanceError>(())
/// ```
pub struct Visualizer<B: WindowBackend = WinitBackend> {
    backend: B,
    window_config: WindowConfig,
    state: LoopState,
    registry: GeometryRegistry,
    utilities: UtilityList,
    coordinate_frame: Option<RendererId>,
    view_control: ViewControl,
    render_option: RenderOption,
    mouse_control: MouseControl,
    callback: CallbackSlot<Visualizer<B>>,
    redraw_required: bool,
    close_requested: bool,
    saved_view: Option<ViewParameters>,
    events: Vec<WindowEvent>,
}

impl Default for Visualizer<WinitBackend> {
    fn default() -> Self {
        Self::new(WinitBackend::new())
    }
}

impl<B: WindowBackend> Visualizer<B> {
    /// Creates a viewer on `backend`. No window is opened yet.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            window_config: WindowConfig::default(),
            state: LoopState::Uninitialized,
            registry: GeometryRegistry::default(),
            utilities: UtilityList::default(),
            coordinate_frame: None,
            view_control: ViewControl::default(),
            render_option: RenderOption::default(),
            mouse_control: MouseControl::default(),
            callback: CallbackSlot::new(),
            redraw_required: false,
            close_requested: false,
            saved_view: None,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Window lifecycle
    // ========================================================================

    /// Opens the window and its GPU context, then builds the coordinate frame.
    ///
    /// With a window already open, only the title is updated.
    pub fn create_visualizer_window(&mut self, config: WindowConfig) -> Result<()> {
        if self.backend.is_window_created() {
            self.window_config = config;
            self.update_window_title();
            return Ok(());
        }

        if let Err(err) = self.backend.create_window(&config) {
            log::error!("failed to create visualizer window: {err}");
            return Err(err);
        }

        let (width, height) = self
            .backend
            .framebuffer_size()
            .unwrap_or((config.width, config.height));
        self.window_config = config;
        self.state = LoopState::WindowCreated;
        self.close_requested = false;
        self.view_control.resize(width, height);
        self.reset_view_point(true);
        log::info!(
            "visualizer window \"{}\" created ({width}x{height})",
            self.window_config.title
        );
        Ok(())
    }

    /// Releases every renderer and closes the window.
    ///
    /// Registered geometries are unregistered along with their renderers.
    /// Safe to call in any state and more than once.
    pub fn destroy_visualizer_window(&mut self) {
        let released: Vec<RendererId> = self
            .registry
            .drain()
            .map(|entry| entry.renderer.id())
            .chain(self.utilities.clear().into_iter().map(|u| u.renderer.id()))
            .collect();
        self.release_renderers(&released);
        self.coordinate_frame = None;

        let had_window = self.backend.is_window_created();
        self.backend.destroy_window();
        if had_window {
            log::info!(
                "visualizer window destroyed ({} renderers released)",
                released.len()
            );
        }
        self.state = LoopState::Closed;
        self.redraw_required = false;
    }

    /// Returns true while the window is open.
    pub fn is_window_created(&self) -> bool {
        self.backend.is_window_created()
    }

    // ========================================================================
    // Geometry registry
    // ========================================================================

    /// Registers a geometry and binds a new renderer to it.
    ///
    /// Fails without changing anything if no window is open, the geometry is
    /// already registered, or no renderer supports its kind. With
    /// `reset_bounding_box`, the camera is re-framed on all geometries.
    pub fn add_geometry(&mut self, geometry: SharedGeometry, reset_bounding_box: bool) -> Result<()> {
        if !self.backend.is_window_created() {
            log::warn!("add_geometry called before the window was created");
            return Err(GlanceError::WindowNotCreated);
        }

        let id = GeometryId::of(&geometry);
        if self.registry.contains(id) {
            log::warn!("geometry {id} is already registered");
            return Err(GlanceError::DuplicateGeometry);
        }

        let kind = geometry
            .read()
            .map_err(|_| GlanceError::GeometryLockPoisoned)?
            .kind();
        let Some(mut renderer) = create_renderer(&geometry) else {
            log::warn!("no renderer for geometry kind {kind}");
            return Err(GlanceError::UnsupportedGeometry(kind));
        };
        if !renderer.initialize(&geometry) {
            log::warn!("renderer rejected {kind} geometry {id}");
            return Err(GlanceError::UnsupportedGeometry(kind));
        }

        self.registry.insert(id, GeometryEntry { geometry, renderer });
        log::debug!(
            "added {kind} geometry {id} ({} registered)",
            self.registry.len()
        );

        if reset_bounding_box {
            self.reset_view_point(true);
        }
        self.update_render();
        Ok(())
    }

    /// Unregisters a geometry and releases its renderer.
    pub fn remove_geometry(
        &mut self,
        geometry: &SharedGeometry,
        reset_bounding_box: bool,
    ) -> Result<()> {
        let id = GeometryId::of(geometry);
        let Some(entry) = self.registry.remove(id) else {
            log::warn!("remove_geometry: geometry {id} is not registered");
            return Err(GlanceError::GeometryNotRegistered);
        };
        self.release_renderers(&[entry.renderer.id()]);
        log::debug!(
            "removed geometry {id} ({} registered)",
            self.registry.len()
        );

        if reset_bounding_box {
            self.reset_view_point(true);
        }
        self.update_render();
        Ok(())
    }

    /// Unregisters every geometry. The coordinate frame stays.
    pub fn clear_geometries(&mut self) {
        let released: Vec<RendererId> = self
            .registry
            .drain()
            .map(|entry| entry.renderer.id())
            .collect();
        self.release_renderers(&released);
        log::debug!("cleared {} geometries", released.len());
        self.update_render();
    }

    /// Tells renderers to re-read their geometry.
    ///
    /// With `Some`, only that geometry's renderer resyncs; with `None`, all do.
    pub fn update_geometry(&mut self, geometry: Option<&SharedGeometry>) -> Result<()> {
        match geometry {
            Some(geometry) => {
                let id = GeometryId::of(geometry);
                let Some(entry) = self.registry.get_mut(id) else {
                    log::warn!("update_geometry: geometry {id} is not registered");
                    return Err(GlanceError::GeometryNotRegistered);
                };
                resync(entry);
            }
            None => self.registry.values_mut().for_each(resync),
        }
        self.update_render();
        Ok(())
    }

    /// Returns true if any geometry is registered.
    pub fn has_geometry(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Returns the number of registered geometries.
    pub fn geometry_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the number of live geometry renderers.
    pub fn geometry_renderer_count(&self) -> usize {
        self.registry.renderer_count()
    }

    /// Returns true if `geometry` is registered.
    pub fn contains_geometry(&self, geometry: &SharedGeometry) -> bool {
        self.registry.contains(GeometryId::of(geometry))
    }

    /// Returns handles to every registered geometry, in no particular order.
    pub fn geometries(&self) -> Vec<SharedGeometry> {
        self.registry
            .values()
            .map(|entry| entry.geometry.clone())
            .collect()
    }

    /// Shows or hides a registered geometry without unregistering it.
    pub fn set_geometry_visible(&mut self, geometry: &SharedGeometry, visible: bool) -> Result<()> {
        let entry = self
            .registry
            .get_mut(GeometryId::of(geometry))
            .ok_or(GlanceError::GeometryNotRegistered)?;
        entry.renderer.set_visible(visible);
        self.update_render();
        Ok(())
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Adds an overlay drawn after the registered geometries.
    ///
    /// With `option`, the overlay renders with its own option instead of the
    /// global one.
    pub fn add_utility(
        &mut self,
        geometry: SharedGeometry,
        option: Option<RenderOption>,
    ) -> Result<RendererId> {
        if !self.backend.is_window_created() {
            return Err(GlanceError::WindowNotCreated);
        }
        let kind = geometry
            .read()
            .map_err(|_| GlanceError::GeometryLockPoisoned)?
            .kind();
        let mut renderer = create_renderer(&geometry).ok_or(GlanceError::UnsupportedGeometry(kind))?;
        if !renderer.initialize(&geometry) {
            return Err(GlanceError::UnsupportedGeometry(kind));
        }
        let id = self.utilities.push(
            Utility {
                geometry,
                renderer,
                permanent: false,
            },
            option,
        );
        self.update_render();
        Ok(id)
    }

    /// Removes an overlay and its option binding.
    pub fn remove_utility(&mut self, id: RendererId) -> Result<()> {
        let utility = self.utilities.remove(id)?;
        self.release_renderers(&[utility.renderer.id()]);
        self.update_render();
        Ok(())
    }

    /// Binds a render option to an overlay.
    pub fn set_utility_render_option(&mut self, id: RendererId, option: RenderOption) -> Result<()> {
        self.utilities.bind_option(id, option)?;
        self.update_render();
        Ok(())
    }

    /// Returns the option an overlay renders with.
    pub fn utility_render_option(&self, id: RendererId) -> Option<&RenderOption> {
        self.utilities
            .contains(id)
            .then(|| self.utilities.options().lookup(id, &self.render_option))
    }

    /// Returns the geometry an overlay draws.
    pub fn utility_geometry(&self, id: RendererId) -> Option<SharedGeometry> {
        self.utilities.get(id).map(|u| u.geometry.clone())
    }

    /// Returns the per-overlay option bindings.
    pub fn render_options_map(&self) -> &RenderOptionsMap {
        self.utilities.options()
    }

    /// Returns the number of overlays, the coordinate frame included.
    pub fn utility_count(&self) -> usize {
        self.utilities.len()
    }

    /// Returns the renderer id of the coordinate frame.
    pub fn coordinate_frame(&self) -> Option<RendererId> {
        self.coordinate_frame
    }

    /// Builds or rebuilds the coordinate frame to fit the view bounding box.
    ///
    /// The frame sits at the box's minimum corner. An empty box gets a unit
    /// frame at the origin.
    pub fn build_utilities(&mut self) -> Result<()> {
        if !self.backend.is_window_created() {
            return Err(GlanceError::WindowNotCreated);
        }

        let bbox = self.view_control.bounding_box();
        let (size, origin) = if bbox.is_empty() {
            (1.0, Vec3::ZERO)
        } else {
            (
                (COORDINATE_FRAME_SCALE * bbox.max_extent()).max(COORDINATE_FRAME_MIN_SIZE),
                bbox.min,
            )
        };
        let geometry: SharedGeometry = share(TriangleMesh::create_coordinate_frame(size, origin));

        match self.coordinate_frame.and_then(|id| self.utilities.get_mut(id)) {
            Some(frame) => {
                if !frame.renderer.initialize(&geometry) {
                    return Err(GlanceError::Render(
                        "coordinate frame renderer rejected its mesh".into(),
                    ));
                }
                frame.geometry = geometry;
            }
            None => {
                let mut renderer: Box<dyn GeometryRenderer> =
                    Box::new(CoordinateFrameRenderer::new());
                if !renderer.initialize(&geometry) {
                    return Err(GlanceError::Render(
                        "coordinate frame renderer rejected its mesh".into(),
                    ));
                }
                let id = self.utilities.push(
                    Utility {
                        geometry,
                        renderer,
                        permanent: true,
                    },
                    None,
                );
                self.coordinate_frame = Some(id);
            }
        }
        self.update_render();
        Ok(())
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Registers the animation callback, replacing any previous one.
    ///
    /// Replacing the callback from inside itself takes effect on the next
    /// loop iteration.
    pub fn register_animation_callback(
        &mut self,
        callback: impl FnMut(&mut Self) -> bool + 'static,
    ) {
        self.callback.register(callback);
    }

    /// Removes the animation callback.
    pub fn clear_animation_callback(&mut self) {
        self.callback.clear();
    }

    /// Returns true if an animation callback is registered.
    pub fn has_animation_callback(&self) -> bool {
        self.callback.is_registered()
    }

    /// Loops until the window is closed, then destroys it.
    ///
    /// Polls while an animation callback is registered, otherwise sleeps
    /// until events arrive.
    pub fn run(&mut self) -> Result<()> {
        if !self.backend.is_window_created() {
            return Err(GlanceError::WindowNotCreated);
        }
        loop {
            let more = if self.callback.is_registered() {
                self.poll_events()
            } else {
                self.wait_events()
            };
            if !more {
                break;
            }
        }
        self.destroy_visualizer_window();
        Ok(())
    }

    /// Requests the loop to stop. Observed at the start of the next iteration.
    pub fn close(&mut self) {
        if !self.close_requested {
            log::info!("visualizer close requested");
        }
        self.close_requested = true;
    }

    /// Runs one loop iteration, blocking until an event arrives.
    ///
    /// Returns false once a close has been requested.
    pub fn wait_events(&mut self) -> bool {
        self.iterate(true)
    }

    /// Runs one loop iteration without blocking.
    ///
    /// Returns false once a close has been requested.
    pub fn poll_events(&mut self) -> bool {
        self.iterate(false)
    }

    /// Marks the view dirty so the next iteration redraws.
    pub fn update_render(&mut self) {
        self.redraw_required = true;
    }

    /// Re-frames the camera, optionally recomputing the bounding box and the
    /// coordinate frame from the registered geometries first.
    pub fn reset_view_point(&mut self, reset_bounding_box: bool) {
        if reset_bounding_box {
            self.view_control.reset_bounding_box();
            let bbox = self.registry.bounding_box();
            self.view_control.fit_in_geometry(&bbox);
            if let Err(err) = self.build_utilities() {
                log::debug!("coordinate frame not rebuilt: {err}");
            }
        }
        self.view_control.reset();
        self.update_render();
    }

    fn iterate(&mut self, block: bool) -> bool {
        if self.close_requested || !self.backend.is_window_created() {
            return false;
        }
        self.state = LoopState::Running;

        let mut events = std::mem::take(&mut self.events);
        if block {
            self.backend.wait_events(&mut events);
        } else {
            self.backend.poll_events(&mut events);
        }
        for event in events.drain(..) {
            self.handle_event(event);
        }
        self.events = events;

        if self.close_requested {
            return false;
        }

        if let Some(active) = self.callback.snapshot() {
            if invoke(&active, self) == Some(true) {
                self.registry.values_mut().for_each(resync);
                self.update_render();
            }
        }

        if self.redraw_required && !self.close_requested {
            if let Err(err) = self.render() {
                log::warn!("frame not presented: {err}");
            }
        }
        !self.close_requested
    }

    /// Draws every renderer from its current batches, then presents.
    fn render(&mut self) -> Result<()> {
        let Self {
            backend,
            registry,
            utilities,
            view_control,
            render_option,
            ..
        } = self;
        let canvas: &mut dyn Canvas = match backend.canvas() {
            Some(canvas) => canvas,
            None => return Err(GlanceError::WindowNotCreated),
        };

        canvas.begin_frame(render_option.background_color);
        for entry in registry.values_mut() {
            entry.renderer.render(render_option, view_control, canvas);
        }
        utilities.for_each_with_option(render_option, |utility, option| {
            utility.renderer.render(option, view_control, canvas);
        });
        canvas.present()?;

        self.redraw_required = false;
        Ok(())
    }

    fn release_renderers(&mut self, ids: &[RendererId]) {
        let Some(canvas) = self.backend.canvas() else {
            return;
        };
        for id in ids {
            canvas.release(*id);
        }
    }

    // ========================================================================
    // Misc operations
    // ========================================================================

    /// Saves the current frame as an image.
    ///
    /// Without a path, writes `ScreenCapture_<timestamp>.png` in the working
    /// directory. Returns the path written.
    pub fn capture_screen_image(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        if self.redraw_required {
            self.render()?;
        }
        let canvas = self.backend.canvas().ok_or(GlanceError::WindowNotCreated)?;
        let capture = canvas.capture()?;

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
                PathBuf::from(format!("ScreenCapture_{timestamp}.png"))
            }
        };
        save_image(&path, &capture)?;
        log::info!("screen capture saved to {}", path.display());
        Ok(path)
    }

    /// Logs the key and mouse bindings.
    pub fn print_visualizer_help(&self) {
        log::info!("glance visualizer controls:\n{HELP_TEXT}");
    }

    /// Pushes the configured title to the window.
    pub fn update_window_title(&mut self) {
        let title = self.window_config.title.clone();
        self.backend.set_title(&title);
    }

    /// Changes the window title.
    pub fn set_window_title(&mut self, title: impl Into<String>) {
        self.window_config.title = title.into();
        self.update_window_title();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the camera.
    pub fn view_control(&self) -> &ViewControl {
        &self.view_control
    }

    /// Returns the camera for modification and marks the view dirty.
    pub fn view_control_mut(&mut self) -> &mut ViewControl {
        self.redraw_required = true;
        &mut self.view_control
    }

    /// Returns the global render option.
    pub fn render_option(&self) -> &RenderOption {
        &self.render_option
    }

    /// Returns the global render option for modification and marks the view dirty.
    pub fn render_option_mut(&mut self) -> &mut RenderOption {
        self.redraw_required = true;
        &mut self.render_option
    }

    /// Returns the mouse and modifier state.
    pub fn mouse_control(&self) -> &MouseControl {
        &self.mouse_control
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns true if the next iteration will redraw.
    pub fn is_redraw_required(&self) -> bool {
        self.redraw_required
    }

    /// Returns true once a close has been requested.
    pub fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    /// Returns the window configuration.
    pub fn window_config(&self) -> &WindowConfig {
        &self.window_config
    }

    /// Returns the window backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the window backend for modification.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: WindowBackend> Drop for Visualizer<B> {
    fn drop(&mut self) {
        if self.backend.is_window_created() {
            self.destroy_visualizer_window();
        }
    }
}

fn resync(entry: &mut GeometryEntry) {
    if !entry.renderer.resync() {
        log::debug!(
            "renderer {} failed to resync its geometry",
            entry.renderer.id()
        );
    }
}
