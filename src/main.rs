// Date/time panel widget - Wayland Layer Shell host
// A clock slot with a calendar popup and a tooltip, each on its own layer surface

use anyhow::{Context, Result};
use calloop::{
    channel::{self, Channel},
    signals::{Signal, Signals},
    timer::{TimeoutAction, Timer},
    EventLoop, LoopHandle, RegistrationToken,
};
use smithay_client_toolkit::reexports::calloop_wayland_source::WaylandSource;
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_layer, delegate_output, delegate_pointer, delegate_registry,
    delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{Shm, ShmHandler},
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_surface},
    Connection, Dispatch, QueueHandle, WEnum,
};

use datetime_panel_widget::{
    config::{Config, DatetimeSettings},
    config_watcher::{ConfigReloadEvent, ConfigWatcher},
    input::{self, InputState},
    panel::Orientation,
    placement::{place_popup, Point, Rect, Size},
    render::Renderer,
    surface::{PanelSurface, SurfaceRole},
    update::{WakeId, WakeKind, WakeScheduler},
    widget::{CalendarMonth, DatetimeWidget, Label, MouseButton, PanelEvent, PanelHost},
};

/// Size assumed until an output reports its logical size
const FALLBACK_SCREEN: Size = Size::new(1920, 1080);

/// Everything the widget sees of the compositor
struct PanelShell {
    // Wayland states
    registry_state: RegistryState,
    output_state: OutputState,
    compositor_state: CompositorState,
    shm_state: Shm,
    layer_shell: LayerShell,
    seat_state: SeatState,
    qh: QueueHandle<App>,

    // Surfaces
    slot: Option<PanelSurface>,
    popup: Option<PanelSurface>,
    tooltip: Option<PanelSurface>,

    // What is on them
    renderer: Renderer,
    labels: Vec<Label>,
    border_width: u32,
    popup_month: Option<CalendarMonth>,
    tooltip_text: Option<String>,

    // Input
    input: InputState,
    keyboard: Option<wl_keyboard::WlKeyboard>,
    keyboard_focus: Option<SurfaceRole>,

    // One-shot wakes
    loop_handle: LoopHandle<'static, App>,
    timers: HashMap<WakeId, RegistrationToken>,
    next_wake: u64,

    // Configuration
    config: Config,
    config_path: PathBuf,

    exit: bool,
}

/// Main application state
struct App {
    widget: Option<DatetimeWidget>,
    shell: PanelShell,
}

impl PanelShell {
    fn create_slot(&mut self) {
        let surface = self.compositor_state.create_surface(&self.qh);
        let layer = self.layer_shell.create_layer_surface(
            &self.qh,
            surface,
            Layer::Top,
            Some(SurfaceRole::Slot.namespace()),
            None,
        );

        let margin = self.config.panel.margin;
        let side = self.config.panel.size.max(1);
        layer.set_anchor(self.config.panel.position.to_anchor());
        layer.set_size(side, side);
        layer.set_margin(margin.top, margin.right, margin.bottom, margin.left);
        layer.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer.set_exclusive_zone(0);
        layer.commit();

        self.slot = Some(PanelSurface::new(SurfaceRole::Slot, layer, side, side));
        tracing::info!(position = %self.config.panel.position.as_str(), "Slot surface created");
    }

    /// A top-left anchored surface moved around with margins
    fn create_floating(&self, role: SurfaceRole, size: Size, keyboard: KeyboardInteractivity) -> PanelSurface {
        let surface = self.compositor_state.create_surface(&self.qh);
        let layer = self.layer_shell.create_layer_surface(
            &self.qh,
            surface,
            Layer::Overlay,
            Some(role.namespace()),
            None,
        );

        let (width, height) = (size.width.max(1) as u32, size.height.max(1) as u32);
        layer.set_anchor(Anchor::TOP | Anchor::LEFT);
        layer.set_size(width, height);
        layer.set_keyboard_interactivity(keyboard);
        layer.set_exclusive_zone(-1);
        layer.commit();

        PanelSurface::new(role, layer, width, height)
    }

    /// Re-apply anchor and margins after the panel settings changed
    fn reposition_slot(&mut self) {
        let Some(slot) = self.slot.as_mut() else {
            return;
        };
        let margin = self.config.panel.margin;
        slot.layer.set_anchor(self.config.panel.position.to_anchor());
        slot.layer
            .set_margin(margin.top, margin.right, margin.bottom, margin.left);
        slot.layer.commit();
    }

    /// Logical size of the first output that reported one
    fn output_size(&self) -> Option<Size> {
        self.output_state.outputs().find_map(|output| {
            let info = self.output_state.info(&output)?;
            let (w, h) = info.logical_size?;
            Some(Size::new(w, h))
        })
    }

    fn role_of(&self, surface: &wl_surface::WlSurface) -> Option<SurfaceRole> {
        [&self.slot, &self.popup, &self.tooltip]
            .into_iter()
            .flatten()
            .find(|s| s.wl_surface() == surface)
            .map(|s| s.role)
    }

    fn surface_mut(&mut self, role: SurfaceRole) -> Option<&mut PanelSurface> {
        match role {
            SurfaceRole::Slot => self.slot.as_mut(),
            SurfaceRole::Popup => self.popup.as_mut(),
            SurfaceRole::Tooltip => self.tooltip.as_mut(),
        }
    }

    fn slot_size(&mut self) -> Size {
        let content = self.renderer.measure_labels(&self.labels);
        let frame = (self.border_width * 2) as i32;
        let thickness = self.config.panel.size as i32;
        let (width, height) = (content.width + frame, content.height + frame);

        if self.config.panel.orientation() == Orientation::Horizontal {
            Size::new(width, height.max(thickness))
        } else {
            Size::new(width.max(thickness), height)
        }
    }

    fn draw(&mut self, role: SurfaceRole) {
        let result = match role {
            SurfaceRole::Slot => {
                let Some(slot) = self.slot.as_mut() else {
                    return;
                };
                let (labels, border) = (&self.labels, self.border_width);
                let renderer = &mut self.renderer;
                slot.draw(&self.shm_state, |canvas, w, h| {
                    renderer.render_panel(canvas, w, h, labels, border)
                })
            }
            SurfaceRole::Popup => {
                let (Some(popup), Some(month)) = (self.popup.as_mut(), self.popup_month.as_ref())
                else {
                    return;
                };
                let renderer = &mut self.renderer;
                popup.draw(&self.shm_state, |canvas, w, h| {
                    renderer.render_calendar(canvas, w, h, month)
                })
            }
            SurfaceRole::Tooltip => {
                let (Some(tooltip), Some(text)) = (self.tooltip.as_mut(), self.tooltip_text.as_ref())
                else {
                    return;
                };
                let renderer = &mut self.renderer;
                tooltip.draw(&self.shm_state, |canvas, w, h| {
                    renderer.render_tooltip(canvas, w, h, text)
                })
            }
        };

        if let Err(e) = result {
            tracing::error!(error = %e, ?role, "Failed to draw surface, skipping frame");
        }
    }

    fn move_surface(surface: &PanelSurface, at: Point) {
        surface.layer.set_margin(at.y.max(0), 0, 0, at.x.max(0));
        surface.layer.commit();
    }
}

impl WakeScheduler for PanelShell {
    fn schedule_wake(&mut self, kind: WakeKind, after: Duration) -> Option<WakeId> {
        let id = WakeId(self.next_wake);
        self.next_wake += 1;

        let event = match kind {
            WakeKind::Tick => PanelEvent::Tick,
            WakeKind::Tooltip => PanelEvent::TooltipTick,
        };

        let inserted = self.loop_handle.insert_source(
            Timer::from_duration(after),
            move |_deadline, _metadata, app: &mut App| {
                app.shell.timers.remove(&id);
                app.dispatch(event.clone());
                TimeoutAction::Drop
            },
        );

        match inserted {
            Ok(token) => {
                self.timers.insert(id, token);
                Some(id)
            }
            Err(e) => {
                tracing::error!(error = %e, ?kind, "Failed to insert wake timer");
                None
            }
        }
    }

    fn cancel_wake(&mut self, id: WakeId) {
        if let Some(token) = self.timers.remove(&id) {
            self.loop_handle.remove(token);
        }
    }
}

impl PanelHost for PanelShell {
    fn now(&self) -> chrono::DateTime<chrono::Local> {
        chrono::Local::now()
    }

    fn show_labels(&mut self, labels: &[Label]) {
        self.labels = labels.to_vec();
        let size = self.slot_size();
        if let Some(slot) = self.slot.as_mut() {
            slot.resize(size.width as u32, size.height as u32);
        }
        self.draw(SurfaceRole::Slot);
    }

    fn set_tooltip(&mut self, text: Option<&str>) {
        let Some(text) = text else {
            self.tooltip = None;
            self.tooltip_text = None;
            return;
        };

        let size = self.renderer.measure_tooltip(text);
        let at = place_popup(
            self.trigger_rect(),
            self.screen_size(),
            size,
            self.config.panel.orientation(),
        );
        self.tooltip_text = Some(text.to_string());

        match self.tooltip.as_mut() {
            Some(tooltip) => {
                tooltip.resize(size.width as u32, size.height as u32);
            }
            None => {
                self.tooltip =
                    Some(self.create_floating(SurfaceRole::Tooltip, size, KeyboardInteractivity::None));
            }
        }
        if let Some(tooltip) = self.tooltip.as_ref() {
            Self::move_surface(tooltip, at);
        }
        self.draw(SurfaceRole::Tooltip);
    }

    fn set_border_width(&mut self, width: u32) {
        if self.border_width == width {
            return;
        }
        self.border_width = width;
        let size = self.slot_size();
        if let Some(slot) = self.slot.as_mut() {
            slot.resize(size.width as u32, size.height as u32);
        }
        self.draw(SurfaceRole::Slot);
    }

    fn trigger_rect(&self) -> Rect {
        let size = self
            .slot
            .as_ref()
            .map(|s| Size::new(s.width as i32, s.height as i32))
            .unwrap_or_default();
        self.config
            .panel
            .position
            .slot_rect(self.screen_size(), size, &self.config.panel.margin)
    }

    fn screen_size(&self) -> Size {
        self.output_size().unwrap_or(FALLBACK_SCREEN)
    }

    fn monitor_rect(&self) -> Option<Rect> {
        // Layer surface margins are output-local
        self.output_size()
            .map(|size| Rect::from_parts(Point::default(), size))
    }

    fn open_popup(&mut self, month: &CalendarMonth) -> Size {
        let size = self.renderer.measure_calendar(month);
        self.popup = Some(self.create_floating(SurfaceRole::Popup, size, KeyboardInteractivity::OnDemand));
        self.popup_month = Some(month.clone());
        tracing::debug!(width = size.width, height = size.height, "Calendar popup created");
        size
    }

    fn update_popup(&mut self, month: &CalendarMonth) -> Option<Size> {
        let size = self.renderer.measure_calendar(month);
        self.popup_month = Some(month.clone());
        if let Some(popup) = self.popup.as_mut() {
            popup.resize(size.width as u32, size.height as u32);
        }
        self.draw(SurfaceRole::Popup);
        Some(size)
    }

    fn move_popup(&mut self, at: Point) {
        if let Some(popup) = self.popup.as_ref() {
            Self::move_surface(popup, at);
        }
    }

    fn close_popup(&mut self) {
        self.popup = None;
        self.popup_month = None;
        if self.keyboard_focus == Some(SurfaceRole::Popup) {
            self.keyboard_focus = None;
        }
    }

    fn save_settings(&mut self, settings: &DatetimeSettings) -> anyhow::Result<()> {
        self.config.datetime = settings.clone();
        self.config
            .save_to(&self.config_path)
            .with_context(|| format!("Failed to save settings to {}", self.config_path.display()))
    }
}

impl App {
    /// Hand an event to the widget. Right clicks on the slot are the host's:
    /// they open the settings file.
    fn dispatch(&mut self, event: PanelEvent) {
        if event == PanelEvent::Clicked(MouseButton::Right) {
            if let Err(e) = input::open_settings_file(&self.shell.config_path) {
                tracing::warn!(error = %e, "Failed to open settings");
            }
            return;
        }

        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        if !widget.handle(event.clone(), &mut self.shell) {
            tracing::trace!(?event, "Event ignored");
        }
    }

    fn start(&mut self) {
        let size = self.shell.config.panel.size;
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        widget.size_changed(size, &mut self.shell);
        widget.update_now(&mut self.shell);
    }

    /// The settings file changed on disk
    fn reload_config(&mut self) {
        let config = match Config::load_or_migrate(&self.shell.config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reload settings, keeping current ones");
                return;
            }
        };
        if config == self.shell.config {
            tracing::trace!("Settings unchanged");
            return;
        }

        let previous = std::mem::replace(&mut self.shell.config, config.clone());
        self.shell.renderer.set_theme(config.theme());

        if previous.panel.position != config.panel.position || previous.panel.margin != config.panel.margin {
            self.shell.reposition_slot();
        }

        if let Some(widget) = self.widget.as_mut() {
            widget.size_changed(config.panel.size, &mut self.shell);
            if widget.orientation() != config.panel.orientation() {
                widget.orientation_changed(config.panel.orientation(), &mut self.shell);
            }
            widget.week_start_changed(config.calendar.week_start, &mut self.shell);
            widget.apply_settings(&config.datetime, &mut self.shell);
            widget.trigger_moved(&mut self.shell);
        }

        // Theme changes need a redraw even when no label changed
        self.shell.draw(SurfaceRole::Slot);
        self.shell.draw(SurfaceRole::Popup);
        tracing::info!("Settings reloaded");
    }

    /// Save, cancel every wake and drop the popup
    fn shutdown(&mut self) {
        if let Some(widget) = self.widget.take() {
            widget.save(&mut self.shell);
            widget.teardown(&mut self.shell);
        }
        self.shell.tooltip = None;
        tracing::info!(pending_timers = self.shell.timers.len(), "Widget torn down");
    }
}

impl CompositorHandler for App {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
        // Handle DPI scaling if needed
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for App {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.shell.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
        // The screen may have been resized under the slot
        self.dispatch(PanelEvent::TriggerMoved);
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl LayerShellHandler for App {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, layer: &LayerSurface) {
        match self.shell.role_of(layer.wl_surface()) {
            Some(SurfaceRole::Popup) => {
                tracing::debug!("Popup closed by compositor");
                self.shell.popup = None;
                self.shell.popup_month = None;
                self.dispatch(PanelEvent::PopupClosedExternally);
            }
            Some(SurfaceRole::Tooltip) => {
                self.shell.tooltip = None;
                self.dispatch(PanelEvent::TooltipHidden);
            }
            Some(SurfaceRole::Slot) | None => {
                tracing::info!("Slot surface closed");
                self.shell.exit = true;
            }
        }
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let Some(role) = self.shell.role_of(layer.wl_surface()) else {
            return;
        };
        let Some(surface) = self.shell.surface_mut(role) else {
            return;
        };

        if configure.new_size.0 > 0 && configure.new_size.1 > 0 {
            let (width, height) = configure.new_size;
            if (width, height) != (surface.width, surface.height) {
                surface.width = width;
                surface.height = height;
                surface.buffer_pool = None;
            }
        }
        surface.configured = true;
        tracing::debug!(?role, width = surface.width, height = surface.height, "Configured");

        self.shell.draw(role);
        if role == SurfaceRole::Slot {
            self.dispatch(PanelEvent::TriggerMoved);
        }
    }
}

impl ShmHandler for App {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shell.shm_state
    }
}

impl SeatHandler for App {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.shell.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        match capability {
            Capability::Pointer => {
                if let Err(e) = self.shell.seat_state.get_pointer(qh, &seat) {
                    tracing::warn!(error = %e, "Failed to get pointer");
                }
            }
            Capability::Keyboard if self.shell.keyboard.is_none() => {
                self.shell.keyboard = Some(seat.get_keyboard(qh, ()));
            }
            _ => {}
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Keyboard {
            if let Some(keyboard) = self.shell.keyboard.take() {
                keyboard.release();
            }
        }
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}
}

impl PointerHandler for App {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let (x, y) = event.position;
            let panel_event = match event.kind {
                PointerEventKind::Enter { .. } => self
                    .shell
                    .role_of(&event.surface)
                    .and_then(|role| self.shell.input.pointer_enter(role, x, y)),
                PointerEventKind::Leave { .. } => self.shell.input.pointer_leave(),
                PointerEventKind::Motion { .. } => {
                    self.shell.input.pointer_moved(x, y);
                    None
                }
                PointerEventKind::Press { button, .. } => self.shell.input.button_pressed(button),
                PointerEventKind::Axis { vertical, .. } => {
                    self.shell.input.scrolled(vertical.absolute)
                }
                _ => None,
            };

            if let Some(panel_event) = panel_event {
                self.dispatch(panel_event);
            }
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for App {
    fn event(
        app: &mut Self,
        _keyboard: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_keyboard::Event::Enter { surface, .. } => {
                app.shell.keyboard_focus = app.shell.role_of(&surface);
            }
            wl_keyboard::Event::Leave { .. } => {
                app.shell.input.keyboard_left();
                let had_popup = app.shell.keyboard_focus.take() == Some(SurfaceRole::Popup);
                if had_popup {
                    app.dispatch(PanelEvent::FocusLost);
                }
            }
            wl_keyboard::Event::Key {
                key,
                state: WEnum::Value(wl_keyboard::KeyState::Pressed),
                ..
            } if app.shell.keyboard_focus == Some(SurfaceRole::Popup) => {
                if let Some(panel_event) = app.shell.input.key_down(key) {
                    app.dispatch(panel_event);
                }
            }
            wl_keyboard::Event::Key {
                key,
                state: WEnum::Value(wl_keyboard::KeyState::Released),
                ..
            } => app.shell.input.key_up(key),
            // Raw keycodes are enough, the keymap fd is closed on drop
            _ => {}
        }
    }
}

impl ProvidesRegistryState for App {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.shell.registry_state
    }
    registry_handlers![OutputState, SeatState];
}

delegate_compositor!(App);
delegate_output!(App);
delegate_shm!(App);
delegate_seat!(App);
delegate_pointer!(App);
delegate_layer!(App);
delegate_registry!(App);

/// Deliver settings file changes into the event loop
fn watch_config(path: &std::path::Path, handle: &LoopHandle<'static, App>) -> Result<ConfigWatcher> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let (sender, receiver): (channel::Sender<ConfigReloadEvent>, Channel<ConfigReloadEvent>) =
        channel::channel();
    let watcher = ConfigWatcher::with_sender(path.to_path_buf(), sender)?;

    handle
        .insert_source(receiver, |event, _metadata, app| {
            if let channel::Event::Msg(_) = event {
                app.reload_config();
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert config watcher source: {}", e))?;

    Ok(watcher)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting date/time panel widget");

    // Load configuration
    let config_path = Config::config_path().context("Failed to locate settings file")?;
    let config = Config::load_or_default(&config_path);
    tracing::info!("Configuration loaded: {:?}", config);

    let renderer = Renderer::new(config.theme()).context("Failed to initialise text rendering")?;

    // Connect to Wayland
    let conn = Connection::connect_to_env()
        .context("Failed to connect to Wayland compositor. Is a Wayland compositor running?")?;

    let (globals, mut event_queue) =
        registry_queue_init(&conn).context("Failed to initialize Wayland registry")?;
    let qh = event_queue.handle();

    let registry_state = RegistryState::new(&globals);
    let output_state = OutputState::new(&globals, &qh);
    let seat_state = SeatState::new(&globals, &qh);
    let compositor_state = CompositorState::bind(&globals, &qh)
        .context("wl_compositor protocol not available. Your compositor may not support required Wayland protocols.")?;
    let shm_state = Shm::bind(&globals, &qh)
        .context("wl_shm protocol not available. Shared memory buffers are required.")?;
    let layer_shell = LayerShell::bind(&globals, &qh)
        .context("zwlr_layer_shell_v1 not available. Your compositor must support the Layer Shell protocol.")?;

    let mut event_loop: EventLoop<'static, App> =
        EventLoop::try_new().context("Failed to create event loop")?;

    let widget = DatetimeWidget::new(
        config.datetime.clone(),
        config.panel.orientation(),
        config.calendar.week_start,
    );

    let mut app = App {
        widget: Some(widget),
        shell: PanelShell {
            registry_state,
            output_state,
            compositor_state,
            shm_state,
            layer_shell,
            seat_state,
            qh: qh.clone(),
            slot: None,
            popup: None,
            tooltip: None,
            renderer,
            labels: Vec::new(),
            border_width: 0,
            popup_month: None,
            tooltip_text: None,
            input: InputState::new(),
            keyboard: None,
            keyboard_focus: None,
            loop_handle: event_loop.handle(),
            timers: HashMap::new(),
            next_wake: 0,
            config,
            config_path: config_path.clone(),
            exit: false,
        },
    };

    app.shell.create_slot();

    // Outputs and the first configure arrive before the first tick
    event_queue
        .roundtrip(&mut app)
        .context("Initial Wayland roundtrip failed")?;

    WaylandSource::new(conn.clone(), event_queue)
        .insert(event_loop.handle())
        .context("Failed to insert Wayland event source into event loop")?;

    app.start();

    let _watcher = match watch_config(&config_path, &event_loop.handle()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Settings hot-reload disabled");
            None
        }
    };

    // Signal handling for graceful shutdown
    let signals = Signals::new(&[Signal::SIGINT, Signal::SIGTERM])
        .context("Failed to create signal handler for graceful shutdown")?;
    event_loop
        .handle()
        .insert_source(signals, |event, _metadata, app| {
            tracing::info!(signal = ?event.signal(), "Received signal, exiting gracefully");
            app.shell.exit = true;
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert signal handler: {:?}", e))?;

    tracing::info!("Event loop starting");

    while !app.shell.exit {
        if let Err(e) = event_loop.dispatch(None, &mut app) {
            tracing::error!(error = %e, "Event loop dispatch error");
            app.shutdown();
            return Err(e.into());
        }
    }

    app.shutdown();
    conn.flush().context("Failed to flush final requests")?;
    Ok(())
}
