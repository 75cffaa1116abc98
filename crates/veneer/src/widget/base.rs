//! The lifecycle gate shared by every widget.

use std::sync::Arc;

use veneer_core::WindowHandle;
use veneer_core::logging::targets;
use veneer_render::{Color, DrawSurface, Size};
use veneer_style::ColorRole;

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::{WindowClass, WindowHost};
use crate::system::{InstanceGuard, Providers, RegistryEntry, SubclassSystem};
use crate::widget::WidgetKind;
use crate::widget::timer::{ANIMATION_TIMER, SCROLL_TIMER};

/// State every widget carries.
///
/// Constructing a base counts the widget against its [`SubclassSystem`];
/// dropping it releases the count. A base is associated with one primary
/// window exactly once, and remembers every window it subclassed so they
/// can be unregistered together when the primary window is destroyed.
pub struct WidgetBase {
    instance: InstanceGuard,
    kind: WidgetKind,
    window: WindowHandle,
    control_id: i32,
    config: SubclassConfig,
    subclassed: Vec<WindowHandle>,
}

impl WidgetBase {
    /// Create a base for a widget of `kind`.
    ///
    /// Fails with [`WidgetError::NotInitialized`] if `system` has not been
    /// initialized; no instance is counted in that case.
    pub fn new(system: &SubclassSystem, kind: WidgetKind) -> WidgetResult<Self> {
        let instance = system.acquire_instance()?;
        tracing::trace!(target: targets::SYSTEM, %kind, "widget constructed");
        Ok(Self {
            instance,
            kind,
            window: WindowHandle::NULL,
            control_id: 0,
            config: SubclassConfig::default(),
            subclassed: Vec::new(),
        })
    }

    pub fn system(&self) -> &SubclassSystem {
        self.instance.system()
    }

    /// The system's current providers.
    pub fn providers(&self) -> WidgetResult<Arc<Providers>> {
        self.system().providers()
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn control_id(&self) -> i32 {
        self.control_id
    }

    pub fn is_associated(&self) -> bool {
        !self.window.is_null()
    }

    pub fn config(&self) -> &SubclassConfig {
        &self.config
    }

    /// Every window this widget subclassed.
    pub fn subclassed_windows(&self) -> &[WindowHandle] {
        &self.subclassed
    }

    /// Color painted behind the control.
    pub fn background(&self, providers: &Providers) -> Color {
        self.config
            .background
            .unwrap_or_else(|| providers.theme.color(ColorRole::Background))
    }

    /// Check the preconditions of `set_window` without changing anything.
    pub(crate) fn check_association(
        &self,
        providers: &Providers,
        window: WindowHandle,
        config: &SubclassConfig,
    ) -> WidgetResult<()> {
        if self.is_associated() {
            return Err(WidgetError::AlreadyAssociated(self.window));
        }
        check_window(providers.host.as_ref(), window)?;
        config.validate().map_err(WidgetError::InvalidConfig)
    }

    /// Subclass `windows` and route their messages to `entry`.
    ///
    /// Either every window is subclassed or none is.
    pub(crate) fn subclass(
        &mut self,
        providers: &Providers,
        windows: &[WindowHandle],
        entry: RegistryEntry,
    ) -> WidgetResult<()> {
        let host = providers.host.as_ref();
        for (installed, &window) in windows.iter().enumerate() {
            if let Err(err) = host.install_subclass(window) {
                tracing::error!(
                    target: targets::SYSTEM,
                    kind = %self.kind,
                    %window,
                    error = %err,
                    "subclass installation failed"
                );
                for &done in &windows[..installed] {
                    self.system().unregister(done);
                    if let Err(err) = host.remove_subclass(done) {
                        tracing::warn!(target: targets::SYSTEM, window = %done, error = %err, "rollback failed");
                    }
                }
                return Err(err.into());
            }
            self.system().register(window, entry.clone());
        }
        self.subclassed.extend_from_slice(windows);
        Ok(())
    }

    /// Commit the association. Called once every fallible step succeeded.
    pub(crate) fn associate(&mut self, window: WindowHandle, control_id: i32, config: SubclassConfig) {
        self.window = window;
        self.control_id = control_id;
        self.config = config;
        tracing::debug!(
            target: targets::SYSTEM,
            kind = %self.kind,
            %window,
            control_id,
            "widget associated"
        );
    }

    /// Unregister every subclassed window and stop their timers.
    pub(crate) fn detach(&mut self, host: &dyn WindowHost) {
        for window in self.subclassed.drain(..) {
            self.instance.system().unregister(window);
            host.kill_timer(window, ANIMATION_TIMER);
            host.kill_timer(window, SCROLL_TIMER);
            if let Err(err) = host.remove_subclass(window) {
                tracing::warn!(target: targets::SYSTEM, %window, error = %err, "failed to remove subclass");
            }
        }
        tracing::debug!(target: targets::SYSTEM, kind = %self.kind, window = %self.window, "widget detached");
    }

    /// Forget the association after a failed `set_window`, or after the
    /// primary window was destroyed.
    pub(crate) fn reset(&mut self, host: &dyn WindowHost) {
        self.detach(host);
        self.window = WindowHandle::NULL;
        self.control_id = 0;
        self.config = SubclassConfig::default();
    }
}

/// Reject null handles and handles naming no live window.
pub(crate) fn check_window(host: &dyn WindowHost, window: WindowHandle) -> WidgetResult<()> {
    if window.is_null() || !host.is_window(window) {
        return Err(WidgetError::InvalidWindow(window));
    }
    Ok(())
}

/// Reject windows of the wrong native class.
pub(crate) fn check_class(
    host: &dyn WindowHost,
    window: WindowHandle,
    expected: WindowClass,
    expected_name: &'static str,
) -> WidgetResult<()> {
    let found = host.window_class(window)?;
    if found != expected {
        return Err(WidgetError::WrongWindowClass {
            window,
            expected: expected_name,
            found,
        });
    }
    Ok(())
}

/// A drawing surface bound lazily to one window.
#[derive(Default)]
pub struct SurfaceSlot {
    surface: Option<Box<dyn DrawSurface>>,
}

impl SurfaceSlot {
    pub const fn new() -> Self {
        Self { surface: None }
    }

    /// The surface, binding one to `window` first if needed.
    pub fn get_or_bind(
        &mut self,
        providers: &Providers,
        window: WindowHandle,
    ) -> WidgetResult<&mut Box<dyn DrawSurface>> {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => {
                let rect = providers.host.client_rect(window)?;
                providers.graphics.bind_to_window(window, rect.size)?
            }
        };
        Ok(self.surface.insert(surface))
    }

    /// Resize the bound surface, if any.
    pub fn resize(&mut self, size: Size) -> WidgetResult<()> {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(size)?;
        }
        Ok(())
    }

    /// Drop the surface; the next paint binds a new one.
    pub fn release(&mut self) -> bool {
        self.surface.take().is_some()
    }
}
