//! The subclass system context.
//!
//! A [`SubclassSystem`] replaces process-wide singletons: it holds the
//! providers every widget draws and animates with, counts live widget
//! instances so teardown can be refused while any exist, owns the shared
//! device resources of every widget type, and maps subclassed window handles
//! back to the widgets that own them.
//!
//! The context is cheap to clone; clones share the same state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use veneer_core::logging::targets;
use veneer_core::{AnimationEngine, WindowHandle};
use veneer_render::{GraphicsEngine, SharedResourceRegistry};
use veneer_style::ThemeProvider;

use crate::config::ToolkitSettings;
use crate::error::{WidgetError, WidgetResult};
use crate::host::WindowHost;
use crate::message::{Message, MessageResult};
use crate::widget::SubclassWidget;

/// The collaborators a subclass system is initialized with.
#[derive(Clone)]
pub struct Providers {
    pub graphics: Arc<dyn GraphicsEngine>,
    pub animation: Arc<dyn AnimationEngine>,
    pub theme: Arc<dyn ThemeProvider>,
    pub host: Arc<dyn WindowHost>,
    /// The application's main window.
    pub app_window: WindowHandle,
    pub settings: ToolkitSettings,
}

impl Providers {
    /// Bundle providers with default settings.
    pub fn new(
        graphics: Arc<dyn GraphicsEngine>,
        animation: Arc<dyn AnimationEngine>,
        theme: Arc<dyn ThemeProvider>,
        host: Arc<dyn WindowHost>,
        app_window: WindowHandle,
    ) -> Self {
        Self {
            graphics,
            animation,
            theme,
            host,
            app_window,
            settings: ToolkitSettings::default(),
        }
    }

    /// Use the given settings.
    pub fn with_settings(mut self, settings: ToolkitSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers")
            .field("theme", &self.theme.name())
            .field("app_window", &self.app_window)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// A registered widget, type-erased two ways: as a message handler and as
/// `Any` for typed lookups.
#[derive(Clone)]
pub(crate) struct RegistryEntry {
    widget: Arc<Mutex<dyn SubclassWidget>>,
    any: Arc<dyn Any + Send + Sync>,
}

impl RegistryEntry {
    pub(crate) fn new<T: SubclassWidget>(widget: Arc<Mutex<T>>) -> Self {
        Self {
            widget: widget.clone(),
            any: widget,
        }
    }
}

struct SystemInner {
    providers: RwLock<Option<Arc<Providers>>>,
    instances: AtomicUsize,
    registry: Mutex<HashMap<WindowHandle, RegistryEntry>>,
    shared: SharedResourceRegistry,
}

/// Context shared by every widget.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use veneer::{Providers, SubclassSystem, WidgetError};
/// use veneer_core::{SystemClock, TimelineEngine};
/// use veneer_render::HeadlessGraphics;
/// use veneer_style::Theme;
///
/// // `host` is the application's `WindowHost` implementation.
/// let system = SubclassSystem::new();
/// system.initialize(Providers::new(
///     Arc::new(HeadlessGraphics::new()),
///     Arc::new(TimelineEngine::new(Arc::new(SystemClock::new()))),
///     Arc::new(Theme::dark()),
///     host.clone(),
///     app_window,
/// ))?;
///
/// let button = ButtonWidget::new(&system)?;
/// button.lock().set_window(ok_button, SubclassConfig::default())?;
///
/// // Teardown is refused while widgets are alive.
/// assert!(matches!(system.uninitialize(), Err(WidgetError::InstancesAlive(1))));
/// ```
///
/// Widgets are locked while they handle a message; `apply_theme` and
/// `dispatch` must not be called from inside a widget's signal slots.
#[derive(Clone)]
pub struct SubclassSystem {
    inner: Arc<SystemInner>,
}

impl Default for SubclassSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SubclassSystem {
    /// Create an uninitialized system.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SystemInner {
                providers: RwLock::new(None),
                instances: AtomicUsize::new(0),
                registry: Mutex::new(HashMap::new()),
                shared: SharedResourceRegistry::new(),
            }),
        }
    }

    /// Store the providers. Must happen once, before any widget is built.
    pub fn initialize(&self, providers: Providers) -> WidgetResult<()> {
        let mut slot = self.inner.providers.write();
        if slot.is_some() {
            tracing::error!(target: targets::SYSTEM, "subclass system initialized twice");
            return Err(WidgetError::AlreadyInitialized);
        }
        let app_window = providers.app_window;
        if app_window.is_null() || !providers.host.is_window(app_window) {
            tracing::error!(target: targets::SYSTEM, %app_window, "invalid application window");
            return Err(WidgetError::InvalidWindow(app_window));
        }
        tracing::debug!(
            target: targets::SYSTEM,
            theme = providers.theme.name(),
            %app_window,
            "subclass system initialized"
        );
        *slot = Some(Arc::new(providers));
        Ok(())
    }

    /// Drop the providers. Fails while any widget is alive.
    pub fn uninitialize(&self) -> WidgetResult<()> {
        let mut slot = self.inner.providers.write();
        if slot.is_none() {
            return Err(WidgetError::NotInitialized);
        }
        let alive = self.instance_count();
        if alive > 0 {
            tracing::error!(target: targets::SYSTEM, alive, "cannot tear down with live widgets");
            return Err(WidgetError::InstancesAlive(alive));
        }
        self.inner.shared.release_all();
        *slot = None;
        tracing::debug!(target: targets::SYSTEM, "subclass system torn down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.providers.read().is_some()
    }

    /// The current providers.
    pub fn providers(&self) -> WidgetResult<Arc<Providers>> {
        self.inner
            .providers
            .read()
            .clone()
            .ok_or(WidgetError::NotInitialized)
    }

    /// Number of live widgets built on this system.
    pub fn instance_count(&self) -> usize {
        self.inner.instances.load(Ordering::Acquire)
    }

    /// Shared device resources, one set per widget type.
    pub fn shared_resources(&self) -> &SharedResourceRegistry {
        &self.inner.shared
    }

    /// Count a new widget. Fails if the system is not initialized.
    pub(crate) fn acquire_instance(&self) -> WidgetResult<InstanceGuard> {
        // Hold the read lock so teardown cannot interleave with the count.
        let providers = self.inner.providers.read();
        if providers.is_none() {
            tracing::error!(target: targets::SYSTEM, "widget constructed before initialization");
            return Err(WidgetError::NotInitialized);
        }
        self.inner.instances.fetch_add(1, Ordering::AcqRel);
        Ok(InstanceGuard {
            system: self.clone(),
        })
    }

    /// Replace the theme, drop every shared resource set and refresh every
    /// registered widget.
    pub fn apply_theme(&self, theme: Arc<dyn ThemeProvider>) -> WidgetResult<()> {
        {
            let mut slot = self.inner.providers.write();
            let current = slot.as_ref().ok_or(WidgetError::NotInitialized)?;
            let mut providers = Providers::clone(current);
            tracing::debug!(
                target: targets::THEME,
                from = current.theme.name(),
                to = theme.name(),
                "applying theme"
            );
            providers.theme = theme;
            *slot = Some(Arc::new(providers));
        }
        self.inner.shared.release_all();

        let mut first_error = None;
        for widget in self.registered_widgets() {
            if let Err(err) = widget.lock().refresh() {
                tracing::warn!(target: targets::THEME, error = %err, "widget refresh failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// The widget subclassing `window`, if any.
    pub fn subclass_of(&self, window: WindowHandle) -> Option<Arc<Mutex<dyn SubclassWidget>>> {
        self.inner
            .registry
            .lock()
            .get(&window)
            .map(|entry| entry.widget.clone())
    }

    /// The widget subclassing `window`, if it is a `T`.
    pub fn subclass_as<T: SubclassWidget>(&self, window: WindowHandle) -> Option<Arc<Mutex<T>>> {
        let any = self.inner.registry.lock().get(&window)?.any.clone();
        any.downcast::<Mutex<T>>().ok()
    }

    /// Number of subclassed windows.
    pub fn registered_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Deliver a message to the widget subclassing `window`.
    ///
    /// Unknown windows get [`MessageResult::Default`].
    pub fn dispatch(&self, window: WindowHandle, message: &Message) -> MessageResult {
        let Some(widget) = self.subclass_of(window) else {
            return MessageResult::Default;
        };
        let result = widget.lock().handle_message(window, message);
        tracing::trace!(target: targets::SYSTEM, %window, ?message, ?result, "dispatched");
        result
    }

    pub(crate) fn register(&self, window: WindowHandle, entry: RegistryEntry) {
        self.inner.registry.lock().insert(window, entry);
    }

    pub(crate) fn unregister(&self, window: WindowHandle) -> bool {
        self.inner.registry.lock().remove(&window).is_some()
    }

    /// Every registered widget, once each.
    fn registered_widgets(&self) -> Vec<Arc<Mutex<dyn SubclassWidget>>> {
        let registry = self.inner.registry.lock();
        let mut widgets: Vec<Arc<Mutex<dyn SubclassWidget>>> = Vec::new();
        for entry in registry.values() {
            if !widgets.iter().any(|w| Arc::ptr_eq(w, &entry.widget)) {
                widgets.push(entry.widget.clone());
            }
        }
        widgets
    }
}

impl fmt::Debug for SubclassSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubclassSystem")
            .field("initialized", &self.is_initialized())
            .field("instances", &self.instance_count())
            .field("registered", &self.registered_count())
            .finish()
    }
}

/// Keeps a widget counted until dropped.
pub(crate) struct InstanceGuard {
    system: SubclassSystem,
}

impl InstanceGuard {
    pub(crate) fn system(&self) -> &SubclassSystem {
        &self.system
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.system.inner.instances.fetch_sub(1, Ordering::AcqRel);
    }
}

static_assertions::assert_impl_all!(SubclassSystem: Send, Sync);
static_assertions::assert_impl_all!(Providers: Send, Sync);
