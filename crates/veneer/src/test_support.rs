//! Test doubles: a recording window host, a counting animation engine and a
//! harness wiring them into an initialized subclass system.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use veneer_core::{
    AnimationEngine, AnimationError, AnimationResult, ManualClock, Rounding, Storyboard,
    StoryboardId, StoryboardStatus, StoryboardTag, TimelineEngine, VariableBounds, VariableId,
    WindowHandle,
};
use veneer_render::{HeadlessGraphics, Rect};
use veneer_style::{Theme, ThemeProvider};

use crate::config::ToolkitSettings;
use crate::error::{HostError, HostResult};
use crate::host::{
    CharFormat, ComboInfo, ComboStyle, Notification, ScrollInfo, WindowClass, WindowHost,
};
use crate::message::{Message, MessageResult, TimerId};
use crate::system::{Providers, SubclassSystem};

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Debug, Clone)]
struct FakeCombo {
    list: WindowHandle,
    style: ComboStyle,
    items: Vec<String>,
    selection: Option<usize>,
    dropped: bool,
    item_height: Option<f32>,
}

#[derive(Debug, Clone)]
struct FakeWindow {
    class: WindowClass,
    control_id: i32,
    parent: WindowHandle,
    rect: Rect,
    text: String,
    combo: Option<FakeCombo>,
    scroll: Option<ScrollInfo>,
}

#[derive(Debug, Default)]
struct FakeState {
    next_handle: u64,
    windows: HashMap<WindowHandle, FakeWindow>,
    order: Vec<WindowHandle>,
    subclassed: HashSet<WindowHandle>,
    timers: BTreeMap<(WindowHandle, TimerId), Duration>,
    invalidations: HashMap<WindowHandle, usize>,
    notifications: Vec<(WindowHandle, Notification)>,
    focus: Option<WindowHandle>,
    capture: Option<WindowHandle>,
    tracking: HashSet<WindowHandle>,
    scrolled: Vec<(WindowHandle, i32)>,
    char_formats: HashMap<WindowHandle, CharFormat>,
    stripped: HashSet<WindowHandle>,
    failing_subclass: HashSet<WindowHandle>,
    failing_timers: bool,
}

/// A window host that records what widgets ask of it.
///
/// It never delivers messages itself; tests dispatch them explicitly.
#[derive(Debug)]
pub(crate) struct FakeWindowHost {
    state: Mutex<FakeState>,
    app_window: WindowHandle,
}

impl FakeWindowHost {
    /// A host with one top-level application window.
    pub(crate) fn new() -> Self {
        let mut state = FakeState {
            next_handle: 0x100,
            ..Default::default()
        };
        let app_window = insert(
            &mut state,
            WindowHandle::NULL,
            WindowClass::Other("App".into()),
            0,
            Rect::new(0.0, 0.0, 800.0, 600.0),
            "",
        );
        Self {
            state: Mutex::new(state),
            app_window,
        }
    }

    pub(crate) fn app_window(&self) -> WindowHandle {
        self.app_window
    }

    /// Add a child of the application window.
    pub(crate) fn add_window(
        &self,
        class: WindowClass,
        control_id: i32,
        rect: Rect,
        text: &str,
    ) -> WindowHandle {
        insert(&mut self.state.lock(), self.app_window, class, control_id, rect, text)
    }

    pub(crate) fn add_push_button(&self, control_id: i32, text: &str) -> WindowHandle {
        self.add_window(
            WindowClass::PushButton,
            control_id,
            Rect::new(0.0, 0.0, 120.0, 32.0),
            text,
        )
    }

    pub(crate) fn add_radio_button(&self, control_id: i32, text: &str) -> WindowHandle {
        self.add_window(
            WindowClass::RadioButton,
            control_id,
            Rect::new(0.0, 0.0, 160.0, 24.0),
            text,
        )
    }

    pub(crate) fn add_static(&self, control_id: i32, rect: Rect, text: &str) -> WindowHandle {
        self.add_window(WindowClass::Static, control_id, rect, text)
    }

    /// A rich edit control and its decoration window.
    pub(crate) fn add_edit(&self, control_id: i32) -> (WindowHandle, WindowHandle) {
        let edit = self.add_window(
            WindowClass::Edit,
            control_id,
            Rect::new(0.0, 0.0, 200.0, 28.0),
            "",
        );
        let decoration = self.add_static(control_id + 1, Rect::new(0.0, 0.0, 208.0, 36.0), "");
        (edit, decoration)
    }

    /// A combo box and its popup list.
    pub(crate) fn add_combo(
        &self,
        control_id: i32,
        style: ComboStyle,
        items: &[&str],
    ) -> (WindowHandle, WindowHandle) {
        let mut state = self.state.lock();
        let list = insert(
            &mut state,
            self.app_window,
            WindowClass::ComboList,
            0,
            Rect::new(0.0, 0.0, 200.0, 20.0 * items.len() as f32),
            "",
        );
        let combo = insert(
            &mut state,
            self.app_window,
            WindowClass::ComboBox,
            control_id,
            Rect::new(0.0, 0.0, 200.0, 28.0),
            items.first().copied().unwrap_or(""),
        );
        if let Some(window) = state.windows.get_mut(&combo) {
            window.combo = Some(FakeCombo {
                list,
                style,
                items: items.iter().map(|s| s.to_string()).collect(),
                selection: if items.is_empty() { None } else { Some(0) },
                dropped: false,
                item_height: None,
            });
        }
        (combo, list)
    }

    /// A vertical scrollbar with its decoration window.
    pub(crate) fn add_scrollbar(
        &self,
        control_id: i32,
        info: ScrollInfo,
    ) -> (WindowHandle, WindowHandle) {
        let scrollbar = self.add_window(
            WindowClass::ScrollBar,
            control_id,
            Rect::new(0.0, 0.0, 16.0, 200.0),
            "",
        );
        if let Some(window) = self.state.lock().windows.get_mut(&scrollbar) {
            window.scroll = Some(info);
        }
        let decoration = self.add_static(control_id + 1, Rect::new(0.0, 0.0, 16.0, 200.0), "");
        (scrollbar, decoration)
    }

    pub(crate) fn set_client_rect(&self, window: WindowHandle, rect: Rect) {
        if let Some(w) = self.state.lock().windows.get_mut(&window) {
            w.rect = rect;
        }
    }

    pub(crate) fn set_combo_selection(&self, combo: WindowHandle, selection: Option<usize>) {
        if let Some(mut c) = self.combo_mut(combo) {
            c.selection = selection;
        }
    }

    /// Make `install_subclass` fail for `window`.
    pub(crate) fn fail_subclass(&self, window: WindowHandle) {
        self.state.lock().failing_subclass.insert(window);
    }

    /// Make `set_timer` fail.
    pub(crate) fn fail_timers(&self, fail: bool) {
        self.state.lock().failing_timers = fail;
    }

    // Queries

    pub(crate) fn is_subclassed(&self, window: WindowHandle) -> bool {
        self.state.lock().subclassed.contains(&window)
    }

    pub(crate) fn timer_armed(&self, window: WindowHandle, id: TimerId) -> bool {
        self.state.lock().timers.contains_key(&(window, id))
    }

    pub(crate) fn armed_timers(&self) -> Vec<(WindowHandle, TimerId)> {
        self.state.lock().timers.keys().copied().collect()
    }

    pub(crate) fn invalidation_count(&self, window: WindowHandle) -> usize {
        self.state
            .lock()
            .invalidations
            .get(&window)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn notifications(&self) -> Vec<(WindowHandle, Notification)> {
        self.state.lock().notifications.clone()
    }

    pub(crate) fn focused(&self) -> Option<WindowHandle> {
        self.state.lock().focus
    }

    pub(crate) fn captured(&self) -> Option<WindowHandle> {
        self.state.lock().capture
    }

    pub(crate) fn is_tracking_leave(&self, window: WindowHandle) -> bool {
        self.state.lock().tracking.contains(&window)
    }

    /// Every `scroll_window` call, in order.
    pub(crate) fn scrolled(&self) -> Vec<(WindowHandle, i32)> {
        self.state.lock().scrolled.clone()
    }

    pub(crate) fn char_format(&self, edit: WindowHandle) -> Option<CharFormat> {
        self.state.lock().char_formats.get(&edit).cloned()
    }

    pub(crate) fn is_stripped(&self, list: WindowHandle) -> bool {
        self.state.lock().stripped.contains(&list)
    }

    pub(crate) fn item_height(&self, combo: WindowHandle) -> Option<f32> {
        self.combo_mut(combo).and_then(|c| c.item_height)
    }

    pub(crate) fn scroll_pos(&self, scrollbar: WindowHandle) -> Option<i32> {
        self.state
            .lock()
            .windows
            .get(&scrollbar)
            .and_then(|w| w.scroll)
            .map(|info| info.pos)
    }

    fn combo_mut(&self, combo: WindowHandle) -> Option<parking_lot::MappedMutexGuard<'_, FakeCombo>> {
        parking_lot::MutexGuard::try_map(self.state.lock(), |state| {
            state.windows.get_mut(&combo).and_then(|w| w.combo.as_mut())
        })
        .ok()
    }

    fn with_window<T>(
        &self,
        window: WindowHandle,
        read: impl FnOnce(&FakeWindow) -> T,
    ) -> HostResult<T> {
        self.state
            .lock()
            .windows
            .get(&window)
            .map(read)
            .ok_or(HostError::InvalidWindow(window))
    }
}

fn insert(
    state: &mut FakeState,
    parent: WindowHandle,
    class: WindowClass,
    control_id: i32,
    rect: Rect,
    text: &str,
) -> WindowHandle {
    state.next_handle += 0x10;
    let handle = WindowHandle::from_raw(state.next_handle);
    state.windows.insert(
        handle,
        FakeWindow {
            class,
            control_id,
            parent,
            rect,
            text: text.to_owned(),
            combo: None,
            scroll: None,
        },
    );
    state.order.push(handle);
    handle
}

impl WindowHost for FakeWindowHost {
    fn is_window(&self, window: WindowHandle) -> bool {
        self.state.lock().windows.contains_key(&window)
    }

    fn window_class(&self, window: WindowHandle) -> HostResult<WindowClass> {
        self.with_window(window, |w| w.class.clone())
    }

    fn control_id(&self, window: WindowHandle) -> HostResult<i32> {
        self.with_window(window, |w| w.control_id)
    }

    fn parent(&self, window: WindowHandle) -> HostResult<WindowHandle> {
        self.with_window(window, |w| w.parent)
    }

    fn client_rect(&self, window: WindowHandle) -> HostResult<Rect> {
        self.with_window(window, |w| Rect::from_size(w.rect.size))
    }

    fn window_text(&self, window: WindowHandle) -> HostResult<String> {
        self.with_window(window, |w| w.text.clone())
    }

    fn install_subclass(&self, window: WindowHandle) -> HostResult<()> {
        let mut state = self.state.lock();
        if !state.windows.contains_key(&window) {
            return Err(HostError::InvalidWindow(window));
        }
        if state.failing_subclass.contains(&window) {
            return Err(HostError::Failed {
                operation: "install_subclass",
                reason: "refused by test".into(),
            });
        }
        state.subclassed.insert(window);
        Ok(())
    }

    fn remove_subclass(&self, window: WindowHandle) -> HostResult<()> {
        if self.state.lock().subclassed.remove(&window) {
            Ok(())
        } else {
            Err(HostError::InvalidWindow(window))
        }
    }

    fn invalidate(&self, window: WindowHandle) {
        *self.state.lock().invalidations.entry(window).or_default() += 1;
    }

    fn set_timer(&self, window: WindowHandle, id: TimerId, interval: Duration) -> HostResult<()> {
        let mut state = self.state.lock();
        if state.failing_timers {
            return Err(HostError::Failed {
                operation: "set_timer",
                reason: "refused by test".into(),
            });
        }
        state.timers.insert((window, id), interval);
        Ok(())
    }

    fn kill_timer(&self, window: WindowHandle, id: TimerId) -> bool {
        self.state.lock().timers.remove(&(window, id)).is_some()
    }

    fn track_mouse_leave(&self, window: WindowHandle) {
        self.state.lock().tracking.insert(window);
    }

    fn set_capture(&self, window: WindowHandle) {
        self.state.lock().capture = Some(window);
    }

    fn release_capture(&self) {
        self.state.lock().capture = None;
    }

    fn set_focus(&self, window: WindowHandle) {
        self.state.lock().focus = Some(window);
    }

    fn next_tab_stop(&self, window: WindowHandle, backward: bool) -> Option<WindowHandle> {
        let state = self.state.lock();
        let parent = state.windows.get(&window)?.parent;
        let siblings: Vec<WindowHandle> = state
            .order
            .iter()
            .copied()
            .filter(|w| state.windows.get(w).is_some_and(|fw| fw.parent == parent))
            .collect();
        let index = siblings.iter().position(|&w| w == window)?;
        let len = siblings.len();
        if len < 2 {
            return None;
        }
        let next = if backward {
            (index + len - 1) % len
        } else {
            (index + 1) % len
        };
        Some(siblings[next])
    }

    fn notify_parent(&self, window: WindowHandle, notification: Notification) {
        self.state.lock().notifications.push((window, notification));
    }

    fn combo_info(&self, combo: WindowHandle) -> HostResult<ComboInfo> {
        self.with_window(combo, |w| w.combo.as_ref().map(|c| ComboInfo { list: c.list, style: c.style }))?
            .ok_or(HostError::Unsupported {
                window: combo,
                operation: "combo_info",
            })
    }

    fn strip_popup_frame(&self, list: WindowHandle) -> HostResult<()> {
        let mut state = self.state.lock();
        if !state.windows.contains_key(&list) {
            return Err(HostError::InvalidWindow(list));
        }
        state.stripped.insert(list);
        Ok(())
    }

    fn set_item_height(&self, combo: WindowHandle, height: f32) -> HostResult<()> {
        let mut c = self.combo_mut(combo).ok_or(HostError::Unsupported {
            window: combo,
            operation: "set_item_height",
        })?;
        c.item_height = Some(height);
        Ok(())
    }

    fn is_dropped_down(&self, combo: WindowHandle) -> bool {
        self.combo_mut(combo).is_some_and(|c| c.dropped)
    }

    fn show_dropdown(&self, combo: WindowHandle, show: bool) {
        if let Some(mut c) = self.combo_mut(combo) {
            c.dropped = show;
        }
    }

    fn combo_items(&self, combo: WindowHandle) -> Vec<String> {
        self.combo_mut(combo)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    fn combo_selection(&self, combo: WindowHandle) -> Option<usize> {
        self.combo_mut(combo).and_then(|c| c.selection)
    }

    fn scroll_info(&self, scrollbar: WindowHandle) -> HostResult<ScrollInfo> {
        self.with_window(scrollbar, |w| w.scroll)?
            .ok_or(HostError::Unsupported {
                window: scrollbar,
                operation: "scroll_info",
            })
    }

    fn set_scroll_pos(&self, scrollbar: WindowHandle, pos: i32) -> HostResult<()> {
        let mut state = self.state.lock();
        let info = state
            .windows
            .get_mut(&scrollbar)
            .and_then(|w| w.scroll.as_mut())
            .ok_or(HostError::InvalidWindow(scrollbar))?;
        info.pos = pos;
        Ok(())
    }

    fn scroll_window(&self, target: WindowHandle, delta: i32) -> HostResult<()> {
        let mut state = self.state.lock();
        if !state.windows.contains_key(&target) {
            return Err(HostError::InvalidWindow(target));
        }
        state.scrolled.push((target, delta));
        Ok(())
    }

    fn set_char_format(&self, edit: WindowHandle, format: &CharFormat) -> HostResult<()> {
        let mut state = self.state.lock();
        if !state.windows.contains_key(&edit) {
            return Err(HostError::InvalidWindow(edit));
        }
        state.char_formats.insert(edit, format.clone());
        Ok(())
    }
}

/// A [`TimelineEngine`] that counts scheduled storyboards and can be told
/// to refuse scheduling.
pub(crate) struct CountingEngine {
    inner: TimelineEngine,
    scheduled: AtomicUsize,
    failing: AtomicBool,
}

impl CountingEngine {
    pub(crate) fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: TimelineEngine::new(clock),
            scheduled: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Storyboards scheduled so far.
    pub(crate) fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_schedules(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn variable_count(&self) -> usize {
        self.inner.variable_count()
    }
}

impl AnimationEngine for CountingEngine {
    fn create_variable(
        &self,
        initial: f64,
        bounds: VariableBounds,
        rounding: Rounding,
    ) -> AnimationResult<VariableId> {
        self.inner.create_variable(initial, bounds, rounding)
    }

    fn release_variable(&self, variable: VariableId) -> AnimationResult<()> {
        self.inner.release_variable(variable)
    }

    fn value(&self, variable: VariableId) -> AnimationResult<f64> {
        self.inner.value(variable)
    }

    fn integer_value(&self, variable: VariableId) -> AnimationResult<i64> {
        self.inner.integer_value(variable)
    }

    fn create_storyboard(&self) -> AnimationResult<Storyboard> {
        self.inner.create_storyboard()
    }

    fn schedule(&self, storyboard: Storyboard, at: f64) -> AnimationResult<StoryboardId> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AnimationError::Engine("scheduling refused by test".into()));
        }
        let id = self.inner.schedule(storyboard, at)?;
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn now(&self) -> f64 {
        self.inner.now()
    }

    fn find_storyboard(&self, tag: StoryboardTag) -> Option<StoryboardId> {
        self.inner.find_storyboard(tag)
    }

    fn status(&self, storyboard: StoryboardId) -> StoryboardStatus {
        self.inner.status(storyboard)
    }
}

/// An initialized subclass system over test doubles.
pub(crate) struct Harness {
    pub(crate) system: SubclassSystem,
    pub(crate) host: Arc<FakeWindowHost>,
    pub(crate) graphics: HeadlessGraphics,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) engine: Arc<CountingEngine>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_settings(ToolkitSettings::default())
    }

    pub(crate) fn with_settings(settings: ToolkitSettings) -> Self {
        init_tracing();
        let host = Arc::new(FakeWindowHost::new());
        let graphics = HeadlessGraphics::new();
        let clock = Arc::new(ManualClock::new());
        let engine = Arc::new(CountingEngine::new(clock.clone()));
        let system = SubclassSystem::new();
        system
            .initialize(
                Providers::new(
                    Arc::new(graphics.clone()),
                    engine.clone(),
                    Arc::new(Theme::light()),
                    host.clone(),
                    host.app_window(),
                )
                .with_settings(settings),
            )
            .unwrap();
        Self {
            system,
            host,
            graphics,
            clock,
            engine,
        }
    }

    pub(crate) fn theme(&self) -> Arc<dyn ThemeProvider> {
        self.system.providers().unwrap().theme.clone()
    }

    pub(crate) fn send(&self, window: WindowHandle, message: Message) -> MessageResult {
        self.system.dispatch(window, &message)
    }

    pub(crate) fn advance(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }

    /// Fire every armed timer once.
    pub(crate) fn tick_timers(&self) {
        for (window, id) in self.host.armed_timers() {
            self.send(window, Message::Timer(id));
        }
    }

    /// Advance time in timer-sized steps until every timer stopped itself.
    pub(crate) fn settle(&self) {
        for _ in 0..1_000 {
            if self.host.armed_timers().is_empty() {
                return;
            }
            self.advance(10);
            self.tick_timers();
        }
        panic!("timers still armed after 10 simulated seconds");
    }
}
