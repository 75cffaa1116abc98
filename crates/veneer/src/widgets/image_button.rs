//! Image button widget.
//!
//! Like [`ButtonWidget`](super::ButtonWidget), but the content drawn inside
//! the animated frame is a theme bitmap instead of a caption.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{Signal, WindowHandle};
use veneer_render::{
    Bitmap, Brush, PaintReport, Rect, SharedResource, SharedResourceSet, paint_with_recovery,
};
use veneer_style::ColorRole;

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::message::{Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::{
    Interactive, PointerState, StateMap, SubclassWidget, WidgetBase, WidgetKind, drive,
};
use crate::widgets::abstract_button::{AbstractButton, ButtonFrame, ButtonState, FocusRingSet};
use crate::widgets::{input_result, paint_result};

/// Configuration of an image button.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageButtonConfig {
    /// Name of the theme bitmap to draw.
    pub image: String,
    /// Space between the frame and the bitmap, in pixels.
    pub padding: f32,
    pub base: SubclassConfig,
}

impl ImageButtonConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            padding: 4.0,
            base: SubclassConfig::default(),
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_base(mut self, base: SubclassConfig) -> Self {
        self.base = base;
        self
    }

    fn validate(&self) -> WidgetResult<()> {
        if self.image.is_empty() {
            return Err(WidgetError::InvalidConfig("image name is empty".into()));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(WidgetError::InvalidConfig(format!(
                "padding {} must be a non-negative number",
                self.padding
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct ImageButtonResources {
    focus_ring: SharedResource<Mutex<Brush>>,
}

impl SharedResourceSet for ImageButtonResources {
    fn release(&self) {
        self.focus_ring.release();
    }
}

impl FocusRingSet for ImageButtonResources {
    fn focus_ring(&self) -> &SharedResource<Mutex<Brush>> {
        &self.focus_ring
    }
}

/// An owner-drawn push button showing a bitmap.
pub struct ImageButtonWidget {
    button: AbstractButton<ImageButtonResources>,
    image: Option<Arc<Bitmap>>,
    image_name: String,
    padding: f32,
    this: Weak<Mutex<Self>>,
}

impl ImageButtonWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let button = AbstractButton::new(system, WidgetKind::ImageButton, ColorRole::ImageButton)?;
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                button,
                image: None,
                image_name: String::new(),
                padding: 0.0,
                this: this.clone(),
            })
        }))
    }

    /// Associate the widget with a native push button.
    ///
    /// Fails with [`WidgetError::InvalidConfig`] if the theme has no bitmap
    /// named `config.image`.
    pub fn set_window(&mut self, window: WindowHandle, config: ImageButtonConfig) -> WidgetResult<()> {
        let providers = self.button.base.providers()?;
        self.button
            .base
            .check_association(&providers, window, &config.base)?;
        config.validate()?;
        let image = lookup_image(&providers, &config.image)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;
        self.button
            .associate(&providers, window, config.base, RegistryEntry::new(this))?;
        self.image = Some(image);
        self.image_name = config.image;
        self.padding = config.padding;
        if let Err(err) = self.button.create_device_resources(&providers) {
            tracing::error!(target: targets::BUTTON, %window, error = %err, "device resource creation failed");
            self.button.abandon(&providers);
            self.image = None;
            return Err(err);
        }
        Ok(())
    }

    pub fn state(&self) -> ButtonState {
        self.button.state()
    }

    pub fn activated(&self) -> &Signal<()> {
        self.button.activated()
    }

    pub fn image(&self) -> Option<&Arc<Bitmap>> {
        self.image.as_ref()
    }

    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.button.base.providers()?;
        let colors = self.button.frame_colors()?;
        let image = self.image.clone().ok_or(WidgetError::NotAssociated)?;
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |button| button.draw(&providers, &colors, &image),
            |button| {
                button.button.release_device_resources();
                Ok(())
            },
        )
    }

    fn draw(&mut self, providers: &Providers, colors: &ButtonFrame, image: &Bitmap) -> WidgetResult<()> {
        let padding = self.padding;
        self.button.draw_frame(providers, colors, |surface, _brush, body| {
            surface.draw_image(image, fit_centered(image, body.deflate(padding)), 1.0);
        })
    }
}

fn lookup_image(providers: &Providers, name: &str) -> WidgetResult<Arc<Bitmap>> {
    providers.theme.bitmap(name).ok_or_else(|| {
        tracing::error!(target: targets::BUTTON, image = name, theme = providers.theme.name(), "bitmap not found");
        WidgetError::InvalidConfig(format!("theme has no bitmap named {name:?}"))
    })
}

/// The largest rectangle with `image`'s aspect ratio centered in `area`.
fn fit_centered(image: &Bitmap, area: Rect) -> Rect {
    let size = image.size();
    if size.is_empty() || area.is_empty() {
        return area;
    }
    let scale = (area.width() / size.width).min(area.height() / size.height);
    let width = size.width * scale;
    let height = size.height * scale;
    Rect::new(
        area.left() + (area.width() - width) / 2.0,
        area.top() + (area.height() - height) / 2.0,
        width,
        height,
    )
}

impl Interactive for ImageButtonWidget {
    type State = ButtonState;

    fn input_window(&self) -> WindowHandle {
        self.button.base.window()
    }

    fn pointer(&mut self) -> &mut PointerState {
        &mut self.button.pointer
    }

    fn state_map(&self) -> StateMap<ButtonState> {
        ButtonState::MAP
    }

    fn transition(&mut self, state: ButtonState) -> WidgetResult<()> {
        self.button.transition(state)
    }

    fn on_activate(&mut self) -> WidgetResult<()> {
        self.button.activate()
    }
}

impl SubclassWidget for ImageButtonWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ImageButton
    }

    fn base(&self) -> &WidgetBase {
        &self.button.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        if let Some(result) = self.button.handle_common(message) {
            if matches!(message, Message::Destroy) {
                self.image = None;
            }
            return result;
        }
        match message {
            Message::Paint => paint_result(WidgetKind::ImageButton, window, self.paint()),
            Message::Size(_) => {
                if let Err(err) = self.button.refresh() {
                    tracing::warn!(target: targets::BUTTON, %window, error = %err, "resize failed");
                }
                MessageResult::Handled(0)
            }
            _ => {
                let Ok(providers) = self.button.base.providers() else {
                    return MessageResult::Default;
                };
                let outcome = drive(self, providers.host.as_ref(), message);
                input_result(WidgetKind::ImageButton, window, outcome)
            }
        }
    }

    /// Look the bitmap up again in the current theme, then rebuild.
    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.button.base.providers()?;
        if self.button.base.is_associated() {
            self.image = Some(lookup_image(&providers, &self.image_name)?);
        }
        self.button.refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use veneer_render::{DrawCommand, Point, Size};
    use veneer_style::Theme;

    fn themed_harness() -> Harness {
        let h = Harness::new();
        h.system
            .apply_theme(Arc::new(
                Theme::light().with_bitmap("gear", Bitmap::new("gear", Size::new(16.0, 16.0))),
            ))
            .unwrap();
        h
    }

    #[test]
    fn test_missing_bitmap_is_invalid_config() {
        let h = Harness::new();
        let window = h.host.add_push_button(7, "");
        let button = ImageButtonWidget::new(&h.system).unwrap();
        let err = button
            .lock()
            .set_window(window, ImageButtonConfig::new("gear"))
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig(_)));
        assert!(!h.host.is_subclassed(window));
    }

    #[test]
    fn test_negative_padding_rejected() {
        let h = themed_harness();
        let window = h.host.add_push_button(7, "");
        let button = ImageButtonWidget::new(&h.system).unwrap();
        let err = button
            .lock()
            .set_window(window, ImageButtonConfig::new("gear").with_padding(-1.0))
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidConfig(_)));
    }

    #[test]
    fn test_set_window_twice_fails() {
        let h = themed_harness();
        let window = h.host.add_push_button(7, "");
        let button = ImageButtonWidget::new(&h.system).unwrap();
        button
            .lock()
            .set_window(window, ImageButtonConfig::new("gear"))
            .unwrap();
        let variables = h.engine.variable_count();

        let other = h.host.add_push_button(8, "");
        let err = button
            .lock()
            .set_window(other, ImageButtonConfig::new("gear"))
            .unwrap_err();
        assert_eq!(err, WidgetError::AlreadyAssociated(window));
        assert_eq!(button.lock().base().window(), window);
        assert!(!h.host.is_subclassed(other));
        assert_eq!(h.engine.variable_count(), variables);
    }

    #[test]
    fn test_paints_bitmap_centered() {
        let h = themed_harness();
        let window = h.host.add_push_button(7, "");
        let button = ImageButtonWidget::new(&h.system).unwrap();
        button
            .lock()
            .set_window(window, ImageButtonConfig::new("gear"))
            .unwrap();
        assert_eq!(button.lock().image().unwrap().name(), "gear");

        h.send(window, Message::Paint);
        let frame = h.graphics.last_frame(window).unwrap();
        let rect = frame
            .iter()
            .find_map(|c| match c {
                DrawCommand::Image { name, rect, .. } if name == "gear" => Some(*rect),
                _ => None,
            })
            .unwrap();
        // 120x32 frame, 2 px inset, 4 px padding: a 20 px square centered.
        assert_eq!(rect, Rect::new(50.0, 6.0, 20.0, 20.0));
    }

    #[test]
    fn test_click_activates() {
        let h = themed_harness();
        let window = h.host.add_push_button(7, "");
        let button = ImageButtonWidget::new(&h.system).unwrap();
        button
            .lock()
            .set_window(window, ImageButtonConfig::new("gear"))
            .unwrap();
        let at = Point::new(3.0, 3.0);
        h.send(window, Message::MouseMove(at));
        h.send(window, Message::LeftButtonDown(at));
        h.send(window, Message::LeftButtonUp(at));
        assert_eq!(h.host.notifications().len(), 1);
        assert_eq!(button.lock().state(), ButtonState::Hover);
    }

    #[test]
    fn test_fit_centered_keeps_aspect_ratio() {
        let image = Bitmap::new("wide", Size::new(40.0, 20.0));
        let rect = fit_centered(&image, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(rect, Rect::new(0.0, 5.0, 20.0, 10.0));
    }
}
