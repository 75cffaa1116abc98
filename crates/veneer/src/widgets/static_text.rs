//! Static text widget.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::WindowHandle;
use veneer_core::logging::targets;
use veneer_render::{
    Brush, Color, DrawSurface, HorizontalAlign, PaintReport, Rect, TextFormat, TextFormatSpec,
    UniqueResource, VerticalAlign, paint_with_recovery,
};
use veneer_style::ColorRole;

use crate::config::SubclassConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::host::WindowClass;
use crate::message::{Message, MessageResult};
use crate::system::{Providers, RegistryEntry, SubclassSystem};
use crate::widget::base::check_class;
use crate::widget::{SubclassWidget, SurfaceSlot, WidgetBase, WidgetKind};
use crate::widgets::paint_result;

/// Configuration of a static text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTextConfig {
    /// Font size as a fraction of the control height.
    pub font_scale: f32,
    pub anchor: HorizontalAlign,
    pub vertical_anchor: VerticalAlign,
    /// Text color instead of the theme's.
    pub color: Option<Color>,
    pub base: SubclassConfig,
}

impl Default for StaticTextConfig {
    fn default() -> Self {
        Self {
            font_scale: 0.6,
            anchor: HorizontalAlign::Left,
            vertical_anchor: VerticalAlign::Middle,
            color: None,
            base: SubclassConfig::default(),
        }
    }
}

impl StaticTextConfig {
    pub fn with_font_scale(mut self, scale: f32) -> Self {
        self.font_scale = scale;
        self
    }

    pub fn with_anchor(mut self, anchor: HorizontalAlign, vertical: VerticalAlign) -> Self {
        self.anchor = anchor;
        self.vertical_anchor = vertical;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_base(mut self, base: SubclassConfig) -> Self {
        self.base = base;
        self
    }

    fn validate(&self) -> WidgetResult<()> {
        if self.font_scale.is_finite() && self.font_scale > 0.0 {
            Ok(())
        } else {
            Err(WidgetError::InvalidConfig(format!(
                "font scale {} must be positive",
                self.font_scale
            )))
        }
    }
}

/// Owner-drawn text on a static window. Has no animated states.
pub struct StaticTextWidget {
    base: WidgetBase,
    config: StaticTextConfig,
    surface: SurfaceSlot,
    brush: UniqueResource<Brush>,
    format: UniqueResource<TextFormat>,
    this: Weak<Mutex<Self>>,
}

impl StaticTextWidget {
    pub fn new(system: &SubclassSystem) -> WidgetResult<Arc<Mutex<Self>>> {
        let base = WidgetBase::new(system, WidgetKind::StaticText)?;
        Ok(Arc::new_cyclic(|this| {
            Mutex::new(Self {
                base,
                config: StaticTextConfig::default(),
                surface: SurfaceSlot::new(),
                brush: UniqueResource::new(),
                format: UniqueResource::new(),
                this: this.clone(),
            })
        }))
    }

    pub fn set_window(&mut self, window: WindowHandle, config: StaticTextConfig) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.base.check_association(&providers, window, &config.base)?;
        config.validate()?;
        check_class(providers.host.as_ref(), window, WindowClass::Static, "static window")?;
        let control_id = providers.host.control_id(window)?;
        let this = self.this.upgrade().ok_or(WidgetError::Expired)?;

        self.base
            .subclass(&providers, &[window], RegistryEntry::new(this))?;
        self.base.associate(window, control_id, config.base);
        self.config = config;
        if let Err(err) = self.create_device_resources() {
            tracing::error!(target: targets::STATIC_TEXT, %window, error = %err, "device resource creation failed");
            self.abandon(&providers);
            return Err(err);
        }
        Ok(())
    }

    /// Size of the current text format, once created.
    pub fn font_size(&self) -> Option<f32> {
        self.format.get().map(TextFormat::font_size)
    }

    pub fn create_device_resources(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        self.device_resources(&providers)?;
        Ok(())
    }

    pub fn paint(&mut self) -> WidgetResult<PaintReport> {
        let providers = self.base.providers()?;
        let text = providers.host.window_text(self.base.window())?;
        paint_with_recovery(
            self,
            providers.settings.paint_retry_cap,
            |widget| widget.draw(&providers, &text),
            |widget| {
                widget.release_instance_resources();
                Ok(())
            },
        )
    }

    fn device_resources(
        &mut self,
        providers: &Providers,
    ) -> WidgetResult<(&mut Box<dyn DrawSurface>, &mut Brush, TextFormat)> {
        let height = providers.host.client_rect(self.base.window())?.height();
        let size = self
            .config
            .base
            .text_scale
            .font_size(height, self.config.font_scale);
        let config = self.config;
        let format = self.format.get_or_try_create(|| {
            let spec = TextFormatSpec::new(providers.theme.font_family(), size)
                .with_align(config.anchor)
                .with_vertical_align(config.vertical_anchor);
            providers.graphics.create_text_format(&spec)
        })?;
        let format = format.clone();
        let surface = self.surface.get_or_bind(providers, self.base.window())?;
        let color = config
            .color
            .unwrap_or_else(|| providers.theme.color(ColorRole::StaticText));
        let brush = self
            .brush
            .get_or_try_create(|| surface.create_solid_brush(color))?;
        Ok((surface, brush, format))
    }

    fn draw(&mut self, providers: &Providers, text: &str) -> WidgetResult<()> {
        let background = self.base.background(providers);
        let (surface, brush, format) = self.device_resources(providers)?;
        surface.begin_draw()?;
        let bounds = Rect::from_size(surface.size());
        surface.clear(background);
        surface.draw_text(text, &format, bounds, brush);
        surface.end_draw()?;
        Ok(())
    }

    fn release_instance_resources(&mut self) {
        self.surface.release();
        self.brush.release();
        self.format.release();
    }

    fn abandon(&mut self, providers: &Providers) {
        self.base.reset(providers.host.as_ref());
        self.release_instance_resources();
    }
}

impl SubclassWidget for StaticTextWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::StaticText
    }

    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn handle_message(&mut self, window: WindowHandle, message: &Message) -> MessageResult {
        match *message {
            Message::EraseBackground => MessageResult::Handled(1),
            Message::Paint => paint_result(WidgetKind::StaticText, window, self.paint()),
            Message::Size(_) => {
                if let Err(err) = self.refresh() {
                    tracing::warn!(target: targets::STATIC_TEXT, %window, error = %err, "resize failed");
                }
                MessageResult::Default
            }
            Message::Destroy => {
                if let Ok(providers) = self.base.providers() {
                    self.abandon(&providers);
                }
                MessageResult::Handled(0)
            }
            _ => MessageResult::Default,
        }
    }

    /// Recreate the text format for the current height.
    fn refresh(&mut self) -> WidgetResult<()> {
        let providers = self.base.providers()?;
        if !self.base.is_associated() {
            return Err(WidgetError::NotAssociated);
        }
        self.release_instance_resources();
        self.device_resources(&providers)?;
        providers.host.invalidate(self.base.window());
        Ok(())
    }
}
