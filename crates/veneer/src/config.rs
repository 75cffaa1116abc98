//! Widget overrides and toolkit-wide settings.
//!
//! [`SubclassConfig`] is what every `set_window` call accepts: per-widget
//! overrides of the background, the animation phases to skip and the bounds
//! caption sizes are clamped to.
//!
//! [`ToolkitSettings`] holds values shared by every widget (transition
//! durations, smooth-scroll tuning, the paint retry cap). It can be loaded
//! from TOML; keys left out keep their defaults.
//!
//! ```
//! use std::time::Duration;
//! use veneer::ToolkitSettings;
//!
//! let settings = ToolkitSettings::from_toml_str(
//!     r#"
//!     [durations]
//!     hover_ms = 80
//!
//!     [scroll]
//!     wheel_lines = 5
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.durations.hover(), Duration::from_millis(80));
//! assert_eq!(settings.durations.selected(), Duration::from_millis(150));
//! assert_eq!(settings.scroll.wheel_lines, 5);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use veneer_render::{Color, MAX_PAINT_ATTEMPTS};

use crate::widget::Phase;

/// Errors loading or validating [`ToolkitSettings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The document is not valid TOML or has mistyped keys.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be written out.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Animation phases a widget jumps through without easing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationSkip {
    pub default: bool,
    pub hover: bool,
    pub active: bool,
    pub focus: bool,
    pub selected: bool,
}

impl AnimationSkip {
    /// Skip every phase.
    pub const ALL: Self = Self {
        default: true,
        hover: true,
        active: true,
        focus: true,
        selected: true,
    };

    /// Whether transitions into `phase` are instantaneous.
    pub fn skips(&self, phase: Phase) -> bool {
        match phase {
            Phase::Default => self.default,
            Phase::Hover => self.hover,
            Phase::Active => self.active,
            Phase::Focus => self.focus,
            Phase::Selected => self.selected,
        }
    }
}

/// Bounds on caption size, as a percentage of the control height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextScaleLimits {
    pub min_percent: f32,
    pub max_percent: f32,
    /// Use the requested scale as is.
    pub ignore_limits: bool,
}

impl Default for TextScaleLimits {
    fn default() -> Self {
        Self {
            min_percent: 20.0,
            max_percent: 100.0,
            ignore_limits: false,
        }
    }
}

impl TextScaleLimits {
    /// Font size for a control `height` tall at `scale` (a fraction of the
    /// height), clamped unless limits are ignored.
    pub fn font_size(&self, height: f32, scale: f32) -> f32 {
        let percent = scale * 100.0;
        let percent = if self.ignore_limits {
            percent
        } else {
            percent.clamp(self.min_percent, self.max_percent)
        };
        (height * percent / 100.0).max(1.0)
    }

    /// Clamp an absolute font size into the bounds for `height`.
    pub fn clamp_size(&self, height: f32, size: f32) -> f32 {
        if self.ignore_limits || height <= 0.0 {
            size
        } else {
            size.clamp(
                height * self.min_percent / 100.0,
                height * self.max_percent / 100.0,
            )
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.ignore_limits {
            return Ok(());
        }
        let valid = self.min_percent.is_finite()
            && self.max_percent.is_finite()
            && self.min_percent > 0.0
            && self.min_percent <= self.max_percent;
        if valid {
            Ok(())
        } else {
            Err(format!(
                "text scale limits [{}, {}] are not an increasing positive range",
                self.min_percent, self.max_percent
            ))
        }
    }
}

/// Per-widget overrides accepted by every `set_window`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubclassConfig {
    /// Paint this behind the control instead of the theme background.
    pub background: Option<Color>,
    pub skip: AnimationSkip,
    pub text_scale: TextScaleLimits,
}

impl SubclassConfig {
    /// Override the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Skip the given animation phases.
    pub fn with_skip(mut self, skip: AnimationSkip) -> Self {
        self.skip = skip;
        self
    }

    /// Use the given caption bounds.
    pub fn with_text_scale(mut self, text_scale: TextScaleLimits) -> Self {
        self.text_scale = text_scale;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        self.text_scale.validate()
    }
}

/// Per-phase transition durations, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationDurations {
    pub default_ms: u64,
    pub hover_ms: u64,
    pub active_ms: u64,
    pub focus_ms: u64,
    pub selected_ms: u64,
}

impl Default for AnimationDurations {
    fn default() -> Self {
        Self {
            default_ms: 150,
            hover_ms: 100,
            active_ms: 100,
            focus_ms: 100,
            selected_ms: 150,
        }
    }
}

impl AnimationDurations {
    pub fn default_phase(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn hover(&self) -> Duration {
        Duration::from_millis(self.hover_ms)
    }

    pub fn active(&self) -> Duration {
        Duration::from_millis(self.active_ms)
    }

    pub fn focus(&self) -> Duration {
        Duration::from_millis(self.focus_ms)
    }

    pub fn selected(&self) -> Duration {
        Duration::from_millis(self.selected_ms)
    }

    /// Duration of transitions into `phase`.
    pub fn for_phase(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Default => self.default_phase(),
            Phase::Hover => self.hover(),
            Phase::Active => self.active(),
            Phase::Focus => self.focus(),
            Phase::Selected => self.selected(),
        }
    }
}

/// Smooth-scroll and wheel tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollSettings {
    /// Slowest smooth-scroll speed, in pixels per second.
    pub min_speed: f64,
    /// Fastest smooth-scroll speed, in pixels per second.
    pub max_speed: f64,
    /// Speed per pixel of remaining distance.
    pub speed_factor: f64,
    /// Speed multiplier when a scroll reverses an animation in flight.
    pub reverse_boost: f64,
    /// Duration of position-targeted smooth scrolls.
    pub smooth_duration_ms: u64,
    /// Lines scrolled per wheel notch.
    pub wheel_lines: u32,
    /// Pixels per line.
    pub line_step: i32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            min_speed: 800.0,
            max_speed: 4000.0,
            speed_factor: 8.0,
            reverse_boost: 2.0,
            smooth_duration_ms: 250,
            wheel_lines: 3,
            line_step: 20,
        }
    }
}

impl ScrollSettings {
    pub fn smooth_duration(&self) -> Duration {
        Duration::from_millis(self.smooth_duration_ms)
    }

    /// Speed for a smooth scroll covering `distance` pixels.
    pub fn speed_for(&self, distance: f64, reversing: bool) -> f64 {
        let mut speed = distance.abs() * self.speed_factor;
        if reversing {
            speed *= self.reverse_boost;
        }
        speed.clamp(self.min_speed, self.max_speed)
    }
}

/// Toolkit-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitSettings {
    pub durations: AnimationDurations,
    pub scroll: ScrollSettings,
    /// Paint attempts before device loss is reported.
    pub paint_retry_cap: u32,
    /// Interval of animation and scroll timers.
    pub timer_interval_ms: u64,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            durations: AnimationDurations::default(),
            scroll: ScrollSettings::default(),
            paint_retry_cap: MAX_PAINT_ATTEMPTS,
            timer_interval_ms: 10,
        }
    }
}

impl ToolkitSettings {
    /// Parse settings from TOML and validate them.
    pub fn from_toml_str(source: &str) -> SettingsResult<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render the settings as TOML.
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    /// Reject values the widgets cannot work with.
    pub fn validate(&self) -> SettingsResult<()> {
        let scroll = &self.scroll;
        if !(scroll.min_speed.is_finite() && scroll.min_speed > 0.0) {
            return Err(invalid("scroll.min_speed", "must be positive"));
        }
        if !(scroll.max_speed.is_finite() && scroll.max_speed >= scroll.min_speed) {
            return Err(invalid("scroll.max_speed", "must not be below scroll.min_speed"));
        }
        if !(scroll.speed_factor.is_finite() && scroll.speed_factor > 0.0) {
            return Err(invalid("scroll.speed_factor", "must be positive"));
        }
        if !(scroll.reverse_boost.is_finite() && scroll.reverse_boost >= 1.0) {
            return Err(invalid("scroll.reverse_boost", "must be at least 1"));
        }
        if scroll.wheel_lines == 0 {
            return Err(invalid("scroll.wheel_lines", "must be at least 1"));
        }
        if scroll.line_step <= 0 {
            return Err(invalid("scroll.line_step", "must be positive"));
        }
        if self.paint_retry_cap == 0 {
            return Err(invalid("paint_retry_cap", "must be at least 1"));
        }
        if self.timer_interval_ms == 0 {
            return Err(invalid("timer_interval_ms", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        key,
        reason: reason.to_owned(),
    }
}

static_assertions::assert_impl_all!(ToolkitSettings: Send, Sync);
