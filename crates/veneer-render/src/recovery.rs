//! Bounded retry of paints interrupted by device loss.

use veneer_core::logging::targets;

use crate::error::RenderError;

/// Default number of paint attempts before device loss is reported.
pub const MAX_PAINT_ATTEMPTS: u32 = 10;

/// Errors that may report device loss.
///
/// [`paint_with_recovery`] retries only errors for which
/// [`is_device_loss`](Self::is_device_loss) is true.
pub trait DeviceLoss: From<RenderError> {
    /// Whether the error means the surface must be recreated.
    fn is_device_loss(&self) -> bool;
}

impl DeviceLoss for RenderError {
    fn is_device_loss(&self) -> bool {
        matches!(self, RenderError::RecreateTarget)
    }
}

/// What a successful [`paint_with_recovery`] call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintReport {
    /// Paint attempts made, including the successful one.
    pub attempts: u32,
    /// Resource rebuilds performed between attempts.
    pub rebuilds: u32,
}

/// Run `draw` until it succeeds, rebuilding resources after each device loss.
///
/// `draw` is retried only for device loss (see [`DeviceLoss`]); any other
/// error is returned immediately. Between attempts `rebuild` tears down and
/// recreates the surface and its resources. A rebuild is only performed when
/// another attempt remains. After `max_attempts` consecutive losses the
/// result is [`RenderError::RecoveryExhausted`], converted into `E`.
///
/// # Example
///
/// ```
/// use veneer_render::{paint_with_recovery, RenderError};
///
/// let mut failures = 2;
/// let report = paint_with_recovery(
///     &mut failures,
///     10,
///     |left| {
///         if *left > 0 {
///             *left -= 1;
///             Err(RenderError::RecreateTarget)
///         } else {
///             Ok(())
///         }
///     },
///     |_| Ok(()),
/// )
/// .unwrap();
/// assert_eq!(report.attempts, 3);
/// assert_eq!(report.rebuilds, 2);
/// ```
pub fn paint_with_recovery<T, E, D, R>(
    target: &mut T,
    max_attempts: u32,
    mut draw: D,
    mut rebuild: R,
) -> Result<PaintReport, E>
where
    T: ?Sized,
    E: DeviceLoss,
    D: FnMut(&mut T) -> Result<(), E>,
    R: FnMut(&mut T) -> Result<(), E>,
{
    let max_attempts = max_attempts.max(1);
    let mut report = PaintReport::default();

    while report.attempts < max_attempts {
        report.attempts += 1;
        match draw(target) {
            Ok(()) => return Ok(report),
            Err(err) if err.is_device_loss() => {
                tracing::warn!(
                    target: targets::RENDER,
                    attempt = report.attempts,
                    max_attempts,
                    "device lost during paint"
                );
                if report.attempts < max_attempts {
                    rebuild(target)?;
                    report.rebuilds += 1;
                }
            }
            Err(err) => return Err(err),
        }
    }

    tracing::error!(
        target: targets::RENDER,
        attempts = report.attempts,
        "giving up on paint after repeated device loss"
    );
    Err(RenderError::RecoveryExhausted {
        attempts: report.attempts,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderResult;

    #[derive(Default)]
    struct Target {
        failures_left: u32,
        draws: u32,
        rebuilds: u32,
    }

    fn draw(t: &mut Target) -> RenderResult<()> {
        t.draws += 1;
        if t.failures_left > 0 {
            t.failures_left -= 1;
            Err(RenderError::RecreateTarget)
        } else {
            Ok(())
        }
    }

    fn rebuild(t: &mut Target) -> RenderResult<()> {
        t.rebuilds += 1;
        Ok(())
    }

    #[test]
    fn test_first_attempt_succeeds() {
        let mut t = Target::default();
        let report = paint_with_recovery(&mut t, MAX_PAINT_ATTEMPTS, draw, rebuild).unwrap();
        assert_eq!(report, PaintReport { attempts: 1, rebuilds: 0 });
        assert_eq!(t.rebuilds, 0);
    }

    #[test]
    fn test_recovers_on_last_attempt() {
        let mut t = Target {
            failures_left: 9,
            ..Default::default()
        };
        let report = paint_with_recovery(&mut t, MAX_PAINT_ATTEMPTS, draw, rebuild).unwrap();
        assert_eq!(report, PaintReport { attempts: 10, rebuilds: 9 });
    }

    #[test]
    fn test_gives_up_after_cap() {
        let mut t = Target {
            failures_left: u32::MAX,
            ..Default::default()
        };
        let err = paint_with_recovery(&mut t, MAX_PAINT_ATTEMPTS, draw, rebuild).unwrap_err();
        assert_eq!(err, RenderError::RecoveryExhausted { attempts: 10 });
        assert_eq!(t.draws, 10);
        // No rebuild after the final failed attempt.
        assert_eq!(t.rebuilds, 9);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut t = Target::default();
        let err = paint_with_recovery(
            &mut t,
            MAX_PAINT_ATTEMPTS,
            |t| {
                t.draws += 1;
                Err(RenderError::NotDrawing)
            },
            rebuild,
        )
        .unwrap_err();
        assert_eq!(err, RenderError::NotDrawing);
        assert_eq!(t.draws, 1);
        assert_eq!(t.rebuilds, 0);
    }

    #[test]
    fn test_rebuild_failure_aborts() {
        let mut t = Target {
            failures_left: 1,
            ..Default::default()
        };
        let err = paint_with_recovery(&mut t, MAX_PAINT_ATTEMPTS, draw, |_| {
            Err(RenderError::InvalidWindow(veneer_core::WindowHandle::NULL))
        })
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidWindow(_)));
    }
}
