//! Process-exit interception.
//!
//! Launched components assume they own the process lifecycle and ask to
//! terminate it. While a launch is active that request must become a
//! catchable value instead of killing the host. [`ExitInterceptor`] is the
//! process-wide controller: [`arm`](ExitInterceptor::arm) returns an RAII
//! guard, and only while the guard lives does [`request_exit`] raise an
//! [`ExitSignal`] instead of really exiting.
//!
//! Two invariants carry the design:
//! - disarming is guaranteed on every path out of a launch (guard drop), so
//!   the host's own final termination is never intercepted; and
//! - while armed, only exit requests are mediated: any other panic is
//!   delegated unchanged to whatever panic hook was installed before
//!   arming, and that hook is restored on disarm.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use tracing::debug;

type PanicHook = dyn Fn(&panic::PanicInfo<'_>) + Send + Sync + 'static;

/// "The launched component asked to terminate the process with this
/// status." A control-flow value, not an error: it travels as a panic
/// payload from [`request_exit`] to the execution context's catch boundary
/// and is never wrapped into a [`LaunchError`](crate::core::errors::LaunchError).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitSignal {
    pub status: i32,
}

/// Process-wide exit interception state.
pub struct ExitInterceptor {
    armed: AtomicBool,
    /// Serializes launches: two concurrent `arm()`s would corrupt the
    /// armed/hook bookkeeping, so the second blocks until the first guard
    /// drops.
    active: Mutex<()>,
}

lazy_static! {
    static ref INTERCEPTOR: ExitInterceptor = ExitInterceptor {
        armed: AtomicBool::new(false),
        active: Mutex::new(()),
    };
}

impl ExitInterceptor {
    /// The single process-wide interceptor.
    pub fn global() -> &'static ExitInterceptor {
        &INTERCEPTOR
    }

    /// Begin intercepting exit requests.
    ///
    /// Blocks until no other launch is active, swaps in a panic hook that
    /// stays silent for [`ExitSignal`] payloads while delegating everything
    /// else to the previously installed hook, and sets the armed flag. All
    /// of it is undone when the returned guard drops.
    pub fn arm(&'static self) -> InterceptGuard {
        let active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let prior: Arc<PanicHook> = Arc::from(panic::take_hook());
        let delegate = Arc::clone(&prior);
        panic::set_hook(Box::new(move |info| {
            if info.payload().downcast_ref::<ExitSignal>().is_none() {
                delegate(info);
            }
        }));

        self.armed.store(true, Ordering::SeqCst);
        debug!("exit interception armed");
        InterceptGuard {
            interceptor: self,
            prior: Some(prior),
            _active: active,
        }
    }

    /// Whether exit requests are currently intercepted.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Handle a request to terminate the process.
    ///
    /// Armed: raises [`ExitSignal`] for the nearest frame prepared to catch
    /// it. Unarmed: really terminates the process, which is the path the
    /// launcher's own caller takes once the run is over.
    pub fn exit_requested(&self, status: i32) -> ! {
        if self.is_armed() {
            panic::panic_any(ExitSignal { status });
        }
        std::process::exit(status);
    }
}

/// Scoped interception. Dropping restores normal termination semantics and
/// the prior panic hook; a new launch must re-arm from scratch.
pub struct InterceptGuard {
    interceptor: &'static ExitInterceptor,
    prior: Option<Arc<PanicHook>>,
    _active: MutexGuard<'static, ()>,
}

impl Drop for InterceptGuard {
    fn drop(&mut self) {
        self.interceptor.armed.store(false, Ordering::SeqCst);
        if let Some(prior) = self.prior.take() {
            // The hook cannot be swapped from a panicking thread. Armed is
            // already cleared, and the wrapper delegates every non-signal
            // panic to the prior hook, so leaving it in place is sound.
            if !std::thread::panicking() {
                let _ = panic::take_hook();
                panic::set_hook(Box::new(move |info| prior(info)));
            }
        }
        debug!("exit interception disarmed");
    }
}

/// Request process termination with `status`.
///
/// Launched components call this where a standalone program would exit the
/// process directly.
pub fn request_exit(status: i32) -> ! {
    ExitInterceptor::global().exit_requested(status)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_armed_request_becomes_signal() {
        let _serial = test_support::serial();
        let interceptor = ExitInterceptor::global();
        {
            let _guard = interceptor.arm();
            assert!(interceptor.is_armed());

            let payload = catch_unwind(AssertUnwindSafe(|| request_exit(7))).unwrap_err();
            let signal = payload.downcast_ref::<ExitSignal>().unwrap();
            assert_eq!(signal.status, 7);

            // Still armed: one signal does not disarm.
            assert!(interceptor.is_armed());
        }
        assert!(!interceptor.is_armed());
    }

    #[test]
    fn test_guard_disarms_on_unwind() {
        let _serial = test_support::serial();
        let interceptor = ExitInterceptor::global();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = interceptor.arm();
            panic!("invocation failed");
        }));
        assert!(result.is_err());
        assert!(!interceptor.is_armed());
    }

    #[test]
    fn test_rearm_after_disarm() {
        let _serial = test_support::serial();
        let interceptor = ExitInterceptor::global();
        {
            let _guard = interceptor.arm();
            assert!(interceptor.is_armed());
        }
        assert!(!interceptor.is_armed());
        {
            let _guard = interceptor.arm();
            assert!(interceptor.is_armed());
        }
        assert!(!interceptor.is_armed());
    }
}
