// StepInvoker: runs a step implementation behind a panic boundary.
//
// Every fault raised by step code, whether a returned error, an argument
// mismatch or a panic, becomes a `Failure` outcome. Nothing escapes to the
// message loop.

use gauge_common::ProtoExecutionResult;
use gauge_sdk::StepArg;
use once_cell::sync::Lazy;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use crate::error::ExecutionError;
use crate::registry::Step;

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure { message: String, stack_trace: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success)
    }

    /// Wire representation, stamped with the measured execution time.
    pub fn into_result(self, execution_time_ms: i64) -> ProtoExecutionResult {
        match self {
            ExecutionOutcome::Success => ProtoExecutionResult::success(execution_time_ms),
            ExecutionOutcome::Failure {
                message,
                stack_trace,
            } => ProtoExecutionResult::failure(message, stack_trace, execution_time_ms),
        }
    }
}

impl From<ExecutionError> for ExecutionOutcome {
    fn from(err: ExecutionError) -> Self {
        ExecutionOutcome::Failure {
            message: err.to_string(),
            stack_trace: err.stack_trace(),
        }
    }
}

/// Where and how a step panicked, recorded by the panic hook.
struct PanicReport {
    location: Option<String>,
    backtrace: String,
}

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

// Records panic details while a step runs on this thread; otherwise defers to
// whatever hook was installed before.
static PANIC_HOOK: Lazy<()> = Lazy::new(|| {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if CAPTURING.with(Cell::get) {
            let report = PanicReport {
                location: info.location().map(|l| l.to_string()),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
        } else {
            previous(info);
        }
    }));
});

/// Resets the capture flag even if something between set and reset unwinds.
struct CaptureGuard;

impl CaptureGuard {
    fn enter() -> Self {
        LAST_PANIC.with(|slot| *slot.borrow_mut() = None);
        CAPTURING.with(|flag| flag.set(true));
        CaptureGuard
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURING.with(|flag| flag.set(false));
    }
}

/// Invokes step implementations synchronously on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInvoker;

impl StepInvoker {
    pub fn new() -> Self {
        Self
    }

    /// Call `step` with `args` bound positionally.
    pub fn invoke(&self, step: &Step, args: Vec<StepArg>) -> ExecutionOutcome {
        Lazy::force(&PANIC_HOOK);

        let result = {
            let _guard = CaptureGuard::enter();
            panic::catch_unwind(AssertUnwindSafe(|| step.call(args)))
        };

        match result {
            Ok(Ok(())) => ExecutionOutcome::Success,
            Ok(Err(step_error)) => {
                tracing::debug!(
                    step = step.description(),
                    error = %step_error,
                    "Step returned error"
                );
                ExecutionError::Step(step_error).into()
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let report = LAST_PANIC.with(|slot| slot.borrow_mut().take());
                tracing::debug!(
                    step = step.description(),
                    panic_msg = %message,
                    "Step panicked"
                );
                ExecutionError::Panicked {
                    message,
                    location: report.as_ref().and_then(|r| r.location.clone()),
                    backtrace: report.map(|r| r.backtrace),
                }
                .into()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
