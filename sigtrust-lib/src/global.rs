//! Process-wide entry points over a single [`TrustContext`].
//!
//! For callers that want an initialize-once, verify-anywhere lifecycle
//! instead of passing a context around. All calls serialize on one mutex.
//! The lifecycle runs one way: uninitialized, initialized, torn down. A
//! failed `init` leaves the process uninitialized. `deinit` may be called
//! any number of times; once a context has been released no new one can be
//! installed.

use crate::verify::{TrustContext, VerifyOptions};
use crate::SigError;
use parking_lot::{const_mutex, Mutex};
use std::path::Path;

enum State {
    Uninitialized,
    Ready(TrustContext),
    TornDown,
}

static STATE: Mutex<State> = const_mutex(State::Uninitialized);

/// Install the process-wide trust context.
///
/// # Errors
///
/// [`SigError::AlreadyInitialized`] if a context is installed,
/// [`SigError::TornDown`] after [`deinit`] released one, or whatever
/// [`TrustContext::init`] reports. The state is unchanged on error.
pub fn try_init(root_path: impl AsRef<Path>, crl_path: Option<&Path>) -> Result<(), SigError> {
    let mut state = STATE.lock();
    match *state {
        State::Uninitialized => {
            *state = State::Ready(TrustContext::init(root_path, crl_path)?);
            Ok(())
        }
        State::Ready(_) => Err(SigError::AlreadyInitialized),
        State::TornDown => Err(SigError::TornDown),
    }
}

/// [`try_init`] reduced to success or failure. Failures are logged.
pub fn init(root_path: impl AsRef<Path>, crl_path: Option<&Path>) -> bool {
    match try_init(root_path, crl_path) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Failed to initialize signature verification: {}", e);
            false
        }
    }
}

/// Drop the process-wide trust context, if any.
pub fn deinit() {
    let mut state = STATE.lock();
    if let State::Ready(_) = *state {
        *state = State::TornDown;
        log::debug!("Signature verification context released");
    }
}

pub fn is_initialized() -> bool {
    matches!(*STATE.lock(), State::Ready(_))
}

/// Run `f` against the installed context.
pub fn with_context<R>(f: impl FnOnce(&TrustContext) -> R) -> Result<R, SigError> {
    match &*STATE.lock() {
        State::Ready(ctx) => Ok(f(ctx)),
        State::Uninitialized => Err(SigError::NotInitialized),
        State::TornDown => Err(SigError::TornDown),
    }
}

/// [`TrustContext::verify_data`] on the installed context; false when
/// uninitialized.
pub fn verify_data(data: &[u8], signature: &[u8], options: VerifyOptions) -> bool {
    with_context(|ctx| ctx.verify_data(data, signature, options)).unwrap_or_else(|e| {
        if options.print_errors {
            log::debug!("{}", e);
        }
        false
    })
}

/// [`TrustContext::verify_files`] on the installed context; false when
/// uninitialized.
pub fn verify_files(
    data_path: impl AsRef<Path>,
    signature_path: impl AsRef<Path>,
    options: VerifyOptions,
) -> bool {
    with_context(|ctx| ctx.verify_files(data_path, signature_path, options)).unwrap_or_else(|e| {
        if options.print_errors {
            log::debug!("{}", e);
            log::warn!("Signature check failed");
        }
        false
    })
}
