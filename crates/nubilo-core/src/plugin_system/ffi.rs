//! C ABI shared by the host and dynamically loaded plugins.
//!
//! A plugin library exports two symbols, `load` and `unload`, each of type
//! [`RawEntryPoint`]. They receive a pointer to the host's
//! [`HostContext`] and a host-owned [`FfiErrorSink`], and report the outcome
//! as an [`FfiResult`]. On failure the plugin writes its own message into the
//! sink so the host can log it. Plugin authors normally generate both symbols
//! with [`export_plugin!`](crate::export_plugin).
//!
//! The context is passed as a Rust type, so a plugin must be built against the
//! same `nubilo-core` and compiler as the host.
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

use crate::kernel::context::HostContext;
use crate::plugin_system::loader::panic_message;

/// Outcome of an entry-point call across the library boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResult {
    Ok = 0,
    Err = 1,
    NullPointer = 2,
    Panic = 3,
}

impl FfiResult {
    /// Human readable description used in host-side error messages.
    pub fn describe(self) -> &'static str {
        match self {
            FfiResult::Ok => "success",
            FfiResult::Err => "entry point returned an error",
            FfiResult::NullPointer => "entry point received a null context",
            FfiResult::Panic => "entry point panicked",
        }
    }
}

/// Callback a plugin uses to append UTF-8 bytes to the host's message buffer.
pub type RawWriteMessage = unsafe extern "C" fn(buffer: *mut c_void, data: *const u8, len: usize);

/// Host-owned buffer receiving the failure message of an entry-point call.
///
/// Only the two pointers cross the boundary; the buffer itself is a `String`
/// on the host side that the plugin never touches directly.
#[repr(C)]
pub struct FfiErrorSink<'a> {
    buffer: *mut c_void,
    write: RawWriteMessage,
    _buffer: PhantomData<&'a mut String>,
}

impl<'a> FfiErrorSink<'a> {
    /// A sink appending to `buffer`.
    pub fn new(buffer: &'a mut String) -> Self {
        Self {
            buffer: buffer as *mut String as *mut c_void,
            write: append_to_string,
            _buffer: PhantomData,
        }
    }

    /// Write `message` into the sink behind `sink`.
    ///
    /// # Safety
    ///
    /// `sink` must be null or point to a live `FfiErrorSink`.
    pub unsafe fn report(sink: *mut FfiErrorSink<'_>, message: &str) {
        if sink.is_null() {
            return;
        }
        let sink = unsafe { &*sink };
        unsafe { (sink.write)(sink.buffer, message.as_ptr(), message.len()) };
    }
}

unsafe extern "C" fn append_to_string(buffer: *mut c_void, data: *const u8, len: usize) {
    if buffer.is_null() || data.is_null() {
        return;
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let buffer = unsafe { &mut *(buffer as *mut String) };
    buffer.push_str(&String::from_utf8_lossy(bytes));
}

/// Signature of the exported `load` and `unload` symbols.
pub type RawEntryPoint =
    unsafe extern "C-unwind" fn(context: *mut c_void, error: *mut FfiErrorSink<'_>) -> FfiResult;

pub const LOAD_SYMBOL: &str = "load";
pub const UNLOAD_SYMBOL: &str = "unload";

/// Run a safe entry-point body on the plugin side of the boundary.
///
/// Panics are caught here so they never unwind into the host. Errors and
/// panic messages are written to `error` and reduced to [`FfiResult::Err`]
/// or [`FfiResult::Panic`].
///
/// # Safety
///
/// `context` must be null or point to a live `HostContext` that nothing else
/// accesses for the duration of the call. `error` must be null or point to a
/// live `FfiErrorSink`.
pub unsafe fn invoke_entry_point<F, E>(context: *mut c_void, error: *mut FfiErrorSink<'_>, body: F) -> FfiResult
where
    F: FnOnce(&mut HostContext) -> Result<(), E>,
    E: fmt::Display,
{
    if context.is_null() {
        return FfiResult::NullPointer;
    }
    let host = unsafe { &mut *(context as *mut HostContext) };

    match panic::catch_unwind(AssertUnwindSafe(|| body(host))) {
        Ok(Ok(())) => FfiResult::Ok,
        Ok(Err(e)) => {
            unsafe { FfiErrorSink::report(error, &e.to_string()) };
            FfiResult::Err
        }
        Err(panic_obj) => {
            unsafe { FfiErrorSink::report(error, &panic_message(panic_obj.as_ref())) };
            FfiResult::Panic
        }
    }
}

/// Export `load` and `unload` symbols for a plugin library.
///
/// Both functions take `&mut HostContext` and return `Result<(), E>` for any
/// displayable `E`.
///
/// ```ignore
/// fn on_load(ctx: &mut HostContext) -> Result<(), MenuError> {
///     ctx.menu_mut().add_item("hello", "Hello", "/hello")
/// }
///
/// fn on_unload(ctx: &mut HostContext) -> Result<(), MenuError> {
///     ctx.menu_mut().remove_app("hello");
///     Ok(())
/// }
///
/// nubilo_core::export_plugin!(load = on_load, unload = on_unload);
/// ```
#[macro_export]
macro_rules! export_plugin {
    (load = $load:path, unload = $unload:path $(,)?) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C-unwind" fn load(
            context: *mut ::std::ffi::c_void,
            error: *mut $crate::plugin_system::ffi::FfiErrorSink<'_>,
        ) -> $crate::plugin_system::ffi::FfiResult {
            unsafe { $crate::plugin_system::ffi::invoke_entry_point(context, error, $load) }
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C-unwind" fn unload(
            context: *mut ::std::ffi::c_void,
            error: *mut $crate::plugin_system::ffi::FfiErrorSink<'_>,
        ) -> $crate::plugin_system::ffi::FfiResult {
            unsafe { $crate::plugin_system::ffi::invoke_entry_point(context, error, $unload) }
        }
    };
}
