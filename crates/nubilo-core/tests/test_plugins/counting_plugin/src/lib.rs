use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

// Mirrors nubilo_core::plugin_system::ffi::FfiResult
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResult {
    Ok = 0,
    Err = 1,
    NullPointer = 2,
    Panic = 3,
}

// Mirrors nubilo_core::plugin_system::ffi::FfiErrorSink
#[repr(C)]
pub struct FfiErrorSink {
    buffer: *mut c_void,
    write: unsafe extern "C" fn(*mut c_void, *const u8, usize),
}

static LOADS: AtomicUsize = AtomicUsize::new(0);
static UNLOADS: AtomicUsize = AtomicUsize::new(0);

#[no_mangle]
pub extern "C-unwind" fn load(context: *mut c_void, _error: *mut FfiErrorSink) -> FfiResult {
    if context.is_null() {
        return FfiResult::NullPointer;
    }
    LOADS.fetch_add(1, Ordering::SeqCst);
    FfiResult::Ok
}

#[no_mangle]
pub extern "C-unwind" fn unload(context: *mut c_void, _error: *mut FfiErrorSink) -> FfiResult {
    if context.is_null() {
        return FfiResult::NullPointer;
    }
    UNLOADS.fetch_add(1, Ordering::SeqCst);
    FfiResult::Ok
}

// Counters live as long as the library stays mapped.
#[no_mangle]
pub extern "C" fn load_count() -> usize {
    LOADS.load(Ordering::SeqCst)
}

#[no_mangle]
pub extern "C" fn unload_count() -> usize {
    UNLOADS.load(Ordering::SeqCst)
}
