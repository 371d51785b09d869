use std::ffi::c_void;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResult {
    Ok = 0,
    Err = 1,
    NullPointer = 2,
    Panic = 3,
}

#[repr(C)]
pub struct FfiErrorSink {
    buffer: *mut c_void,
    write: unsafe extern "C" fn(*mut c_void, *const u8, usize),
}

// Exports `load` only, and it always fails. The missing `unload` symbol is
// what the host is expected to reject.
#[no_mangle]
pub extern "C-unwind" fn load(_context: *mut c_void, error: *mut FfiErrorSink) -> FfiResult {
    if !error.is_null() {
        let message = "load_only_plugin refuses to load";
        unsafe { ((*error).write)((*error).buffer, message.as_ptr(), message.len()) };
    }
    FfiResult::Err
}
