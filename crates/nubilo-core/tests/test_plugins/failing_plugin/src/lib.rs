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

fn report(error: *mut FfiErrorSink, message: &str) {
    if error.is_null() {
        return;
    }
    unsafe { ((*error).write)((*error).buffer, message.as_ptr(), message.len()) };
}

// Both entry points exist, but `load` always fails with its own reason.
#[no_mangle]
pub extern "C-unwind" fn load(_context: *mut c_void, error: *mut FfiErrorSink) -> FfiResult {
    report(error, "failing_plugin: settings file is missing");
    FfiResult::Err
}

#[no_mangle]
pub extern "C-unwind" fn unload(_context: *mut c_void, _error: *mut FfiErrorSink) -> FfiResult {
    FfiResult::Ok
}
