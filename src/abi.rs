//! Purpose: C ABI bridge exporting the `yakshaver.h` contract.
//! Exports: `create`, `destroy`, `shave`, `yaks_shaved`, plus callback-effect and
//! structured-error extensions.
//! Role: Stable ABI surface for C callers; mirrors `include/yakshaver.h`.
//! Invariants: Opaque handles; one `destroy` per `create`; explicit free functions.
//! Invariants: `shave` returns 0 on success and a negative status otherwise.
//! Invariants: Error kind codes map 1:1 with CLI exit codes.
//! Notes: Use after `destroy` is not detected; null handles are reported as usage errors.
#![allow(non_camel_case_types)]

use crate::core::effect::Effect;
use crate::core::error::{Error, ErrorKind, STATUS_OK, to_exit_code, to_status_code};
use crate::core::shaver::YakShaver;
use std::ffi::{CString, c_char, c_int, c_uint, c_void};
use std::ptr;

/// Shave effect supplied from C: returns 0 when the yak was shaved.
pub type yakshaver_effect_fn = unsafe extern "C" fn(ctx: *mut c_void, yak: c_uint) -> c_int;

/// Opaque handle; layout-identical to the `YakShaver` it wraps.
#[repr(transparent)]
pub struct yakshaver(YakShaver<AbiEffect>);

#[repr(C)]
pub struct yakshaver_error {
    kind: i32,
    message: *mut c_char,
    yak: c_uint,
    has_yak: u8,
}

enum AbiEffect {
    Trim,
    Callback {
        effect: yakshaver_effect_fn,
        ctx: *mut c_void,
    },
}

impl Effect for AbiEffect {
    fn apply(&mut self, yak: u32) -> Result<(), Error> {
        match self {
            AbiEffect::Trim => Ok(()),
            AbiEffect::Callback { effect, ctx } => {
                // SAFETY: the caller of `create_with_effect` guarantees `effect` is callable
                // with `ctx` for as long as the handle lives.
                let code = unsafe { (*effect)(*ctx, yak) };
                if code == 0 {
                    Ok(())
                } else {
                    Err(Error::new(ErrorKind::OperationFailure)
                        .with_message(format!("effect returned {code}")))
                }
            }
        }
    }
}

/// Creates a yakshaver whose shaves always succeed. Returns null on allocation failure.
#[unsafe(no_mangle)]
pub extern "C" fn create() -> *mut yakshaver {
    create_with_effect(None, ptr::null_mut())
}

/// Creates a yakshaver that calls `effect(ctx, yak)` for each shave.
///
/// A null `effect` behaves like `create`. `ctx` stays owned by the caller and must
/// outlive the handle. Returns null on allocation failure.
#[unsafe(no_mangle)]
pub extern "C" fn create_with_effect(
    effect: Option<yakshaver_effect_fn>,
    ctx: *mut c_void,
) -> *mut yakshaver {
    let effect = match effect {
        Some(effect) => AbiEffect::Callback { effect, ctx },
        None => AbiEffect::Trim,
    };
    YakShaver::create_with(effect)
        .map(|handle| Box::into_raw(handle).cast::<yakshaver>())
        .unwrap_or(ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn destroy(handle: *mut yakshaver) {
    if handle.is_null() {
        return;
    }
    // SAFETY: `yakshaver` is `repr(transparent)` over `YakShaver<AbiEffect>`, and every
    // non-null handle came from `Box::into_raw` in `create_with_effect`.
    unsafe { Box::from_raw(handle.cast::<YakShaver<AbiEffect>>()) }.destroy();
}

#[unsafe(no_mangle)]
pub extern "C" fn yaks_shaved(handle: *const yakshaver) -> c_uint {
    match borrow_shaver_ref(handle) {
        Some(handle) => handle.0.yaks_shaved(),
        None => 0,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn shave(handle: *mut yakshaver) -> c_int {
    shave_checked(handle, ptr::null_mut())
}

/// Like `shave`, but on failure also stores a `yakshaver_error` in `out_err` (if non-null).
/// The caller releases it with `yakshaver_error_free`.
#[unsafe(no_mangle)]
pub extern "C" fn shave_checked(
    handle: *mut yakshaver,
    out_err: *mut *mut yakshaver_error,
) -> c_int {
    let handle = match borrow_shaver(handle, out_err) {
        Ok(handle) => handle,
        Err(code) => return code,
    };
    match handle.0.shave() {
        Ok(_) => STATUS_OK,
        Err(err) => fail(out_err, err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn yakshaver_error_kind(err: *const yakshaver_error) -> c_int {
    if err.is_null() {
        return 0;
    }
    unsafe { (*err).kind }
}

#[unsafe(no_mangle)]
pub extern "C" fn yakshaver_error_message(err: *const yakshaver_error) -> *const c_char {
    if err.is_null() {
        return ptr::null();
    }
    unsafe { (*err).message }
}

/// Yak index the failed attempt was working on, or 0 when the error has none.
#[unsafe(no_mangle)]
pub extern "C" fn yakshaver_error_yak(err: *const yakshaver_error) -> c_uint {
    if err.is_null() {
        return 0;
    }
    unsafe {
        if (*err).has_yak != 0 { (*err).yak } else { 0 }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn yakshaver_error_free(err: *mut yakshaver_error) {
    if err.is_null() {
        return;
    }
    unsafe {
        let err = Box::from_raw(err);
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
        }
    }
}

fn borrow_shaver<'a>(
    handle: *mut yakshaver,
    out_err: *mut *mut yakshaver_error,
) -> Result<&'a mut yakshaver, i32> {
    if handle.is_null() {
        return Err(fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("yakshaver is null"),
        ));
    }
    unsafe { Ok(&mut *handle) }
}

fn borrow_shaver_ref<'a>(handle: *const yakshaver) -> Option<&'a yakshaver> {
    if handle.is_null() {
        return None;
    }
    unsafe { Some(&*handle) }
}

fn fail(out_err: *mut *mut yakshaver_error, err: Error) -> i32 {
    let code = to_status_code(err.kind());
    if out_err.is_null() {
        return code;
    }
    let error = Box::new(yakshaver_error {
        kind: to_exit_code(err.kind()),
        message: to_c_string(&err.to_string()),
        yak: err.yak().unwrap_or(0),
        has_yak: if err.yak().is_some() { 1 } else { 0 },
    });
    unsafe {
        *out_err = Box::into_raw(error);
    }
    code
}

fn to_c_string(input: &str) -> *mut c_char {
    CString::new(input)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}
