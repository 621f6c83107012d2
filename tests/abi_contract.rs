// C ABI contract tests: the `yakshaver.h` surface driven from Rust.
use std::ffi::{CStr, c_int, c_uint, c_void};
use std::io::{self, Write};
use std::ptr;
use std::sync::{Arc, Mutex};

use yakshaver::abi::{
    create, create_with_effect, destroy, shave, shave_checked, yakshaver_error,
    yakshaver_error_free, yakshaver_error_kind, yakshaver_error_message, yakshaver_error_yak,
    yaks_shaved,
};

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().expect("log buffer").clone();
    String::from_utf8(bytes).expect("utf8 logs")
}

#[derive(Default)]
struct Razor {
    calls: Vec<c_uint>,
    fail_on_call: Option<usize>,
}

unsafe extern "C" fn razor_effect(ctx: *mut c_void, yak: c_uint) -> c_int {
    let razor = unsafe { &mut *(ctx as *mut Razor) };
    razor.calls.push(yak);
    if razor.fail_on_call == Some(razor.calls.len()) {
        3
    } else {
        0
    }
}

#[test]
fn fresh_handle_reports_zero() {
    let handle = create();
    assert!(!handle.is_null());
    assert_eq!(yaks_shaved(handle), 0);
    destroy(handle);
}

#[test]
fn three_shaves_count_three() {
    let handle = create();
    assert_eq!(shave(handle), 0);
    assert_eq!(shave(handle), 0);
    assert_eq!(shave(handle), 0);
    assert_eq!(yaks_shaved(handle), 3);
    destroy(handle);
}

#[test]
fn failed_shave_leaves_count_unchanged() {
    let mut razor = Razor {
        fail_on_call: Some(1),
        ..Razor::default()
    };
    let handle = create_with_effect(Some(razor_effect), &mut razor as *mut Razor as *mut c_void);
    assert!(!handle.is_null());

    assert_eq!(shave(handle), -1);
    assert_eq!(yaks_shaved(handle), 0);
    assert_eq!(shave(handle), 0);
    assert_eq!(yaks_shaved(handle), 1);

    destroy(handle);
    assert_eq!(razor.calls, [1, 1]);
}

#[test]
fn null_effect_behaves_like_create() {
    let handle = create_with_effect(None, ptr::null_mut());
    assert_eq!(shave(handle), 0);
    assert_eq!(yaks_shaved(handle), 1);
    destroy(handle);
}

#[test]
fn handles_are_independent() {
    let left = create();
    let right = create();
    assert_eq!(shave(left), 0);
    assert_eq!(shave(left), 0);
    assert_eq!(shave(right), 0);
    assert_eq!(yaks_shaved(left), 2);
    assert_eq!(yaks_shaved(right), 1);
    destroy(left);
    destroy(right);
}

#[test]
fn shave_checked_reports_structured_error() {
    let mut razor = Razor {
        fail_on_call: Some(2),
        ..Razor::default()
    };
    let handle = create_with_effect(Some(razor_effect), &mut razor as *mut Razor as *mut c_void);

    let mut err: *mut yakshaver_error = ptr::null_mut();
    assert_eq!(shave_checked(handle, &mut err), 0);
    assert!(err.is_null());

    assert_eq!(shave_checked(handle, &mut err), -1);
    assert!(!err.is_null());
    assert_eq!(yakshaver_error_kind(err), 4);
    assert_eq!(yakshaver_error_yak(err), 2);
    let message = unsafe { CStr::from_ptr(yakshaver_error_message(err)) }
        .to_str()
        .expect("utf8");
    assert!(message.contains("effect returned 3"), "{message}");
    yakshaver_error_free(err);

    assert_eq!(yaks_shaved(handle), 1);
    destroy(handle);
}

#[test]
fn null_handle_is_a_usage_error() {
    assert_eq!(shave(ptr::null_mut()), -2);

    let mut err: *mut yakshaver_error = ptr::null_mut();
    assert_eq!(shave_checked(ptr::null_mut(), &mut err), -2);
    assert_eq!(yakshaver_error_kind(err), 2);
    assert_eq!(yakshaver_error_yak(err), 0);
    yakshaver_error_free(err);

    assert_eq!(yaks_shaved(ptr::null()), 0);
    destroy(ptr::null_mut());
    yakshaver_error_free(ptr::null_mut());
}

#[test]
fn lifecycle_is_logged_through_the_abi() {
    let logs = capture_logs(|| {
        let handle = create();
        assert_eq!(shave(handle), 0);
        destroy(handle);
    });
    assert!(logs.contains("created yakshaver"), "{logs}");
    assert!(logs.contains("yak shaved"), "{logs}");
    assert!(logs.contains("destroying yakshaver"), "{logs}");
    assert!(logs.contains("yaks_shaved=1"), "{logs}");
}
