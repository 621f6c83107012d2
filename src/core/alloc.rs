// Fallible heap placement: report allocator exhaustion instead of aborting.
use std::alloc::{Layout, alloc};

use crate::core::error::{Error, ErrorKind};

/// Moves `value` into a fresh heap allocation.
///
/// Unlike `Box::new`, a null return from the global allocator surfaces as
/// `ErrorKind::AllocationFailure`. On failure `value` is dropped here, so nothing
/// it owns outlives the call.
pub fn try_box<T>(value: T) -> Result<Box<T>, Error> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }
    // SAFETY: layout has non-zero size.
    let ptr = unsafe { alloc(layout) }.cast::<T>();
    if ptr.is_null() {
        return Err(Error::new(ErrorKind::AllocationFailure)
            .with_message(format!("failed to allocate {} bytes", layout.size())));
    }
    // SAFETY: ptr is non-null, was allocated by the global allocator with T's layout,
    // and is written before being handed to Box, which frees it with the same layout.
    unsafe {
        ptr.write(value);
        Ok(Box::from_raw(ptr))
    }
}
