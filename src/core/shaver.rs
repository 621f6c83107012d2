// The yakshaver: an exclusively owned counter advanced by successful shaves.
use crate::core::alloc::try_box;
use crate::core::effect::{Effect, Trim};
use crate::core::error::{Error, ErrorKind};

/// Owned handle to a heap-placed [`YakShaver`], as returned by [`YakShaver::create`].
pub type Handle<E = Trim> = Box<YakShaver<E>>;

/// Counts yaks shaved by an injected [`Effect`].
///
/// The count only moves on a successful [`shave`](Self::shave), by exactly one. There
/// is no interior mutability: sharing a shaver across threads means wrapping it in a
/// lock.
#[derive(Debug)]
pub struct YakShaver<E = Trim> {
    shaved: u32,
    effect: E,
}

impl YakShaver<Trim> {
    /// Heap-allocates a shaver whose shaves always succeed.
    pub fn create() -> Result<Handle, Error> {
        Self::create_with(Trim)
    }
}

impl<E: Effect> YakShaver<E> {
    pub fn new(effect: E) -> Self {
        Self { shaved: 0, effect }
    }

    /// Heap-allocates a shaver driven by `effect`.
    ///
    /// Fails with `ErrorKind::AllocationFailure` if the allocator is exhausted, in
    /// which case `effect` is dropped and no handle exists.
    pub fn create_with(effect: E) -> Result<Handle<E>, Error> {
        let handle = try_box(Self::new(effect)).inspect_err(|err| {
            tracing::warn!(error = %err, "yakshaver allocation failed");
        })?;
        tracing::debug!("created yakshaver");
        Ok(handle)
    }

    /// Retires a heap-allocated shaver, releasing it and its effect.
    pub fn destroy(self: Box<Self>) {
        tracing::debug!(yaks_shaved = self.shaved, "destroying yakshaver");
        drop(self);
    }

    /// Shaves one yak, returning the new total on success.
    ///
    /// Every failure has kind `ErrorKind::OperationFailure` and leaves the count as it
    /// was. Effect errors of other kinds are kept as the source.
    pub fn shave(&mut self) -> Result<u32, Error> {
        let Some(yak) = self.shaved.checked_add(1) else {
            return Err(Error::new(ErrorKind::OperationFailure)
                .with_message("yak counter is saturated")
                .with_hint("Create a new yakshaver to keep shaving."));
        };
        match self.effect.apply(yak) {
            Ok(()) => {
                self.shaved = yak;
                tracing::trace!(yak, "yak shaved");
                Ok(yak)
            }
            Err(err) => {
                tracing::debug!(yak, error = %err, "shave failed");
                Err(operation_failure(err, yak))
            }
        }
    }

    pub fn yaks_shaved(&self) -> u32 {
        self.shaved
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }
}

impl<E: Effect + Default> Default for YakShaver<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

fn operation_failure(err: Error, yak: u32) -> Error {
    if err.kind() != ErrorKind::OperationFailure {
        return Error::new(ErrorKind::OperationFailure)
            .with_message("shave effect failed")
            .with_yak(yak)
            .with_source(err);
    }
    if err.yak().is_none() {
        return err.with_yak(yak);
    }
    err
}

#[cfg(test)]
impl<E> YakShaver<E> {
    fn with_count(shaved: u32, effect: E) -> Self {
        Self { shaved, effect }
    }
}
