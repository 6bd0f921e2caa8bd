use super::driver::types::{ObjectKind, RawHandle};
use super::driver::Driver;
use crate::{GlazeError, Result};

/// State of one driver-side object: a live handle or nothing.
///
/// The lifecycle is `Unallocated -> Allocated -> Released`, with the release
/// edge taken at most once against the driver. Anything other than
/// [`RawObject::release`] on a released (or never-allocated) object fails with
/// [`GlazeError::NotAllocated`]. Identity is handle plus kind.
///
/// Driver handles are not garbage collected; dropping a live object leaks it
/// on the driver side. `Drop` only logs the leak, it never issues the delete
/// call.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawObject {
    handle: Option<RawHandle>,
    kind: ObjectKind,
}

impl RawObject {
    pub fn new(handle: RawHandle, kind: ObjectKind) -> Self {
        Self {
            handle: Some(handle),
            kind,
        }
    }

    pub fn unallocated(kind: ObjectKind) -> Self {
        Self { handle: None, kind }
    }

    pub fn handle(&self) -> Result<RawHandle> {
        self.handle
            .ok_or(GlazeError::NotAllocated { kind: self.kind })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn is_allocated(&self) -> bool {
        self.handle.is_some()
    }

    /// Delete the driver object. Safe to call any number of times; only the
    /// first call on a live handle reaches the driver.
    pub fn release(&mut self, driver: &mut dyn Driver) {
        if let Some(handle) = self.handle.take() {
            log::debug!("releasing {:?} handle {}", self.kind, handle);
            driver.delete_object(self.kind, handle);
        }
    }
}

impl Drop for RawObject {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            log::warn!("leaked {:?} handle {} (dropped without release)", self.kind, handle);
        }
    }
}

/// Shared surface of every driver-object wrapper.
///
/// Concrete kinds embed a [`RawObject`] and expose it through
/// [`GpuObject::raw`]; lifecycle, identity, and debug labeling come for free.
pub trait GpuObject {
    fn raw(&self) -> &RawObject;
    fn raw_mut(&mut self) -> &mut RawObject;

    fn handle(&self) -> Result<RawHandle> {
        self.raw().handle()
    }

    fn kind(&self) -> ObjectKind {
        self.raw().kind()
    }

    fn is_allocated(&self) -> bool {
        self.raw().is_allocated()
    }

    /// Delete the driver object. Idempotent; a second release is a no-op.
    fn release(&mut self, driver: &mut dyn Driver) {
        self.raw_mut().release(driver);
    }

    /// Attach a debug label to the live object.
    fn set_debug_name(&self, driver: &mut dyn Driver, name: &str) -> Result<()> {
        let handle = self.handle()?;
        driver.set_debug_name(self.kind(), handle, name);
        Ok(())
    }

    /// Read back the object's debug label.
    fn debug_name(&self, driver: &dyn Driver) -> Result<String> {
        let handle = self.handle()?;
        Ok(driver.debug_name(self.kind(), handle))
    }
}

/// Check that `handle` really is a live `kind` object before wrapping it.
///
/// Backs the validating from-handle constructors used when handles come from
/// enumeration or foreign code. The unchecked constructors skip this and trust
/// the caller.
pub(crate) fn validate_raw(
    driver: &dyn Driver,
    kind: ObjectKind,
    handle: RawHandle,
) -> Result<RawObject> {
    if driver.is_kind(kind, handle) {
        Ok(RawObject::new(handle, kind))
    } else {
        Err(GlazeError::InvalidHandle { kind, handle })
    }
}
