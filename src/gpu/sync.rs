use super::driver::types::{ObjectKind, QueryTarget, RawHandle, WaitFlags, WaitStatus};
use super::driver::Driver;
use super::object::{validate_raw, GpuObject, RawObject};
use crate::Result;

/// A driver-observed completion signal for previously submitted work.
///
/// Fences go `Unsignaled -> Signaled` exactly once. Waiting from the host is
/// the only blocking operation in the crate; waits are bounded solely by the
/// caller's timeout, there is no cancellation of in-flight GPU work.
#[derive(Debug)]
pub struct Fence {
    raw: RawObject,
}

impl Fence {
    /// Insert a fence into the command stream; it signals once all prior
    /// submissions complete.
    pub fn new(driver: &mut dyn Driver) -> Result<Self> {
        let handle = driver.create_fence()?;
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Fence),
        })
    }

    pub fn from_raw(driver: &dyn Driver, handle: RawHandle) -> Result<Self> {
        Ok(Self {
            raw: validate_raw(driver, ObjectKind::Fence, handle)?,
        })
    }

    pub fn from_raw_unchecked(handle: RawHandle) -> Self {
        Self {
            raw: RawObject::new(handle, ObjectKind::Fence),
        }
    }

    /// Block the calling thread until the fence signals or `timeout_ns`
    /// elapses.
    ///
    /// A timeout is an expected [`WaitStatus`] outcome; only a driver-side
    /// failure (device lost) is an error.
    pub fn client_wait(
        &self,
        driver: &mut dyn Driver,
        flags: WaitFlags,
        timeout_ns: u64,
    ) -> Result<WaitStatus> {
        driver.client_wait(self.raw.handle()?, flags, timeout_ns)
    }

    /// Enqueue a GPU-side wait on this fence without blocking the host.
    pub fn server_wait(&self, driver: &mut dyn Driver) -> Result<()> {
        driver.server_wait(self.raw.handle()?);
        Ok(())
    }
}

impl GpuObject for Fence {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}

/// A driver query bracketing a measurement region (elapsed time, samples
/// passed).
#[derive(Debug)]
pub struct Query {
    raw: RawObject,
    target: QueryTarget,
}

impl Query {
    pub fn new(driver: &mut dyn Driver, target: QueryTarget) -> Result<Self> {
        let handle = driver.create_query(target)?;
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Query),
            target,
        })
    }

    pub fn from_raw(driver: &dyn Driver, handle: RawHandle, target: QueryTarget) -> Result<Self> {
        Ok(Self {
            raw: validate_raw(driver, ObjectKind::Query, handle)?,
            target,
        })
    }

    pub fn from_raw_unchecked(handle: RawHandle, target: QueryTarget) -> Self {
        Self {
            raw: RawObject::new(handle, ObjectKind::Query),
            target,
        }
    }

    pub fn target(&self) -> QueryTarget {
        self.target
    }

    pub fn begin(&self, driver: &mut dyn Driver) -> Result<()> {
        driver.begin_query(self.raw.handle()?, self.target);
        Ok(())
    }

    pub fn end(&self, driver: &mut dyn Driver) -> Result<()> {
        self.raw.handle()?;
        driver.end_query(self.target);
        Ok(())
    }

    /// Non-blocking poll for result readiness.
    pub fn is_result_available(&self, driver: &dyn Driver) -> Result<bool> {
        Ok(driver.query_result_available(self.raw.handle()?))
    }

    /// Fetch the measured value. The driver may block until the result is
    /// available; poll [`Query::is_result_available`] first when blocking is
    /// unacceptable.
    pub fn result(&self, driver: &dyn Driver) -> Result<u64> {
        Ok(driver.query_result(self.raw.handle()?))
    }
}

impl GpuObject for Query {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}
