use super::driver::types::{BindSlot, ObjectKind, RawHandle};
use super::driver::Driver;
use super::object::{validate_raw, GpuObject, RawObject};
use crate::Result;

/// A linked shader program.
///
/// Compilation and linking happen outside this crate; programs usually enter
/// through the from-handle constructors. The wrapper covers lifecycle,
/// binding, and named-block lookup.
#[derive(Debug)]
pub struct Program {
    raw: RawObject,
}

impl Program {
    pub fn new(driver: &mut dyn Driver) -> Result<Self> {
        let handle = driver.create_program()?;
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Program),
        })
    }

    pub fn from_raw(driver: &dyn Driver, handle: RawHandle) -> Result<Self> {
        Ok(Self {
            raw: validate_raw(driver, ObjectKind::Program, handle)?,
        })
    }

    pub fn from_raw_unchecked(handle: RawHandle) -> Self {
        Self {
            raw: RawObject::new(handle, ObjectKind::Program),
        }
    }

    pub fn bind(&self, driver: &mut dyn Driver) -> Result<()> {
        driver.bind_program(self.raw.handle()?);
        Ok(())
    }

    /// Index of a named uniform/storage block, if the program declares one.
    pub fn resource_block_index(
        &self,
        driver: &dyn Driver,
        slot: BindSlot,
        name: &str,
    ) -> Result<Option<u32>> {
        Ok(driver.resource_block_index(self.raw.handle()?, slot, name))
    }
}

impl GpuObject for Program {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}
