use super::driver::types::{ObjectKind, PixelFormat, RawHandle};
use super::driver::Driver;
use super::object::{validate_raw, GpuObject, RawObject};
use crate::utils::memory::MemoryBlock;
use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct ImageInfo<'a> {
    pub debug_name: &'a str,
    pub dim: [u32; 2],
    pub format: PixelFormat,
}

impl<'a> Default for ImageInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            dim: [1, 1],
            format: PixelFormat::RGBA8,
        }
    }
}

/// A driver image with fixed storage.
///
/// This type only consumes already-decoded pixel data: callers hand it a flat
/// memory region and a format, and it uploads into a sub-region. Decoding
/// lives outside the crate.
#[derive(Debug)]
pub struct Image {
    raw: RawObject,
    dim: [u32; 2],
    format: PixelFormat,
}

impl Image {
    pub fn new(driver: &mut dyn Driver, info: &ImageInfo) -> Result<Self> {
        let handle = driver.create_image()?;
        if let Err(err) = driver.image_storage(handle, info.dim[0], info.dim[1], info.format) {
            driver.delete_object(ObjectKind::Image, handle);
            return Err(err);
        }
        if !info.debug_name.is_empty() {
            driver.set_debug_name(ObjectKind::Image, handle, info.debug_name);
        }
        log::debug!(
            "image {} allocated, {}x{} {:?}",
            handle,
            info.dim[0],
            info.dim[1],
            info.format
        );
        Ok(Self {
            raw: RawObject::new(handle, ObjectKind::Image),
            dim: info.dim,
            format: info.format,
        })
    }

    pub fn from_raw(driver: &dyn Driver, handle: RawHandle, info: &ImageInfo) -> Result<Self> {
        Ok(Self {
            raw: validate_raw(driver, ObjectKind::Image, handle)?,
            dim: info.dim,
            format: info.format,
        })
    }

    pub fn from_raw_unchecked(handle: RawHandle, info: &ImageInfo) -> Self {
        Self {
            raw: RawObject::new(handle, ObjectKind::Image),
            dim: info.dim,
            format: info.format,
        }
    }

    pub fn dim(&self) -> [u32; 2] {
        self.dim
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Upload tightly packed pixels into the given region.
    pub fn upload_region(
        &self,
        driver: &mut dyn Driver,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<()> {
        driver.image_sub_image(self.raw.handle()?, x, y, width, height, self.format, pixels)
    }

    /// Upload a staged block of pixels covering the whole image.
    pub fn upload(&self, driver: &mut dyn Driver, pixels: &MemoryBlock) -> Result<()> {
        self.upload_region(driver, 0, 0, self.dim[0], self.dim[1], pixels.as_slice())
    }
}

impl GpuObject for Image {
    fn raw(&self) -> &RawObject {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawObject {
        &mut self.raw
    }
}
