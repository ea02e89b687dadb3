use super::Observer;
use crate::{RawHandle, Result, ResultExt, UniqueHandle};

/// Device buffer created by [`Device::create_buffer`](super::Device::create_buffer).
#[derive(Debug)]
pub struct Buffer {
    handle: UniqueHandle,
    size: u64,
    observer: Observer,
}

impl Buffer {
    pub(crate) fn new(handle: UniqueHandle, size: u64, observer: Observer) -> Self {
        Self {
            handle,
            size,
            observer,
        }
    }

    /// Native buffer handle, still owned by this buffer.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Size in bytes requested at creation.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Release the buffer and raise the release status if it failed.
    pub fn close(self) -> Result<()> {
        let result = self
            .handle
            .close()
            .context("release_buffer")
            .with_metadata("size", self.size.to_string());
        self.observer.observe("buffer", result)
    }
}
