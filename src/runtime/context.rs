use super::{ComputeApi, Observer};
use crate::{check, RawHandle, Result, ResultExt, UniqueHandle};
use std::fmt;
use std::sync::Arc;

/// Command context created by [`Device::create_context`](super::Device::create_context).
pub struct Context {
    handle: UniqueHandle,
    api: Arc<dyn ComputeApi>,
    observer: Observer,
}

impl Context {
    pub(crate) fn new(handle: UniqueHandle, api: Arc<dyn ComputeApi>, observer: Observer) -> Self {
        Self {
            handle,
            api,
            observer,
        }
    }

    /// Native context handle, still owned by this context.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Wait for all submitted work to finish.
    ///
    /// Device-lost codes (`DXGI_ERROR_DEVICE_REMOVED`, `DXGI_ERROR_DEVICE_HUNG`,
    /// ...) are raised like any other failure; recovery is up to the caller.
    pub fn synchronize(&self) -> Result<()> {
        let result = check(self.api.synchronize(self.raw())).context("synchronize");
        self.observer.observe("context", result)
    }

    /// Release the context and raise the release status if it failed.
    pub fn close(self) -> Result<()> {
        let result = self.handle.close().context("release_context");
        self.observer.observe("context", result)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("handle", &self.handle).finish()
    }
}
