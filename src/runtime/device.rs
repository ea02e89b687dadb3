use super::{Buffer, ComputeApi, Context, Kernel, Observer};
use crate::{check, FailureLog, RawHandle, Result, ResultExt, StatusCode, UniqueHandle};
use std::fmt;
use std::sync::Arc;

/// Run one native create call and take ownership of the handle it wrote.
///
/// Failures are recorded at the caller's site.
#[track_caller]
fn acquire<F>(api: &Arc<dyn ComputeApi>, create: F) -> Result<UniqueHandle>
where
    F: FnOnce(&mut RawHandle) -> StatusCode,
{
    let mut raw = RawHandle::NULL;
    check(create(&mut raw))?;
    UniqueHandle::new(Arc::clone(api), raw)
}

/// An opened compute device.
///
/// Owns the device handle. Contexts, buffers and kernels created from it hold
/// their own handles and may outlive the `Device` value; the native API is
/// responsible for keeping the underlying device alive until they are released.
pub struct Device {
    handle: UniqueHandle,
    adapter: u32,
    api: Arc<dyn ComputeApi>,
    observer: Observer,
}

impl Device {
    /// Open the device on `adapter`.
    ///
    /// A failing native status is raised unchanged, with `open_device` as the
    /// operation and the adapter index attached.
    pub fn open(api: Arc<dyn ComputeApi>, adapter: u32) -> Result<Self> {
        Self::open_inner(api, adapter, Observer::default())
    }

    /// Like [`open`](Self::open), recording every failure raised by this
    /// device and its children into `log` before it is returned.
    pub fn open_with_log(api: Arc<dyn ComputeApi>, adapter: u32, log: FailureLog) -> Result<Self> {
        Self::open_inner(api, adapter, Observer::new(Some(log)))
    }

    fn open_inner(api: Arc<dyn ComputeApi>, adapter: u32, observer: Observer) -> Result<Self> {
        let result = acquire(&api, |raw| api.create_device(adapter, raw))
            .context("open_device")
            .with_metadata("adapter", adapter.to_string());

        let handle = observer.observe("device", result)?;
        Ok(Self {
            handle,
            adapter,
            api,
            observer,
        })
    }

    /// Adapter index the device was opened on.
    #[inline]
    pub fn adapter(&self) -> u32 {
        self.adapter
    }

    /// Native device handle, still owned by this device.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Create a command context on this device.
    pub fn create_context(&self) -> Result<Context> {
        let result = acquire(&self.api, |raw| self.api.create_context(self.raw(), raw))
            .context("create_context")
            .with_metadata("device", self.raw().to_string());

        let handle = self.observer.observe("context", result)?;
        Ok(Context::new(handle, Arc::clone(&self.api), self.observer.clone()))
    }

    /// Allocate a buffer of `size` bytes.
    ///
    /// The size is passed to the native API as given; a zero size is not
    /// rejected here.
    pub fn create_buffer(&self, size: u64) -> Result<Buffer> {
        let result = acquire(&self.api, |raw| self.api.create_buffer(self.raw(), size, raw))
            .context("create_buffer")
            .with_metadata("size", size.to_string());

        let handle = self.observer.observe("buffer", result)?;
        Ok(Buffer::new(handle, size, self.observer.clone()))
    }

    /// Create a kernel for `entry_point`.
    pub fn create_kernel(&self, entry_point: impl Into<String>) -> Result<Kernel> {
        let entry_point = entry_point.into();
        let result = acquire(&self.api, |raw| {
            self.api.create_kernel(self.raw(), &entry_point, raw)
        })
        .context("create_kernel")
        .with_metadata("entry_point", entry_point.clone());

        let handle = self.observer.observe("kernel", result)?;
        Ok(Kernel::new(handle, entry_point, self.observer.clone()))
    }

    /// Release the device and raise the release status if it failed.
    pub fn close(self) -> Result<()> {
        let result = self
            .handle
            .close()
            .context("release_device")
            .with_metadata("adapter", self.adapter.to_string());
        self.observer.observe("device", result)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("adapter", &self.adapter)
            .field("handle", &self.handle)
            .finish()
    }
}
