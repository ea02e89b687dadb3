//! Collaborators built on the failure bridge.
//!
//! The native compute API is reached through the [`ComputeApi`] seam: every
//! method returns a raw [`StatusCode`] and writes results through
//! out-parameters, the way the native calls do. The wrappers here own the
//! resulting handles and follow one rule: every fallible native call goes
//! through [`check`](crate::check), and the raised
//! [`Diagnostic`](crate::Diagnostic) is returned to the caller unchanged apart
//! from added context.
//!
//! Device enumeration, command recording, kernel compilation and dispatch,
//! and buffer allocation policy belong to the native side and are not modeled.
//!
//! # Example
//!
//! ```rust,ignore
//! let device = Device::open(api, 0)?;
//! let context = device.create_context()?;
//! let buffer = device.create_buffer(4096)?;
//! let kernel = device.create_kernel("cs_main")?;
//! context.synchronize()?;
//! ```

mod buffer;
mod context;
mod device;
mod kernel;

pub use buffer::Buffer;
pub use context::Context;
pub use device::Device;
pub use kernel::Kernel;

use crate::{FailureLog, RawHandle, Result, StatusCode};

/// Native compute API surface.
///
/// Implementations wrap the real driver entry points. Each method returns the
/// native status unchanged; the wrappers in this module decide nothing from it
/// beyond passing it to the bridge.
pub trait ComputeApi: Send + Sync {
    /// Open the device on adapter `adapter`, writing its handle to `device`.
    fn create_device(&self, adapter: u32, device: &mut RawHandle) -> StatusCode;

    /// Create a command context on `device`.
    fn create_context(&self, device: RawHandle, context: &mut RawHandle) -> StatusCode;

    /// Allocate a device buffer of `size` bytes.
    fn create_buffer(&self, device: RawHandle, size: u64, buffer: &mut RawHandle) -> StatusCode;

    /// Create a compute kernel for the named entry point.
    fn create_kernel(&self, device: RawHandle, entry_point: &str, kernel: &mut RawHandle)
        -> StatusCode;

    /// Block until all work submitted on `context` has finished.
    fn synchronize(&self, context: RawHandle) -> StatusCode;

    /// Release any handle issued by this API.
    fn release(&self, handle: RawHandle) -> StatusCode;
}

/// Optional failure sink shared by a device and everything it creates.
#[derive(Clone, Debug, Default)]
pub(crate) struct Observer {
    log: Option<FailureLog>,
}

impl Observer {
    pub(crate) fn new(log: Option<FailureLog>) -> Self {
        Self { log }
    }

    /// Record a failure, then hand the result back untouched.
    pub(crate) fn observe<T>(&self, component: &str, result: Result<T>) -> Result<T> {
        if let (Err(err), Some(log)) = (&result, &self.log) {
            log.record(err, component);
        }
        result
    }
}

crate::assert_unique_owner!(Device, Context, Buffer, Kernel);

#[cfg(test)]
pub(crate) mod test_support {
    use super::ComputeApi;
    use crate::{definitions, RawHandle, StatusCode};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// In-memory API: hands out increasing handles and fails on request.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        next: AtomicU64,
        null_handles: AtomicBool,
        create_status: Mutex<Option<StatusCode>>,
        sync_status: Mutex<Option<StatusCode>>,
        release_status: Mutex<Option<StatusCode>>,
        released: Mutex<Vec<RawHandle>>,
        last_size: Mutex<Option<u64>>,
        last_entry: Mutex<Option<String>>,
    }

    impl FakeApi {
        pub(crate) fn fail_create_with(&self, code: StatusCode) {
            *self.create_status.lock().unwrap() = Some(code);
        }

        /// Report success from creates but write no handle.
        pub(crate) fn return_null_handles(&self) {
            self.null_handles.store(true, Ordering::Relaxed);
        }

        pub(crate) fn fail_sync_with(&self, code: StatusCode) {
            *self.sync_status.lock().unwrap() = Some(code);
        }

        pub(crate) fn fail_release_with(&self, code: StatusCode) {
            *self.release_status.lock().unwrap() = Some(code);
        }

        pub(crate) fn released(&self) -> Vec<RawHandle> {
            self.released.lock().unwrap().clone()
        }

        pub(crate) fn last_size(&self) -> Option<u64> {
            *self.last_size.lock().unwrap()
        }

        pub(crate) fn last_entry(&self) -> Option<String> {
            self.last_entry.lock().unwrap().clone()
        }

        fn create(&self, out: &mut RawHandle) -> StatusCode {
            if let Some(code) = *self.create_status.lock().unwrap() {
                *out = RawHandle::NULL;
                return code;
            }
            if self.null_handles.load(Ordering::Relaxed) {
                *out = RawHandle::NULL;
                return definitions::S_OK;
            }
            *out = RawHandle::from_raw(self.next.fetch_add(1, Ordering::Relaxed) + 1);
            definitions::S_OK
        }
    }

    impl ComputeApi for FakeApi {
        fn create_device(&self, _adapter: u32, device: &mut RawHandle) -> StatusCode {
            self.create(device)
        }

        fn create_context(&self, _device: RawHandle, context: &mut RawHandle) -> StatusCode {
            self.create(context)
        }

        fn create_buffer(&self, _device: RawHandle, size: u64, buffer: &mut RawHandle) -> StatusCode {
            *self.last_size.lock().unwrap() = Some(size);
            self.create(buffer)
        }

        fn create_kernel(
            &self,
            _device: RawHandle,
            entry_point: &str,
            kernel: &mut RawHandle,
        ) -> StatusCode {
            *self.last_entry.lock().unwrap() = Some(entry_point.to_owned());
            self.create(kernel)
        }

        fn synchronize(&self, _context: RawHandle) -> StatusCode {
            self.sync_status.lock().unwrap().unwrap_or(definitions::S_OK)
        }

        fn release(&self, handle: RawHandle) -> StatusCode {
            self.released.lock().unwrap().push(handle);
            self.release_status.lock().unwrap().unwrap_or(definitions::S_OK)
        }
    }
}
