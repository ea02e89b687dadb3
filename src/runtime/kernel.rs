use super::Observer;
use crate::{RawHandle, Result, ResultExt, UniqueHandle};

/// Compute kernel created by [`Device::create_kernel`](super::Device::create_kernel).
#[derive(Debug)]
pub struct Kernel {
    handle: UniqueHandle,
    entry_point: String,
    observer: Observer,
}

impl Kernel {
    pub(crate) fn new(handle: UniqueHandle, entry_point: String, observer: Observer) -> Self {
        Self {
            handle,
            entry_point,
            observer,
        }
    }

    /// Native kernel handle, still owned by this kernel.
    #[inline]
    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    /// Entry point the kernel was created for.
    #[inline]
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Release the kernel and raise the release status if it failed.
    pub fn close(self) -> Result<()> {
        let result = self
            .handle
            .close()
            .context("release_kernel")
            .with_metadata("entry_point", self.entry_point);
        self.observer.observe("kernel", result)
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::test_support::FakeApi;
    use crate::runtime::Device;
    use crate::definitions;
    use std::sync::Arc;

    #[test]
    fn entry_point_reaches_native_call() {
        let api = Arc::new(FakeApi::default());
        let device = Device::open(api.clone(), 0).unwrap();

        let kernel = device.create_kernel(String::from("reduce_sum")).unwrap();
        assert_eq!(kernel.entry_point(), "reduce_sum");
        assert_eq!(api.last_entry().as_deref(), Some("reduce_sum"));
    }

    #[test]
    fn creation_failure_carries_entry_point() {
        let api = Arc::new(FakeApi::default());
        let device = Device::open(api.clone(), 0).unwrap();
        api.fail_create_with(definitions::E_NOTIMPL);

        let err = device.create_kernel("cs_main").unwrap_err();
        assert_eq!(err.code(), definitions::E_NOTIMPL);
        assert_eq!(err.operation(), Some("create_kernel"));
        assert_eq!(err.log().metadata_value("entry_point"), Some("cs_main"));
    }

    #[test]
    fn close_failure_is_recorded_in_this_file() {
        let api = Arc::new(FakeApi::default());
        let device = Device::open(api.clone(), 0).unwrap();
        let kernel = device.create_kernel("main").unwrap();
        api.fail_release_with(definitions::E_HANDLE);

        let err = kernel.close().unwrap_err();
        assert_eq!(err.code(), definitions::E_HANDLE);
        assert_eq!(err.operation(), Some("release_kernel"));
        assert_eq!(err.file(), file!());
    }

    #[test]
    fn dropped_kernel_is_released() {
        let api = Arc::new(FakeApi::default());
        let device = Device::open(api.clone(), 0).unwrap();
        let kernel = device.create_kernel("main").unwrap();
        let raw = kernel.raw();

        drop(kernel);
        assert_eq!(api.released(), vec![raw]);
    }
}
