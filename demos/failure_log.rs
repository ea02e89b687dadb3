use dx_status::runtime::{ComputeApi, Device};
use dx_status::{definitions, FailureLog, FailureLogConfig, RawHandle, Result, StatusCode};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Backend whose device is lost after a fixed number of synchronizations.
struct FlakyBackend {
    next_handle: AtomicU64,
    syncs_left: AtomicU32,
}

impl FlakyBackend {
    fn new(healthy_syncs: u32) -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            syncs_left: AtomicU32::new(healthy_syncs),
        }
    }

    fn issue(&self, out: &mut RawHandle) -> StatusCode {
        *out = RawHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed));
        definitions::S_OK
    }
}

impl ComputeApi for FlakyBackend {
    fn create_device(&self, _adapter: u32, device: &mut RawHandle) -> StatusCode {
        self.issue(device)
    }

    fn create_context(&self, _device: RawHandle, context: &mut RawHandle) -> StatusCode {
        self.issue(context)
    }

    fn create_buffer(&self, _device: RawHandle, size: u64, buffer: &mut RawHandle) -> StatusCode {
        if size > 1 << 30 {
            return definitions::E_OUTOFMEMORY;
        }
        self.issue(buffer)
    }

    fn create_kernel(&self, _device: RawHandle, entry_point: &str, kernel: &mut RawHandle) -> StatusCode {
        if entry_point.is_empty() {
            return definitions::E_INVALIDARG;
        }
        self.issue(kernel)
    }

    fn synchronize(&self, _context: RawHandle) -> StatusCode {
        match self.syncs_left.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1)) {
            Ok(_) => definitions::S_OK,
            Err(_) => definitions::DXGI_ERROR_DEVICE_REMOVED,
        }
    }

    fn release(&self, _handle: RawHandle) -> StatusCode {
        definitions::S_OK
    }
}

fn run(device: &Device) -> Result<()> {
    let context = device.create_context()?;
    let _staging = device.create_buffer(64 << 10)?;
    let _kernel = device.create_kernel("cs_main")?;

    for _ in 0..5 {
        context.synchronize()?;
    }
    Ok(())
}

fn main() {
    println!("--- Failure Log Example ---\n");

    let log = FailureLog::with_config(FailureLogConfig {
        max_entries: 4,
        ..FailureLogConfig::default()
    });

    let api = Arc::new(FlakyBackend::new(3));
    let device = match Device::open_with_log(api, 0, log.clone()) {
        Ok(device) => device,
        Err(err) => {
            eprintln!("open failed: {}", err);
            return;
        }
    };

    // Each call fails independently; the log keeps the most recent four
    let _ = device.create_buffer(4 << 30);
    let _ = device.create_kernel("");
    let _ = device.create_kernel("");
    if let Err(err) = run(&device) {
        println!("run stopped: {}\n", err);
    }

    println!(
        "{} entries, {} evicted, {} bytes\n",
        log.len(),
        log.eviction_count(),
        log.payload_bytes()
    );

    for entry in log.get_recent(10) {
        println!(
            "[{}] {:<10} {:<26} {}:{} {:?}",
            entry.timestamp,
            entry.component,
            entry.label,
            entry.file,
            entry.line,
            entry.operation
        );
    }

    let lost = log.get_filtered(|e| e.code == definitions::DXGI_ERROR_DEVICE_REMOVED);
    println!("\ndevice-lost failures: {}", lost.len());
}
