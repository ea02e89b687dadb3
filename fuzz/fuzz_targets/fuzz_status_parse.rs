#![no_main]

use dx_status::StatusCode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(code) = s.parse::<StatusCode>() {
            assert_eq!(code.to_string().parse::<StatusCode>(), Ok(code));
        }
    }
});
