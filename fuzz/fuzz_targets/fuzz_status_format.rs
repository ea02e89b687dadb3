#![no_main]

use dx_status::{check, FailureLog, ResultExt, StatusCode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u32, &str)| {
    let (bits, text) = input;
    let code = StatusCode::from_bits(bits);

    let Err(err) = check(code)
        .context(text.to_owned())
        .with_metadata("value", text.to_owned())
    else {
        assert!(code.is_success());
        return;
    };

    let suffix = format!("Failure with HRESULT of {:x}, {}", bits, code.label());
    assert!(err.message().ends_with(&suffix));

    let mut out = String::new();
    err.log().write_to(&mut out).unwrap();

    let log = FailureLog::new(4, 256);
    log.record(&err, text);
    assert!(log.payload_bytes() <= 256);
});
