use dx_status::{check, check_status, definitions, located_msg, Result, ResultExt, StatusCode};

fn create_pipeline(native_status: StatusCode) -> Result<()> {
    // Stand-in for a native create call returning its status
    check(native_status).context("create_pipeline")
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    // Success codes pass straight through, including S_FALSE
    for code in [definitions::S_OK, definitions::S_FALSE] {
        println!("{} ({}) -> {:?}", code, code.label(), create_pipeline(code).is_ok());
    }

    match create_pipeline(definitions::E_INVALIDARG) {
        Ok(()) => println!("Success!"),
        Err(err) => {
            println!("\n1. [MESSAGE] One-line description:");
            println!("   {}", err);

            println!("\n2. [STRUCTURED] Fields for a log pipeline:");
            err.with_log(|log| {
                println!("   Code:      {}", log.code());
                println!("   Label:     {}", log.label());
                println!("   Site:      {}:{}:{}", log.file(), log.line(), log.column());
                println!("   Operation: {:?}", log.operation());
            });
        }
    }

    // Codes outside the table still raise, labeled UNKNOWN
    let raw: i32 = 0x8BAD_F00Du32 as i32;
    if let Err(err) = check_status!(raw) {
        println!("\n3. [UNKNOWN] {}", err);
    }

    println!("\n4. [LOCATED] {}", located_msg!("adapter {} has no compute queue", 1));
}
