use procura_core::error::ProcuraError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), ProcuraError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
