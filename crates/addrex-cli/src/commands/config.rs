use addrex_core::config::AppConfig;
use addrex_core::error::AddrexError;

pub fn show(config: &AppConfig) -> Result<(), AddrexError> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{json}");
    Ok(())
}
