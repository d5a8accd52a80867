//! `kindred config`: Configuration management commands.

use kindred_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            // Legal but probably unintended settings
            let mut warnings = Vec::new();

            if config.synthesis.budget_chars > 4000 {
                warnings.push("Budget above 4000 chars; most voice transports reject that");
            }

            if config.synthesis.max_facts > 200 {
                warnings.push("More than 200 facts will rarely fit the budget");
            }

            if config.sources.read_timeout_ms * 2 > config.sources.call_timeout_ms {
                warnings.push("Read timeout is over half the call timeout");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Companion: {}", config.companion.name);
            println!("   Offset:    {} min", config.companion.utc_offset_minutes);
            println!("   Budget:    {} chars", config.synthesis.budget_chars);
            println!("   Max facts: {}", config.synthesis.max_facts);
            println!(
                "   Timeouts:  {}ms read / {}ms call",
                config.sources.read_timeout_ms, config.sources.call_timeout_ms
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
