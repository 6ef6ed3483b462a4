use anyhow::Result;
use veil_config::Config;

pub fn list() -> Result<()> {
    let config = Config::load()?;

    if config.sites.is_empty() {
        println!("No site profiles configured.");
        return Ok(());
    }

    println!("Site profiles ({}):", config.sites.len());
    for site in &config.sites {
        println!("  {}", site.name);
        println!("    hosts: {}", site.hosts.join(", "));
        println!("    container: {}", site.container);
        println!("    surface: {}", site.surface);
        if let Some(save) = &site.save {
            println!("    save: {}", save);
        }
        if let Some(cancel) = &site.cancel {
            println!("    cancel: {}", cancel);
        }
    }
    println!("\nConfig file: {}", Config::config_path().display());

    Ok(())
}
