//! Configuration commands.

use crate::AppContext;

pub fn show(ctx: &AppContext) -> anyhow::Result<()> {
    println!("# Config file: {}", tinytutor_core::Config::config_dir().join("config.toml").display());
    println!("# Data dir: {}", ctx.config.data_dir().display());
    println!();

    let rendered = toml::to_string_pretty(&ctx.config)?;
    println!("{}", rendered);
    Ok(())
}
