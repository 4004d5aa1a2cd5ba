use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use crate::config::{Config, Settings, mask_key};

pub(crate) fn cmd_settings(
    config: &Config,
    settings: &mut Settings,
    amount: Option<u32>,
    api_key: Option<String>,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct SettingRow {
        #[tabled(rename = "Setting")]
        name: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let changed = amount.is_some() || api_key.is_some();
    if let Some(amount) = amount {
        settings.set_recipe_amount(amount)?;
    }
    if let Some(key) = api_key {
        settings.api_key = key.trim().to_string();
    }
    if changed {
        settings.save(&config.settings_path)?;
        if !json {
            println!("Settings saved to {}", config.settings_path.display());
        }
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "api_key": mask_key(&settings.api_key),
                "recipe_amount": settings.recipe_amount,
                "base_url": settings.base_url,
                "database": config.db_path.display().to_string(),
            })
        );
        return Ok(());
    }

    let rows = [
        SettingRow {
            name: "API key",
            value: mask_key(&settings.api_key),
        },
        SettingRow {
            name: "Recipe amount",
            value: settings.recipe_amount.to_string(),
        },
        SettingRow {
            name: "Base URL",
            value: settings.base_url.clone(),
        },
        SettingRow {
            name: "Database",
            value: config.db_path.display().to_string(),
        },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}
