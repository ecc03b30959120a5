use lolpub_core::util::{is_http_url, non_blank};

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            address,
            api_base_url,
            no_activate,
        } => run_config_init(
            global_profile,
            address,
            api_base_url,
            no_activate,
        ),
        ConfigCommands::Show => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let profile = config.profile(&profile_name).ok_or_else(|| {
                CliError::Config(format!(
                    "Profile '{profile_name}' is not configured. Run `lolpub config init --profile {profile_name}` first."
                ))
            })?;
            println!("{}", serde_json::to_string_pretty(profile)?);
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let profile = config.profile_mut_or_default(&profile_name);
            profile.set_value(&key, &value).map_err(CliError::Config)?;
            validate_profile_urls(profile)?;
            config.save().map_err(CliError::Config)?;
            println!("Set {key} for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn run_config_init(
    profile_name: Option<&str>,
    address: Option<String>,
    api_base_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = non_blank(address) {
        profile.address = Some(value.trim_start_matches('@').to_string());
    }
    if let Some(value) = non_blank(api_base_url) {
        profile.api_base_url = Some(value.trim_end_matches('/').to_string());
    }

    validate_profile_urls(profile)?;
    let ready = profile.address().is_some();

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if ready {
        println!("Run `lolpub auth login --token <TOKEN>` to store the API token for '{profile_name}'.");
    } else {
        println!("Profile '{profile_name}' is missing: address");
    }

    Ok(())
}

pub fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = non_blank(profile.api_base_url.clone()) {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
