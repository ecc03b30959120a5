use std::io::{self, BufRead};

use crate::auth::{
    clear_stored_token, mask_token, resolve_token, store_token, TokenSource, TOKEN_ENV_VAR,
};
use crate::cli::AuthCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    match command {
        AuthCommands::Login { token } => {
            let token = match token {
                Some(token) => token,
                None => read_token_line()?,
            };
            store_token(&profile_name, &token)?;
            println!("Stored API token for profile '{profile_name}'");
            if config.profile(&profile_name).and_then(|p| p.address()).is_none() {
                println!(
                    "Profile '{profile_name}' has no address yet. Run `lolpub config init --profile {profile_name} --address <NAME>`."
                );
            }
            Ok(())
        }
        AuthCommands::Status => {
            let address = config
                .profile(&profile_name)
                .and_then(|p| p.address())
                .map_or_else(|| "(no address)".to_string(), |address| format!("@{address}"));
            match resolve_token(&profile_name)? {
                Some((token, TokenSource::Environment)) => println!(
                    "Profile '{profile_name}' ({address}) uses {TOKEN_ENV_VAR} ({})",
                    mask_token(&token)
                ),
                Some((token, TokenSource::Keychain)) => println!(
                    "Profile '{profile_name}' ({address}) has a stored token ({})",
                    mask_token(&token)
                ),
                None => println!("Profile '{profile_name}' ({address}) has no API token."),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            clear_stored_token(&profile_name)?;
            println!("Removed API token for profile '{profile_name}'");
            Ok(())
        }
    }
}

fn read_token_line() -> Result<String, CliError> {
    eprint!("API token: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
