//! Interactive creation of the configuration file.

use std::path::PathBuf;

use clap::Args;
use dialoguer::Password;

use crate::config::{
    AppConfig, EndpointConfig, MigrationTuning, CLOUD_ONE_REGIONS, LEGACY_REGIONS,
};
use crate::error::CliResult;
use crate::output::{print_key_value, print_success};
use crate::prompts::select_one;

/// Arguments for the configure command
#[derive(Args)]
pub struct ConfigureArgs {
    /// Where to write the configuration file
    #[arg(long, value_name = "FILE", default_value = "conformity-migration.yml")]
    pub config: PathBuf,
}

pub fn execute(args: ConfigureArgs) -> CliResult<()> {
    let legacy = prompt_endpoint("legacy Conformity", LEGACY_REGIONS);
    let cloud_one = prompt_endpoint("Cloud One Conformity", CLOUD_ONE_REGIONS);

    let config = AppConfig {
        legacy,
        cloud_one,
        migration: MigrationTuning::default(),
    };
    config.save(&args.config)?;

    print_success(&format!(
        "Configuration written to {}",
        args.config.display()
    ));
    print_key_value("Legacy endpoint", &config.legacy_base_url());
    print_key_value("Cloud One endpoint", &config.cloud_one_base_url());
    Ok(())
}

fn prompt_endpoint(label: &str, regions: &[&str]) -> EndpointConfig {
    let region = select_one(&format!("Region of the {label} deployment"), regions);
    let api_key = Password::new()
        .with_prompt(format!("API key for the {label} deployment"))
        .interact()
        .unwrap_or_default();
    EndpointConfig {
        region,
        api_key,
        content_type: None,
    }
}
