use crate::config::toml_config::AtlasConfig;
use crate::domain::model::{BaseLayer, ManualFilters, UserProfile};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "project-atlas")]
#[command(about = "Browse, filter and map real-estate projects")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Backend base URL, overrides the config file")]
    pub api_base: Option<String>,

    #[arg(long, help = "Fetch the user profile for this email")]
    pub email: Option<String>,

    #[arg(long = "profile-location", value_delimiter = ',')]
    pub profile_locations: Vec<String>,

    #[arg(long)]
    pub profile_budget: Option<f64>,

    #[arg(long = "location", value_delimiter = ',', help = "Manual location filter")]
    pub locations: Vec<String>,

    #[arg(long, help = "Manual maximum budget")]
    pub budget: Option<f64>,

    #[arg(long, help = "Place to search for and center the map on")]
    pub search: Option<String>,

    #[arg(long, default_value = "0", help = "Which search result to pick")]
    pub pick: usize,

    #[arg(long, help = "Base layer: openstreetmap, satellite, dark or light")]
    pub layer: Option<BaseLayer>,

    #[arg(long, help = "Select the project with this id or name")]
    pub select: Option<String>,

    #[arg(long, help = "Send the selected project to the agent")]
    pub ask_agent: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// File config (or defaults) with command-line overrides applied.
    pub fn atlas_config(&self) -> Result<AtlasConfig> {
        let mut config = match &self.config {
            Some(path) => AtlasConfig::from_file(path)?,
            None => AtlasConfig::default(),
        };
        if let Some(base) = &self.api_base {
            config.api.base_url = base.clone();
        }
        if let Some(layer) = self.layer {
            config.map.base_layer = layer;
        }
        Ok(config)
    }

    pub fn manual_filters(&self) -> ManualFilters {
        ManualFilters {
            locations: self.locations.clone(),
            budget: self.budget,
        }
    }

    /// A profile given directly on the command line, if any.
    pub fn inline_profile(&self) -> Option<UserProfile> {
        if self.profile_locations.is_empty() && self.profile_budget.is_none() {
            return None;
        }
        Some(UserProfile {
            preferred_locations: self.profile_locations.clone(),
            average_budget: self.profile_budget,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base) = &self.api_base {
            validation::validate_url("api_base", base)?;
        }
        if let Some(budget) = self.budget {
            validation::validate_non_negative("budget", budget)?;
        }
        if let Some(budget) = self.profile_budget {
            validation::validate_non_negative("profile_budget", budget)?;
        }
        if let Some(email) = &self.email {
            validation::validate_non_empty_string("email", email)?;
        }
        if self.ask_agent {
            validation::validate_required_field("select", &self.select)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_and_profile() {
        let cli = CliConfig::parse_from([
            "project-atlas",
            "--location",
            "New Cairo,Maadi",
            "--budget",
            "4000000",
            "--profile-location",
            "Zayed",
            "--layer",
            "dark",
        ]);

        let manual = cli.manual_filters();
        assert_eq!(manual.locations, vec!["New Cairo", "Maadi"]);
        assert_eq!(manual.budget, Some(4_000_000.0));

        let profile = cli.inline_profile().unwrap();
        assert_eq!(profile.preferred_locations, vec!["Zayed"]);
        assert!(profile.average_budget.is_none());

        let config = cli.atlas_config().unwrap();
        assert_eq!(config.map.base_layer, BaseLayer::Dark);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_flags() {
        let negative = CliConfig::parse_from(["project-atlas", "--budget=-1"]);
        assert!(negative.validate().is_err());

        let orphan_ask = CliConfig::parse_from(["project-atlas", "--ask-agent"]);
        assert!(orphan_ask.validate().is_err());

        let bad_base = CliConfig::parse_from(["project-atlas", "--api-base", "nowhere"]);
        assert!(bad_base.validate().is_err());
    }

    #[test]
    fn test_no_inline_profile_by_default() {
        let cli = CliConfig::parse_from(["project-atlas"]);
        assert!(cli.inline_profile().is_none());
        assert!(cli.manual_filters().locations.is_empty());
    }
}
