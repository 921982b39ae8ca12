use crate::domain::model::UserProfile;
use crate::domain::ports::{ConfigProvider, ProfileSource};
use crate::utils::error::{AtlasError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const PROFILE_PATH: &str = "/api/user/profile";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile {
    #[serde(default)]
    preferred_locations: serde_json::Value,
    #[serde(default)]
    average_budget: Option<f64>,
}

impl From<WireProfile> for UserProfile {
    fn from(wire: WireProfile) -> Self {
        let preferred_locations = match wire.preferred_locations {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        // The backend reports "no budget" as zero.
        let average_budget = wire
            .average_budget
            .filter(|budget| budget.is_finite() && *budget > 0.0);
        UserProfile {
            preferred_locations,
            average_budget,
        }
    }
}

pub struct HttpProfileSource {
    client: Client,
    base_url: String,
}

impl HttpProfileSource {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Like `fetch_profile`, but any failure simply means "no profile".
    pub async fn fetch_or_none(&self, email: &str) -> Option<UserProfile> {
        match self.fetch_profile(email).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!("Failed to fetch user profile: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>> {
        if email.trim().is_empty() {
            tracing::debug!("No email supplied, skipping profile fetch");
            return Ok(None);
        }

        let endpoint = format!("{}{}", self.base_url, PROFILE_PATH);
        let url = Url::parse_with_params(&endpoint, &[("email", email)]).map_err(|e| {
            AtlasError::ConfigError {
                message: format!("Invalid profile endpoint {}: {}", endpoint, e),
            }
        })?;
        tracing::debug!("Fetching user profile for {}", email);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AtlasError::FetchError {
                endpoint,
                message: format!("HTTP status {}", status),
            });
        }

        let wire: WireProfile = response.json().await?;
        let profile = UserProfile::from(wire);
        tracing::info!(
            "Loaded profile with {} preferred locations",
            profile.preferred_locations.len()
        );
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::AtlasConfig;
    use httpmock::prelude::*;

    fn source_for(server: &MockServer) -> HttpProfileSource {
        let mut config = AtlasConfig::default();
        config.api.base_url = server.base_url();
        HttpProfileSource::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_profile_normalizes_fields() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(PROFILE_PATH)
                .query_param("email", "buyer@example.com");
            then.status(200).json_body(serde_json::json!({
                "name": "Buyer",
                "preferredLocations": ["New Cairo", 7, "Maadi"],
                "averageBudget": 5000000
            }));
        });

        let profile = source_for(&server)
            .fetch_profile("buyer@example.com")
            .await
            .unwrap()
            .unwrap();

        mock.assert();
        assert_eq!(profile.preferred_locations, vec!["New Cairo", "Maadi"]);
        assert_eq!(profile.average_budget, Some(5_000_000.0));
    }

    #[tokio::test]
    async fn test_zero_budget_and_non_array_locations() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(PROFILE_PATH);
            then.status(200).json_body(serde_json::json!({
                "preferredLocations": "New Cairo",
                "averageBudget": 0
            }));
        });

        let profile = source_for(&server)
            .fetch_profile("buyer@example.com")
            .await
            .unwrap()
            .unwrap();

        assert!(profile.preferred_locations.is_empty());
        assert!(profile.average_budget.is_none());
    }

    #[tokio::test]
    async fn test_failure_yields_no_profile() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(PROFILE_PATH);
            then.status(404);
        });

        let source = source_for(&server);
        assert!(source.fetch_profile("buyer@example.com").await.is_err());
        assert!(source.fetch_or_none("buyer@example.com").await.is_none());
        assert!(source.fetch_or_none("  ").await.is_none());
    }
}
