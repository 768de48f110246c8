use anyhow::{bail, Context, Result};
use std::str::FromStr;
use url::Url;

/// What to do when the existing-file lookup fails for a reason other than 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Write without a revision marker, as if the file did not exist.
    #[default]
    Proceed,
    /// Fail the push without attempting the write.
    Abort,
}

impl FromStr for LookupPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proceed" => Ok(LookupPolicy::Proceed),
            "abort" => Ok(LookupPolicy::Abort),
            other => bail!("unknown lookup failure policy: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub github_api_url: Url,
    pub lookup_policy: LookupPolicy,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let github_api_url = var("GITHUB_API_URL")
            .unwrap_or_else(|| github_contents::DEFAULT_API_URL.to_string());
        let github_api_url = Url::parse(&github_api_url)
            .with_context(|| format!("GITHUB_API_URL is not a valid URL: {}", github_api_url))?;
        if !matches!(github_api_url.scheme(), "http" | "https") {
            bail!("GITHUB_API_URL must use http or https");
        }

        let lookup_policy = match var("LOOKUP_FAILURE_POLICY") {
            Some(value) => value.parse::<LookupPolicy>()?,
            None => LookupPolicy::default(),
        };

        let max_body_bytes = var("MAX_BODY_BYTES")
            .unwrap_or_else(|| crate::DEFAULT_MAX_BODY_BYTES.to_string())
            .parse::<usize>()
            .context("MAX_BODY_BYTES must be a byte count")?;

        Ok(Self {
            port,
            github_api_url,
            lookup_policy,
            max_body_bytes,
        })
    }
}
