// GitHub REST client
// Lists the organizations and repositories visible to the authenticated user


use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{ConfigError, Credentials, GitHubConfig};
use crate::http::{build_agent, parse_json, read_body};
use crate::{Result, RouterError};

const SERVICE: &str = "GitHub";
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/name`, the key the router stores records under
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Where the router gets its repository listings from
pub trait RepositorySource: Send + Sync {
    fn list_organizations(&self) -> Result<Vec<Organization>>;

    fn list_user_repositories(&self) -> Result<Vec<Repository>>;

    /// First page only, sized by the source's page size
    fn list_organization_repositories(&self, org: &str) -> Result<Vec<Repository>>;
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: Url,
    authorization: String,
    org_page_size: u32,
    agent: ureq::Agent,
}

impl GitHubClient {
    #[inline]
    pub fn new(config: &GitHubConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            base_url: config.base_url()?,
            authorization: format!("Bearer {}", credentials.github_token),
            org_page_size: config.org_page_size,
            agent: build_agent(
                Duration::from_secs(config.timeout_seconds),
                &config.user_agent,
            ),
        })
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .agent
            .get(url.as_str())
            .header("Authorization", &self.authorization)
            .header("Accept", ACCEPT)
            .call();

        let body = read_body(SERVICE, response)?;
        parse_json(SERVICE, &body)
    }
}

impl RepositorySource for GitHubClient {
    #[inline]
    fn list_organizations(&self) -> Result<Vec<Organization>> {
        let url = self.endpoint(["user", "orgs"])?;
        let orgs: Vec<Organization> = self.get(&url)?;
        info!("Found {} organizations", orgs.len());
        Ok(orgs)
    }

    #[inline]
    fn list_user_repositories(&self) -> Result<Vec<Repository>> {
        let url = self.endpoint(["user", "repos"])?;
        let repos: Vec<Repository> = self.get(&url)?;
        info!("Found {} repositories for the authenticated user", repos.len());
        Ok(repos)
    }

    #[inline]
    fn list_organization_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        if org.trim().is_empty() {
            return Err(RouterError::InvalidInput(
                "organization login is empty".to_string(),
            ));
        }

        let mut url = self.endpoint(["orgs", org, "repos"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.org_page_size.to_string());

        let repos: Vec<Repository> = self.get(&url)?;
        if repos.len() >= self.org_page_size as usize {
            debug!(
                "Organization {} has at least {} repositories; only the first page is used",
                org, self.org_page_size
            );
        }
        info!("Found {} repositories in organization {}", repos.len(), org);
        Ok(repos)
    }
}
