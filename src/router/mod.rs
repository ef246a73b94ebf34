// Router
// Indexes the user's repositories by embedding and ranks them against free text


use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Credentials};
use crate::embeddings::{EmbeddingClient, Embedder, cosine_similarity, extract_keywords};
use crate::github::{GitHubClient, Repository, RepositorySource};
use crate::{Result, RouterError};

/// What the router knows about one repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryRecord {
    pub description: String,
    pub keywords: Vec<String>,
    pub embedding: Vec<f32>,
}

/// A repository name and its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub name: String,
    pub score: f32,
}

pub struct Router {
    source: Option<Box<dyn RepositorySource>>,
    embedder: Box<dyn Embedder>,
    /// Keyed by `owner/name`. Keys are unique; iteration order carries no meaning.
    repositories: Vec<(String, RepositoryRecord)>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("has_source", &self.source.is_some())
            .field("repositories", &self.repositories.len())
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Build a router whose credentials come from the process environment.
    ///
    /// Fails with a configuration error before any request when a credential is missing.
    #[inline]
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    #[inline]
    pub fn from_lookup<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(lookup).inspect_err(|e| {
            error!("Cannot construct router: {}", e);
        })?;
        Self::new(config, &credentials)
    }

    #[inline]
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let source = GitHubClient::new(&config.github, credentials)?;
        let embedder = EmbeddingClient::new(&config.embeddings, credentials)?;
        Ok(Self::with_clients(source, embedder))
    }

    #[inline]
    pub fn with_clients<S, E>(source: S, embedder: E) -> Self
    where
        S: RepositorySource + 'static,
        E: Embedder + 'static,
    {
        Self {
            source: Some(Box::new(source)),
            embedder: Box::new(embedder),
            repositories: Vec::new(),
        }
    }

    /// A router over an already-built mapping. `initialize` is not available on it.
    #[inline]
    pub fn with_records<E, I>(embedder: E, records: I) -> Self
    where
        E: Embedder + 'static,
        I: IntoIterator<Item = (String, RepositoryRecord)>,
    {
        let mut router = Self {
            source: None,
            embedder: Box::new(embedder),
            repositories: Vec::new(),
        };
        for (name, record) in records {
            router.insert(name, record);
        }
        router
    }

    #[inline]
    pub fn initialize(&mut self) -> Result<usize> {
        self.initialize_with_progress(&ProgressBar::hidden())
    }

    /// Fetch every visible repository and embed it, one request at a time.
    ///
    /// Order: organizations, the user's own repositories, then each
    /// organization's first page. Records stored before a failure are kept.
    #[inline]
    pub fn initialize_with_progress(&mut self, progress: &ProgressBar) -> Result<usize> {
        let result = self.populate(progress);
        progress.finish_and_clear();

        result
            .inspect(|added| {
                info!(
                    "Router initialized: {} new repositories, {} total",
                    added,
                    self.repositories.len()
                );
            })
            .inspect_err(|e| {
                error!(
                    "Router initialization failed after {} repositories: {}",
                    self.repositories.len(),
                    e
                );
            })
    }

    fn populate(&mut self, progress: &ProgressBar) -> Result<usize> {
        let source = self.source.take().ok_or_else(|| {
            RouterError::Other(anyhow::anyhow!(
                "router was built without a repository source"
            ))
        })?;

        let result = self.populate_from(source.as_ref(), progress);
        self.source = Some(source);
        result
    }

    fn populate_from(
        &mut self,
        source: &dyn RepositorySource,
        progress: &ProgressBar,
    ) -> Result<usize> {
        let orgs = source.list_organizations()?;
        let user_repos = source.list_user_repositories()?;

        let mut added = self.add_repositories(&user_repos, progress)?;
        for org in &orgs {
            if org.login.trim().is_empty() {
                warn!("Skipping organization with an empty login");
                continue;
            }
            let org_repos = source.list_organization_repositories(&org.login)?;
            added += self.add_repositories(&org_repos, progress)?;
        }
        Ok(added)
    }

    fn add_repositories(&mut self, repos: &[Repository], progress: &ProgressBar) -> Result<usize> {
        progress.inc_length(repos.len() as u64);

        let mut added = 0;
        for repo in repos {
            progress.set_message(repo.full_name.clone());

            if self.get(&repo.full_name).is_some() {
                debug!("Skipping {} (already indexed)", repo.full_name);
            } else {
                let record = self.build_record(repo)?;
                self.insert(repo.full_name.clone(), record);
                added += 1;
            }

            progress.inc(1);
        }
        Ok(added)
    }

    fn build_record(&self, repo: &Repository) -> Result<RepositoryRecord> {
        let description = repo.description.clone().unwrap_or_default();
        let keywords = extract_keywords(&repo.topics, &repo.name, repo.description.as_deref());

        let text = if description.trim().is_empty() {
            repo.name.as_str()
        } else {
            description.as_str()
        };
        let embedding = self.embedder.create_embedding(text)?;

        debug!(
            "Indexed {} ({} keywords, {} dimensions)",
            repo.full_name,
            keywords.len(),
            embedding.len()
        );

        Ok(RepositoryRecord {
            description,
            keywords,
            embedding,
        })
    }

    /// First record for a name wins
    fn insert(&mut self, name: String, record: RepositoryRecord) {
        if self.get(&name).is_some() {
            debug!("Ignoring duplicate record for {}", name);
            return;
        }
        self.repositories.push((name, record));
    }

    /// Score every stored repository against `description`, best first.
    ///
    /// Ties keep their stored order.
    #[inline]
    pub fn rank(&self, description: &str) -> Result<Vec<Match>> {
        let query = self
            .embedder
            .create_embedding(description)
            .inspect_err(|e| error!("Failed to embed query: {}", e))?;

        let mismatched = self.dimension_mismatches(query.len());
        if let Some(first) = mismatched.first() {
            warn!(
                "Query has {} dimensions but {} repositories differ (first: {}); their scores will be 0",
                query.len(),
                mismatched.len(),
                first
            );
        }

        let mut matches: Vec<Match> = self
            .repositories
            .iter()
            .map(|(name, record)| Match {
                name: name.clone(),
                score: cosine_similarity(&query, &record.embedding),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(
            "Ranked {} repositories for query (length: {})",
            matches.len(),
            description.len()
        );
        Ok(matches)
    }

    /// Names of stored repositories whose embedding length differs from `dimensions`
    fn dimension_mismatches(&self, dimensions: usize) -> Vec<&str> {
        self.repositories
            .iter()
            .filter(|(_, record)| record.embedding.len() != dimensions)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Repository names ordered by descending similarity to `description`
    #[inline]
    pub fn find_matches(&self, description: &str) -> Result<Vec<String>> {
        Ok(self
            .rank(description)?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&RepositoryRecord> {
        self.repositories
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, record)| record)
    }

    /// All `(name, record)` pairs. Order is unspecified.
    #[inline]
    pub fn records(&self) -> impl Iterator<Item = (&str, &RepositoryRecord)> {
        self.repositories
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
