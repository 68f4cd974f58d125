//! Repository listing through the GitHub REST API.

use crate::{RemoteRepo, RepoSource};
use anyhow::Context;
use auditgate_types::RepoId;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("auditgate/", env!("CARGO_PKG_VERSION"));

/// One entry of `GET /user/repos`, reduced to what selection needs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ListedRepo {
    pub name: String,
    pub owner: Owner,
    #[serde(default)]
    pub archived: bool,
    pub clone_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Owner {
    pub login: String,
}

impl ListedRepo {
    pub fn id(&self) -> RepoId {
        RepoId::new(&self.owner.login, &self.name)
    }
}

/// Which listed repositories are audited.
#[derive(Clone, Debug, Default)]
pub struct RepoFilter {
    pub accounts: Vec<String>,
    pub language: String,
    pub skip_repos: BTreeSet<RepoId>,
}

/// Keep repositories owned by a configured account, not archived, not
/// skipped, and written (at least partly) in the configured language.
///
/// `languages` is only consulted for repositories that pass the cheaper
/// checks, since each lookup is a request.
pub fn select_repositories<F>(
    listed: Vec<ListedRepo>,
    filter: &RepoFilter,
    mut languages: F,
) -> anyhow::Result<Vec<RemoteRepo>>
where
    F: FnMut(&RepoId) -> anyhow::Result<Vec<String>>,
{
    let mut selected = Vec::new();
    for repo in listed {
        let id = repo.id();
        if !filter.accounts.iter().any(|a| a == &id.owner) {
            continue;
        }
        if repo.archived {
            tracing::debug!(repository = %id, "archived, not audited");
            continue;
        }
        if filter.skip_repos.contains(&id) {
            tracing::info!(repository = %id, "skipped by configuration");
            continue;
        }
        let langs = languages(&id)?;
        if !langs.iter().any(|l| l == &filter.language) {
            tracing::debug!(repository = %id, language = %filter.language, "language not present");
            continue;
        }
        selected.push(RemoteRepo::new(id, repo.clone_url));
    }
    Ok(selected)
}

pub fn parse_repo_page(body: &str) -> anyhow::Result<Vec<ListedRepo>> {
    serde_json::from_str(body).context("unexpected repository listing format")
}

/// Language names from `GET /repos/{owner}/{name}/languages`, sorted.
pub fn parse_languages(body: &str) -> anyhow::Result<Vec<String>> {
    let map: BTreeMap<String, u64> =
        serde_json::from_str(body).context("unexpected languages format")?;
    Ok(map.into_keys().collect())
}

pub struct GithubSource {
    client: reqwest::blocking::Client,
    api_url: String,
    token: String,
    filter: RepoFilter,
}

impl GithubSource {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        filter: RepoFilter,
    ) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            filter,
        })
    }

    fn get(&self, url: &str) -> anyhow::Result<String> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GitHub API returned {status} for {url}");
        }
        response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))
    }

    fn list_all(&self) -> anyhow::Result<Vec<ListedRepo>> {
        let mut all = Vec::new();
        for page in 1.. {
            let url = format!(
                "{}/user/repos?per_page={PER_PAGE}&page={page}",
                self.api_url
            );
            let batch = parse_repo_page(&self.get(&url)?)
                .with_context(|| format!("page {page} of the repository listing"))?;
            let last = batch.len() < PER_PAGE;
            all.extend(batch);
            if last {
                break;
            }
        }
        Ok(all)
    }

    fn languages(&self, id: &RepoId) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/repos/{}/{}/languages", self.api_url, id.owner, id.name);
        parse_languages(&self.get(&url)?).with_context(|| format!("languages of {id}"))
    }
}

impl RepoSource for GithubSource {
    fn list(&self) -> anyhow::Result<Vec<RemoteRepo>> {
        let listed = self.list_all()?;
        tracing::info!(count = listed.len(), "repositories visible to token");
        let selected = select_repositories(listed, &self.filter, |id| self.languages(id))?;
        tracing::info!(count = selected.len(), "repositories selected for audit");
        Ok(selected)
    }
}
