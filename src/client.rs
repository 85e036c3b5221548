use chrono::{Local, NaiveDate};
use tracing::{instrument, warn};

use crate::archive::{self, ArchiveSources};
use crate::error::{MtaszError, Result};
use crate::model::*;
use crate::scraper::{self, PageClient};
use crate::scraper::listings::ListingFilter;
use crate::scraper::score_sheet::ScoreSheetKind;

/// Root of the MTASZ section of the upstream site.
pub const DEFAULT_BASE_URL: &str = "https://ksis.szts.sk/mtasz";

/// Browser User-Agent; the upstream site serves reduced pages to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Settings used to build a [`MtaszClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upstream root that page paths are appended to, without trailing slash.
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// The main entry point for reading MTASZ competition data.
///
/// `MtaszClient` wraps a [`reqwest::Client`] and exposes one method per
/// upstream page, plus [`MtaszClient::download_competition`] which bundles a
/// competition's records into a ZIP of CSV files.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> mtasz_scraper::Result<()> {
/// use mtasz_scraper::{FieldSelection, MtaszClient};
///
/// let client = MtaszClient::new();
/// let results = client.get_competition_results("4321").await?;
/// println!("{} results in {}", results.results.len(), results.title);
///
/// let archive = client
///     .download_competition("4321", &FieldSelection::parse("results,marks"))
///     .await?;
/// std::fs::write(&archive.file_name, &archive.bytes)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MtaszClient {
    http: PageClient,
    base_url: String,
}

impl MtaszClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        let config = ClientConfig::default();
        let http = build_http(&config).unwrap_or_else(|e| {
            warn!(error = %e, "falling back to a plain http client");
            reqwest::Client::new()
        });
        Self {
            http: PageClient::new(http, config.user_agent),
            base_url: config.base_url,
        }
    }

    /// Create a client for a custom upstream root or User-Agent.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            http: PageClient::new(build_http(&config)?, config.user_agent),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts or proxies. Requests are
    /// still sent with [`DEFAULT_USER_AGENT`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: PageClient::new(client, DEFAULT_USER_AGENT),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another upstream root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the announcement (info) page of a competition.
    #[instrument(skip(self))]
    pub async fn get_competition_info(&self, id: &str) -> Result<CompetitionInfo> {
        let id = required(id, "competition id")?;
        scraper::competition_info::get_competition_info(&self.http, &self.base_url, id).await
    }

    /// Fetch the results, judges and officials of a competition.
    #[instrument(skip(self))]
    pub async fn get_competition_results(&self, id: &str) -> Result<CompetitionResults> {
        let id = required(id, "competition id")?;
        scraper::competition_results::get_competition_results(&self.http, &self.base_url, id)
            .await
    }

    /// Fetch the judges' marks of a competition.
    #[instrument(skip(self))]
    pub async fn get_competition_marks(&self, id: &str) -> Result<MarkData> {
        let id = required(id, "competition id")?;
        scraper::score_sheet::get_score_sheet(&self.http, &self.base_url, ScoreSheetKind::Marks, id)
            .await
    }

    /// Fetch the skating system calculation of a competition.
    #[instrument(skip(self))]
    pub async fn get_competition_skating(&self, id: &str) -> Result<SkatingData> {
        let id = required(id, "competition id")?;
        scraper::score_sheet::get_score_sheet(
            &self.http,
            &self.base_url,
            ScoreSheetKind::Skating,
            id,
        )
        .await
    }

    /// Fetch the entry list of a competition, grouped by category.
    #[instrument(skip(self))]
    pub async fn get_competition_participants(&self, id: &str) -> Result<EntryList> {
        let id = required(id, "competition id")?;
        scraper::entries::get_entry_list(&self.http, &self.base_url, id).await
    }

    /// Fetch a couple's profile and competition history.
    #[instrument(skip(self))]
    pub async fn get_participant(&self, id: &str) -> Result<Participant> {
        let id = required(id, "participant id")?;
        scraper::participant::get_participant(&self.http, &self.base_url, id).await
    }

    /// Fetch every competition on the current calendar, in page order.
    #[instrument(skip(self))]
    pub async fn get_competitions(&self) -> Result<CompetitionListing> {
        scraper::listings::get_calendar(&self.http, &self.base_url, ListingFilter::All).await
    }

    /// Fetch the competitions dated today or later, months in calendar order.
    pub async fn get_upcoming_competitions(&self) -> Result<CompetitionListing> {
        self.get_upcoming_competitions_as_of(Local::now().date_naive())
            .await
    }

    /// Like [`MtaszClient::get_upcoming_competitions`], with an explicit "today".
    #[instrument(skip(self))]
    pub async fn get_upcoming_competitions_as_of(
        &self,
        today: NaiveDate,
    ) -> Result<CompetitionListing> {
        scraper::listings::get_calendar(&self.http, &self.base_url, ListingFilter::NotBefore(today))
            .await
    }

    /// Fetch the competitions held in a past year.
    #[instrument(skip(self))]
    pub async fn get_previous_competitions(&self, year: &str) -> Result<CompetitionListing> {
        let year = required(year, "year")?;
        scraper::listings::get_previous_year(&self.http, &self.base_url, year).await
    }

    /// Fetch the national ranking for an age group and dance type.
    #[instrument(skip(self))]
    pub async fn get_rankings(&self, query: &RankingQuery) -> Result<Rankings> {
        required(&query.date, "ranking date")?;
        required(&query.age_group, "age group")?;
        required(&query.dance_type, "dance type")?;
        scraper::rankings::get_rankings(&self.http, &self.base_url, query).await
    }

    /// Fetch a competition's records and pack the selected ones into a ZIP.
    ///
    /// The results page is required; marks and skating are fetched
    /// concurrently afterwards and left out of the archive if they fail.
    #[instrument(skip(self))]
    pub async fn download_competition(
        &self,
        id: &str,
        selection: &FieldSelection,
    ) -> Result<CompetitionArchive> {
        let id = required(id, "competition id")?;
        let results = self.get_competition_results(id).await?;

        let (marks, skating) = tokio::join!(
            self.secondary_sheet(ScoreSheetKind::Marks, ArchiveField::Marks, id, selection),
            self.secondary_sheet(ScoreSheetKind::Skating, ArchiveField::Skating, id, selection),
        );

        let title = if results.title.is_empty() {
            format!("competition_{id}")
        } else {
            results.title.clone()
        };
        let sources = ArchiveSources {
            results: Some(results),
            marks,
            skating,
        };
        archive::build_archive(&title, &sources, selection)
    }

    /// A score sheet for the archive, `None` when not selected or unavailable.
    async fn secondary_sheet(
        &self,
        kind: ScoreSheetKind,
        field: ArchiveField,
        id: &str,
        selection: &FieldSelection,
    ) -> Option<ScoreSheet> {
        if !selection.includes(field) {
            return None;
        }
        match scraper::score_sheet::get_score_sheet(&self.http, &self.base_url, kind, id).await {
            Ok(sheet) => Some(sheet),
            Err(e) => {
                warn!(%kind, id, error = %e, "leaving score sheet out of archive");
                None
            }
        }
    }
}

impl Default for MtaszClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_http(config: &ClientConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| MtaszError::Http {
            url: config.base_url.clone(),
            source: e,
        })
}

/// Reject blank identifiers before any request is made.
fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(MtaszError::MissingIdentifier { name })
    } else {
        Ok(value)
    }
}
