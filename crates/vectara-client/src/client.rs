//! Session facade over the corpus components.

use std::fmt;
use std::sync::Arc;

use log::info;

use vectara_common::{Config, Document};

use crate::auth::{AuthTokenManager, Clock, SystemClock, TokenProvider};
use crate::corpus::{CorpusKey, CorpusResolver};
use crate::error::ClientError;
use crate::gateway::{HttpGateway, build_http_client};
use crate::ingest::DocumentIngestor;
use crate::prune::DocumentPruner;
use crate::wire::CorpusId;

/// A connected session bound to one resolved corpus.
///
/// The corpus is resolved once in [`connect`](Self::connect) and reused by
/// every later call.
///
/// # Example
///
/// ```no_run
/// use vectara_client::VectaraClient;
/// use vectara_common::{Config, Document};
///
/// # async fn example() -> Result<(), vectara_client::ClientError> {
/// let config = Config::new("1234567", "support-articles", "client-id", "client-secret");
/// let client = VectaraClient::connect(config).await?;
///
/// let doc = Document::new("articles_1")
///     .with_section("title", "Resetting a password")
///     .with_metadata("_ab_stream", "articles");
/// client.index(&[doc]).await?;
///
/// let failed = client.delete_by_metadata("_ab_stream", &["articles"]).await?;
/// assert!(failed.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct VectaraClient {
    config: Config,
    tokens: Arc<dyn TokenProvider>,
    corpus: CorpusKey,
    resolver: CorpusResolver,
    ingestor: DocumentIngestor,
    pruner: DocumentPruner,
}

impl fmt::Debug for VectaraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectaraClient")
            .field("customer_id", &self.corpus.customer_id)
            .field("corpus_name", &self.config.corpus_name)
            .field("corpus_id", &self.corpus.corpus_id)
            .finish_non_exhaustive()
    }
}

impl VectaraClient {
    /// Connects using client-credentials tokens and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, no token can be
    /// obtained, or the corpus cannot be resolved.
    pub async fn connect(config: Config) -> Result<Self, ClientError> {
        Self::connect_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Connects with token expiry measured against `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub async fn connect_with_clock(
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let http = build_http_client(&config)?;
        let tokens = Arc::new(AuthTokenManager::new(http.clone(), &config, clock));
        Self::establish(config, http, tokens).await
    }

    /// Connects with bearer tokens supplied by `tokens`.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    pub async fn with_token_provider(
        config: Config,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Self::establish(config, http, tokens).await
    }

    async fn establish(
        config: Config,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ClientError> {
        let gateway = Arc::new(HttpGateway::new(http, &config, Arc::clone(&tokens)));
        let resolver = CorpusResolver::new(Arc::clone(&gateway));
        let corpus = resolver.resolve(&config.corpus_name).await?;

        info!(
            "Connected to corpus '{}' ({}) for customer {}",
            config.corpus_name, corpus.corpus_id, corpus.customer_id
        );

        Ok(Self {
            ingestor: DocumentIngestor::new(Arc::clone(&gateway), corpus.clone()),
            pruner: DocumentPruner::new(gateway, corpus.clone()),
            config,
            tokens,
            corpus,
            resolver,
        })
    }

    /// The resolved corpus identifier.
    pub const fn corpus_id(&self) -> &CorpusId {
        &self.corpus.corpus_id
    }

    /// The tenant this session writes to.
    pub fn customer_id(&self) -> &str {
        &self.corpus.customer_id
    }

    /// The configured corpus name.
    pub fn corpus_name(&self) -> &str {
        &self.config.corpus_name
    }

    /// The configuration the session was opened with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Re-authenticates and confirms the resolved corpus is still the only
    /// one with its name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationError`] if a fresh token cannot
    /// be obtained, [`ClientError::AmbiguousCorpusError`] if duplicates
    /// appeared, and [`ClientError::InvalidResponse`] if the corpus is gone.
    pub async fn check(&self) -> Result<(), ClientError> {
        self.tokens.invalidate().await;

        match self.resolver.find(&self.config.corpus_name).await? {
            Some(id) if id == self.corpus.corpus_id => Ok(()),
            Some(id) => Err(ClientError::InvalidResponse(format!(
                "corpus '{}' now resolves to {id}, expected {}",
                self.config.corpus_name, self.corpus.corpus_id
            ))),
            None => Err(ClientError::InvalidResponse(format!(
                "corpus '{}' ({}) no longer exists",
                self.config.corpus_name, self.corpus.corpus_id
            ))),
        }
    }

    /// Indexes `documents` in order, stopping at the first rejection.
    ///
    /// # Errors
    ///
    /// See [`DocumentIngestor::index`].
    pub async fn index(&self, documents: &[Document]) -> Result<usize, ClientError> {
        self.ingestor.index(documents).await
    }

    /// Deletes the documents whose `field` equals any of `values`.
    ///
    /// # Errors
    ///
    /// See [`DocumentPruner::delete_by_metadata`].
    pub async fn delete_by_metadata<S>(
        &self,
        field: &str,
        values: &[S],
    ) -> Result<Vec<String>, ClientError>
    where
        S: AsRef<str> + Sync,
    {
        self.pruner.delete_by_metadata(field, values).await
    }

    /// Deletes documents by id, returning those that were not deleted.
    ///
    /// # Errors
    ///
    /// See [`DocumentPruner::delete_by_id`].
    pub async fn delete_by_id<S>(&self, ids: &[S]) -> Result<Vec<String>, ClientError>
    where
        S: AsRef<str> + Sync,
    {
        self.pruner.delete_by_id(ids).await
    }
}
