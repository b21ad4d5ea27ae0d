//! Deep answering flow
//!
//! Keywords are judged by the LLM, corroborated against a web search and
//! gated against stored knowledge. When stored knowledge is not relevant
//! enough, an encyclopedia article is acquired and ingested before the
//! final answer is composed from the best passages.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::domain::ingestion::{Document, Passage, Segmenter};
use crate::domain::knowledge_base::{IndexName, RetrievalGateway, SearchResult};
use crate::domain::llm::{AnswerReply, EntityName, KeywordJudgment};
use crate::domain::ranking::{fuzzy_jaccard, normalize_by_top_score, PassageRanker};
use crate::domain::workflow::{prompts, WorkflowTrace};
use crate::domain::{
    AnswerLevel, AnswerSource, CompletionClient, DomainError, KeywordExtractor, Question,
    StopWords, Tokenizer, WebAcquisition, WorkflowConfig, WorkflowOutcome, WorkflowState,
};
use crate::infrastructure::ingestion::KnowledgeIngestor;

/// Runs both answering flows against one knowledge index
#[derive(Debug)]
pub struct WorkflowOrchestrator {
    pub(super) llm: CompletionClient,
    pub(super) gateway: Arc<dyn RetrievalGateway>,
    pub(super) web: Arc<dyn WebAcquisition>,
    pub(super) ingestor: KnowledgeIngestor,
    pub(super) index: IndexName,
    pub(super) config: WorkflowConfig,
    extractor: KeywordExtractor,
    ranker: PassageRanker,
    stop_words: StopWords,
}

impl WorkflowOrchestrator {
    pub fn new(
        llm: CompletionClient,
        gateway: Arc<dyn RetrievalGateway>,
        web: Arc<dyn WebAcquisition>,
        ingestor: KnowledgeIngestor,
        index: IndexName,
    ) -> Self {
        let config = WorkflowConfig::default();
        let tokenizer = Tokenizer::default();

        Self {
            llm,
            gateway,
            web,
            ingestor,
            index,
            stop_words: StopWords::new(&config.stop_words),
            config,
            extractor: KeywordExtractor::new(tokenizer.clone()),
            ranker: PassageRanker::new(tokenizer),
        }
    }

    /// Share a tokenizer (and its custom dictionary) with other components
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.extractor = KeywordExtractor::new(tokenizer.clone());
        self.ranker = PassageRanker::new(tokenizer);
        self
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.stop_words = StopWords::new(&config.stop_words);
        self.config = config;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn index(&self) -> &IndexName {
        &self.index
    }

    /// Answer a question through the full retrieval pipeline
    #[instrument(skip(self, question), fields(level = question.level().as_u8()))]
    pub async fn answer(&self, question: &Question) -> Result<WorkflowOutcome, DomainError> {
        let started = Instant::now();
        let mut trace = WorkflowTrace::new();
        info!(state = %WorkflowState::Start, "Answering question");

        let step = Instant::now();
        let judgment: KeywordJudgment = self
            .llm
            .ask(&prompts::keyword_judgment(question.text()))
            .await?;
        trace.record(
            WorkflowState::ExtractKeywords,
            step,
            Some(judgment.keywords.join(", ")),
        );

        if !judgment.judgment {
            let step = Instant::now();
            let reply: AnswerReply = self
                .llm
                .ask(&prompts::persona_answer(question.text(), &self.config.persona))
                .await?;
            trace.record(WorkflowState::NotApplicable, step, None);
            info!(state = %WorkflowState::NotApplicable, "Answered without retrieval");

            return Ok(WorkflowOutcome::new(reply.answer, AnswerSource::Persona, trace).finished(started));
        }

        let step = Instant::now();
        let dictionary = self.extractor.tokenizer().dictionary();
        for keyword in &judgment.keywords {
            dictionary.insert(keyword);
        }
        let web_query = if judgment.keywords.is_empty() {
            question.text().to_string()
        } else {
            judgment.keywords.join(" ")
        };
        let search_text = self.search_web(&web_query).await?;
        trace.record(WorkflowState::Search, step, Some(web_query.clone()));

        let step = Instant::now();
        let keywords = self
            .stop_words
            .remove(self.extractor.extract(&search_text, self.config.keyword_top_n));
        debug!(?keywords, "Search keywords");
        trace.record(
            WorkflowState::CollectCandidateText,
            step,
            Some(keywords.join(", ")),
        );

        let step = Instant::now();
        let store_query = if keywords.is_empty() {
            web_query.clone()
        } else {
            keywords.join(" ")
        };
        let hits = self
            .search_knowledge(&store_query, "", self.config.knowledge_limit)
            .await?;
        let retained = normalize_by_top_score(hits, self.config.thresholds.relative_cutoff);
        let knowledge = retained.joined_text();
        let corroborating = self
            .stop_words
            .remove(self.extractor.extract(&knowledge, self.config.keyword_top_n));
        debug!(?corroborating, retained = retained.len(), "Knowledge keywords");
        trace.record(
            WorkflowState::ExtractCorroboratingKeywords,
            step,
            Some(corroborating.join(", ")),
        );

        let step = Instant::now();
        let similarity = fuzzy_jaccard(&corroborating, &keywords);
        let relevant = similarity >= self.config.thresholds.jaccard_threshold;
        let acquire = question.level() == AnswerLevel::Eager || !relevant;
        trace.record(
            WorkflowState::GateRelevance,
            step,
            Some(format!("similarity {:.3}", similarity)),
        );

        let step = Instant::now();
        let (article, source) = if acquire {
            info!(state = %WorkflowState::AcquireAndIngest, similarity, "Acquiring new material");
            let (article, detail) = self
                .acquire_article(question.level(), &search_text)
                .await?;
            trace.record(WorkflowState::AcquireAndIngest, step, detail);
            (article, AnswerSource::Acquired)
        } else {
            info!(state = %WorkflowState::UseExistingKnowledge, similarity, "Using stored knowledge");
            trace.record(WorkflowState::UseExistingKnowledge, step, None);
            (knowledge, AnswerSource::ExistingKnowledge)
        };

        let step = Instant::now();
        let passages = self.select_passages(&article, question.text());
        trace.record(
            WorkflowState::SelectPassages,
            step,
            Some(format!("{} passages", passages.len())),
        );

        let step = Instant::now();
        let reply: AnswerReply = self
            .llm
            .ask(&prompts::compose_answer(
                question.text(),
                &passages,
                &self.config.persona,
            ))
            .await?;
        trace.record(WorkflowState::ComposeAnswer, step, None);
        info!(state = %WorkflowState::ComposeAnswer, "Answer composed");

        Ok(WorkflowOutcome::new(reply.answer, source, trace)
            .with_keywords(keywords)
            .with_similarity(similarity)
            .finished(started))
    }

    /// Full-text search where a missing index counts as an empty store
    pub(super) async fn search_knowledge(
        &self,
        query: &str,
        boost: &str,
        limit: usize,
    ) -> Result<SearchResult, DomainError> {
        match self.gateway.full_text(&self.index, query, boost, limit).await {
            Err(DomainError::NotFound { .. }) => {
                debug!(index = %self.index, "Knowledge index missing");
                Ok(SearchResult::empty())
            }
            other => other,
        }
    }

    /// Search results text; an acquisition failure yields no text
    pub(super) async fn search_web(&self, query: &str) -> Result<String, DomainError> {
        match self.web.fetch_search_results(query).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, query, "Web search failed");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Encyclopedia page for `name`, if one could be fetched
    pub(super) async fn fetch_entity(&self, name: &str) -> Result<Option<String>, DomainError> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        match self.web.fetch_entity_page(name).await {
            Ok(page) => Ok(page.filter(|p| !p.trim().is_empty())),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, name, "Entity page fetch failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Ingest acquired material; failures are logged and ignored
    pub(super) async fn ingest_acquired(&self, source: &str, text: &str, min_paragraph_length: usize) {
        let segmenter = Segmenter {
            min_paragraph_length,
            ..self.ingestor.segmenter()
        };

        match self.ingestor.ingest(&Document::new(source, text), segmenter).await {
            Ok(report) => debug!(added = report.added, skipped = report.skipped, "Acquired material ingested"),
            Err(e) => warn!(error = %e, source, "Failed to ingest acquired material"),
        }
    }

    async fn acquire_article(
        &self,
        level: AnswerLevel,
        search_text: &str,
    ) -> Result<(String, Option<String>), DomainError> {
        if level == AnswerLevel::KnowledgeOnly {
            return Ok((search_text.to_string(), Some("search text only".to_string())));
        }

        let probe = prompts::char_prefix(search_text, self.config.entity_probe_chars);
        let entity: EntityName = self.llm.ask(&prompts::dominant_entity(probe)).await?;
        let name = entity.name.trim();
        info!(entity = name, "Dominant entity");

        let article = match self.fetch_entity(name).await? {
            Some(page) => page,
            None => search_text.to_string(),
        };

        if !article.trim().is_empty() {
            let source = if name.is_empty() { "search" } else { name };
            self.ingest_acquired(source, &article, self.config.article_min_paragraph_length)
                .await;
        }

        Ok((article, Some(name.to_string())))
    }

    fn select_passages(&self, article: &str, question: &str) -> Vec<String> {
        let document = Document::new("article", article);
        let candidates: Vec<Passage> = self.ingestor.segmenter().passages(&document).collect();

        self.ranker
            .rank(candidates, question, self.config.top_passages)
            .into_iter()
            .map(|p| p.text)
            .collect()
    }
}
