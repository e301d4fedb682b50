use anyhow::{Context, Result};
use extract::{EntityExtractor, EntityMap, HeuristicExtractor, agreement_stats, fuse, group_mentions};
use ingest::{Chunker, Document, Sentence, SentenceSegmenter, UnicodeSegmenter};
use models::{EntityTagger, LengthBounds, SentimentClassifier, Summarizer};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::AnalysisConfig;
use crate::events::key_events;
use crate::filter::{sentences_matching, sentences_mentioning};
use crate::report::{
    AnalysisReport, DocumentMetadata, KeyEvent, QueryOptions, QueryResult, SentimentTally, Summary,
};
use crate::sentiment::SentimentAggregator;
use crate::summarize::SummaryOrchestrator;
use crate::topics::TopicExtractor;

/// The model-backed collaborators, loaded once and shared across requests.
#[derive(Clone)]
pub struct Collaborators {
    pub tagger: Arc<dyn EntityTagger>,
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
}

pub struct Analyzer {
    segmenter: UnicodeSegmenter,
    extractor: EntityExtractor,
    heuristic: HeuristicExtractor,
    topics: TopicExtractor,
    sentiment: SentimentAggregator,
    summary: SummaryOrchestrator,
}

impl Analyzer {
    pub fn new(collaborators: Collaborators, config: &AnalysisConfig) -> Result<Self> {
        let summarization = &config.summarization;
        let bounds = LengthBounds {
            min: summarization.min_length,
            max: summarization.max_length,
        };

        Ok(Self {
            segmenter: UnicodeSegmenter,
            extractor: EntityExtractor::new(collaborators.tagger),
            heuristic: HeuristicExtractor::new().context("Invalid heuristic pattern")?,
            topics: TopicExtractor::new(config.topics.top_n).context("Invalid token pattern")?,
            sentiment: SentimentAggregator::new(collaborators.sentiment),
            summary: SummaryOrchestrator::new(
                collaborators.summarizer,
                Chunker::with_max_chars(summarization.chunk_size),
                bounds,
                summarization.max_concurrent_chunks,
            ),
        })
    }

    pub fn sentences(&self, doc: &Document) -> Vec<Sentence> {
        self.segmenter.segment(&doc.text)
    }

    pub async fn summarize(&self, doc: &Document) -> Summary {
        self.summary.summarize(&doc.text).await
    }

    pub async fn entities(&self, doc: &Document) -> Result<EntityMap> {
        self.extractor.extract(&doc.text).await
    }

    pub fn heuristic_entities(&self, doc: &Document) -> EntityMap {
        self.heuristic.extract(&doc.text)
    }

    pub fn topics(&self, doc: &Document) -> Vec<String> {
        let sentences = self.sentences(doc);
        self.topics_for(&sentences)
    }

    pub async fn sentiments(&self, doc: &Document) -> Result<SentimentTally> {
        let sentences = self.sentences(doc);
        self.sentiment.tally(&sentences).await
    }

    pub async fn key_events(&self, doc: &Document) -> Result<Vec<KeyEvent>> {
        let sentences = self.sentences(doc);
        let mentions = self.extractor.mentions(&doc.text).await?;
        Ok(key_events(&sentences, &mentions))
    }

    /// Full report for one document.
    ///
    /// NER runs once; its mentions feed both the entity map and the key
    /// events. NER or sentiment failure fails the report, summarization
    /// failures only degrade the summary.
    #[instrument(skip_all, fields(document = %doc.name))]
    pub async fn analyze(&self, doc: &Document, entity: Option<&str>) -> Result<AnalysisReport> {
        let sentences = self.sentences(doc);

        let (summary, mentions, sentiment_analysis) = tokio::join!(
            self.summarize(doc),
            self.extractor.mentions(&doc.text),
            self.sentiment.tally(&sentences),
        );
        let mentions = mentions?;
        let sentiment_analysis = sentiment_analysis?;

        let entities = group_mentions(&mentions);
        let heuristic_entities = self.heuristic_entities(doc);
        let evaluation = fuse(&entities, &heuristic_entities);
        let evaluation_stats = agreement_stats(&entities, &heuristic_entities, &evaluation);

        let relevant_contributions = entity
            .map(|e| sentences_mentioning(&sentences, e))
            .unwrap_or_default();

        let report = AnalysisReport {
            summary: summary.text,
            summary_chunks: summary.chunks,
            summary_failed_chunks: summary.failed_chunks,
            entities,
            heuristic_entities,
            evaluation,
            evaluation_stats,
            topics: self.topics_for(&sentences),
            key_events: key_events(&sentences, &mentions),
            sentiment_analysis,
            relevant_contributions,
        };

        info!(
            sentences = sentences.len(),
            entities = report.entities.len(),
            key_events = report.key_events.len(),
            failed_chunks = report.summary_failed_chunks,
            "Document analyzed"
        );

        Ok(report)
    }

    pub async fn metadata(&self, doc: &Document) -> Result<DocumentMetadata> {
        Ok(DocumentMetadata {
            entities: self.entities(doc).await?,
            topics: self.topics(doc),
        })
    }

    /// Sentences mentioning the requested entity or topic, plus an optional
    /// summary.
    pub async fn query(&self, doc: &Document, options: &QueryOptions) -> Result<QueryResult> {
        let sentences = self.sentences(doc);
        let filtered_sentences =
            sentences_matching(&sentences, options.entity.as_deref(), options.topic.as_deref());

        let summary = if options.summarize {
            Some(self.summarize(doc).await.text)
        } else {
            None
        };

        Ok(QueryResult {
            filtered_sentences,
            summary,
        })
    }

    fn topics_for(&self, sentences: &[Sentence]) -> Vec<String> {
        let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
        self.topics.extract(&texts)
    }
}
