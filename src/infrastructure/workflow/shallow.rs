//! Shallow answering flow
//!
//! Three escalating steps: answer from a small knowledge sample, answer
//! from a larger sample boosted by the named entity (or ask follow-up
//! questions), and finally answer from freshly acquired material.

use std::time::Instant;

use tracing::{info, instrument};

use super::orchestrator::WorkflowOrchestrator;
use crate::domain::llm::{AnswerWithKeywords, CanAnswer};
use crate::domain::workflow::{prompts, ShallowStep, WorkflowTrace};
use crate::domain::{AnswerLevel, AnswerSource, DomainError, Question, WorkflowOutcome};

impl WorkflowOrchestrator {
    #[instrument(skip(self, question), fields(level = question.level().as_u8()))]
    pub async fn start(&self, question: &Question) -> Result<WorkflowOutcome, DomainError> {
        let started = Instant::now();
        let mut trace = WorkflowTrace::new();
        let level = question.level();

        let step = Instant::now();
        let sample = self
            .search_knowledge(question.text(), "", self.config.small_sample_size)
            .await?
            .joined_text();
        let first: CanAnswer = self
            .llm
            .ask(&prompts::can_answer(question.text(), &sample))
            .await?;
        trace.record(ShallowStep::SampleKnowledge, step, Some(first.message.clone()));

        if first.can_answer {
            info!(step = %ShallowStep::SampleKnowledge, "Answered from knowledge sample");
            return Ok(WorkflowOutcome::new(first.message, AnswerSource::ExistingKnowledge, trace)
                .finished(started));
        }
        let entity = first.message.trim().to_string();

        if level != AnswerLevel::Eager {
            let step = Instant::now();
            let sample = self
                .search_knowledge(question.text(), &entity, self.config.large_sample_size)
                .await?
                .joined_text();
            let second: CanAnswer = self
                .llm
                .ask(&prompts::can_answer_or_follow_up(question.text(), &sample))
                .await?;
            trace.record(ShallowStep::BoostedKnowledge, step, None);

            if second.can_answer {
                info!(step = %ShallowStep::BoostedKnowledge, "Answered from boosted sample");
                return Ok(
                    WorkflowOutcome::new(second.message, AnswerSource::ExistingKnowledge, trace)
                        .finished(started),
                );
            }
            if level == AnswerLevel::KnowledgeOnly {
                info!("Replying with follow-up questions");
                return Ok(WorkflowOutcome::new(second.message, AnswerSource::FollowUp, trace)
                    .finished(started));
            }
        }

        let step = Instant::now();
        let data = match self.fetch_entity(&entity).await? {
            Some(page) => page,
            None => {
                let query: &str = if entity.is_empty() { question.text() } else { &entity };
                self.search_web(query).await?
            }
        };
        let excerpt = prompts::char_prefix(&data, self.config.data_max_chars);

        let reply: AnswerWithKeywords = self
            .llm
            .ask(&prompts::answer_with_keywords(question.text(), excerpt))
            .await?;

        if !data.trim().is_empty() {
            let source = if reply.keywords.is_empty() {
                entity.clone()
            } else {
                reply.keywords.join(" ")
            };
            self.ingest_acquired(&source, &data, self.config.data_max_chars)
                .await;
        }
        trace.record(
            ShallowStep::AcquireAndAnswer,
            step,
            Some(format!("{} chars acquired", data.chars().count())),
        );
        info!(step = %ShallowStep::AcquireAndAnswer, entity = %entity, "Answered from acquired material");

        Ok(WorkflowOutcome::new(reply.answer, AnswerSource::Acquired, trace)
            .with_keywords(reply.keywords)
            .finished(started))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::knowledge_base::{IndexEntry, IndexName, MockRetrievalGateway, RetrievalGateway};
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::web::MockWebAcquisition;
    use crate::domain::CompletionClient;
    use crate::infrastructure::ingestion::{HashDeduplicator, KnowledgeIngestor};
    use crate::infrastructure::knowledge_base::InMemoryRetrievalGateway;

    fn index() -> IndexName {
        IndexName::new("knowledge_library").unwrap()
    }

    fn orchestrator(
        llm: Arc<MockLlmProvider>,
        gateway: Arc<dyn RetrievalGateway>,
        web: Arc<MockWebAcquisition>,
    ) -> WorkflowOrchestrator {
        let ingestor = KnowledgeIngestor::new(Arc::new(HashDeduplicator::new(gateway.clone(), index())));
        WorkflowOrchestrator::new(
            CompletionClient::new(llm, "qwen-turbo"),
            gateway,
            web,
            ingestor,
            index(),
        )
    }

    fn question(text: &str, level: AnswerLevel) -> Question {
        Question::new(text).unwrap().with_level(level)
    }

    #[tokio::test]
    async fn test_answers_from_small_sample() {
        let llm = Arc::new(MockLlmProvider::new().with_reply(r#"{"can_answer": true, "message": "Excalibur."}"#));
        let gateway = Arc::new(InMemoryRetrievalGateway::new());
        gateway
            .add_entry(&index(), IndexEntry::new("1", "Saber wields Excalibur."))
            .await
            .unwrap();
        let web = Arc::new(MockWebAcquisition::new());

        let outcome = orchestrator(llm.clone(), gateway, web.clone())
            .start(&question("What does Saber wield?", AnswerLevel::Standard))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Excalibur.");
        assert_eq!(outcome.source, AnswerSource::ExistingKnowledge);
        assert_eq!(web.call_count(), 0);
        assert!(llm.prompts()[0].contains("Saber wields Excalibur."));
    }

    #[tokio::test]
    async fn test_boosted_search_uses_entity_from_first_step() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"canAns": false, "message": "Saber"}"#)
                .with_reply(r#"{"canAns": true, "message": "She is a knight."}"#),
        );
        let gateway = Arc::new(MockRetrievalGateway::new());
        let web = Arc::new(MockWebAcquisition::new());

        let outcome = orchestrator(llm, gateway.clone(), web.clone())
            .start(&question("Who is she?", AnswerLevel::Standard))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "She is a knight.");
        assert_eq!(
            gateway.queries(),
            vec![
                ("Who is she?".to_string(), String::new()),
                ("Who is she?".to_string(), "Saber".to_string()),
            ]
        );
        assert_eq!(web.call_count(), 0);
    }

    #[tokio::test]
    async fn test_knowledge_only_returns_follow_up_questions() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"can_answer": false, "message": "Saber"}"#)
                .with_reply(r#"{"can_answer": false, "message": ["Which Saber?", "From which work?", "Which route?"]}"#),
        );
        let web = Arc::new(MockWebAcquisition::new());

        let outcome = orchestrator(llm, Arc::new(InMemoryRetrievalGateway::new()), web.clone())
            .start(&question("Tell me about Saber", AnswerLevel::KnowledgeOnly))
            .await
            .unwrap();

        assert_eq!(outcome.source, AnswerSource::FollowUp);
        assert!(outcome.answer.contains("From which work?"));
        assert_eq!(web.call_count(), 0);
    }

    #[tokio::test]
    async fn test_acquires_answers_and_ingests() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"can_answer": false, "message": "Saber"}"#)
                .with_reply(r#"{"can_answer": false, "message": "Which Saber?"}"#)
                .with_reply(r#"{"ans": "Saber is Artoria.", "keyWords": "Saber, Artoria"}"#),
        );
        let gateway = Arc::new(InMemoryRetrievalGateway::new());
        let web = Arc::new(MockWebAcquisition::new().with_entity_page("Saber is Artoria Pendragon."));

        let outcome = orchestrator(llm.clone(), gateway.clone(), web.clone())
            .start(&question("Who is Saber?", AnswerLevel::Standard))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Saber is Artoria.");
        assert_eq!(outcome.source, AnswerSource::Acquired);
        assert_eq!(outcome.keywords, vec!["Saber", "Artoria"]);
        assert_eq!(web.entity_requests(), vec!["Saber"]);
        assert!(llm.prompts()[2].contains("Saber is Artoria Pendragon."));

        let stored = gateway.list_entries(&index(), 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].source(), Some("Saber Artoria"));
    }

    #[tokio::test]
    async fn test_eager_level_skips_boosted_step() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"can_answer": false, "message": "Saber"}"#)
                .with_reply(r#"{"answer": "Fresh answer.", "keywords": []}"#),
        );
        let web = Arc::new(MockWebAcquisition::new().with_search_text("Saber search results"));

        let outcome = orchestrator(llm.clone(), Arc::new(InMemoryRetrievalGateway::new()), web.clone())
            .start(&question("Who is Saber?", AnswerLevel::Eager))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Fresh answer.");
        assert!(!outcome.trace.contains(ShallowStep::BoostedKnowledge));
        assert_eq!(llm.call_count(), 2);
        assert_eq!(web.search_queries(), vec!["Saber"]);
    }

    #[tokio::test]
    async fn test_acquisition_failure_still_answers() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"can_answer": false, "message": "Saber"}"#)
                .with_reply(r#"{"answer": "I could not look it up.", "keywords": []}"#),
        );
        let gateway = Arc::new(InMemoryRetrievalGateway::new());
        let web = Arc::new(
            MockWebAcquisition::new()
                .with_failing_entity_page()
                .with_failing_search(),
        );

        let outcome = orchestrator(llm, gateway.clone(), web)
            .start(&question("Who is Saber?", AnswerLevel::Eager))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "I could not look it up.");
        assert!(!gateway.index_exists(&index()).await.unwrap());
    }

    #[tokio::test]
    async fn test_acquired_data_is_truncated_for_the_prompt() {
        let llm = Arc::new(
            MockLlmProvider::new()
                .with_reply(r#"{"can_answer": false, "message": "Saber"}"#)
                .with_reply(r#"{"answer": "ok"}"#),
        );
        let web = Arc::new(MockWebAcquisition::new().with_entity_page("x".repeat(20)));
        let config = crate::domain::WorkflowConfig {
            data_max_chars: 5,
            ..Default::default()
        };

        orchestrator(llm.clone(), Arc::new(InMemoryRetrievalGateway::new()), web)
            .with_config(config)
            .start(&question("Who is Saber?", AnswerLevel::Eager))
            .await
            .unwrap();

        assert!(llm.prompts()[1].ends_with("Material: xxxxx"));
    }
}
