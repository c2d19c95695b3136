//! In-memory session store
//!
//! Holds every open document. Matcher calls run without the lock held; their
//! results are only applied if the rule list is unchanged by then.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{AddedRule, DocumentSession, Rehighlight, RemoveOutcome, SessionError, SessionSummary};
use crate::document::{DocumentFormat, LoadedDocument};
use crate::html::{HighlightConfig, HighlightOutcome};
use crate::matcher::WordMatcher;
use crate::rules::HighlightRule;

type Result<T> = std::result::Result<T, SessionError>;

/// Original upload bytes with their format
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

/// Thread-safe session store
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, DocumentSession>>>,
    max_documents: usize,
    highlight_config: Arc<HighlightConfig>,
}

impl SessionStore {
    pub fn new(max_documents: usize) -> Self {
        Self::with_config(max_documents, HighlightConfig::default())
    }

    pub fn with_config(max_documents: usize, highlight_config: HighlightConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_documents: max_documents.max(1),
            highlight_config: Arc::new(highlight_config),
        }
    }

    /// Open a session for a freshly loaded document, evicting the oldest
    /// session when the store is full
    pub async fn insert(&self, document: LoadedDocument) -> SessionSummary {
        let session = DocumentSession::new(document);
        let summary = session.summary();

        let mut sessions = self.sessions.write().await;
        while sessions.len() >= self.max_documents {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.document.loaded_at)
                .map(|s| s.id());
            match oldest {
                Some(id) => {
                    tracing::info!(document_id = %id, "Evicting oldest document session");
                    sessions.remove(&id);
                }
                None => break,
            }
        }
        sessions.insert(session.id(), session);

        summary
    }

    pub async fn summary(&self, id: Uuid) -> Result<SessionSummary> {
        self.read(id, |s| s.summary()).await
    }

    /// All sessions, oldest first
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions.values().map(|s| s.summary()).collect();
        summaries.sort_by_key(|s| s.loaded_at);
        summaries
    }

    /// Clear a document selection
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn current_html(&self, id: Uuid) -> Result<String> {
        self.read(id, |s| {
            s.current_html()
                .map(str::to_string)
                .ok_or(SessionError::NoHtmlRendering(s.document.format))
        })
        .await?
    }

    pub async fn plain_text(&self, id: Uuid) -> Result<String> {
        self.read(id, |s| {
            s.document
                .plain_text()
                .map(str::to_string)
                .ok_or(SessionError::NoHtmlRendering(s.document.format))
        })
        .await?
    }

    pub async fn source(&self, id: Uuid) -> Result<SourceFile> {
        self.read(id, |s| SourceFile {
            file_name: s.document.file_name.clone(),
            format: s.document.format,
            bytes: s.document.source.clone(),
        })
        .await
    }

    pub async fn rules(&self, id: Uuid) -> Result<Vec<HighlightRule>> {
        self.read(id, |s| s.rules.rules().to_vec()).await
    }

    pub async fn add_rule(
        &self,
        id: Uuid,
        description: &str,
        color: Option<&str>,
    ) -> Result<AddedRule> {
        self.update(id, |s| {
            let rule = s.add_rule(description, color)?;
            Ok(AddedRule {
                index: s.rules.len() - 1,
                rule,
                selected_color: s.rules.selected_color().to_string(),
            })
        })
        .await
    }

    pub async fn select_color(&self, id: Uuid, color: &str) -> Result<String> {
        self.update(id, |s| {
            s.rules.select_color(color)?;
            Ok(s.rules.selected_color().to_string())
        })
        .await
    }

    /// Drop the highlighted rendering
    pub async fn reset(&self, id: Uuid) -> Result<()> {
        self.update(id, |s| {
            s.reset();
            Ok(())
        })
        .await
    }

    /// Send the plain text and rules to the matcher and highlight the result
    pub async fn extract(&self, id: Uuid, matcher: &dyn WordMatcher) -> Result<HighlightOutcome> {
        let job = self.read(id, |s| s.prepare_match()).await??;

        let matches = matcher.match_rules(&job.content, &job.rules).await?;

        let config = Arc::clone(&self.highlight_config);
        let outcome = self
            .update(id, |s| s.apply_matches(&job, &matches, &config))
            .await?;

        tracing::info!(
            document_id = %id,
            rules = job.rules.len(),
            applied = outcome.applied,
            "Highlights applied"
        );

        Ok(outcome)
    }

    /// Remove a rule and bring the rendering back in line with the rest
    ///
    /// With rules remaining, the matcher is asked again and the highlights are
    /// rebuilt from the pristine rendering. With none left, the pristine
    /// rendering is restored.
    pub async fn remove_rule(
        &self,
        id: Uuid,
        index: usize,
        matcher: &dyn WordMatcher,
    ) -> Result<RemoveOutcome> {
        let (removed, job) = self
            .update(id, |s| {
                let removed = s.remove_rule(index)?;
                if !s.document.format.supports_highlighting() {
                    return Ok((removed, Err(Rehighlight::Skipped)));
                }
                // The old rendering carries spans of the removed rule and
                // indices that no longer line up
                s.reset();
                if s.rules.is_empty() {
                    return Ok((removed, Err(Rehighlight::Reset)));
                }
                Ok((removed, Ok(s.prepare_match()?)))
            })
            .await?;

        let job = match job {
            Ok(job) => job,
            Err(rehighlight) => return Ok(RemoveOutcome { removed, rehighlight }),
        };

        let rehighlight = match matcher.match_rules(&job.content, &job.rules).await {
            Ok(matches) => {
                let config = Arc::clone(&self.highlight_config);
                match self
                    .update(id, |s| s.apply_matches(&job, &matches, &config))
                    .await
                {
                    Ok(outcome) => Rehighlight::Applied {
                        applied: outcome.applied,
                    },
                    Err(SessionError::StaleRules) => Rehighlight::Superseded,
                    Err(e) => fail_rehighlight(id, e)?,
                }
            }
            Err(e) => fail_rehighlight(id, e.into())?,
        };

        Ok(RemoveOutcome { removed, rehighlight })
    }

    async fn read<T>(&self, id: Uuid, f: impl FnOnce(&DocumentSession) -> T) -> Result<T> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(f).ok_or(SessionError::NotFound(id))
    }

    async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut DocumentSession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }
}

/// The rendering is already pristine; only a vanished session is an error
fn fail_rehighlight(id: Uuid, error: SessionError) -> Result<Rehighlight> {
    tracing::warn!(document_id = %id, "Re-highlight failed: {}", error);

    if let SessionError::NotFound(_) = error {
        return Err(error);
    }

    Ok(Rehighlight::Failed {
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load_document;
    use crate::html::RuleMatches;
    use crate::matcher::{HealthMessage, MatcherError, MockMatcher};

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    async fn store_with_txt(text: &str) -> (SessionStore, Uuid) {
        let store = SessionStore::new(8);
        let doc = load_document("doc.txt", text.as_bytes().to_vec()).unwrap();
        let summary = store.insert(doc).await;
        (store, summary.id)
    }

    #[tokio::test]
    async fn test_extract_applies_matches() {
        let (store, id) = store_with_txt("Sam was born on 11-05-2005").await;
        store.add_rule(id, "Dates", None).await.unwrap();
        store.add_rule(id, "Names", None).await.unwrap();

        let matcher = MockMatcher::with_replies(vec![vec![words(&["11-05-2005"]), words(&["Sam"])]]);
        let outcome = store.extract(id, &matcher).await.unwrap();

        assert_eq!(outcome.per_rule, vec![1, 1]);
        let html = store.current_html(id).await.unwrap();
        assert!(html.contains("background-color: #4285F4\">11-05-2005</span>"));
        assert!(html.contains("background-color: #34A853\">Sam</span>"));
    }

    #[tokio::test]
    async fn test_extract_twice_does_not_compound() {
        let (store, id) = store_with_txt("alpha beta").await;
        store.add_rule(id, "Greek", None).await.unwrap();

        let reply = vec![words(&["beta"])];
        let matcher = MockMatcher::with_replies(vec![reply.clone(), reply]);
        store.extract(id, &matcher).await.unwrap();
        let first = store.current_html(id).await.unwrap();
        store.extract(id, &matcher).await.unwrap();
        let second = store.current_html(id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("<span").count(), 1);
    }

    #[tokio::test]
    async fn test_remove_rule_rehighlights_remaining() {
        let (store, id) = store_with_txt("Sam was born on 11-05-2005").await;
        store.add_rule(id, "Dates", None).await.unwrap();
        store.add_rule(id, "Names", None).await.unwrap();

        let matcher = MockMatcher::with_replies(vec![
            vec![words(&["11-05-2005"]), words(&["Sam"])],
            vec![words(&["Sam"])],
        ]);
        store.extract(id, &matcher).await.unwrap();

        let outcome = store.remove_rule(id, 0, &matcher).await.unwrap();
        assert_eq!(outcome.removed.description, "Dates");
        assert_eq!(outcome.rehighlight, Rehighlight::Applied { applied: 1 });

        // Second request carried only the remaining rule
        let requests = matcher.requests.lock().unwrap().clone();
        assert_eq!(requests[1].len(), 1);
        assert_eq!(requests[1][0].description, "Names");

        let html = store.current_html(id).await.unwrap();
        assert!(!html.contains("11-05-2005</span>"));
        assert!(html.contains("background-color: #34A853\">Sam</span>"));
    }

    #[tokio::test]
    async fn test_remove_last_rule_resets() {
        let (store, id) = store_with_txt("alpha beta").await;
        store.add_rule(id, "Greek", None).await.unwrap();
        let matcher = MockMatcher::with_replies(vec![vec![words(&["beta"])]]);
        store.extract(id, &matcher).await.unwrap();

        let outcome = store.remove_rule(id, 0, &matcher).await.unwrap();
        assert_eq!(outcome.rehighlight, Rehighlight::Reset);
        assert_eq!(store.current_html(id).await.unwrap(), "<p>alpha beta</p>\n");
    }

    #[tokio::test]
    async fn test_remove_rule_matcher_failure_resets() {
        let (store, id) = store_with_txt("alpha beta").await;
        store.add_rule(id, "a", None).await.unwrap();
        store.add_rule(id, "b", None).await.unwrap();
        let matcher = MockMatcher::with_replies(vec![vec![words(&["alpha"]), words(&["beta"])]]);
        store.extract(id, &matcher).await.unwrap();

        // No reply queued for the re-highlight
        let outcome = store.remove_rule(id, 1, &matcher).await.unwrap();
        assert!(matches!(outcome.rehighlight, Rehighlight::Failed { .. }));
        assert_eq!(store.current_html(id).await.unwrap(), "<p>alpha beta</p>\n");
        assert_eq!(store.rules(id).await.unwrap().len(), 1);
    }

    /// Holds every matcher call until released
    struct GatedMatcher {
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
        reply: RuleMatches,
    }

    #[async_trait::async_trait]
    impl WordMatcher for GatedMatcher {
        async fn match_rules(
            &self,
            _content: &str,
            _rules: &[HighlightRule],
        ) -> std::result::Result<RuleMatches, MatcherError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.reply.clone())
        }

        async fn check_health(&self) -> std::result::Result<HealthMessage, MatcherError> {
            Ok(HealthMessage {
                message: "gated".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_superseded_rehighlight_drops_removed_spans() {
        let (store, id) = store_with_txt("alpha beta gamma").await;
        store.add_rule(id, "a", None).await.unwrap();
        store.add_rule(id, "b", None).await.unwrap();
        let matcher = MockMatcher::with_replies(vec![vec![words(&["alpha"]), words(&["beta"])]]);
        store.extract(id, &matcher).await.unwrap();

        let gated = Arc::new(GatedMatcher {
            entered: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
            reply: vec![words(&["beta"])],
        });
        let task = {
            let store = store.clone();
            let gated = Arc::clone(&gated);
            tokio::spawn(async move { store.remove_rule(id, 0, gated.as_ref()).await })
        };

        gated.entered.notified().await;
        store.add_rule(id, "c", None).await.unwrap();
        gated.release.notify_one();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.rehighlight, Rehighlight::Superseded);

        let rules: Vec<String> = store
            .rules(id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(rules, vec!["b", "c"]);
        assert_eq!(store.current_html(id).await.unwrap(), "<p>alpha beta gamma</p>\n");
    }

    #[tokio::test]
    async fn test_add_rule_reports_index_and_next_color() {
        let (store, id) = store_with_txt("text").await;
        let first = store.add_rule(id, "one", None).await.unwrap();
        let second = store.add_rule(id, "two", Some("#123456")).await.unwrap();

        assert_eq!(first.index, 0);
        assert_eq!(first.rule.color, "#4285F4");
        assert_eq!(first.selected_color, "#34A853");
        assert_eq!(second.index, 1);
        assert_eq!(second.rule.color, "#123456");
    }

    #[tokio::test]
    async fn test_pdf_rules_skip_highlighting() {
        let store = SessionStore::new(8);
        let doc = load_document("paper.pdf", b"%PDF-1.4".to_vec()).unwrap();
        let id = store.insert(doc).await.id;
        store.add_rule(id, "Dates", None).await.unwrap();

        let matcher = MockMatcher::with_replies(vec![]);
        assert!(matches!(
            store.extract(id, &matcher).await,
            Err(SessionError::HighlightingUnsupported(DocumentFormat::Pdf))
        ));
        let outcome = store.remove_rule(id, 0, &matcher).await.unwrap();
        assert_eq!(outcome.rehighlight, Rehighlight::Skipped);
        assert!(matcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_eviction_keeps_newest() {
        let store = SessionStore::new(2);
        let mut ids = Vec::new();
        for i in 0..3 {
            let doc = load_document(&format!("{}.txt", i), b"x".to_vec()).unwrap();
            ids.push(store.insert(doc).await.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        assert_eq!(store.len().await, 2);
        assert!(matches!(store.summary(ids[0]).await, Err(SessionError::NotFound(_))));
        assert!(store.summary(ids[2]).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new(2);
        let id = Uuid::new_v4();
        assert!(matches!(store.remove(id).await, Err(SessionError::NotFound(_))));
        assert!(matches!(store.rules(id).await, Err(SessionError::NotFound(_))));
    }
}
