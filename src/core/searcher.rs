/// Command searcher with fuzzy matching
///
/// Finds earlier commands in the persisted history.

use crate::db::{Database, SearchResult};
use crate::error::Result;
use crate::intelligence::Intent;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

/// How far back a search looks
const SEARCH_WINDOW: i64 = 1000;

/// Handles command searching with fuzzy matching
pub struct Searcher {
    db: Arc<Database>,
    matcher: SkimMatcherV2,
}

impl Searcher {
    /// Create a new searcher instance
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Search commands with fuzzy matching
    ///
    /// # Arguments
    /// * `query` - Search query
    /// * `limit` - Maximum results to return
    ///
    /// # Returns
    /// * `Ok(Vec<SearchResult>)` - Search results, best score first
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let commands = self.db.get_recent_commands(SEARCH_WINDOW).await?;

        let mut results: Vec<SearchResult> = commands
            .into_iter()
            .filter_map(|cmd| {
                self.matcher
                    .fuzzy_match(&cmd.raw_text, query)
                    .map(|score| SearchResult {
                        command: cmd,
                        score: score as f64,
                    })
            })
            .collect();

        // Highest score first; equal scores keep the most recent first
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);

        Ok(results)
    }

    /// Most recent commands that classified as `intent`
    pub async fn search_by_intent(&self, intent: Intent, limit: usize) -> Result<Vec<SearchResult>> {
        let commands = self.db.get_recent_commands(SEARCH_WINDOW).await?;

        let results = commands
            .into_iter()
            .filter(|cmd| cmd.intent() == Some(intent))
            .take(limit)
            .map(|cmd| SearchResult {
                command: cmd,
                score: 1.0,
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CommandRecord;

    async fn setup() -> Searcher {
        let db = Arc::new(Database::new_in_memory().await.unwrap());

        let test_commands = [
            ("search ldap.example.com dc=example,dc=com", Some(Intent::Search)),
            ("search ldap.example.com dc=example,dc=com (cn=admin)", Some(Intent::Search)),
            ("info ldap.example.com", Some(Intent::Info)),
            ("delete ldap.example.com cn=old,dc=example,dc=com", Some(Intent::Delete)),
        ];

        for (cmd, intent) in test_commands {
            db.record_command(CommandRecord {
                session_id: "test".to_string(),
                raw_text: cmd.to_string(),
                intent,
                succeeded: true,
            })
            .await
            .unwrap();
        }

        Searcher::new(db)
    }

    #[tokio::test]
    async fn test_fuzzy_search() {
        let searcher = setup().await;

        let results = searcher.search("search", 10).await.unwrap();
        assert!(results.len() >= 2);
        assert!(results[0].command.raw_text.starts_with("search"));
    }

    #[tokio::test]
    async fn test_fuzzy_typo() {
        let searcher = setup().await;

        // Characters in order are enough
        let results = searcher.search("dlt", 10).await.unwrap();
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_search_limit() {
        let searcher = setup().await;

        let results = searcher.search("ldap", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_by_intent() {
        let searcher = setup().await;

        let results = searcher.search_by_intent(Intent::Search, 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].command.raw_text.contains("(cn=admin)"));
    }
}
