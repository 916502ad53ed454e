use database::{Database, DatabaseError};
use veepiac_core::{SubtitleContext, SubtitleId};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Anything that can answer "what was said, where, and on which frames" for a
/// subtitle id. Looked up fresh for every request.
#[async_trait::async_trait]
pub trait SubtitleSource: std::fmt::Debug + Send + Sync {
    async fn subtitle_context(
        &self,
        id: SubtitleId,
    ) -> Result<Option<SubtitleContext>, SourceError>;
}

#[async_trait::async_trait]
impl SubtitleSource for Database {
    async fn subtitle_context(
        &self,
        id: SubtitleId,
    ) -> Result<Option<SubtitleContext>, SourceError> {
        Ok(self.get_subtitle_context(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::NewSubtitle;
    use veepiac_core::EpisodeRef;

    #[tokio::test]
    async fn database_is_a_subtitle_source() {
        let db = Database::memory().await.unwrap();
        let ep = EpisodeRef::new(2, 4).unwrap();
        db.add_episode(ep, Some("The One With The Test")).await.unwrap();
        let id = db
            .add_subtitle(&NewSubtitle {
                episode: ep,
                subtitle_number: 1,
                timestamp_start: "00:00:01,000",
                timestamp_end: "00:00:02,500",
                content: "Hello.",
                start_frame: 24,
                end_frame: 60,
            })
            .await
            .unwrap();

        let source: &dyn SubtitleSource = &db;
        let ctx = source.subtitle_context(id).await.unwrap().unwrap();
        assert_eq!(ctx.episode, ep);
        assert_eq!(ctx.start_frame, 24);
        assert!(source
            .subtitle_context(SubtitleId::new(id.get() + 100))
            .await
            .unwrap()
            .is_none());
    }
}
