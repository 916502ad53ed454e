use veepiac_core::{EpisodeRef, SubtitleContext, SubtitleId};

use crate::{Database, DatabaseError};

/// A subtitle line to be inserted, mirroring a row in `subtitles`.
#[derive(Debug, Clone)]
pub struct NewSubtitle<'a> {
    pub episode: EpisodeRef,
    pub subtitle_number: i64,
    pub timestamp_start: &'a str,
    pub timestamp_end: &'a str,
    pub content: &'a str,
    pub start_frame: u64,
    pub end_frame: u64,
}

#[derive(Debug, sqlx::FromRow)]
struct SubtitleRow {
    subtitle_id: i64,
    season: i64,
    episode: i64,
    episode_title: Option<String>,
    timestamp_start: String,
    timestamp_end: String,
    dialogue: String,
    start_frame: i64,
    end_frame: i64,
}

fn frame_from_sql(frame: i64) -> Result<u64, DatabaseError> {
    u64::try_from(frame)
        .map_err(|_| DatabaseError::ConvertFromSqlError(format!("negative frame number: {frame}")))
}

fn episode_from_sql(season: i64, episode: i64) -> Result<EpisodeRef, DatabaseError> {
    let convert = |n: i64| {
        u32::try_from(n).map_err(|_| {
            DatabaseError::ConvertFromSqlError(format!("episode number out of range: {n}"))
        })
    };
    EpisodeRef::new(convert(season)?, convert(episode)?)
        .map_err(|e| DatabaseError::ConvertFromSqlError(e.to_string()))
}

impl TryFrom<SubtitleRow> for SubtitleContext {
    type Error = DatabaseError;

    fn try_from(row: SubtitleRow) -> Result<Self, Self::Error> {
        Ok(SubtitleContext {
            subtitle_id: SubtitleId::new(row.subtitle_id),
            episode: episode_from_sql(row.season, row.episode)?,
            episode_title: row.episode_title,
            dialogue: row.dialogue,
            start_frame: frame_from_sql(row.start_frame)?,
            end_frame: frame_from_sql(row.end_frame)?,
            timestamp_start: Some(row.timestamp_start),
            timestamp_end: Some(row.timestamp_end),
        })
    }
}

impl Database {
    pub async fn add_episode(
        &self,
        episode: EpisodeRef,
        title: Option<&str>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO episodes (season, episode_of_season, title)
            VALUES ( ?1, ?2, ?3 )
            ON CONFLICT (season, episode_of_season) DO UPDATE SET title = excluded.title
            "#,
        )
        .bind(episode.season() as i64)
        .bind(episode.episode() as i64)
        .bind(title)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_subtitle(&self, sub: &NewSubtitle<'_>) -> Result<SubtitleId, DatabaseError> {
        let id = sqlx::query(
            r#"
            INSERT INTO subtitles (
                season, episode, subtitle_number, timestamp_start,
                timestamp_end, content, start_frame, end_frame
            )
            VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8 )
            "#,
        )
        .bind(sub.episode.season() as i64)
        .bind(sub.episode.episode() as i64)
        .bind(sub.subtitle_number)
        .bind(sub.timestamp_start)
        .bind(sub.timestamp_end)
        .bind(sub.content)
        .bind(sub.start_frame as i64)
        .bind(sub.end_frame as i64)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(SubtitleId::new(id))
    }

    /// Look up a single subtitle line along with its episode.
    ///
    /// Returns `None` when the subtitle does not exist, or when its episode
    /// has no row in `episodes`.
    pub async fn get_subtitle_context(
        &self,
        subtitle_id: SubtitleId,
    ) -> Result<Option<SubtitleContext>, DatabaseError> {
        let row = sqlx::query_as::<_, SubtitleRow>(
            r#"
            SELECT
                s.id AS subtitle_id,
                s.season AS season,
                s.episode AS episode,
                e.title AS episode_title,
                s.timestamp_start AS timestamp_start,
                s.timestamp_end AS timestamp_end,
                s.content AS dialogue,
                s.start_frame AS start_frame,
                s.end_frame AS end_frame
            FROM subtitles s
            JOIN episodes e ON s.season = e.season AND s.episode = e.episode_of_season
            WHERE s.id = ?
            "#,
        )
        .bind(subtitle_id.get())
        .fetch_optional(&self.pool)
        .await?;

        log::trace!("subtitle {} => {:?}", subtitle_id, row);
        row.map(SubtitleContext::try_from).transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn episode(season: u32, episode: u32) -> EpisodeRef {
        EpisodeRef::new(season, episode).unwrap()
    }

    fn line(e: EpisodeRef, content: &str) -> NewSubtitle<'_> {
        NewSubtitle {
            episode: e,
            subtitle_number: 1,
            timestamp_start: "00:01:02,500",
            timestamp_end: "00:01:04,000",
            content,
            start_frame: 1500,
            end_frame: 1536,
        }
    }

    #[tokio::test]
    async fn lookup_subtitle_context() {
        let db = Database::memory().await.unwrap();
        let e = episode(2, 5);
        db.add_episode(e, Some("Bad Tina")).await.unwrap();
        let id = db.add_subtitle(&line(e, "Uhhhhhh")).await.unwrap();

        let ctx = db.get_subtitle_context(id).await.unwrap().unwrap();
        assert_eq!(ctx.subtitle_id, id);
        assert_eq!(ctx.episode.code(), "S02E05");
        assert_eq!(ctx.episode_title.as_deref(), Some("Bad Tina"));
        assert_eq!(ctx.dialogue, "Uhhhhhh");
        assert_eq!((ctx.start_frame, ctx.end_frame), (1500, 1536));
        assert_eq!(ctx.timestamp_start.as_deref(), Some("00:01:02,500"));
    }

    #[tokio::test]
    async fn missing_subtitle() {
        let db = Database::memory().await.unwrap();
        let ctx = db.get_subtitle_context(SubtitleId::new(99)).await.unwrap();
        assert!(ctx.is_none());
    }

    #[tokio::test]
    async fn subtitle_without_episode_row() {
        let db = Database::memory().await.unwrap();
        let id = db.add_subtitle(&line(episode(1, 1), "hi")).await.unwrap();
        assert!(db.get_subtitle_context(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn episode_title_is_updated() {
        let db = Database::memory().await.unwrap();
        let e = episode(1, 2);
        db.add_episode(e, None).await.unwrap();
        db.add_episode(e, Some("Crawl Space")).await.unwrap();
        let id = db.add_subtitle(&line(e, "hi")).await.unwrap();
        let ctx = db.get_subtitle_context(id).await.unwrap().unwrap();
        assert_eq!(ctx.episode_title.as_deref(), Some("Crawl Space"));
    }
}
