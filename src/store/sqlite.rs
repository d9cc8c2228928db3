use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::DatabaseSettings,
    models::{ActivityStats, Rank, RankError, Result, StoredScore},
    store::ScoreStore,
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallet_scores (
    address TEXT PRIMARY KEY NOT NULL,
    total_points REAL NOT NULL,
    rank TEXT NOT NULL,
    transactions INTEGER NOT NULL,
    tokens INTEGER NOT NULL,
    nfts INTEGER NOT NULL,
    contracts INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_wallet_scores_points ON wallet_scores (total_points DESC)";

#[derive(Debug, FromRow)]
struct ScoreRow {
    address: String,
    total_points: f64,
    rank: String,
    transactions: i64,
    tokens: i64,
    nfts: i64,
    contracts: i64,
    updated_at: i64,
}

impl TryFrom<ScoreRow> for StoredScore {
    type Error = RankError;

    fn try_from(row: ScoreRow) -> Result<Self> {
        let rank: Rank = row.rank.parse().map_err(|_| {
            RankError::CorruptRecord(format!("unknown rank {:?} for {}", row.rank, row.address))
        })?;
        let updated_at = DateTime::<Utc>::from_timestamp_millis(row.updated_at).unwrap_or_default();

        Ok(StoredScore {
            address: row.address,
            total_points: row.total_points,
            rank,
            stats: ActivityStats {
                transactions: row.transactions.max(0) as u64,
                tokens: row.tokens.max(0) as u64,
                nfts: row.nfts.max(0) as u64,
                contracts: row.contracts.max(0) as u64,
            },
            updated_at,
        })
    }
}

/// Scores persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteScoreStore {
    pool: SqlitePool,
}

impl SqliteScoreStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .connect_with(options)
            .await?;

        info!("Connected to score store at {}", settings.url);
        Self::from_pool(pool).await
    }

    /// Single-connection in-memory database (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn save(&self, score: &StoredScore) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO wallet_scores
                (address, total_points, rank, transactions, tokens, nfts, contracts, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(address) DO UPDATE SET
                 total_points = excluded.total_points,
                 rank = excluded.rank,
                 transactions = excluded.transactions,
                 tokens = excluded.tokens,
                 nfts = excluded.nfts,
                 contracts = excluded.contracts,
                 updated_at = excluded.updated_at
            "#,
        )
        .bind(score.address.to_lowercase())
        .bind(score.total_points)
        .bind(score.rank.as_str())
        .bind(score.stats.transactions as i64)
        .bind(score.stats.tokens as i64)
        .bind(score.stats.nfts as i64)
        .bind(score.stats.contracts as i64)
        .bind(score.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        debug!("Stored score {} for {}", score.total_points, score.address);
        Ok(())
    }

    async fn load(&self, address: &str) -> Result<Option<StoredScore>> {
        let row = sqlx::query_as::<_, ScoreRow>("SELECT * FROM wallet_scores WHERE address = ?1")
            .bind(address.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(StoredScore::try_from).transpose()
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            "SELECT * FROM wallet_scores ORDER BY total_points DESC, address ASC LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredScore::try_from).collect()
    }
}
