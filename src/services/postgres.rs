use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::models::{
    LedgerSnapshot, Match, NewProfile, NewUser, Photo, Profile, Swipe, SwipeDirection, User,
    UserId, UserPair,
};
use crate::services::store::{check_photo_order, check_swipe_pair, StoreError, SwipeStore};

/// PostgreSQL adapter for the swipe store
///
/// Uniqueness of swipes and matches is carried by the schema
/// (`swipes_unique_pair`, `matches_unique_pair`); every insert uses
/// `ON CONFLICT DO NOTHING` so a lost race shows up as an empty
/// `RETURNING` set rather than an error.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {}, min: {})",
            settings.max_connections,
            settings.min_connections
        );

        Self::new(
            &settings.url,
            settings.max_connections,
            settings.min_connections,
            Duration::from_secs(settings.acquire_timeout_secs),
            Duration::from_secs(settings.idle_timeout_secs),
        )
        .await
    }

    async fn load_profiles(&self, rows: Vec<PgRow>) -> Result<Vec<Profile>, StoreError> {
        let mut profiles: Vec<Profile> = rows.iter().map(profile_from_row).collect();
        if profiles.is_empty() {
            return Ok(profiles);
        }

        let ids: Vec<i64> = profiles.iter().map(|p| p.id).collect();
        let query = r#"
            SELECT id, profile_id, image, display_order
            FROM photos
            WHERE profile_id = ANY($1)
            ORDER BY profile_id, display_order, id
        "#;

        let photo_rows = sqlx::query(query).bind(&ids[..]).fetch_all(&self.pool).await?;

        let mut by_profile: HashMap<i64, Vec<Photo>> = HashMap::new();
        for row in &photo_rows {
            let photo = photo_from_row(row);
            by_profile.entry(photo.profile_id).or_default().push(photo);
        }

        for profile in &mut profiles {
            if let Some(photos) = by_profile.remove(&profile.id) {
                profile.photos = photos;
            }
        }

        Ok(profiles)
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        date_of_birth: row.get("date_of_birth"),
        created_at: row.get("created_at"),
    }
}

fn profile_from_row(row: &PgRow) -> Profile {
    Profile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        first_name: row.get("first_name"),
        bio: row.get("bio"),
        job_title: row.get("job_title"),
        company: row.get("company"),
        photos: Vec::new(),
    }
}

fn photo_from_row(row: &PgRow) -> Photo {
    Photo {
        id: row.get("id"),
        profile_id: row.get("profile_id"),
        image: row.get("image"),
        order: row.get("display_order"),
    }
}

fn swipe_from_row(row: &PgRow) -> Result<Swipe, StoreError> {
    let direction: String = row.get("direction");
    let direction = direction
        .parse::<SwipeDirection>()
        .map_err(|e| StoreError::CorruptRow(e.to_string()))?;

    Ok(Swipe {
        swiper_id: row.get("swiper_id"),
        swiped_id: row.get("swiped_id"),
        direction,
        created_at: row.get("created_at"),
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    let user1: i64 = row.get("user1_id");
    let user2: i64 = row.get("user2_id");
    let pair = UserPair::new(user1, user2)
        .ok_or_else(|| StoreError::CorruptRow(format!("match of user {} with itself", user1)))?;

    Ok(Match {
        pair,
        created_at: row.get("created_at"),
    })
}

/// Foreign-key violations mean a referenced row is missing
fn missing_reference(err: sqlx::Error, what: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound(what),
        _ => err.into(),
    }
}

const PROFILE_COLUMNS: &str = r#"
    p.id, p.user_id, u.first_name, p.bio, p.job_title, p.company
"#;

#[async_trait]
impl SwipeStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let query = r#"
            INSERT INTO users (username, first_name, date_of_birth)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, first_name, date_of_birth, created_at
        "#;

        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(user.date_of_birth)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(user_from_row(&row)),
            None => Err(StoreError::Conflict(format!(
                "username '{}' is taken",
                user.username
            ))),
        }
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let query = r#"
            SELECT id, username, first_name, date_of_birth, created_at
            FROM users
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_profile(
        &self,
        user_id: UserId,
        profile: NewProfile,
    ) -> Result<Profile, StoreError> {
        if !self.user_exists(user_id).await? {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }

        let query = r#"
            WITH inserted AS (
                INSERT INTO profiles (user_id, bio, job_title, company)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING id, user_id, bio, job_title, company
            )
            SELECT p.id, p.user_id, u.first_name, p.bio, p.job_title, p.company
            FROM inserted p
            JOIN users u ON u.id = p.user_id
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(&profile.bio)
            .bind(&profile.job_title)
            .bind(&profile.company)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(profile_from_row(&row)),
            None => Err(StoreError::Conflict(format!(
                "user {} already has a profile",
                user_id
            ))),
        }
    }

    async fn add_photo(
        &self,
        profile_id: i64,
        image: &str,
        order: i32,
    ) -> Result<Photo, StoreError> {
        check_photo_order(order)?;

        let query = r#"
            INSERT INTO photos (profile_id, image, display_order)
            SELECT id, $2, $3 FROM profiles WHERE id = $1
            RETURNING id, profile_id, image, display_order
        "#;

        let row = sqlx::query(query)
            .bind(profile_id)
            .bind(image)
            .bind(order)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref()
            .map(photo_from_row)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", profile_id)))
    }

    async fn profile_for_user(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.user_id = $1
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(self.load_profiles(rows).await?.into_iter().next())
    }

    async fn candidate_profiles(&self, user_id: UserId) -> Result<Vec<Profile>, StoreError> {
        let query = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.user_id <> $1
              AND NOT EXISTS (
                  SELECT 1 FROM swipes s
                  WHERE s.swiper_id = $1 AND s.swiped_id = p.user_id
              )
            ORDER BY p.id
            "#
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("User {} has {} candidate profiles", user_id, rows.len());

        self.load_profiles(rows).await
    }

    async fn insert_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
        direction: SwipeDirection,
    ) -> Result<Option<Swipe>, StoreError> {
        check_swipe_pair(swiper_id, swiped_id)?;

        let query = r#"
            INSERT INTO swipes (swiper_id, swiped_id, direction, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (swiper_id, swiped_id) DO NOTHING
            RETURNING swiper_id, swiped_id, direction, created_at
        "#;

        let row = sqlx::query(query)
            .bind(swiper_id)
            .bind(swiped_id)
            .bind(direction.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                missing_reference(
                    e,
                    format!("swipe {} -> {} references an unknown user", swiper_id, swiped_id),
                )
            })?;

        row.as_ref().map(swipe_from_row).transpose()
    }

    async fn find_swipe(
        &self,
        swiper_id: UserId,
        swiped_id: UserId,
    ) -> Result<Option<Swipe>, StoreError> {
        let query = r#"
            SELECT swiper_id, swiped_id, direction, created_at
            FROM swipes
            WHERE swiper_id = $1 AND swiped_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(swiper_id)
            .bind(swiped_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(swipe_from_row).transpose()
    }

    async fn insert_match(&self, pair: UserPair) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO matches (user1_id, user2_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user1_id, user2_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(pair.low())
            .bind(pair.high())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn matches_for(&self, user_id: UserId) -> Result<Vec<Match>, StoreError> {
        let query = r#"
            SELECT user1_id, user2_id, created_at
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY created_at DESC, id DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn reciprocated_pairs(&self) -> Result<Vec<UserPair>, StoreError> {
        let query = r#"
            SELECT a.swiper_id, a.swiped_id
            FROM swipes a
            JOIN swipes b
              ON b.swiper_id = a.swiped_id AND b.swiped_id = a.swiper_id
            WHERE a.direction = 'right'
              AND b.direction = 'right'
              AND a.swiper_id < a.swiped_id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .filter_map(|row| UserPair::new(row.get("swiper_id"), row.get("swiped_id")))
            .collect())
    }

    async fn ledger_snapshot(&self, user_id: UserId) -> Result<LedgerSnapshot, StoreError> {
        let query = r#"
            SELECT swiper_id, swiped_id, direction, created_at
            FROM swipes
            WHERE swiper_id = $1 OR swiped_id = $1
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = LedgerSnapshot {
            user_id,
            ..LedgerSnapshot::default()
        };

        for row in &rows {
            let swipe = swipe_from_row(row)?;
            if swipe.swiper_id == user_id {
                snapshot.sent.push(swipe);
            } else {
                snapshot.received.push(swipe);
            }
        }

        Ok(snapshot)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEQ: AtomicU32 = AtomicU32::new(0);

    // Run with: DATABASE_URL=postgres://... cargo test -- --ignored
    async fn connect() -> Option<PostgresStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let store = PostgresStore::new(&url, 2, 1, Duration::from_secs(5), Duration::from_secs(60))
            .await
            .unwrap();
        Some(store)
    }

    async fn create(store: &PostgresStore, name: &str) -> UserId {
        let suffix = format!(
            "{}-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_micros(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        );
        store
            .create_user(NewUser {
                username: format!("{}-{}", name, suffix),
                first_name: name.to_string(),
                date_of_birth: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_swipe_is_ignored() {
        let Some(store) = connect().await else { return };
        let a = create(&store, "dup-a").await;
        let b = create(&store, "dup-b").await;

        let first = store.insert_swipe(a, b, SwipeDirection::Left).await.unwrap();
        let second = store.insert_swipe(a, b, SwipeDirection::Right).await.unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let kept = store.find_swipe(a, b).await.unwrap().unwrap();
        assert_eq!(kept.direction, SwipeDirection::Left);

        let snapshot = store.ledger_snapshot(a).await.unwrap();
        assert_eq!(snapshot.sent.len(), 1);
        assert!(snapshot.received.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_match_stored_as_canonical_pair() {
        let Some(store) = connect().await else { return };
        let a = create(&store, "pair-a").await;
        let b = create(&store, "pair-b").await;

        let pair = UserPair::new(b, a).unwrap();
        assert!(store.insert_match(pair).await.unwrap());
        assert!(!store.insert_match(UserPair::new(a, b).unwrap()).await.unwrap());

        let (user1, user2): (i64, i64) =
            sqlx::query_as("SELECT user1_id, user2_id FROM matches WHERE user1_id = $1 OR user2_id = $1")
                .bind(a)
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!((user1, user2), (a.min(b), a.max(b)));

        let matches = store.matches_for(b).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pair.other(b), Some(a));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_reciprocated_pairs_and_deck_exclusion() {
        let Some(store) = connect().await else { return };
        let a = create(&store, "recip-a").await;
        let b = create(&store, "recip-b").await;
        store.create_profile(b, NewProfile::default()).await.unwrap();

        store.insert_swipe(a, b, SwipeDirection::Right).await.unwrap();
        store.insert_swipe(b, a, SwipeDirection::Right).await.unwrap();

        let pairs = store.reciprocated_pairs().await.unwrap();
        assert!(pairs.contains(&UserPair::new(a, b).unwrap()));

        let deck = store.candidate_profiles(a).await.unwrap();
        assert!(deck.iter().all(|p| p.user_id != b && p.user_id != a));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_rejections_match_memory_store() {
        let Some(store) = connect().await else { return };
        let a = create(&store, "reject-a").await;
        let profile = store.create_profile(a, NewProfile::default()).await.unwrap();

        let err = store.insert_swipe(a, a, SwipeDirection::Right).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));

        let err = store.insert_swipe(-1, a, SwipeDirection::Right).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.add_photo(profile.id, "x.jpg", -1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }
}
