#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set, sea_query::OnConflict};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use axum_cinema_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool},
    entity::{movies, shows},
    providers::{
        CatalogProvider, CheckoutSession, CheckoutSessionRequest, IdentityProvider, MovieDetail,
        MovieSummary, PaymentProvider, Profile, ProviderError, SessionStatus,
    },
    state::AppState,
};

/// Fake catalog provider with deterministic metadata.
pub struct FakeCatalog;

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn now_playing(&self) -> Result<Vec<MovieSummary>, ProviderError> {
        Ok(vec![MovieSummary {
            id: 603,
            title: "The Matrix".into(),
            overview: "A hacker learns the truth.".into(),
            poster_path: Some("/matrix.jpg".into()),
            backdrop_path: Some("/matrix-bg.jpg".into()),
            release_date: Some("1999-03-31".into()),
            vote_average: 8.2,
        }])
    }

    async fn details(&self, movie_id: i64) -> Result<MovieDetail, ProviderError> {
        Ok(MovieDetail {
            id: movie_id,
            title: format!("Movie {movie_id}"),
            overview: "Imported for testing.".into(),
            poster_path: Some("/poster.jpg".into()),
            backdrop_path: Some("/backdrop.jpg".into()),
            release_date: Some("2026-01-01".into()),
            original_language: Some("en".into()),
            tagline: None,
            genres: json!([{ "id": 18, "name": "Drama" }]),
            casts: json!([{ "name": "Test Actor" }]),
            vote_average: 7.0,
            runtime: 120,
        })
    }
}

/// Fake hosted-checkout provider; records session requests and serves
/// configurable poll statuses.
#[derive(Default)]
pub struct FakePayments {
    pub sessions: Mutex<Vec<CheckoutSessionRequest>>,
    pub statuses: Mutex<HashMap<String, SessionStatus>>,
    pub fail_create: AtomicBool,
}

impl FakePayments {
    pub fn session_id_for(booking_id: Uuid) -> String {
        format!("cs_test_{}", booking_id.simple())
    }

    pub async fn set_status(&self, session_id: &str, status: SessionStatus) {
        self.statuses
            .lock()
            .await
            .insert(session_id.to_string(), status);
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn create_session(
        &self,
        req: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                provider: "payment",
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        self.sessions.lock().await.push(req.clone());
        let session_id = Self::session_id_for(req.booking_id);
        Ok(CheckoutSession {
            session_id: session_id.clone(),
            redirect_url: format!("https://checkout.test/pay/{session_id}"),
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ProviderError> {
        Ok(self
            .statuses
            .lock()
            .await
            .get(session_id)
            .copied()
            .unwrap_or(SessionStatus::Open))
    }
}

/// In-memory profile store standing in for the identity provider.
#[derive(Default)]
pub struct MemoryProfiles {
    pub users: Mutex<HashMap<String, Value>>,
}

#[async_trait]
impl IdentityProvider for MemoryProfiles {
    async fn get_profile(&self, user_id: &str) -> Result<Profile, ProviderError> {
        let users = self.users.lock().await;
        Ok(Profile {
            private_metadata: users.get(user_id).cloned().unwrap_or(Value::Null),
        })
    }

    async fn update_metadata(
        &self,
        user_id: &str,
        private_metadata: Value,
    ) -> Result<(), ProviderError> {
        let mut users = self.users.lock().await;
        users.insert(user_id.to_string(), private_metadata);
        Ok(())
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub payments: Arc<FakePayments>,
    pub identity: Arc<MemoryProfiles>,
}

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        catalog_base_url: "http://catalog.invalid".into(),
        catalog_api_key: "test".into(),
        payment_base_url: "http://payments.invalid".into(),
        payment_secret_key: "test".into(),
        identity_base_url: "http://identity.invalid".into(),
        identity_secret_key: "test".into(),
        currency: "usd".into(),
        release_on_expiry: false,
    }
}

/// Build an [`AppState`] against the test database, or `None` (with a note)
/// when no database is configured in the environment.
pub async fn setup_state() -> anyhow::Result<Option<TestHarness>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
            );
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let orm = orm_from_pool(pool.clone());

    let payments = Arc::new(FakePayments::default());
    let identity = Arc::new(MemoryProfiles::default());
    let state = AppState {
        pool,
        orm,
        config: test_config(database_url),
        catalog: Arc::new(FakeCatalog),
        payments: payments.clone(),
        identity: identity.clone(),
    };

    Ok(Some(TestHarness {
        state,
        payments,
        identity,
    }))
}

/// Idempotent movie seed so test runs can share fixed ids.
pub async fn seed_movie(state: &AppState, id: i64, title: &str) -> anyhow::Result<()> {
    let movie = movies::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        overview: Set("Seeded for tests".into()),
        poster_path: Set("/poster.jpg".into()),
        backdrop_path: Set("/backdrop.jpg".into()),
        release_date: Set("2026-01-01".into()),
        original_language: Set(Some("en".into())),
        tagline: Set(None),
        genres: Set(json!([])),
        casts: Set(json!([])),
        vote_average: Set(7.5),
        runtime: Set(110),
        created_at: NotSet,
        updated_at: NotSet,
    };

    match movies::Entity::insert(movie)
        .on_conflict(
            OnConflict::column(movies::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec(&state.orm)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Insert an upcoming show and return its id.
pub async fn seed_show(
    state: &AppState,
    movie_id: i64,
    price: i64,
    hours_ahead: i64,
) -> anyhow::Result<Uuid> {
    let show = shows::ActiveModel {
        id: Set(Uuid::new_v4()),
        movie_id: Set(movie_id),
        start_time: Set((Utc::now() + Duration::hours(hours_ahead)).into()),
        price: Set(price),
        occupied_seats: Set(json!({})),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(show.id)
}

pub fn labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}
