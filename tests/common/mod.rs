use pricedesk_api::{
    auth::{user::UserRole, AuthConfig, AuthService, AuthUser, NewUser},
    db::DbPool,
    events::{self, EventSender},
    handlers::AppServices,
    notifications::{NoopNotifier, Notifier},
};
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything a workflow test needs: an isolated in-memory database with
/// the full schema, the service stack wired to a no-op notifier, and one
/// admin plus one standard principal.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub admin: AuthUser,
    pub standard: AuthUser,
}

pub async fn setup() -> TestContext {
    // A single connection keeps the in-memory database alive and shared.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5));

    let db = Database::connect(options).await.expect("connect sqlite");
    pricedesk_api::db::run_migrations(&db)
        .await
        .expect("run migrations");
    let db = Arc::new(db);

    let (event_tx, event_rx) = mpsc::channel(64);
    let event_sender = EventSender::new(event_tx);
    tokio::spawn(events::process_events(event_rx));

    let auth = Arc::new(AuthService::new(
        AuthConfig::new(
            "integration_test_secret_long_enough_for_the_hs256_signer_0123456789abcd".into(),
            "pricedesk-api".into(),
            "pricedesk-auth".into(),
            Duration::from_secs(3600),
        ),
        db.clone(),
    ));

    let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);
    let services = AppServices::new(
        db.clone(),
        Arc::new(event_sender),
        notifier,
        auth.clone(),
    );

    let admin_account = auth
        .create_user(NewUser {
            email: "admin@example.com".into(),
            password: "hunter22".into(),
            name: "Avery Admin".into(),
            role: UserRole::Admin,
        })
        .await
        .expect("create admin");

    let standard_account = auth
        .create_user(NewUser {
            email: "user@example.com".into(),
            password: "hunter22".into(),
            name: "Sam Standard".into(),
            role: UserRole::Standard,
        })
        .await
        .expect("create standard user");

    TestContext {
        db,
        services,
        admin: AuthUser {
            user_id: admin_account.id,
            name: admin_account.name,
            email: admin_account.email,
            role: UserRole::Admin,
        },
        standard: AuthUser {
            user_id: standard_account.id,
            name: standard_account.name,
            email: standard_account.email,
            role: UserRole::Standard,
        },
    }
}
