#[macro_use]
extern crate rocket;

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod store;

use crate::cache::ApiCache;
use crate::config::ApiConfig;
use crate::db::CampaignDb;
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::Once;

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    // Configure CORS
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(CampaignDb::init())
        .attach(cors)
        // Run database migrations on startup
        .attach(AdHoc::try_on_ignite("Run Migrations", |rocket| async move {
            match CampaignDb::fetch(&rocket) {
                Some(db) => {
                    let pool = (**db).clone();
                    match db::MIGRATOR.run(&pool).await {
                        Ok(_) => {
                            log::info!("database migrations successful");
                            Ok(rocket)
                        }
                        Err(e) => {
                            log::error!("database migrations failed: {}", e);
                            Err(rocket)
                        }
                    }
                }
                None => {
                    log::error!("database pool not available for migrations");
                    Err(rocket)
                }
            }
        }))
        // Clone the pool into managed state and set up the response cache.
        // The cache lives for the whole process; entries leave it only via
        // TTL expiry or explicit invalidation on writes.
        .attach(AdHoc::try_on_ignite(
            "Manage DB Pool, Cache and Config",
            |rocket| async move {
                match CampaignDb::fetch(&rocket) {
                    Some(db) => {
                        let pool = (**db).clone();
                        Ok(rocket
                            .manage(pool)
                            .manage(ApiCache::in_memory())
                            .manage(ApiConfig::from_env()))
                    }
                    None => Err(rocket),
                }
            },
        ))
        .register(
            "/",
            catchers![
                routes::catchers::not_found,
                routes::catchers::unprocessable,
                routes::catchers::internal_error,
            ],
        )
        .mount(
            "/v1",
            openapi_get_routes![
                // Health routes
                routes::health::health_check,
                // Candidate routes
                routes::candidates::create_candidate,
                routes::candidates::list_candidates,
                routes::candidates::get_candidate,
                routes::candidates::update_candidate,
                routes::candidates::delete_candidate,
                routes::candidates::batch_fetch_candidates,
                // Volunteer routes
                routes::volunteers::create_volunteer,
                routes::volunteers::list_volunteers,
                routes::volunteers::get_volunteer,
                routes::volunteers::update_volunteer,
                routes::volunteers::delete_volunteer,
                routes::volunteers::batch_post_volunteers,
                // Role routes
                routes::roles::create_role,
                routes::roles::list_roles,
                routes::roles::get_role,
                routes::roles::update_role,
                // Event routes
                routes::events::create_event,
                routes::events::list_events,
                routes::events::get_event,
                routes::events::update_event,
                // Attendance routes
                routes::attendances::create_attendance,
                routes::attendances::list_attendances,
                routes::attendances::get_attendance,
                routes::attendances::update_attendance,
                // Campaign routes
                routes::campaigns::list_campaigns,
                routes::campaigns::create_campaign,
                routes::campaigns::money_raised,
                routes::campaigns::donations,
                routes::campaigns::attendees,
            ],
        )
        .mount(
            "/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Campaign API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::cache::ApiCache;
    use crate::config::{ApiConfig, BatchPolicy};
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::{Build, Rocket, Route};
    use sqlx::PgPool;
    use std::time::Duration;

    pub use database::{TestDatabase, TestDatabaseError};

    /// Deterministic configuration for tests: long TTLs, continue-on-error
    /// batches, no environment lookups.
    pub fn test_config() -> ApiConfig {
        ApiConfig {
            item_ttl: Duration::from_secs(3600),
            list_ttl: Duration::from_secs(3600),
            batch_policy: BatchPolicy::ContinueOnError,
        }
    }

    /// Convenience helpers for seeding entity and association tables in
    /// tests.
    pub struct TestFixtures<'a> {
        pool: &'a PgPool,
    }

    impl<'a> TestFixtures<'a> {
        pub fn new(pool: &'a PgPool) -> Self {
            Self { pool }
        }

        pub async fn insert_candidate(
            &self,
            first_name: &str,
            last_name: &str,
            district: &str,
            office: &str,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO candidates (first_name, last_name, district, office) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(first_name)
            .bind(last_name)
            .bind(district)
            .bind(office)
            .fetch_one(self.pool)
            .await
        }

        pub async fn insert_volunteer(&self, name: &str) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar("INSERT INTO volunteers (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(self.pool)
                .await
        }

        pub async fn insert_role(
            &self,
            name: &str,
            description: Option<&str>,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id",
            )
            .bind(name)
            .bind(description)
            .fetch_one(self.pool)
            .await
        }

        pub async fn insert_event(
            &self,
            money_raised: f64,
            date: &str,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO events (money_raised, date, start_time, end_time) VALUES ($1, $2::date, '10:00:00'::time, '12:00:00'::time) RETURNING id",
            )
            .bind(money_raised)
            .bind(date)
            .fetch_one(self.pool)
            .await
        }

        pub async fn insert_attendance(
            &self,
            name: &str,
            donation_amount: f64,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO attendances (name, contact_info, is_interested_in_volunteering, donation_amount) VALUES ($1, $2, true, $3) RETURNING id",
            )
            .bind(name)
            .bind(format!("{}@example.com", name.to_lowercase().replace(' ', ".")))
            .bind(donation_amount)
            .fetch_one(self.pool)
            .await
        }

        pub async fn insert_campaign(&self, candidate_id: i32) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar("INSERT INTO campaigns (candidate_id) VALUES ($1) RETURNING id")
                .bind(candidate_id)
                .fetch_one(self.pool)
                .await
        }

        pub async fn link_campaign_event(
            &self,
            campaign_id: i32,
            event_id: i32,
        ) -> Result<(), sqlx::Error> {
            sqlx::query("INSERT INTO campaign_events (campaign_id, event_id) VALUES ($1, $2)")
                .bind(campaign_id)
                .bind(event_id)
                .execute(self.pool)
                .await?;
            Ok(())
        }

        pub async fn link_event_attendance(
            &self,
            event_id: i32,
            attendance_id: i32,
        ) -> Result<(), sqlx::Error> {
            sqlx::query("INSERT INTO event_attendances (event_id, attendance_id) VALUES ($1, $2)")
                .bind(event_id)
                .bind(attendance_id)
                .execute(self.pool)
                .await?;
            Ok(())
        }
    }

    pub mod database {
        use log::LevelFilter;
        use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use sqlx::{ConnectOptions, PgPool};
        use testcontainers::core::error::TestcontainersError;
        use testcontainers::runners::AsyncRunner;
        use testcontainers::{ContainerAsync, ImageExt};
        use testcontainers_modules::postgres::Postgres;
        use thiserror::Error;
        use uuid::Uuid;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Ephemeral database factory for integration tests: launches a
        /// disposable Postgres container, creates a uniquely named database
        /// and runs the embedded migrations against it.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            container: Option<ContainerAsync<Postgres>>,
        }

        impl TestDatabase {
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let container = Postgres::default().with_tag("16-alpine").start().await?;

                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let admin_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

                let base_options: PgConnectOptions =
                    admin_url.parse().map_err(TestDatabaseError::Sqlx)?;
                let base_options = base_options.log_statements(LevelFilter::Off);

                let admin_options = base_options.clone().database("postgres");
                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                let database_name = format!("campaigns_{}", Uuid::new_v4().simple());
                let create_sql =
                    format!("CREATE DATABASE \"{}\" TEMPLATE template0", database_name);
                sqlx::query(&create_sql)
                    .execute(&admin_pool)
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(base_options.database(&database_name))
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                crate::db::MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name,
                    container: Some(container),
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            /// Cloneable connection handle for Rocket managed state.
            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close pool connections and drop the ephemeral database. The
            /// container itself is removed when the value is dropped.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }

                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(self.admin_options.clone())
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;
                let drop_sql =
                    format!("DROP DATABASE \"{}\" WITH (FORCE)", self.database_name);
                sqlx::query(&drop_sql)
                    .execute(&admin_pool)
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                if let Some(container) = self.container.take() {
                    drop(container);
                }

                Ok(())
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration
    /// tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        pg_pool: Option<PgPool>,
        cache: Option<ApiCache>,
        config: Option<ApiConfig>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging
        /// disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                pg_pool: None,
                cache: None,
                config: None,
            }
        }

        /// Mount routes under `/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/v1".to_string(), routes));
            self
        }

        /// Manage a `PgPool` instance for tests that exercise
        /// database-backed routes.
        pub fn manage_pg_pool(mut self, pool: PgPool) -> Self {
            self.pg_pool = Some(pool);
            self
        }

        /// Override the response cache (defaults to a fresh in-memory
        /// cache).
        pub fn manage_cache(mut self, cache: ApiCache) -> Self {
            self.cache = Some(cache);
            self
        }

        /// Override the API configuration (defaults to [`test_config`]).
        pub fn manage_config(mut self, config: ApiConfig) -> Self {
            self.config = Some(config);
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment).register(
                "/",
                catchers![
                    crate::routes::catchers::not_found,
                    crate::routes::catchers::unprocessable,
                    crate::routes::catchers::internal_error,
                ],
            );

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(pool) = self.pg_pool {
                rocket = rocket.manage(pool);
            }

            rocket = rocket.manage(self.cache.unwrap_or_else(ApiCache::in_memory));
            rocket.manage(self.config.unwrap_or_else(test_config))
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
