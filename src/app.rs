use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

use actix_cors::Cors;
use actix_web::http;
use scylla::client::caching_session::CachingSession;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use serde::Deserialize;

const DB_CACHE_SIZE: usize = 1000;

#[derive(Deserialize, Clone)]
pub struct Config {
    pub port: u16,
    pub allowed_origin: String,

    /// Origin under which this server is reachable by compute machines.
    /// Used to build the status callback URL handed out at dispatch time.
    pub public_origin: String,

    pub scylla: ScyllaConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Deserialize, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Deserialize, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub cdn_origin: String,
}

#[derive(Deserialize, Clone)]
pub struct DispatchConfig {
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub db_session: Arc<CachingSession>,
    pub http_client: reqwest::Client,
}

impl App {
    pub async fn new() -> Self {
        dotenv::dotenv().ok();

        let env = env::var("ENV").expect("ENV must be set");
        let config_file = format!("config.{}.toml", env);
        let contents = fs::read_to_string(config_file).expect("Unable to read file");
        let config: Config = toml::from_str(&contents).expect("Unable to parse TOML");

        let db_session = init_db_session(&config.scylla).await;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.dispatch.timeout_secs))
            .build()
            .expect("Unable to build http client");

        Self {
            config,
            db_session: Arc::new(db_session),
            http_client,
        }
    }

    /// Init processes that need to be run on startup
    pub fn init(&self) {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    pub fn cors(&self) -> Cors {
        Cors::default()
            .allowed_origin(self.config.allowed_origin.as_str())
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .max_age(86400)
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Callback URL the remote machine reports run status to.
    pub fn status_endpoint(&self) -> String {
        format!(
            "{}/run/update",
            self.config.public_origin.trim_end_matches('/')
        )
    }
}

async fn init_db_session(config: &ScyllaConfig) -> CachingSession {
    let session: Session = SessionBuilder::new()
        .known_nodes(&config.hosts)
        .connection_timeout(Duration::from_secs(3))
        .use_keyspace(config.keyspace.as_str(), false)
        .build()
        .await
        .unwrap_or_else(|e| {
            panic!(
                "Unable to connect to scylla hosts: {:?}. \nError: {}",
                config.hosts, e
            )
        });

    CachingSession::from(session, DB_CACHE_SIZE)
}
