pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_database_url")]
        pub database_url: String,
        #[serde(default = "default_cors_origins")]
        pub cors_origins: String,
        #[serde(default = "default_environment")]
        pub environment: String,
        #[serde(default = "default_port")]
        pub port: u16,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Returns the configured CORS origins as a list, one entry per
        /// comma-separated value.
        pub fn cors_origins_list(&self) -> Vec<String> {
            self.cors_origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        }
    }

    fn default_database_url() -> String {
        "sqlite://tasks.db?mode=rwc".to_string()
    }

    fn default_cors_origins() -> String {
        "http://localhost:5173,http://localhost:3000".to_string()
    }

    fn default_environment() -> String {
        "development".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

}

pub mod entities;
pub mod task;
pub mod web;
