use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use perimetra_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub seed_path: PathBuf,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub manageable_default_depth: usize,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let seed_path = PathBuf::from(required_non_empty_env("PERIMETRA_SEED_PATH")?);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = optional_parsed_env::<u16>("API_PORT")?.unwrap_or(3001);
        let manageable_default_depth =
            optional_parsed_env::<usize>("MANAGEABLE_DEFAULT_DEPTH")?.unwrap_or(1);

        Ok(Self {
            seed_path,
            frontend_url,
            api_host,
            api_port,
            manageable_default_depth,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn optional_parsed_env<T>(name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_setting(name, &value))
        .transpose()
}

fn parse_setting<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
