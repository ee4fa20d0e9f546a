use chrono::Duration;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn token_secret(&self) -> String;
    fn token_lifetime(&self) -> Duration;
    fn payment_secret_key(&self) -> String;
    fn payment_api_url(&self) -> String;
}
