use std::env;

use crate::fetcher::DEFAULT_MIN_CSV_LENGTH;

#[derive(Debug, Clone)]
pub struct Config {
    pub sheet_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Bodies shorter than this are treated as retrieval failure.
    pub min_csv_length: usize,
    /// Session flag: when true, one fetch is triggered at startup.
    pub authenticated: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            sheet_url: env::var("SHEET_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            min_csv_length: env::var("MIN_CSV_LENGTH")
                .unwrap_or_else(|_| DEFAULT_MIN_CSV_LENGTH.to_string())
                .parse()
                .unwrap_or(DEFAULT_MIN_CSV_LENGTH),
            authenticated: env::var("AUTHENTICATED")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
