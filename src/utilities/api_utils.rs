use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, redirect};

use super::config::Config;

#[derive(Debug)]
pub struct ServerError(pub StatusCode);

pub trait DetectServerError {
    fn server_error(self) -> Result<Response, ServerError>;
}

impl DetectServerError for Response {
    fn server_error(self) -> Result<Response, ServerError> {
        if self.status().is_server_error()
            && self.headers().get(CONTENT_TYPE).is_some_and(|header| {
                header.to_str().is_ok_and(|header| header.starts_with("text/html"))
            })
        {
            return Err(ServerError(self.status()));
        }

        Ok(self)
    }
}

/// Shared client for both hosted services.
pub fn http_client(config: &Config) -> reqwest::Result<Client> {
    let mut http_client = Client::builder();

    if let Some(user_agent) = &config.user_agent {
        http_client = http_client.user_agent(user_agent);
    }

    http_client.redirect(redirect::Policy::limited(4)).timeout(config.http_timeout()).build()
}
