use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use domain_users::{ChangePassword, CreateUser, ListParams, UpdateUser, UserResponse};

/// Client for the users HTTP API
#[derive(Clone, Debug)]
pub struct UsersClient {
    client: Client,
    config: ClientConfig,
}

impl UsersClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError {
                message: "Failed to build HTTP client".to_string(),
                server_message: e.to_string(),
                status_code: None,
                url: None,
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::transport(url, e))?;

        let status = response.status();
        debug!(url = %url, status = %status, "Users API responded");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_body(url, status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> ClientResult<T> {
        self.send(url, request)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::transport(url, e))
    }

    async fn json_with_body<B, T>(&self, method: Method, url: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json(url, self.request(method, url).json(body)).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, params: ListParams) -> ClientResult<Vec<UserResponse>> {
        let url = self.config.url("/users/");
        let request = self
            .request(Method::GET, &url)
            .query(&[("limit", params.limit), ("offset", params.offset)]);
        self.json(&url, request).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> ClientResult<UserResponse> {
        let url = self.config.url(&format!("/users/{}", id));
        self.json(&url, self.request(Method::GET, &url)).await
    }

    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: &CreateUser) -> ClientResult<UserResponse> {
        let url = self.config.url("/users/");
        self.json_with_body(Method::POST, &url, input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i32, input: &UpdateUser) -> ClientResult<UserResponse> {
        let url = self.config.url(&format!("/users/{}", id));
        self.json_with_body(Method::PATCH, &url, input).await
    }

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    pub async fn change_password(&self, input: &ChangePassword) -> ClientResult<()> {
        let url = self.config.url("/users/change-password");
        self.send(&url, self.request(Method::POST, &url).json(input))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> ClientResult<()> {
        let url = self.config.url(&format!("/users/{}", id));
        self.send(&url, self.request(Method::DELETE, &url))
            .await
            .map(|_| ())
    }
}
