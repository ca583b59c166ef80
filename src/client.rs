use crate::{ApiResponseOrError, Credentials, OpenAiError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Client, Method, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Clone)]
pub struct OpenAiClient {
    credentials: Credentials,
    client: Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpenAiClient({})", self.credentials.base_url())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiErrorWrapper {
    error: OpenAiError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

/// Query parameters shared by every paginated list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    pub order: ListOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl ListQuery {
    pub fn new(order: ListOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct List<T> {
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    pub data: Vec<T>,
    pub has_more: bool,
}

impl OpenAiClient {
    pub fn from_env() -> ApiResponseOrError<Self> {
        Self::new(Credentials::from_env())
    }

    pub fn new(credentials: Credentials) -> ApiResponseOrError<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", credentials.api_key()))?,
        );
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static("assistants=v2"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            credentials,
            client,
        })
    }

    async fn request_inner<Q, S, R>(
        &self,
        method: Method,
        route: R,
        query: Option<&Q>,
        body: Option<S>,
    ) -> Result<Response, reqwest::Error>
    where
        R: Into<String>,
        Q: Serialize + ?Sized,
        S: Serialize,
    {
        let url = format!("{}{}", self.credentials.base_url(), route.into());
        log::debug!("OpenAI Request[{}] {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());

        if let Some(query) = query {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;

        log::debug!(
            "OpenAI Response[{}] {} {url}",
            method,
            response.status().as_str()
        );
        Ok(response)
    }

    async fn decode<T>(response: Response) -> ApiResponseOrError<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str::<T>(&text)?);
        }

        match serde_json::from_str::<OpenAiErrorWrapper>(&text) {
            Ok(wrapper) => Err(wrapper.error),
            Err(_) => Err(OpenAiError::new(text, status.as_str().to_string())),
        }
    }

    pub async fn request<S, R, T>(
        &self,
        method: Method,
        route: R,
        body: Option<S>,
    ) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        S: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request_inner::<(), S, R>(method, route, None, body)
            .await?;
        Self::decode(response).await
    }

    pub async fn get<R, T>(&self, route: R) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        T: DeserializeOwned,
    {
        self.request::<(), R, T>(Method::GET, route, None).await
    }

    pub async fn post<S, R, T>(&self, route: R, body: S) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        S: Serialize,
        T: DeserializeOwned,
    {
        self.request(Method::POST, route, Some(body)).await
    }

    /// Fetches one page of a list endpoint.
    pub async fn list_page<R, T>(&self, route: R, query: &ListQuery) -> ApiResponseOrError<List<T>>
    where
        R: Into<String>,
        T: DeserializeOwned,
    {
        let response = self
            .request_inner::<ListQuery, (), R>(Method::GET, route, Some(query), None)
            .await?;
        Self::decode(response).await
    }

    /// Follows `has_more` until every page of a list endpoint is collected.
    pub async fn list<R, T>(&self, route: R, mut query: ListQuery) -> ApiResponseOrError<Vec<T>>
    where
        R: Into<String>,
        T: DeserializeOwned,
    {
        let route = route.into();
        let mut data = Vec::new();

        loop {
            let page: List<T> = self.list_page(route.as_str(), &query).await?;
            data.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => query.after = Some(last_id),
                _ => break,
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_serializes_only_set_fields() {
        let query = ListQuery::new(ListOrder::Desc).limit(20);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({ "order": "desc", "limit": 20 })
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let client = OpenAiClient::new(Credentials::new("sk-secret", "http://localhost")).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("http://localhost/"));
    }
}
