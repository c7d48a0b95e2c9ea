//! Request authentication for the Conformity API.

use reqwest::RequestBuilder;

/// Media type used by the Conformity JSON:API endpoints.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// API-key authentication plus the content type negotiated with the
/// deployment.  A handful of endpoints only accept `application/json`,
/// which callers select via [`ApiAuth::with_content_type`].
#[derive(Debug, Clone)]
pub struct ApiAuth {
    api_key: String,
    content_type: String,
}

impl ApiAuth {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            content_type: JSON_API_CONTENT_TYPE.to_string(),
        }
    }

    /// Same key, different `Content-Type`.
    #[must_use]
    pub fn with_content_type(&self, content_type: impl Into<String>) -> Self {
        Self {
            api_key: self.api_key.clone(),
            content_type: content_type.into(),
        }
    }

    /// Attach the `Authorization` and `Content-Type` headers.
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .header("Content-Type", &self.content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_content_type_is_json_api() {
        let auth = ApiAuth::new("key-1");
        assert_eq!(auth.content_type, JSON_API_CONTENT_TYPE);
    }

    #[test]
    fn test_with_content_type_keeps_key() {
        let auth = ApiAuth::new("key-1").with_content_type("application/json");
        assert_eq!(auth.api_key, "key-1");
        assert_eq!(auth.content_type, "application/json");
    }
}
