#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::PlainText };

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
// Liveness probe for orchestrators and load balancers.  No dependencies are
// touched; a running process always answers OK.
pub struct HealthApi;

#[OpenApi]
impl HealthApi {
    #[oai(path = "/health", method = "get")]
    async fn get_health(&self) -> PlainText<String> {
        PlainText("OK".to_string())
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::HealthApi;

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = HealthApi.get_health().await;
        assert_eq!(resp.0, "OK");
    }
}
