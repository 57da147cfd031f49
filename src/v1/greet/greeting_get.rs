#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, param::Query };
use log::info;

use crate::utils::greetings::{Greeting, GreetingGenerator};
use crate::utils::gs_utils::{self, RequestDebug};

use crate::RUNTIME_CTX;

// Name used when the query parameter is absent.
const DEFAULT_NAME: &str = "World";

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct GreetingApi;

struct ReqGreeting
{
    name: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqGreeting {
    type Req = ReqGreeting;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(64);
        s.push_str("  Request parameters:");
        s.push_str("\n    name: ");
        s.push_str(&self.name);
        s
    }
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GreetingApi {
    #[oai(path = "/greeting", method = "get")]
    async fn get_greeting(&self, http_req: &Request, name: Query<Option<String>>) -> Json<Greeting> {
        // Package the request parameters.
        let req = ReqGreeting { name: resolve_name(name.0) };

        // Conditional logging depending on log level.
        gs_utils::debug_request(http_req, &req);
        info!("Received greeting request for name: {}", req.name);

        // The generator is total over string inputs; nothing can fail here.
        Json(process(&RUNTIME_CTX.generator, &req))
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// resolve_name:
// ---------------------------------------------------------------------------
/** Apply the default when the caller supplied no name.  An explicitly empty
 * name is preserved and passes through to the message verbatim.
 */
fn resolve_name(name: Option<String>) -> String {
    match name {
        Some(name) => name,
        None => DEFAULT_NAME.to_string(),
    }
}

// ---------------------------------------------------------------------------
// process:
// ---------------------------------------------------------------------------
/** Process the request against the given generator. */
fn process(generator: &GreetingGenerator, req: &ReqGreeting) -> Greeting {
    generator.create_greeting(&req.name)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::greetings::GreetingConfig;

    fn new_generator() -> GreetingGenerator {
        GreetingGenerator::new(GreetingConfig::new("Hello", "1.0.0"))
    }

    #[test]
    fn missing_name_defaults_to_world() {
        assert_eq!(resolve_name(None), "World");
    }

    #[test]
    fn supplied_name_is_kept() {
        assert_eq!(resolve_name(Some("Cloud".to_string())), "Cloud");
    }

    #[test]
    fn empty_name_is_not_defaulted() {
        assert_eq!(resolve_name(Some(String::new())), "");
    }

    #[test]
    fn process_returns_greeting_record() {
        let generator = new_generator();
        let req = ReqGreeting { name: resolve_name(Some("Cloud".to_string())) };
        let greeting = process(&generator, &req);
        assert_eq!(greeting.id, 1);
        assert_eq!(greeting.message, "Hello, Cloud!");
        assert_eq!(greeting.version, "1.0.0");
    }

    #[test]
    fn request_info_contains_name() {
        let req = ReqGreeting { name: "Cloud".to_string() };
        assert!(req.get_request_info().contains("name: Cloud"));
    }
}
