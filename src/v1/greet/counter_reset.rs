#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

use crate::utils::greetings::GreetingGenerator;
use crate::RUNTIME_CTX;

// ***************************************************************************
//                          Request/Response Definitions
// ***************************************************************************
pub struct CounterResetApi;

#[derive(Object)]
struct RespCounterReset
{
    result_code: String,
    result_msg: String,
    previous_value: i64,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl CounterResetApi {
    #[oai(path = "/greeting/reset", method = "post")]
    async fn reset_counter(&self) -> Json<RespCounterReset> {
        Json(RespCounterReset::process(&RUNTIME_CTX.generator))
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespCounterReset {
    fn new(result_code: &str, result_msg: &str, previous_value: i64) -> Self {
        Self {result_code: result_code.to_string(),
              result_msg: result_msg.to_string(),
              previous_value,
        }
    }

    /** Reset the counter and report the value it held.  The generator also
     * logs the prior value, so the reset is observable in the event stream
     * even when the response body is discarded.  This operation cannot fail.
     */
    fn process(generator: &GreetingGenerator) -> RespCounterReset {
        let previous_value = generator.reset_counter();
        Self::new("0", "success", previous_value)
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::RespCounterReset;
    use crate::utils::greetings::{GreetingConfig, GreetingGenerator};

    #[test]
    fn reset_reports_previous_value_and_restarts_numbering() {
        let generator = GreetingGenerator::new(GreetingConfig::new("Hello", "1.0.0"));
        generator.create_greeting("One");
        generator.create_greeting("Two");
        generator.create_greeting("Three");

        let resp = RespCounterReset::process(&generator);
        assert_eq!(resp.result_code, "0");
        assert_eq!(resp.result_msg, "success");
        assert_eq!(resp.previous_value, 3);

        assert_eq!(generator.create_greeting("Four").id, 1);
    }

    #[test]
    fn reset_of_untouched_counter_reports_zero() {
        let generator = GreetingGenerator::new(GreetingConfig::new("Hello", "1.0.0"));
        let resp = RespCounterReset::process(&generator);
        assert_eq!(resp.previous_value, 0);
    }
}
