#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicI64, Ordering};

use log::info;
use poem_openapi::Object;
use serde::Serialize;

// ***************************************************************************
//                             Greeting Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// GreetingConfig:
// ---------------------------------------------------------------------------
/** The two externalized values a generator needs, copied out of the server
 * configuration at startup.  Generators never re-read configuration, so a
 * greeting's prefix and version are fixed for the generator's lifetime.
 */
#[derive(Debug, Clone)]
pub struct GreetingConfig {
    pub prefix: String,
    pub version: String,
}

impl GreetingConfig {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            version: version.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Greeting:
// ---------------------------------------------------------------------------
/** Immutable value record returned by the generator.  Serializes on the wire
 * as {"id": <int>, "message": <string>, "version": <string>}.
 */
#[derive(Object, Serialize, Debug, Clone)]
pub struct Greeting {
    pub id: i64,
    pub message: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// GreetingGenerator:
// ---------------------------------------------------------------------------
/** Stateful greeting factory.  The counter is the only mutable state and is
 * local to this instance; tests construct as many independent generators as
 * they like.  No coordination across instances or processes.
 */
#[derive(Debug)]
pub struct GreetingGenerator {
    config: GreetingConfig,
    counter: AtomicI64,
}

// ***************************************************************************
//                             Generator Methods
// ***************************************************************************
impl GreetingGenerator {
    // ---------------------------------------------------------------------------
    // new:
    // ---------------------------------------------------------------------------
    pub fn new(config: GreetingConfig) -> Self {
        Self { config, counter: AtomicI64::new(0) }
    }

    // ---------------------------------------------------------------------------
    // create_greeting:
    // ---------------------------------------------------------------------------
    /** Create a greeting for the given name.  Names pass through verbatim,
     * the empty string included.  Ids are assigned by a single atomic
     * fetch-add, so concurrent callers never observe a duplicate or skipped
     * id; the first greeting of a fresh generator has id 1.  Overflow after
     * 2^63 calls wraps with the underlying atomic.
     */
    pub fn create_greeting(&self, name: &str) -> Greeting {
        // Relaxed suffices: only the atomicity of the increment matters.
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;

        let message = format!("{}, {}!", self.config.prefix, name);

        // Log each greeting to the event stream.
        info!("Greeting created: {} (count: {})", message, count);

        Greeting { id: count, message, version: self.config.version.clone() }
    }

    // ---------------------------------------------------------------------------
    // reset_counter:
    // ---------------------------------------------------------------------------
    /** Atomically set the counter back to 0 and return the value it held.
     * The next greeting gets id 1.  A reset racing with in-flight increments
     * is a valid interleaving; each operation is individually atomic.
     */
    pub fn reset_counter(&self) -> i64 {
        let old_value = self.counter.swap(0, Ordering::Relaxed);
        info!("Counter reset from {} to 0", old_value);
        old_value
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn new_generator(prefix: &str, version: &str) -> GreetingGenerator {
        GreetingGenerator::new(GreetingConfig::new(prefix, version))
    }

    #[test]
    fn sequential_ids_are_one_through_n() {
        let generator = new_generator("Hello", "1.0.0-test");
        for expected in 1..=10_i64 {
            assert_eq!(generator.create_greeting("World").id, expected);
        }
    }

    #[test]
    fn message_uses_configured_prefix() {
        let generator = new_generator("Hello", "1.0.0-test");
        let greeting = generator.create_greeting("World");
        assert_eq!(greeting.message, "Hello, World!");
        assert_eq!(greeting.version, "1.0.0-test");
        assert!(greeting.id > 0);
    }

    #[test]
    fn empty_name_passes_through() {
        let generator = new_generator("Hello", "1.0.0-test");
        assert_eq!(generator.create_greeting("").message, "Hello, !");
    }

    #[test]
    fn custom_prefix_and_version() {
        let generator = new_generator("Ciao", "1.0.0");
        let greeting = generator.create_greeting("Mondo");
        assert_eq!(greeting.id, 1);
        assert_eq!(greeting.message, "Ciao, Mondo!");
        assert_eq!(greeting.version, "1.0.0");
    }

    #[test]
    fn different_names_are_independent() {
        let generator = new_generator("Hello", "1.0.0-test");
        for name in ["Alice", "Bob", "Charlie"] {
            let greeting = generator.create_greeting(name);
            assert!(greeting.message.contains(name));
            assert_eq!(greeting.version, "1.0.0-test");
        }
    }

    #[test]
    fn reset_returns_previous_value_and_restarts_numbering() {
        let generator = new_generator("Hello", "1.0.0-test");
        generator.create_greeting("Test1");
        generator.create_greeting("Test2");

        assert_eq!(generator.reset_counter(), 2);
        assert_eq!(generator.create_greeting("Test3").id, 1);
    }

    #[test]
    fn earlier_greetings_unaffected_by_later_calls() {
        let generator = new_generator("Hello", "1.0.0-test");
        let first = generator.create_greeting("First");
        generator.create_greeting("Second");
        generator.create_greeting("Third");
        assert_eq!(first.id, 1);
        assert_eq!(first.message, "Hello, First!");
    }

    #[test]
    fn generators_do_not_share_counters() {
        let generator1 = new_generator("Hello", "1.0.0-test");
        let generator2 = new_generator("Ciao", "1.0.0-test");
        generator1.create_greeting("A");
        generator1.create_greeting("B");
        assert_eq!(generator2.create_greeting("C").id, 1);
    }

    #[test]
    fn concurrent_ids_are_unique_and_gapless() {
        const THREADS: usize = 8;
        const CALLS: usize = 250;

        let generator = Arc::new(new_generator("Hello", "1.0.0-test"));
        let mut handles = Vec::with_capacity(THREADS);
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                (0..CALLS)
                    .map(|_| generator.create_greeting("worker").id)
                    .collect::<Vec<i64>>()
            }));
        }

        let mut ids: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();

        let expected: Vec<i64> = (1..=(THREADS * CALLS) as i64).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn greeting_serializes_to_wire_shape() {
        let generator = new_generator("Hello", "1.0.0");
        let value = serde_json::to_value(generator.create_greeting("Cloud")).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["message"], "Hello, Cloud!");
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
