#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path};
use toml;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::utils::{errors::Errors, gs_utils};
use crate::utils::greetings::{GreetingConfig, GreetingGenerator};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations.  Unless otherwise noted, all files and
// directories are relative to the root directory.
const ENV_ROOT_DIR         : &str = "GREETING_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.greeting_server";
const CONFIG_DIR           : &str = "/config";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";      // relative to config dir
const GREETING_CONFIG_FILE : &str = "/greeting.toml";   // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// Greeting defaults applied when neither file nor environment provides a value.
const DEFAULT_TITLE           : &str = "Greeting Server";
const DEFAULT_GREETING_PREFIX : &str = "Hello";
const DEFAULT_APP_VERSION     : &str = "1.0.0";

// Environment variables that override individual configuration values.
const ENV_GREETING_PREFIX  : &str = "APP_GREETING_PREFIX";
const ENV_APP_VERSION      : &str = "APP_VERSION";
const ENV_HTTP_ADDR        : &str = "GREETING_HTTP_ADDR";
const ENV_HTTP_PORT        : &str = "GREETING_HTTP_PORT";

// Default log4rs pattern for the console fallback appender.
const CONSOLE_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.6fZ)(utc)} {l} [{t}] {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref GS_ARGS: GsArgs = init_gs_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref GS_DIRS: GsDirs = init_gs_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// GsDirs:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct GsDirs {
    pub root_dir: String,
    pub config_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// CommandLineArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "gs_args", about = "Command line arguments for the Greeting Server.")]
pub struct GsArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the optional configuration files the server
    /// reads at startup.  The root directory is calculated using the
    /// following priority order:
    ///
    ///   1. If set, the value of the GREETING_ROOT_DIR environment variable,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.greeting_server
    ///
    #[structopt(short, long)]
    pub root_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub generator: GreetingGenerator,
    pub gs_args: &'static GsArgs,
    pub gs_dirs: &'static GsDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
// All values are optional in the TOML file; missing values take the defaults
// below and individual environment variables override whatever the file said.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_greeting_prefix")]
    pub greeting_prefix: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            http_addr: default_http_addr(),
            http_port: default_http_port(),
            greeting_prefix: default_greeting_prefix(),
            app_version: default_app_version(),
        }
    }
}

fn default_title() -> String { DEFAULT_TITLE.to_string() }
fn default_http_addr() -> String { DEFAULT_HTTP_ADDR.to_string() }
fn default_http_port() -> u16 { DEFAULT_HTTP_PORT }
fn default_greeting_prefix() -> String { DEFAULT_GREETING_PREFIX.to_string() }
fn default_app_version() -> String { DEFAULT_APP_VERSION.to_string() }

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_gs_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_gs_args() -> GsArgs {
    let args = GsArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_gs_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating them if necessary. */
fn init_gs_dirs() -> GsDirs {
    // Check that each path is absolute and is a directory if it exists.
    // If it doesn't exist, create it.
    let root_dir = get_root_dir();
    check_gs_dir(&root_dir, "root directory");

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_gs_dir(&config_dir, "config directory");

    // Package up and return the directories.
    GsDirs { root_dir, config_dir }
}

// ---------------------------------------------------------------------------
// check_gs_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that it is a directory.
 * If it doesn't exist, create it.
 *
 * Any failure results in a panic.
 */
fn check_gs_dir(dir: &String, msgname: &str) {
    // Get the path object.
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        // Make sure the path represents a directory.
        if !path.is_dir() {
            panic!("The {} path must be a directory: {}", msgname, dir);
        }
    } else {
        // Create the directory.
        match fs::create_dir_all(path) {
            Ok(_) => (),
            Err(e) => {
                panic!("Make directory error for {:?}: {}", path, &e.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_ROOT_DIR).unwrap_or_else(
        |_| {
            match GS_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    gs_utils::get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs.  When a log4rs.yml exists in the config directory it
 * takes full control; otherwise all logging goes to stdout so the platform
 * can collect the event stream.
 */
pub fn init_log() {
    let logconfig = init_log_config();
    if Path::new(&logconfig).is_file() {
        match log4rs::init_file(logconfig.clone(), Default::default()) {
            Ok(_) => (),
            Err(e) => {
                println!("{}", e);
                let s = format!("{}", Errors::Log4rsInitialization(logconfig));
                panic!("{}", s);
            },
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        init_console_log();
        info!("Log4rs initialized with the default console configuration.");
    }
}

// ---------------------------------------------------------------------------
// init_console_log:
// ---------------------------------------------------------------------------
/** Build and install the fallback stdout appender at info level. */
fn init_console_log() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();

    let config = match log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info)) {
            Ok(c) => c,
            Err(e) => panic!("Unable to build the default log configuration: {}", e),
        };

    match log4rs::init_config(config) {
        Ok(_) => (),
        Err(e) => panic!("Unable to initialize default logging: {}", e),
    }
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    GS_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory, if present, then overlay individual values supplied
 * through the environment.  A missing file is not an error; defaults apply.
 */
fn get_parms() -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = GS_DIRS.config_dir.clone() + GREETING_CONFIG_FILE;

    // Read the configuration file.
    let config_file_abs = gs_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let config: Config = match fs::read_to_string(&config_file_abs) {
        Ok(contents) => {
            // Parse the toml configuration.
            match toml::from_str(&contents) {
                Ok(c)  => c,
                Err(e) => {
                    let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file_abs), e);
                    error!("{}", msg);
                    return Result::Err(anyhow!(msg));
                }
            }
        },
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file_abs);
            Config::new()
        }
    };

    // The environment wins over the file.
    let config = apply_env_overrides(config);

    Ok(Parms { config_file: config_file_abs, config })
}

// ---------------------------------------------------------------------------
// apply_env_overrides:
// ---------------------------------------------------------------------------
/** Overlay configuration values supplied as environment variables.  Only the
 * values present in the environment change; everything else keeps the file
 * or default value.
 */
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(prefix) = env::var(ENV_GREETING_PREFIX) {
        config.greeting_prefix = prefix;
    }
    if let Ok(version) = env::var(ENV_APP_VERSION) {
        config.app_version = version;
    }
    if let Ok(addr) = env::var(ENV_HTTP_ADDR) {
        config.http_addr = addr;
    }
    if let Ok(port) = env::var(ENV_HTTP_PORT) {
        match port.parse::<u16>() {
            Ok(p)  => config.http_port = p,
            Err(_) => error!("Ignoring non-numeric {} value: {}", ENV_HTTP_PORT, port),
        }
    }
    config
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // If this fails the application aborts.
    let parms = get_parms().expect("FAILED to read configuration file.");

    // The generator gets its own copy of the greeting values; configuration
    // is immutable from here on.
    let generator = GreetingGenerator::new(
        GreetingConfig::new(&parms.config.greeting_prefix, &parms.config.app_version));

    RuntimeCtx { parms, generator, gs_args: &GS_ARGS, gs_dirs: &GS_DIRS }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::utils::config::{Config, apply_env_overrides};

    #[test]
    fn print_config() {
        println!("{:?}", Config::new());
    }

    #[test]
    fn default_values() {
        let config = Config::new();
        assert_eq!(config.greeting_prefix, "Hello");
        assert_eq!(config.app_version, "1.0.0");
        assert_eq!(config.http_addr, "http://localhost");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.title, "Greeting Server");
    }

    #[test]
    fn parse_partial_toml() {
        let config: Config = toml::from_str("greeting_prefix = \"Ciao\"").unwrap();
        assert_eq!(config.greeting_prefix, "Ciao");
        assert_eq!(config.app_version, "1.0.0");
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn parse_full_toml() {
        let text = r#"
            title = "Greeter"
            http_addr = "http://greet.example.com"
            http_port = 9090
            greeting_prefix = "Howdy"
            app_version = "2.1.0"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.title, "Greeter");
        assert_eq!(config.http_addr, "http://greet.example.com");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.greeting_prefix, "Howdy");
        assert_eq!(config.app_version, "2.1.0");
    }

    #[test]
    fn overrides_keep_unset_values() {
        // Clear the greeting variables so the overlay has nothing to apply;
        // the parsed values must come through untouched.
        std::env::remove_var("APP_GREETING_PREFIX");
        std::env::remove_var("APP_VERSION");
        let config: Config = toml::from_str("greeting_prefix = \"Ciao\"").unwrap();
        let config = apply_env_overrides(config);
        assert_eq!(config.greeting_prefix, "Ciao");
        assert_eq!(config.app_version, "1.0.0");
    }
}
