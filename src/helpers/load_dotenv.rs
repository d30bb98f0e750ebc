use std::env;

use crate::constants::envvars;

/// Load `.env` from the working directory, then from the directory of the
/// gateway configuration if one is set. Runs before the logger exists.
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        println!("Loaded local .env");
    }
    if let Ok(config) = env::var(envvars::CONFIG) {
        let Some(dir) = std::path::Path::new(&config).parent() else {
            return;
        };
        let config_dotenv = dir.join(".env");
        if config_dotenv.is_file() && dotenv::from_path(&config_dotenv).is_ok() {
            println!("Loaded {}", config_dotenv.display());
        }
    }
}
