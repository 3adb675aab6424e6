//! Example: Listing catalogue categories
//!
//! Loads configuration (environment first, then a config file), installs
//! the tracing subscriber and fetches `/categories` from the public API.
//!
//! ```bash
//! BOOKSTORE_API_ENDPOINT=http://localhost:4000/api/v1 \
//!     cargo run -p bookstore-infra --example fetch_categories
//! ```

use bookstore_infra::api::{route_error, ApiClient, Feedback};
use bookstore_infra::http::{CacheMode, RequestOptions};
use bookstore_infra::{config, observability};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Category {
    id: u64,
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load()?;
    observability::init_tracing(&config.logging)?;

    let client = ApiClient::new(config)?;
    let options = RequestOptions::new().param("limit", 20).cache(CacheMode::NoStore);

    match client.get("/categories", options).await {
        Ok(outcome) => {
            let categories: Vec<Category> = outcome.into_data()?;
            for category in &categories {
                info!(id = category.id, name = %category.name, "category");
            }
        }
        Err(err) => {
            let feedback = route_error(&err, &mut Feedback::default());
            info!(?feedback, "request failed");
            return Err(err.into());
        }
    }

    Ok(())
}
