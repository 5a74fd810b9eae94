//! # Úřední desky
//!
//! Aggregates Czech municipal public notice board ("úřední deska") open-data
//! feeds into per-city notice tables and summary statistics.
//!
//! ## Architecture
//!
//! 1. **Table**: load the city → endpoint table ([`table::EndpointTable`])
//! 2. **Fetch**: GET each endpoint's JSON feed ([`fetch::EndpointFetcher`])
//! 3. **Extract**: normalize notices out of the raw payload ([`extract::extract_notices`])
//! 4. **Aggregate**: run fetch + extract for every city with bounded
//!    concurrency ([`aggregate::Aggregator`])
//! 5. **Reduce**: per-city statistics ([`stats::reduce_all`])
//! 6. **Output**: JSON files for the dashboard ([`outputs::json`])
//!
//! A city that failed, or whose feed had no notices, is absent from the
//! notice map. The reason is available in [`models::AggregateReport::failures`].
//!
//! ```ignore
//! let table = EndpointTable::from_path(Path::new("data/mesta.csv"))?;
//! let report = Aggregator::from_settings(&Settings::default())?
//!     .aggregate(&table, &NoProgress)
//!     .await;
//! let stats = reduce_all(&report.notices);
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod progress;
pub mod stats;
pub mod table;
pub mod utils;

pub use aggregate::Aggregator;
pub use config::Settings;
pub use fetch::EndpointFetcher;
pub use models::{AggregateReport, CityNotices, CityStatistics, EndpointRow, NoticeRecord};
pub use table::EndpointTable;
