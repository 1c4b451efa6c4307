//! Data plumbing around the rarity classifier.
//!
//! Record stores supply labeled creatures as a [`Table`]; the generator seeds
//! a store with synthetic creatures; the chart and HTML renderers turn a table
//! into something a person can look at.

mod chart;
mod csv_store;
mod error;
mod generator;
mod record;
mod store;
mod table;

pub use chart::{Chart, render_chart};
pub use csv_store::{CollectionName, CsvStore};
pub use error::IoError;
pub use generator::{CreatureGenerator, seed_store};
pub use record::{Rarity, Record};
pub use store::{MemoryStore, RecordStore};
pub use table::{Cell, Column, ColumnData, Table};
