//! Provider adapters implementing [`DataSource`](crate::DataSource).

pub mod yahoo;

pub use yahoo::YahooAdapter;
