pub mod fetch;
pub mod schema;

pub use fetch::{default_catalog_url, CatalogClient};
pub use schema::{Catalog, Fragment, Package};
