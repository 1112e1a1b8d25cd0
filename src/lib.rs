pub mod catalogue;
pub mod document;
pub mod error;
pub mod geo_util;
pub mod graph;
pub mod legacy;
pub mod render;
pub mod route;
pub mod route_query;

pub use catalogue::Catalogue;
pub use document::{process_document, Document, InputDocument, OutputDocument};
pub use error::{Error, Result};
pub use route::{Route, RouteShape};
