pub mod documents;
pub mod feed;

mod error;

pub use error::{Error, Result};
pub use feed::FeedEntry;
