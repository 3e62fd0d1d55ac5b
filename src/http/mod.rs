//! HTTP protocol layer module
//!
//! Content types, cache validation, byte ranges and response builders,
//! independent of where files come from.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use mime::{ContentTypeProvider, FileExtensionContentTypeProvider};
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_400_response, build_404_response, build_416_response,
    build_500_response, HttpResponse,
};
