//! HTTP protocol layer module
//!
//! Response framing and request body decoding, decoupled from validation.

pub mod body;
pub mod response;

pub use body::decode_path;
pub use response::{build_405_response, build_json_response, build_not_found_response};
