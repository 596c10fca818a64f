pub mod tencent;

pub use tencent::{decode_search_response, TencentSearchProvider};
