pub mod bocha;

pub use bocha::BochaRerankProvider;
