use std::sync::Arc;

use crate::config::RerankProviderConfig;
use crate::error::ProviderError;
use crate::providers::BochaRerankProvider;
use crate::traits::RerankProvider;

pub fn build_rerank_provider(
    cfg: RerankProviderConfig,
) -> Result<Arc<dyn RerankProvider>, ProviderError> {
    match cfg {
        RerankProviderConfig::Bocha(c) => Ok(Arc::new(BochaRerankProvider::new(c)?)),
    }
}
