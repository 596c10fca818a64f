use std::sync::Arc;

use crate::config::SearchProviderConfig;
use crate::error::ProviderError;
use crate::providers::TencentSearchProvider;
use crate::traits::SearchProvider;

pub fn build_search_provider(
    cfg: SearchProviderConfig,
) -> Result<Arc<dyn SearchProvider>, ProviderError> {
    match cfg {
        SearchProviderConfig::Tencent(c) => Ok(Arc::new(TencentSearchProvider::new(c)?)),
    }
}
