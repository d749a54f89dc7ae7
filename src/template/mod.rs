pub mod cache;
pub mod fetch;
pub mod source;
pub mod store;

pub use cache::{
    cached_fetcher_for, clear_cache, get_cache_dir, list_cached, CacheMetadata, CachedTemplate,
    CachingFetcher,
};
pub use fetch::{fetcher_for, HttpFetcher, LocalFetcher, TemplateFetcher};
pub use source::{resolve_source, validate_version, TemplateSource};
pub use store::TemplateStore;
