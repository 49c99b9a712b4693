use crate::{LookupError, ResolvedMetadata};

/// A title-indexed metadata lookup service.
#[async_trait::async_trait]
pub trait MovieLookup: Send + Sync {
    fn name(&self) -> &str;

    /// One lookup attempt for a title and optional year.
    async fn lookup(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<ResolvedMetadata, LookupError>;
}
