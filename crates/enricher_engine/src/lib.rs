//! Enricher engine: enrichment client and the async pipeline that executes core effects.
mod client;
mod pipeline;
mod scope;
mod wire;

pub use client::{ClientBuildError, ClientSettings, EnrichmentClient, ReqwestEnrichmentClient};
pub use pipeline::{EnrichmentPipeline, NotificationSink, PipelineSettings, SharedForm};
pub use scope::{bind_scope, Scope, ScopeGuard};
pub use tokio_util::sync::CancellationToken;
