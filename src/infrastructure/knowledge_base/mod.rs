//! Retrieval gateway implementations

mod elasticsearch;
mod factory;
mod in_memory;

pub use elasticsearch::ElasticsearchGateway;
pub use factory::RetrievalGatewayFactory;
pub use in_memory::InMemoryRetrievalGateway;
