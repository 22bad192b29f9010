pub mod brief_llm;
pub mod eval_llm;
pub mod fetch;
pub mod store;

pub use brief_llm::OpenAiBriefAdapter;
pub use eval_llm::OpenAiEvalAdapter;
pub use fetch::AssetFetcher;
pub use store::FileStore;
