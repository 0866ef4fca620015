pub mod auth_api;
pub mod brochure_api;
pub mod history_api;
pub mod http;
pub mod nlp_api;

pub use auth_api::AuthBackend;
pub use brochure_api::BrochureBackend;
pub use history_api::HistoryBackend;
pub use http::Backend;
pub use nlp_api::NlpBackend;
