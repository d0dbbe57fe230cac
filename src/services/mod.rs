pub mod emitter;
pub mod extractor;
pub mod fetcher;
pub mod renderer;
pub mod resolver;

pub use emitter::Emitter;
pub use extractor::ArticleExtractor;
pub use fetcher::ContentFetcher;
pub use renderer::{wait_for_settle, HeadlessRenderer, RenderedPage};
pub use resolver::{InputRequest, InputResolver};
