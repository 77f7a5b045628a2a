use std::sync::{Arc, RwLock};

use crate::models::AnalysisResult;

pub const LOADING_FRAGMENT: &str = r#"<p class="loading">Анализируем новости...</p>"#;
pub const ERROR_FRAGMENT: &str = r#"<p class="loading">Ошибка при подключении к серверу</p>"#;
pub const FALLBACK_ARTICLE: &str = "Не удалось сгенерировать статью.";

/// What the output region shows at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Loading,
    Rendered(String),
    Fallback,
    Errored,
}

impl RenderState {
    pub fn from_result(result: &AnalysisResult) -> Self {
        match result.article() {
            Some(article) => RenderState::Rendered(article.to_string()),
            None => RenderState::Fallback,
        }
    }

    /// HTML written into the output region for this state.
    ///
    /// The article is the backend's own HTML and is inserted unescaped.
    pub fn fragment(&self) -> String {
        match self {
            RenderState::Idle => String::new(),
            RenderState::Loading => LOADING_FRAGMENT.to_string(),
            RenderState::Rendered(article) => article_fragment(article),
            RenderState::Fallback => article_fragment(FALLBACK_ARTICLE),
            RenderState::Errored => ERROR_FRAGMENT.to_string(),
        }
    }
}

fn article_fragment(body: &str) -> String {
    format!(
        r#"<article class="article">
  <h2>Результат анализа</h2>
  <p>{}</p>
</article>"#,
        body
    )
}

/// The single element that displays loading, success and error states.
pub trait OutputRegion: Send + Sync {
    fn write(&self, fragment: &str);
}

/// In-memory region shared between writers and readers.
#[derive(Debug, Clone)]
pub struct SharedRegion {
    inner: Arc<RwLock<String>>,
}

impl SharedRegion {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RenderState::Idle.fragment())),
        }
    }

    pub fn snapshot(&self) -> String {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for SharedRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputRegion for SharedRegion {
    fn write(&self, fragment: &str) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = fragment.to_string();
    }
}

/// Prints every fragment to stdout, one per block.
pub struct TerminalRegion;

impl OutputRegion for TerminalRegion {
    fn write(&self, fragment: &str) {
        println!("{}", fragment);
    }
}
