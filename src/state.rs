use crate::analysis::labels::ClassLabels;
use crate::chat::client::{ChatClient, GeminiClient};
use crate::chat::services::ChatSessions;
use crate::classifier::{Classifier, ServingClassifier};
use crate::config::AppConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub classifier: Arc<dyn Classifier>,
    pub labels: Arc<ClassLabels>,
    /// `None` when chat is disabled.
    pub chat: Option<Arc<dyn ChatClient>>,
    pub sessions: Arc<ChatSessions>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let labels = match &config.class_labels_path {
            Some(path) => ClassLabels::from_file(path).await?,
            None => ClassLabels::builtin(),
        };
        tracing::info!(count = labels.len(), "class labels loaded");

        let classifier = Arc::new(ServingClassifier::new(&config.model_url)?) as Arc<dyn Classifier>;

        let chat = match &config.gemini {
            Some(gemini) => Some(Arc::new(GeminiClient::new(gemini.clone())?) as Arc<dyn ChatClient>),
            None => {
                tracing::warn!("GEMINI_API_KEY not set; chat disabled");
                None
            }
        };

        Ok(Self::from_parts(config, classifier, Arc::new(labels), chat))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        classifier: Arc<dyn Classifier>,
        labels: Arc<ClassLabels>,
        chat: Option<Arc<dyn ChatClient>>,
    ) -> Self {
        Self {
            config,
            classifier,
            labels,
            chat,
            sessions: Arc::new(ChatSessions::default()),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(fakes::FakeClassifier::winning(27), Some(fakes::FakeChat::replying()))
    }

    #[cfg(test)]
    pub fn fake_with(classifier: fakes::FakeClassifier, chat: Option<fakes::FakeChat>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            model_url: "http://fake.local/v1/models/food:predict".into(),
            class_labels_path: None,
            model_input_size: 8,
            daily_target_kcal: 2000.0,
            max_chat_questions: 5,
            upload_limit_bytes: 1024 * 1024,
            gemini: None,
        });
        Self::from_parts(
            config,
            Arc::new(classifier),
            Arc::new(ClassLabels::builtin()),
            chat.map(|c| Arc::new(c) as Arc<dyn ChatClient>),
        )
    }
}

#[cfg(test)]
pub mod fakes {
    use async_trait::async_trait;

    use crate::chat::client::ChatClient;
    use crate::classifier::Classifier;
    use crate::images::services::ImageTensor;

    pub struct FakeClassifier {
        probs: Vec<f32>,
    }

    impl FakeClassifier {
        /// 35 classes with `index` at 0.9.
        pub fn winning(index: usize) -> Self {
            Self::with_probs((0..35).map(|i| if i == index { 0.9 } else { 0.1 / 34.0 }).collect())
        }

        pub fn with_probs(probs: Vec<f32>) -> Self {
            Self { probs }
        }
    }

    #[async_trait]
    impl Classifier for FakeClassifier {
        async fn predict(&self, input: &ImageTensor) -> anyhow::Result<Vec<f32>> {
            anyhow::ensure!(!input.data.is_empty(), "empty tensor");
            Ok(self.probs.clone())
        }
    }

    pub struct FakeChat {
        fail: bool,
    }

    impl FakeChat {
        pub fn replying() -> Self {
            Self { fail: false }
        }

        pub fn failing() -> Self {
            Self { fail: true }
        }
    }

    #[async_trait]
    impl ChatClient for FakeChat {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            if self.fail {
                anyhow::bail!("quota exhausted upstream");
            }
            Ok(format!("fake reply to {} chars", prompt.len()))
        }
    }
}
