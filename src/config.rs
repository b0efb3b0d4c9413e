use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub model_url: String,
    pub class_labels_path: Option<PathBuf>,
    pub model_input_size: u32,
    pub daily_target_kcal: f64,
    pub max_chat_questions: u32,
    pub upload_limit_bytes: usize,
    /// Chat is disabled when no API key is configured.
    pub gemini: Option<GeminiConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            var: &impl Fn(&str) -> Option<String>,
            key: &str,
            default: T,
        ) -> anyhow::Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            match var(key) {
                Some(v) => v.trim().parse::<T>().with_context(|| format!("invalid {}", key)),
                None => Ok(default),
            }
        }

        let model_url = var("MODEL_URL").context("MODEL_URL must be set")?;
        let daily_target_kcal: f64 = parsed(&var, "DAILY_TARGET_KCAL", 2000.0)?;
        anyhow::ensure!(
            daily_target_kcal > 0.0 && daily_target_kcal.is_finite(),
            "DAILY_TARGET_KCAL must be a positive number"
        );
        let model_input_size = parsed(&var, "MODEL_INPUT_SIZE", 320)?;
        anyhow::ensure!(model_input_size > 0, "MODEL_INPUT_SIZE must be positive");

        let gemini = var("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash-lite".into()),
                api_url: var("GEMINI_API_URL").unwrap_or_else(|| {
                    "https://generativelanguage.googleapis.com/v1beta/models".into()
                }),
            });

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&var, "APP_PORT", 8080)?,
            model_url,
            class_labels_path: var("CLASS_LABELS_PATH").map(PathBuf::from),
            model_input_size,
            daily_target_kcal,
            max_chat_questions: parsed(&var, "MAX_CHAT_QUESTIONS", 5)?,
            upload_limit_bytes: parsed(&var, "UPLOAD_LIMIT_BYTES", 20 * 1024 * 1024)?,
            gemini,
        })
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[("MODEL_URL", "http://model:8501/v1/models/food:predict")])).unwrap();
        assert_eq!(cfg.daily_target_kcal, 2000.0);
        assert_eq!(cfg.model_input_size, 320);
        assert_eq!(cfg.max_chat_questions, 5);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.class_labels_path.is_none());
        assert!(cfg.gemini.is_none());
    }

    #[test]
    fn gemini_enabled_by_api_key() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("MODEL_URL", "http://model"),
            ("GEMINI_API_KEY", "k"),
        ]))
        .unwrap();
        let gemini = cfg.gemini.expect("gemini configured");
        assert_eq!(gemini.model, "gemini-2.0-flash-lite");
    }

    #[test]
    fn missing_model_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("MODEL_URL"));
    }

    #[test]
    fn rejects_non_positive_daily_target() {
        let err = AppConfig::from_lookup(lookup(&[
            ("MODEL_URL", "http://model"),
            ("DAILY_TARGET_KCAL", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DAILY_TARGET_KCAL"));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = AppConfig::from_lookup(lookup(&[
            ("MODEL_URL", "http://model"),
            ("MAX_CHAT_QUESTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MAX_CHAT_QUESTIONS"));
    }
}
