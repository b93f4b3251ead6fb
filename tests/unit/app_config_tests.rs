/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;

use dirtrans::app_config::{
    Config, LogLevel, ProgressStyleKind, ProviderConfig, TranslationProvider,
};
use dirtrans::translation::RetryPolicy;

use crate::common;

fn valid_config() -> Config {
    let mut config = Config::new("in", "out");
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.file_extension, "txt");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.resume_index, 0);
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.scheduler.batch_sizes, vec![200, 100, 50, 20, 5, 1]);
    assert_eq!(config.progress.style, ProgressStyleKind::Log);
    assert_eq!(config.progress.interval_ms, 1000);
    assert!(!config.checkpoint.enabled);
    assert_eq!(config.log_level, LogLevel::Info);

    let rate_limit = &config.translation.common.rate_limit;
    assert_eq!(rate_limit.initial_delay_secs, 20);
    assert_eq!(rate_limit.max_attempts, None);

    let openai = config
        .translation
        .get_provider_config(&TranslationProvider::OpenAI)
        .expect("OpenAI provider config should exist");
    assert_eq!(openai.model, "gpt-4o-mini");
    assert_eq!(openai.timeout_secs, 120);
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}

#[test]
fn test_validate_withDefaultOpenAiConfig_shouldRequireApiKey() {
    let config = Config::default();
    let error = config.validate().unwrap_err().to_string();
    assert!(error.contains("API key"));

    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_validate_withLocalProvider_shouldNotRequireApiKey() {
    let mut config = Config::new("in", "out");
    config.translation.provider = TranslationProvider::Ollama;
    assert!(config.validate().is_ok());

    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_validate_withInvalidValues_shouldReject() {
    let mut config = valid_config();
    config.scheduler.batch_sizes = vec![50, 100];
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.scheduler.batch_sizes = vec![5, 5, 1];
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.scheduler.batch_sizes = vec![5, 0];
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.scheduler.batch_sizes.clear();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.target_language = "zz".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.file_extension = ".".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.translation.common.rate_limit.multiplier = 0.5;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.translation.common.rate_limit.max_attempts = Some(0);
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.progress.interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.input_root = PathBuf::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_saveAndLoad_shouldKeepValues() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = valid_config();
    config.resume_index = 42;
    config.scheduler.batch_sizes = vec![10, 3, 1];
    config.progress.style = ProgressStyleKind::Bar;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.resume_index, 42);
    assert_eq!(loaded.scheduler.batch_sizes, vec![10, 3, 1]);
    assert_eq!(loaded.progress.style, ProgressStyleKind::Bar);
    assert_eq!(loaded.translation.get_api_key(), "sk-test");
}

#[test]
fn test_fromFile_withMinimalJson_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "input_root": "/data/raw",
            "output_root": "/data/csv",
            "translation": {
                "provider": "ollama",
                "available_providers": [{ "type": "ollama", "model": "qwen2.5:7b" }]
            },
            "progress": { "style": "off" }
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.input_root, PathBuf::from("/data/raw"));
    assert_eq!(config.file_extension, "txt");
    assert_eq!(config.scheduler.batch_sizes, vec![200, 100, 50, 20, 5, 1]);
    assert_eq!(config.progress.style, ProgressStyleKind::Off);
    assert_eq!(config.progress.interval_ms, 1000);
    assert_eq!(config.translation.get_model(), "qwen2.5:7b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_timeout_secs(), 120);
    assert!(config.validate().is_ok());
}

#[test]
fn test_fromFile_withMalformedJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Anthropic;

    config.translation.active_provider_config_mut().api_key = "key".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "claude-3-haiku-20240307");
    assert_eq!(config.translation.get_api_key(), "key");
}

#[test]
fn test_translationProvider_fromStr_shouldParseKnownNames() {
    assert_eq!("LMStudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert_eq!("openai".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert!("gemini".parse::<TranslationProvider>().is_err());
    assert_eq!(ProviderConfig::new(TranslationProvider::Ollama).provider_type, "ollama");
}

#[test]
fn test_rateLimitConfig_shouldBuildMatchingRetryPolicy() {
    let mut config = valid_config();
    config.translation.common.rate_limit.multiplier = 2.0;
    config.translation.common.rate_limit.max_delay_secs = 50;
    config.translation.common.rate_limit.max_attempts = Some(3);

    let policy = RetryPolicy::from(&config.translation.common.rate_limit);

    assert_eq!(policy.base_delay(0).as_secs(), 20);
    assert_eq!(policy.base_delay(1).as_secs(), 40);
    assert_eq!(policy.base_delay(2).as_secs(), 50);
    assert!(policy.allows_another(2));
    assert!(!policy.allows_another(3));
}
