/*!
 * Tests for application configuration functionality
 */

use docxlate::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider, PLACEHOLDER_API_KEY};
use std::str::FromStr;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "zh-CN");
    assert_eq!(config.font_name, "Microsoft YaHei Light");
    assert_eq!(config.output_suffix, "CN");
    assert_eq!(config.translation.provider, TranslationProvider::SiliconFlow);
    assert_eq!(config.log_level, LogLevel::Info);

    let siliconflow = config.translation.get_provider_config(&TranslationProvider::SiliconFlow)
        .expect("SiliconFlow provider config should exist");
    assert_eq!(siliconflow.model, "Qwen/Qwen2-7B-Instruct");
    assert_eq!(siliconflow.endpoint, "https://api.siliconflow.cn/v1");
    assert_eq!(siliconflow.api_key_env, "SILICONFLOW_API_KEY");

    let common = &config.translation.common;
    assert_eq!(common.temperature, 0.2);
    assert_eq!(common.max_tokens, None);
    assert_eq!(common.protected_prefix, "Forti");
    assert_eq!(common.protected_terms, vec!["output", "spoke"]);
    assert_eq!(common.min_text_chars, 2);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.target_language = "zz-XX".to_string();
    assert!(config.validate().is_err());
    config.target_language = "pt_BR".to_string();
    assert!(config.validate().is_ok());

    config.translation.common.temperature = 2.5;
    assert!(config.validate().is_err());
    config.translation.common.temperature = 0.0;
    assert!(config.validate().is_ok());

    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.translation.active_provider_config_mut().endpoint = "http://localhost:8080/v1".to_string();
    assert!(config.validate().is_ok());

    config.output_suffix = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_getModel_withEmptyConfiguredModel_shouldFallBackToProviderDefault() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    config.translation.active_provider_config_mut().model = String::new();

    assert_eq!(config.translation.get_model(), "local-model");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_getApiKey_withEnvironmentVariable_shouldPreferEnvironment() {
    let mut config = Config::default();
    let provider = config.translation.active_provider_config_mut();
    provider.api_key_env = "DOCXLATE_TEST_KEY_PREFERRED".to_string();
    provider.api_key = "from-config".to_string();

    // The variable name is unique to this test
    unsafe { std::env::set_var("DOCXLATE_TEST_KEY_PREFERRED", "from-env") };
    assert_eq!(config.translation.get_api_key(), "from-env");
    unsafe { std::env::remove_var("DOCXLATE_TEST_KEY_PREFERRED") };

    assert_eq!(config.translation.get_api_key(), "from-config");
}

#[test]
fn test_getApiKey_withNothingConfigured_shouldUsePlaceholder() {
    let mut config = Config::default();
    let provider = config.translation.active_provider_config_mut();
    provider.api_key_env = "DOCXLATE_TEST_KEY_UNSET".to_string();
    provider.api_key = String::new();

    assert_eq!(config.translation.get_api_key(), PLACEHOLDER_API_KEY);

    config.translation.provider = TranslationProvider::LMStudio;
    assert_eq!(config.translation.get_api_key(), "lm-studio");
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::OpenAI;

    config.translation.active_provider_config_mut().model = "gpt-4o".to_string();

    let expected = ProviderConfig::new(TranslationProvider::OpenAI);
    let stored = config.translation.get_active_provider_config().unwrap();
    assert_eq!(stored.model, "gpt-4o");
    assert_eq!(stored.endpoint, expected.endpoint);
}

#[test]
fn test_translationProvider_fromStr_shouldRoundTripNames() {
    for provider in [TranslationProvider::SiliconFlow, TranslationProvider::OpenAI, TranslationProvider::LMStudio] {
        assert_eq!(TranslationProvider::from_str(&provider.to_string()).unwrap(), provider);
    }
    assert!(TranslationProvider::from_str("ollama").is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "zh-CN");
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.font_name, config.font_name);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{ "target_language": "fr", "translation": { "provider": "openai" } }"#).unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.font_name, "Microsoft YaHei Light");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
    assert_eq!(config.translation.common.protected_prefix, "Forti");
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}
