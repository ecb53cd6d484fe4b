//! Integration tests for environment-based configuration

use dapplink_http::runtime::{ChatRuntimeConfigBuilder, ConfigError, OracleConfig};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const VARS: &[&str] = &[
    "HOST",
    "PORT",
    "DAPPLINK_STATIC_DIR",
    "DAPPLINK_ENABLE_CORS",
    "TGI_URL",
    "TGI_API_KEY",
    "OPENAI_API_KEY",
    "MODEL",
    "OPENAI_BASE_URL",
    "DAPPLINK_ORACLE_TIMEOUT_SECS",
    "DAPPLINK_NEWS_FEED_URL",
    "DAPPLINK_NEWS_FEED_TOKEN",
    "DAPPLINK_NEWS_FEED_TIMEOUT_SECS",
    "DAPPLINK_MCP_COMMAND",
    "DAPPLINK_MCP_ARGS",
    "DAPPLINK_MCP_HANDSHAKE_TIMEOUT_SECS",
    "DAPPLINK_MCP_CALL_TIMEOUT_SECS",
];

/// Helper to set environment variable for test
fn set_env(key: &str, value: &str) {
    unsafe {
        env::set_var(key, value);
    }
}

fn clear_all_dapplink_env_vars() {
    for key in VARS {
        unsafe {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_env_config_requires_model_credentials() {
    clear_all_dapplink_env_vars();

    let result = ChatRuntimeConfigBuilder::from_env()
        .expect("should load defaults when no env vars set")
        .build();

    assert!(matches!(result, Err(ConfigError::MissingCredentials)));
}

#[test]
#[serial]
fn test_env_config_openai_defaults() {
    clear_all_dapplink_env_vars();
    set_env("OPENAI_API_KEY", "sk-env");

    let config = ChatRuntimeConfigBuilder::from_env()
        .expect("should load config")
        .build()
        .expect("should build valid config");

    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert_eq!(config.static_dir, PathBuf::from("public"));
    assert!(config.enable_cors);
    assert_eq!(config.news_feed.base_url, "https://cryptopanic.com");
    assert_eq!(config.news_feed.auth_token, "free");
    assert_eq!(config.session.args, vec!["mcp-server".to_string()]);
    match config.oracle {
        OracleConfig::OpenAi(openai) => {
            assert_eq!(openai.api_key, "sk-env");
            assert_eq!(openai.model, "gpt-4o-mini");
        }
        other => panic!("expected OpenAI oracle, got {other:?}"),
    }

    clear_all_dapplink_env_vars();
}

#[test]
#[serial]
fn test_env_config_full_override() {
    clear_all_dapplink_env_vars();
    set_env("HOST", "127.0.0.1");
    set_env("PORT", "9090");
    set_env("DAPPLINK_STATIC_DIR", "web");
    set_env("DAPPLINK_ENABLE_CORS", "off");
    set_env("TGI_URL", "http://tgi:8080");
    set_env("TGI_API_KEY", "tgi-key");
    set_env("OPENAI_API_KEY", "sk-ignored");
    set_env("DAPPLINK_ORACLE_TIMEOUT_SECS", "30");
    set_env("DAPPLINK_NEWS_FEED_URL", "http://feed.local");
    set_env("DAPPLINK_NEWS_FEED_TIMEOUT_SECS", "3");
    set_env("DAPPLINK_MCP_COMMAND", "/opt/dapplink/bin/dapplink");
    set_env("DAPPLINK_MCP_ARGS", "mcp-server");

    let config = ChatRuntimeConfigBuilder::from_env()
        .expect("should load config")
        .build()
        .expect("should build valid config");

    assert_eq!(config.bind_address(), "127.0.0.1:9090");
    assert_eq!(config.static_dir, PathBuf::from("web"));
    assert!(!config.enable_cors);
    assert_eq!(config.news_feed.base_url, "http://feed.local");
    assert_eq!(config.news_feed.timeout, Duration::from_secs(3));
    assert_eq!(config.session.command, "/opt/dapplink/bin/dapplink");
    assert_eq!(config.session.args, vec!["mcp-server".to_string()]);
    match config.oracle {
        OracleConfig::Tgi(tgi) => {
            assert_eq!(tgi.url, "http://tgi:8080");
            assert_eq!(tgi.api_key.as_deref(), Some("tgi-key"));
            assert_eq!(tgi.timeout, Duration::from_secs(30));
        }
        other => panic!("expected TGI oracle, got {other:?}"),
    }

    clear_all_dapplink_env_vars();
}

#[test]
#[serial]
fn test_env_config_invalid_values() {
    clear_all_dapplink_env_vars();

    set_env("PORT", "eighty");
    let err = ChatRuntimeConfigBuilder::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref key, .. } if key == "PORT"));
    clear_all_dapplink_env_vars();

    set_env("DAPPLINK_ENABLE_CORS", "maybe");
    assert!(ChatRuntimeConfigBuilder::from_env().is_err());
    clear_all_dapplink_env_vars();

    set_env("OPENAI_API_KEY", "sk-env");
    set_env("PORT", "0");
    let err = ChatRuntimeConfigBuilder::from_env()
        .expect("port parses")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("port must be greater than 0"));

    clear_all_dapplink_env_vars();
}

#[test]
#[serial]
fn test_env_config_feed_timeout_bounds() {
    clear_all_dapplink_env_vars();
    set_env("DAPPLINK_NEWS_FEED_TIMEOUT_SECS", "600");

    assert!(ChatRuntimeConfigBuilder::from_env().is_err());

    clear_all_dapplink_env_vars();
}
