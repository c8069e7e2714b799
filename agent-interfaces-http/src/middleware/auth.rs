use axum::http::HeaderMap;

use agent_domain::RuntimeConfig;

/// Bearer-token gate for the ops surface. No configured token means the
/// surface is open, which is fine for a loopback bind.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|value| value == *api_token)
            .unwrap_or(false);
    }
    true
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config_with_token(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".into(),
            api_token: token.map(ToString::to_string),
            base_url: "http://backend".into(),
            secret_key: "k".into(),
            token_ttl_seconds: 300,
            poll_interval_ms: 250,
            balance_sync_seconds: 30,
            sweep_interval_seconds: 5,
            block_batch_size: 10,
            request_timeout_seconds: 5,
            max_body_bytes: 1024,
            data_dir: "/tmp".into(),
            item_rules_path: "/tmp/rules.yaml".into(),
            xuid_lookup_url: "http://lookup".into(),
            xuid_fallback_lookup_url: None,
        }
    }

    #[test]
    fn no_token_configured_means_open() {
        assert!(authorize(&config_with_token(None), &HeaderMap::new()));
    }

    #[test]
    fn matching_bearer_token_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer s3cret"));
        assert!(authorize(&config_with_token(Some("s3cret")), &headers));
    }

    #[test]
    fn wrong_or_missing_token_is_rejected() {
        let config = config_with_token(Some("s3cret"));
        assert!(!authorize(&config, &HeaderMap::new()));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer nope"));
        assert!(!authorize(&config, &headers));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic s3cret"));
        assert!(!authorize(&config, &headers));
    }
}
