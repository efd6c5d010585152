pub const DYNAMODB_ENDPOINT_URL_ENV: &str = "DYNAMODB_ENDPOINT_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Overrides the DynamoDB endpoint, e.g. `http://localhost:8000` for DynamoDB Local.
    pub dynamodb_endpoint_url: Option<String>,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            dynamodb_endpoint_url: lookup(DYNAMODB_ENDPOINT_URL_ENV)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_override_is_read_when_set() {
        let config = RuntimeConfig::from_lookup(|key| {
            (key == DYNAMODB_ENDPOINT_URL_ENV).then(|| "http://localhost:8000".to_string())
        });
        assert_eq!(
            config.dynamodb_endpoint_url.as_deref(),
            Some("http://localhost:8000")
        );
    }

    #[test]
    fn blank_endpoint_override_is_ignored() {
        let config = RuntimeConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config, RuntimeConfig::default());
    }
}
