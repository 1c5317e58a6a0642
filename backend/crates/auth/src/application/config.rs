//! Application Configuration
//!
//! Configuration for the authentication core: credential transport names
//! and the path prefix both filters are scoped to. Defaults mirror the
//! REST client contract (`Api-Key`/`Api-Secret` headers, `apiKey`/
//! `apiSecret` parameters, `/api/**`).

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Header carrying the claimed identifier
    pub header_identifier: String,
    /// Header carrying the claimed secret
    pub header_secret: String,
    /// Query/form parameter carrying the claimed identifier
    pub param_identifier: String,
    /// Query/form parameter carrying the claimed secret
    pub param_secret: String,
    /// Ant-style pattern the filters are scoped to
    pub filter_pattern: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_identifier: "Api-Key".to_string(),
            header_secret: "Api-Secret".to_string(),
            param_identifier: "apiKey".to_string(),
            param_secret: "apiSecret".to_string(),
            filter_pattern: "/api/**".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.header_identifier, "Api-Key");
        assert_eq!(config.header_secret, "Api-Secret");
        assert_eq!(config.param_identifier, "apiKey");
        assert_eq!(config.param_secret, "apiSecret");
        assert_eq!(config.filter_pattern, "/api/**");
    }
}
