//! Hostname classification
//!
//! Pure function of the `Host` header: extracts the candidate subdomain
//! label and classifies it. Reserved words, the slug pattern, and the length
//! bounds are injected from configuration at construction.
//!
//! A label failing the charset or length rules is a parse failure (400),
//! distinct from "tenant not found", and never reaches the validator.

use crate::config::DomainConfig;
use crate::errors::{AppError, Result};
use regex_lite::Regex;
use std::collections::HashSet;

/// Classification of a request hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostnameClass {
    /// The apex domain, localhost, or a host with no subdomain label
    Apex,
    /// The `www.` alias of the apex
    Www,
    /// The platform operator console host (`admin.`)
    AdminHost,
    /// The API host (`api.`)
    ApiHost,
    /// A reserved infrastructure label, never a tenant
    Reserved(String),
    /// A well-formed candidate tenant slug
    Tenant(String),
}

impl HostnameClass {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            HostnameClass::Apex => "apex",
            HostnameClass::Www => "www",
            HostnameClass::AdminHost => "admin_host",
            HostnameClass::ApiHost => "api_host",
            HostnameClass::Reserved(_) => "reserved",
            HostnameClass::Tenant(_) => "tenant",
        }
    }
}

pub struct HostnameParser {
    apex: String,
    reserved: HashSet<String>,
    slug_re: Regex,
    min_len: usize,
    max_len: usize,
}

impl HostnameParser {
    pub fn new(domain: &DomainConfig) -> Result<Self> {
        let slug_re = Regex::new(&domain.slug_pattern).map_err(|e| AppError::Configuration {
            message: format!("invalid slug pattern '{}': {}", domain.slug_pattern, e),
        })?;

        Ok(Self {
            apex: domain.apex.to_ascii_lowercase(),
            reserved: domain
                .reserved_words
                .iter()
                .map(|w| w.to_ascii_lowercase())
                .collect(),
            slug_re,
            min_len: domain.slug_min_len,
            max_len: domain.slug_max_len,
        })
    }

    /// Classify a raw `Host` header value
    pub fn classify(&self, host: &str) -> Result<HostnameClass> {
        let host = normalize(host);

        if host == "localhost" || host == "127.0.0.1" {
            return Ok(HostnameClass::Apex);
        }
        if host == self.apex {
            return Ok(HostnameClass::Apex);
        }
        if host == format!("www.{}", self.apex) {
            return Ok(HostnameClass::Www);
        }
        if host.split('.').count() < 3 {
            return Ok(HostnameClass::Apex);
        }

        let label = host.split('.').next().unwrap_or_default().to_string();
        self.classify_label(&label, &host)
    }

    /// Classify a request, honoring the legacy `subdomain` query parameter.
    ///
    /// When the host itself carries no subdomain, the parameter goes through
    /// the identical pipeline. A host-derived classification always wins.
    pub fn classify_request(
        &self,
        host: &str,
        subdomain_param: Option<&str>,
    ) -> Result<HostnameClass> {
        let class = self.classify(host)?;
        if matches!(class, HostnameClass::Apex | HostnameClass::Www) {
            if let Some(param) = subdomain_param.map(str::trim).filter(|s| !s.is_empty()) {
                return self.classify_label(&param.to_ascii_lowercase(), host);
            }
        }
        Ok(class)
    }

    fn classify_label(&self, label: &str, host: &str) -> Result<HostnameClass> {
        match label {
            "admin" => Ok(HostnameClass::AdminHost),
            "api" => Ok(HostnameClass::ApiHost),
            _ if self.reserved.contains(label) => Ok(HostnameClass::Reserved(label.to_string())),
            _ => {
                self.check_slug(label, host)?;
                Ok(HostnameClass::Tenant(label.to_string()))
            }
        }
    }

    fn check_slug(&self, label: &str, host: &str) -> Result<()> {
        if label.len() < self.min_len || label.len() > self.max_len {
            return Err(AppError::MalformedHostname {
                host: host.to_string(),
                reason: format!(
                    "subdomain must be {} to {} characters",
                    self.min_len, self.max_len
                ),
            });
        }
        if !self.slug_re.is_match(label) {
            return Err(AppError::MalformedHostname {
                host: host.to_string(),
                reason: "subdomain may only contain lowercase letters, digits, and inner hyphens"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Lowercase, strip any port, trim a trailing dot
fn normalize(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    let host = host.split(':').next().unwrap_or_default();
    host.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn parser() -> HostnameParser {
        HostnameParser::new(&AppConfig::default().domain).unwrap()
    }

    #[test]
    fn test_apex_and_www() {
        let p = parser();
        assert_eq!(p.classify("guzellestir.com").unwrap(), HostnameClass::Apex);
        assert_eq!(p.classify("GUZELLESTIR.COM").unwrap(), HostnameClass::Apex);
        assert_eq!(p.classify("www.guzellestir.com").unwrap(), HostnameClass::Www);
        assert_eq!(p.classify("guzellestir.com:8080").unwrap(), HostnameClass::Apex);
        assert_eq!(p.classify("guzellestir.com.").unwrap(), HostnameClass::Apex);
    }

    #[test]
    fn test_localhost_is_apex() {
        let p = parser();
        assert_eq!(p.classify("localhost").unwrap(), HostnameClass::Apex);
        assert_eq!(p.classify("localhost:3000").unwrap(), HostnameClass::Apex);
        assert_eq!(p.classify("127.0.0.1").unwrap(), HostnameClass::Apex);
    }

    #[test]
    fn test_two_labels_is_apex() {
        let p = parser();
        assert_eq!(p.classify("example.com").unwrap(), HostnameClass::Apex);
    }

    #[test]
    fn test_admin_and_api_hosts() {
        let p = parser();
        assert_eq!(
            p.classify("admin.guzellestir.com").unwrap(),
            HostnameClass::AdminHost
        );
        assert_eq!(
            p.classify("api.guzellestir.com").unwrap(),
            HostnameClass::ApiHost
        );
    }

    #[test]
    fn test_reserved_words_case_insensitive() {
        let p = parser();
        assert_eq!(
            p.classify("blog.guzellestir.com").unwrap(),
            HostnameClass::Reserved("blog".to_string())
        );
        assert_eq!(
            p.classify("BLOG.guzellestir.com").unwrap(),
            HostnameClass::Reserved("blog".to_string())
        );
        assert_eq!(
            p.classify("mutfak.guzellestir.com").unwrap(),
            HostnameClass::Reserved("mutfak".to_string())
        );
    }

    #[test]
    fn test_candidate_tenant() {
        let p = parser();
        assert_eq!(
            p.classify("kardesler.guzellestir.com").unwrap(),
            HostnameClass::Tenant("kardesler".to_string())
        );
        assert_eq!(
            p.classify("ev-yemekleri-34.guzellestir.com").unwrap(),
            HostnameClass::Tenant("ev-yemekleri-34".to_string())
        );
    }

    #[test]
    fn test_slug_length_boundaries() {
        let p = parser();
        // 3 and 20 characters pass
        assert_eq!(
            p.classify("abc.guzellestir.com").unwrap(),
            HostnameClass::Tenant("abc".to_string())
        );
        let twenty = "a".repeat(20);
        assert_eq!(
            p.classify(&format!("{}.guzellestir.com", twenty)).unwrap(),
            HostnameClass::Tenant(twenty)
        );
        // 2 and 21 characters are parse failures
        assert!(matches!(
            p.classify("ab.guzellestir.com"),
            Err(AppError::MalformedHostname { .. })
        ));
        let twenty_one = "a".repeat(21);
        assert!(matches!(
            p.classify(&format!("{}.guzellestir.com", twenty_one)),
            Err(AppError::MalformedHostname { .. })
        ));
    }

    #[test]
    fn test_slug_charset() {
        let p = parser();
        assert!(matches!(
            p.classify("-abc.guzellestir.com"),
            Err(AppError::MalformedHostname { .. })
        ));
        assert!(matches!(
            p.classify("abc-.guzellestir.com"),
            Err(AppError::MalformedHostname { .. })
        ));
        assert!(matches!(
            p.classify("ka_fe.guzellestir.com"),
            Err(AppError::MalformedHostname { .. })
        ));
        // Inner hyphens are fine
        assert!(matches!(
            p.classify("ka-fe.guzellestir.com"),
            Ok(HostnameClass::Tenant(_))
        ));
    }

    #[test]
    fn test_subdomain_query_param() {
        let p = parser();
        assert_eq!(
            p.classify_request("guzellestir.com", Some("kardesler"))
                .unwrap(),
            HostnameClass::Tenant("kardesler".to_string())
        );
        // Reserved words short-circuit through the parameter path too
        assert_eq!(
            p.classify_request("guzellestir.com", Some("blog")).unwrap(),
            HostnameClass::Reserved("blog".to_string())
        );
        // Malformed parameter is a parse failure
        assert!(p.classify_request("guzellestir.com", Some("ab")).is_err());
        // Host classification wins over the parameter
        assert_eq!(
            p.classify_request("kardesler.guzellestir.com", Some("other-slug"))
                .unwrap(),
            HostnameClass::Tenant("kardesler".to_string())
        );
        // Empty parameter is ignored
        assert_eq!(
            p.classify_request("guzellestir.com", Some("")).unwrap(),
            HostnameClass::Apex
        );
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(HostnameClass::Apex.label(), "apex");
        assert_eq!(HostnameClass::Tenant("x".into()).label(), "tenant");
    }
}
