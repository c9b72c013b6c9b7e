//! Structural validation for configuration documents.

use std::collections::HashSet;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, EmailConfig, NotificationKind, ServiceConfig};

/// Validate a parsed configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::InvalidField`] encountered.
pub fn validate(config: &AppConfig) -> ConfigResult<()> {
    if config.check_interval_minutes == 0 {
        return Err(ConfigError::invalid(
            "root",
            "check_interval",
            "must_be_positive",
            Some("0".to_string()),
        ));
    }

    let mut names = HashSet::new();
    for (index, service) in config.services.iter().enumerate() {
        validate_service(index, service)?;
        if !names.insert(service.name.trim()) {
            return Err(ConfigError::invalid(
                format!("services[{index}]"),
                "name",
                "duplicate",
                Some(service.name.clone()),
            ));
        }
    }

    if config.global_scan.enabled {
        if config.global_scan.scan_paths.is_empty() {
            return Err(ConfigError::invalid(
                "global_scan",
                "scan_paths",
                "required_when_enabled",
                None,
            ));
        }
        if let Some(blank) = config
            .global_scan
            .scan_paths
            .iter()
            .find(|path| path.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "global_scan",
                "scan_paths",
                "blank_entry",
                Some(blank.clone()),
            ));
        }
    }

    if let Some(webhook) = &config.webhook {
        Url::parse(&webhook.url).map_err(|_| {
            ConfigError::invalid("webhook", "url", "invalid_url", Some(webhook.url.clone()))
        })?;
    }

    if config.notification_type == NotificationKind::Email {
        let email = config.email.as_ref().ok_or_else(|| {
            ConfigError::invalid("root", "email", "required_for_email_notifications", None)
        })?;
        validate_email(email)?;
    }

    Ok(())
}

fn validate_email(email: &EmailConfig) -> ConfigResult<()> {
    let required = [
        ("smtp_host", email.smtp_host.as_str()),
        ("username", email.username.as_str()),
        ("password", email.password.as_str()),
        ("to", email.to.as_str()),
    ];
    if let Some((field, _)) = required
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
    {
        return Err(ConfigError::invalid("email", field, "empty", None));
    }
    if email.smtp_port == 0 {
        return Err(ConfigError::invalid("email", "smtp_port", "zero", None));
    }
    if email.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "email",
            "timeout_secs",
            "must_be_positive",
            None,
        ));
    }
    for (field, address) in [("to", email.to.as_str()), ("from", email.sender())] {
        if !looks_like_address(address) {
            return Err(ConfigError::invalid(
                "email",
                field,
                "invalid_address",
                Some(address.to_string()),
            ));
        }
    }
    Ok(())
}

fn looks_like_address(value: &str) -> bool {
    value
        .trim()
        .rsplit_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

fn validate_service(index: usize, service: &ServiceConfig) -> ConfigResult<()> {
    let section = || format!("services[{index}]");

    if service.name.trim().is_empty() {
        return Err(ConfigError::invalid(section(), "name", "empty", None));
    }
    if service.host.trim().is_empty() {
        return Err(ConfigError::invalid(
            section(),
            "host",
            "empty",
            Some(service.name.clone()),
        ));
    }
    if service.port == 0 {
        return Err(ConfigError::invalid(
            section(),
            "port",
            "zero",
            Some(service.name.clone()),
        ));
    }
    if service.connect_timeout_secs == 0 || service.read_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            section(),
            "timeout",
            "must_be_positive",
            Some(service.name.clone()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BackendKind;

    fn base_config() -> AppConfig {
        serde_yaml::from_str("check_interval: 30\n").expect("base config should parse")
    }

    fn field_of(err: &ConfigError) -> Option<(&str, &'static str, &'static str)> {
        match err {
            ConfigError::InvalidField {
                section,
                field,
                reason,
                ..
            } => Some((section.as_str(), *field, *reason)),
            _ => None,
        }
    }

    #[test]
    fn duplicate_service_names_are_rejected() {
        let mut config = base_config();
        config.services = vec![
            ServiceConfig::new("qb", BackendKind::Qbittorrent, "localhost", 8080),
            ServiceConfig::new("qb", BackendKind::Transmission, "localhost", 9091),
        ];
        let err = validate(&config).expect_err("duplicates should fail");
        assert_eq!(field_of(&err), Some(("services[1]", "name", "duplicate")));
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = base_config();
        config.services = vec![ServiceConfig::new(
            "qb",
            BackendKind::Qbittorrent,
            "localhost",
            0,
        )];
        let err = validate(&config).expect_err("zero port should fail");
        assert_eq!(field_of(&err), Some(("services[0]", "port", "zero")));
    }

    #[test]
    fn global_mode_requires_scan_paths() {
        let mut config = base_config();
        config.global_scan.enabled = true;
        let err = validate(&config).expect_err("missing scan paths should fail");
        assert_eq!(
            field_of(&err),
            Some(("global_scan", "scan_paths", "required_when_enabled"))
        );

        config.global_scan.scan_paths = vec!["/downloads".to_string()];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = base_config();
        config.check_interval_minutes = 0;
        let err = validate(&config).expect_err("zero interval should fail");
        assert_eq!(
            field_of(&err),
            Some(("root", "check_interval", "must_be_positive"))
        );
    }

    fn email_config() -> EmailConfig {
        serde_yaml::from_str(
            "smtp_host: smtp.example.com\nsmtp_port: 587\nusername: bot@example.com\npassword: hunter2\nto: ops@example.com\n",
        )
        .expect("email block should parse")
    }

    #[test]
    fn email_notifications_require_an_email_block() {
        let mut config = base_config();
        config.notification_type = NotificationKind::Email;
        let err = validate(&config).expect_err("missing email block should fail");
        assert_eq!(
            field_of(&err),
            Some(("root", "email", "required_for_email_notifications"))
        );

        config.email = Some(email_config());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn incomplete_email_block_is_rejected() {
        let mut config = base_config();
        config.notification_type = NotificationKind::Email;

        let mut email = email_config();
        email.password = "  ".to_string();
        config.email = Some(email);
        let err = validate(&config).expect_err("blank password should fail");
        assert_eq!(field_of(&err), Some(("email", "password", "empty")));

        let mut email = email_config();
        email.smtp_port = 0;
        config.email = Some(email);
        let err = validate(&config).expect_err("zero port should fail");
        assert_eq!(field_of(&err), Some(("email", "smtp_port", "zero")));

        let mut email = email_config();
        email.username = "apikey".to_string();
        config.email = Some(email);
        let err = validate(&config).expect_err("non-address sender should fail");
        assert_eq!(field_of(&err), Some(("email", "from", "invalid_address")));
    }

    #[test]
    fn email_block_is_ignored_for_webhook_notifications() {
        let mut config = base_config();
        let mut email = email_config();
        email.smtp_host = String::new();
        config.email = Some(email);
        assert!(validate(&config).is_ok());
    }
}
