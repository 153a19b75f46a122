//! Named filter presets for common reconnaissance views.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use super::FilterCriteria;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, EnumIter, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterPreset {
    /// Admin panels and management interfaces
    Admin,
    /// API endpoints and data services
    Api,
    /// Configuration and settings files
    Config,
    /// Backup and temporary files
    Backups,
    /// PHP files with successful responses
    Php,
    /// Error pages and restricted content
    Errors,
}

impl FilterPreset {
    pub fn description(self) -> &'static str {
        match self {
            FilterPreset::Admin => "Admin panels and management interfaces",
            FilterPreset::Api => "API endpoints and data services",
            FilterPreset::Config => "Configuration and settings files",
            FilterPreset::Backups => "Backup and temporary files",
            FilterPreset::Php => "PHP files with successful responses",
            FilterPreset::Errors => "Error pages and restricted content",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FilterPreset::Admin => &["php", "asp", "aspx"],
            FilterPreset::Api => &["json", "xml"],
            FilterPreset::Config => &["config", "conf", "ini", "env", "yml", "yaml"],
            FilterPreset::Backups => &["bak", "backup", "old", "tmp", "sql"],
            FilterPreset::Php => &["php", "php3", "php4", "php5", "phtml"],
            FilterPreset::Errors => &[],
        }
    }

    pub fn status_codes(self) -> &'static [u16] {
        match self {
            FilterPreset::Php => &[200],
            FilterPreset::Errors => &[404, 500, 403, 401],
            _ => &[],
        }
    }

    pub fn pattern(self) -> Option<&'static str> {
        match self {
            FilterPreset::Admin => {
                Some("/admin.*|/administrator.*|/wp-admin.*|/control.*|/manage.*|/dashboard.*")
            }
            FilterPreset::Api => Some(r"/api/.*|/v[0-9]+/.*|\.json$|/rest/.*|/graphql.*"),
            FilterPreset::Config => {
                Some(r"\.config$|\.conf$|\.ini$|\.env$|\.yml$|\.yaml$|web\.config|htaccess")
            }
            FilterPreset::Backups => {
                Some(r"backup.*|.*\.bak$|.*\.backup$|.*\.old$|.*\.tmp$|\.sql$")
            }
            FilterPreset::Php | FilterPreset::Errors => None,
        }
    }
}

impl FilterCriteria {
    /// Criteria holding exactly the preset's extensions, status codes and pattern.
    pub fn from_preset(preset: FilterPreset) -> Self {
        Self::new().with_preset(preset)
    }

    /// Replaces extensions, status codes and pattern with the preset's.
    ///
    /// Date range and free text are kept.
    pub fn with_preset(mut self, preset: FilterPreset) -> Self {
        self.extensions.clear();
        self.status_codes.clear();
        self.pattern = preset.pattern().map(str::to_string);
        self.with_extensions(preset.extensions())
            .with_status_codes(preset.status_codes().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::filter::apply;
    use crate::models::UrlRecord;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preset_criteria() {
        let admin = FilterCriteria::from_preset(FilterPreset::Admin);
        assert_eq!(admin.extensions, set(&["asp", "aspx", "php"]));
        assert!(admin.status_codes.is_empty());
        assert!(admin.pattern.as_deref().unwrap().starts_with("/admin.*"));

        let api = FilterCriteria::from_preset(FilterPreset::Api);
        assert_eq!(api.extensions, set(&["json", "xml"]));
        assert!(api.pattern.as_deref().unwrap().contains("/graphql.*"));

        let config = FilterCriteria::from_preset(FilterPreset::Config);
        assert_eq!(
            config.extensions,
            set(&["conf", "config", "env", "ini", "yaml", "yml"])
        );
        assert!(config.pattern.as_deref().unwrap().ends_with("htaccess"));

        let backups = FilterCriteria::from_preset(FilterPreset::Backups);
        assert_eq!(backups.extensions, set(&["backup", "bak", "old", "sql", "tmp"]));
        assert!(backups.pattern.as_deref().unwrap().ends_with(r"\.sql$"));

        let php = FilterCriteria::from_preset(FilterPreset::Php);
        assert_eq!(php.extensions, set(&["php", "php3", "php4", "php5", "phtml"]));
        assert_eq!(php.status_codes, BTreeSet::from([200]));
        assert_eq!(php.pattern, None);

        let errors = FilterCriteria::from_preset(FilterPreset::Errors);
        assert!(errors.extensions.is_empty());
        assert_eq!(errors.status_codes, BTreeSet::from([401, 403, 404, 500]));
        assert_eq!(errors.pattern, None);
    }

    #[test]
    fn test_every_preset_constrains_something() {
        for preset in FilterPreset::iter() {
            assert!(!FilterCriteria::from_preset(preset).is_empty(), "{preset}");
            assert!(!preset.description().is_empty());
        }
    }

    #[test]
    fn test_with_preset_replaces_fields_and_keeps_dates() {
        let criteria = FilterCriteria::new()
            .with_extensions(["html"])
            .with_status_codes([301])
            .with_pattern("old")
            .with_date_range(Some("20200101".into()), None)
            .with_preset(FilterPreset::Errors);
        assert!(criteria.extensions.is_empty());
        assert_eq!(criteria.status_codes, BTreeSet::from([401, 403, 404, 500]));
        assert_eq!(criteria.pattern, None);
        assert_eq!(criteria.date_from.as_deref(), Some("20200101"));
    }

    #[test]
    fn test_admin_preset_applies_through_filter_engine() {
        let records = vec![
            UrlRecord::new("http://example.com/wp-admin/index.php", "2023-01-01T00:00:00Z", 200),
            UrlRecord::new("http://example.com/admin/panel.html", "2023-01-01T00:00:00Z", 200),
            UrlRecord::new("http://example.com/shop/cart.php", "2023-01-01T00:00:00Z", 200),
        ];
        let kept = apply(&records, &FilterCriteria::from_preset(FilterPreset::Admin));
        assert_eq!(kept, records[..1].to_vec());
    }
}
