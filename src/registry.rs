//! The site registry: which portals can be scraped, and how their tables are laid out.
//!
//! Without a config file the built-in NIC eProcurement portals are used. A YAML
//! file can replace the list entirely:
//!
//! ```yaml
//! sites:
//!   - name: Odisha
//!     url: https://tendersodisha.gov.in/nicgep/app?page=FrontEndLatestActiveTenders&service=page
//!     columns: { date: 2, title: 5 }
//! ```

use crate::models::{ColumnRoles, Site};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument, warn};

const BUILTIN_SITES: &[(&str, &str)] = &[
    (
        "Odisha",
        "https://tendersodisha.gov.in/nicgep/app?page=FrontEndLatestActiveTenders&service=page",
    ),
    (
        "Maharashtra",
        "https://mahatenders.gov.in/nicgep/app?page=FrontEndLatestActiveTenders&service=page",
    ),
    (
        "Madhya Pradesh",
        "https://mptenders.gov.in/nicgep/app?page=FrontEndLatestActiveTenders&service=page",
    ),
];

#[derive(Debug, Deserialize)]
struct RegistryFile {
    sites: Vec<Site>,
}

/// Ordered list of portals. Scraping always follows this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    sites: Vec<Site>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            sites: BUILTIN_SITES
                .iter()
                .map(|(name, url)| Site::new(*name, *url))
                .collect(),
        }
    }
}

impl Registry {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    /// Parse a registry from YAML text.
    ///
    /// Sites without a name are rejected since `State` must identify the source
    /// of every record.
    pub fn from_yaml(text: &str) -> Result<Self, Box<dyn Error>> {
        let file: RegistryFile = serde_yaml::from_str(text)?;
        if let Some(bad) = file.sites.iter().find(|s| s.name.trim().is_empty()) {
            return Err(format!("site with url {} has an empty name", bad.url).into());
        }
        Ok(Self::new(file.sites))
    }

    /// Load the registry from `path`, or fall back to the built-in portals.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML registry file; `None` selects the built-in portals
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// contains a site with an empty name.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let registry = match path {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        info!(sites = registry.sites.len(), "Loaded site registry");
        Ok(registry)
    }

    /// All registered sites, in scrape order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }

    /// Column roles for the portal a record came from.
    pub fn roles_for(&self, state: &str) -> ColumnRoles {
        self.get(state).map(|s| s.columns.clone()).unwrap_or_default()
    }

    /// Sites to scrape, in registry order.
    ///
    /// An empty `names` selects everything. Names that match no site are logged
    /// and ignored.
    pub fn select(&self, names: &[String]) -> Vec<&Site> {
        if names.is_empty() {
            return self.sites.iter().collect();
        }
        for name in names {
            if self.get(name).is_none() {
                warn!(%name, "Unknown site name; ignoring");
            }
        }
        self.sites
            .iter()
            .filter(|s| names.iter().any(|n| n == &s.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order() {
        let registry = Registry::default();
        let names: Vec<&str> = registry.sites().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Odisha", "Maharashtra", "Madhya Pradesh"]);
    }

    #[test]
    fn test_select_keeps_registry_order() {
        let registry = Registry::default();
        let picked = registry.select(&["Madhya Pradesh".to_string(), "Odisha".to_string()]);
        let names: Vec<&str> = picked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Odisha", "Madhya Pradesh"]);
    }

    #[test]
    fn test_select_ignores_unknown_names() {
        let registry = Registry::default();
        assert!(registry.select(&["Atlantis".to_string()]).is_empty());
        assert_eq!(registry.select(&[]).len(), 3);
    }

    #[test]
    fn test_from_yaml_with_column_roles() {
        let yaml = r#"
sites:
  - name: Kerala
    url: https://etenders.kerala.gov.in/nicgep/app
    columns:
      date: 3
      title: 4
    table_selector: "table#table"
  - name: Goa
    url: https://eprocure.goa.gov.in/nicgep/app
"#;
        let registry = Registry::from_yaml(yaml).unwrap();
        assert_eq!(registry.sites().len(), 2);
        assert_eq!(registry.roles_for("Kerala"), ColumnRoles { date: 3, title: 4 });
        assert_eq!(registry.get("Kerala").unwrap().table_selector, "table#table");
        assert_eq!(registry.roles_for("Goa"), ColumnRoles::default());
        assert_eq!(registry.roles_for("Nowhere"), ColumnRoles::default());
    }

    #[test]
    fn test_from_yaml_rejects_empty_name() {
        let yaml = "sites:\n  - name: \"  \"\n    url: https://example.gov.in\n";
        assert!(Registry::from_yaml(yaml).is_err());
    }
}
