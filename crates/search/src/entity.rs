//! CRM records the search runs over.

use crate::error::{Result, SearchError};
use crate::fields::Fieldful;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A site (object) that requests are raised against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteObject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A contractor company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: i64,
    pub name: String,
    /// Taxpayer identification number
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A request flattened together with its object and contractor names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDigest {
    pub id: i64,
    #[serde(default)]
    pub object_name: String,
    #[serde(default)]
    pub object_address: String,
    #[serde(default)]
    pub object_customer: String,
    #[serde(default)]
    pub manufacturers: String,
    #[serde(default)]
    pub contractor_names: String,
}

impl RequestDigest {
    /// Builds a digest from a request's object, manufacturers and contractors.
    pub fn assemble<'c>(
        id: i64,
        object: Option<&SiteObject>,
        manufacturers: Option<&str>,
        contractors: impl IntoIterator<Item = &'c Contractor>,
    ) -> Self {
        let contractor_names: Vec<&str> = contractors.into_iter().map(|c| c.name.as_str()).collect();

        Self {
            id,
            object_name: object.map(|o| o.name.clone()).unwrap_or_default(),
            object_address: object.and_then(|o| o.address.clone()).unwrap_or_default(),
            object_customer: object.and_then(|o| o.customer.clone()).unwrap_or_default(),
            manufacturers: manufacturers.unwrap_or_default().to_string(),
            contractor_names: contractor_names.join(" "),
        }
    }

    /// All non-empty parts joined with spaces.
    pub fn combined_search_text(&self) -> String {
        [
            self.object_name.as_str(),
            self.object_address.as_str(),
            self.object_customer.as_str(),
            self.manufacturers.as_str(),
            self.contractor_names.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

fn optional(value: &Option<String>) -> Option<Cow<'_, str>> {
    value.as_deref().map(Cow::Borrowed)
}

impl Fieldful for SiteObject {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "address" => optional(&self.address),
            "customer" => optional(&self.customer),
            "phone" => optional(&self.phone),
            _ => None,
        }
    }
}

impl Fieldful for Contractor {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "inn" => optional(&self.inn),
            "contact_person" => optional(&self.contact_person),
            "phone" => optional(&self.phone),
            "email" => optional(&self.email),
            _ => None,
        }
    }
}

impl Fieldful for RequestDigest {
    fn get_field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "id" => Some(Cow::Owned(self.id.to_string())),
            "object_name" => Some(Cow::Borrowed(self.object_name.as_str())),
            "object_address" => Some(Cow::Borrowed(self.object_address.as_str())),
            "object_customer" => Some(Cow::Borrowed(self.object_customer.as_str())),
            "manufacturers" => Some(Cow::Borrowed(self.manufacturers.as_str())),
            "contractor_names" => Some(Cow::Borrowed(self.contractor_names.as_str())),
            "combined_search_text" => Some(Cow::Owned(self.combined_search_text())),
            _ => None,
        }
    }
}

/// The kinds of record the CRM searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Object,
    Contractor,
    Request,
}

impl EntityKind {
    /// Fields searched for this kind, in tie-break order.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Object => &["name", "address", "customer"],
            EntityKind::Contractor => &["name", "inn", "contact_person", "phone", "email"],
            EntityKind::Request => &[
                "object_name",
                "object_address",
                "object_customer",
                "manufacturers",
                "contractor_names",
                "combined_search_text",
            ],
        }
    }

    /// Default minimum score. Requests search more loosely.
    pub fn default_threshold(&self) -> f64 {
        match self {
            EntityKind::Object | EntityKind::Contractor => 0.4,
            EntityKind::Request => 0.3,
        }
    }
}

impl FromStr for EntityKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "object" | "objects" => Ok(EntityKind::Object),
            "contractor" | "contractors" => Ok(EntityKind::Contractor),
            "request" | "requests" => Ok(EntityKind::Request),
            other => Err(SearchError::UnknownEntity(other.to_string())),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Object => "object",
            EntityKind::Contractor => "contractor",
            EntityKind::Request => "request",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search;

    fn site(id: i64, name: &str, address: Option<&str>) -> SiteObject {
        SiteObject {
            id,
            name: name.to_string(),
            address: address.map(String::from),
            customer: None,
            phone: None,
        }
    }

    fn contractor(id: i64, name: &str) -> Contractor {
        Contractor {
            id,
            name: name.to_string(),
            inn: None,
            contact_person: None,
            phone: None,
            email: None,
        }
    }

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("object".parse::<EntityKind>().unwrap(), EntityKind::Object);
        assert_eq!("Contractors".parse::<EntityKind>().unwrap(), EntityKind::Contractor);
        assert!("manufacturer".parse::<EntityKind>().is_err());
        assert_eq!(EntityKind::Request.to_string(), "request");
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(EntityKind::Object.default_threshold(), 0.4);
        assert_eq!(EntityKind::Request.default_threshold(), 0.3);
    }

    #[test]
    fn test_site_object_fields() {
        let obj = site(1, "Moscow Tower", None);
        assert_eq!(obj.get_field("name").as_deref(), Some("Moscow Tower"));
        assert_eq!(obj.get_field("address"), None);
        assert_eq!(obj.get_field("unknown"), None);
    }

    #[test]
    fn test_request_digest_assemble() {
        let obj = SiteObject {
            customer: Some("Gazprom".to_string()),
            ..site(7, "Moscow Tower", Some("Presnenskaya 12"))
        };
        let contractors = [contractor(1, "Pulsar"), contractor(2, "Ivanov Group")];
        let digest = RequestDigest::assemble(42, Some(&obj), Some("Daikin"), &contractors);

        assert_eq!(digest.contractor_names, "Pulsar Ivanov Group");
        assert_eq!(
            digest.combined_search_text(),
            "Moscow Tower Presnenskaya 12 Gazprom Daikin Pulsar Ivanov Group"
        );
    }

    #[test]
    fn test_request_digest_without_object() {
        let digest = RequestDigest::assemble(1, None, None, &[]);
        assert_eq!(digest.combined_search_text(), "");
        assert_eq!(digest.get_field("object_name").as_deref(), Some(""));
    }

    #[test]
    fn test_search_sites_by_address() {
        let sites = vec![
            site(1, "Ivanov Group", Some("Lenina 5")),
            site(2, "Petrov LLC", Some("Tverskaya 10")),
        ];
        let results = search("tverskaya", &sites, EntityKind::Object.search_fields(), 0.4);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, 2);
        assert_eq!(results[0].field, "address");
    }
}
