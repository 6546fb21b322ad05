//! Collect.chat → Bitrix24 field mapping.
//!
//! Two record shapes are supported. `contact` is the plain contact card
//! (name, last name, email, phone). `qualified` drops the last name and adds
//! the qualification answers as `UF_CRM_*` user fields plus a comment with the
//! page and IP the chat was opened from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::lead_models::{CrmRecord, InboundLead, LeadFields, MultiField};

/// Which Bitrix24 record shape to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeadMapping {
    #[default]
    Contact,
    Qualified,
}

/// Bitrix24 user field codes for the qualification answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldCodes {
    pub nationality: String,
    pub tenure: String,
    pub lead_type: String,
}

impl Default for CustomFieldCodes {
    fn default() -> Self {
        Self {
            nationality: "UF_CRM_NATIONALITY".to_string(),
            tenure: "UF_CRM_TENURE".to_string(),
            lead_type: "UF_CRM_LEAD_TYPE".to_string(),
        }
    }
}

/// Portal-specific values injected into every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSettings {
    pub source_id: String,
    pub custom_fields: CustomFieldCodes,
}

impl MappingSettings {
    pub const DEFAULT_SOURCE_ID: &'static str = "WEB";
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            source_id: Self::DEFAULT_SOURCE_ID.to_string(),
            custom_fields: CustomFieldCodes::default(),
        }
    }
}

impl LeadMapping {
    /// Builds the Bitrix24 record for `lead`. Missing keys become empty strings.
    pub fn build_record(&self, lead: &InboundLead, settings: &MappingSettings) -> CrmRecord {
        let name = lead.get("name");

        let fields = match self {
            LeadMapping::Contact => LeadFields {
                title: title_with_name("Lead from Collect.chat", ": ", &name),
                name,
                last_name: Some(lead.get("last_name")),
                email: vec![MultiField::work(lead.get("email"))],
                phone: vec![MultiField::work(lead.get("phone"))],
                custom: BTreeMap::new(),
                comments: None,
                source_id: settings.source_id.clone(),
            },
            LeadMapping::Qualified => {
                let codes = &settings.custom_fields;
                let custom = BTreeMap::from([
                    (codes.nationality.clone(), lead.get("nationality")),
                    (codes.tenure.clone(), lead.get("tenure")),
                    (codes.lead_type.clone(), lead.get("type")),
                ]);

                LeadFields {
                    title: title_with_name("Collect.chat lead", " - ", &name),
                    name,
                    last_name: None,
                    email: vec![MultiField::work(lead.get("email"))],
                    phone: vec![MultiField::work(lead.get("phone"))],
                    custom,
                    comments: Some(format!(
                        "Page: {}\nIP: {}",
                        lead.get("page"),
                        lead.get("ip")
                    )),
                    source_id: settings.source_id.clone(),
                }
            }
        };

        CrmRecord { fields }
    }

    /// Whether the success response echoes the received payload as `data_received`.
    pub fn echoes_payload(&self) -> bool {
        matches!(self, LeadMapping::Contact)
    }
}

fn title_with_name(prefix: &str, separator: &str, name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}{}{}", prefix, separator, name)
    }
}

impl fmt::Display for LeadMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadMapping::Contact => write!(f, "contact"),
            LeadMapping::Qualified => write!(f, "qualified"),
        }
    }
}

impl FromStr for LeadMapping {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contact" => Ok(LeadMapping::Contact),
            "qualified" => Ok(LeadMapping::Qualified),
            other => anyhow::bail!(
                "LEAD_MAPPING must be 'contact' or 'qualified', got '{}'",
                other
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(value: serde_json::Value) -> InboundLead {
        InboundLead::from(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_contact_mapping() {
        let record = LeadMapping::Contact.build_record(
            &lead(json!({"name": "Ana", "last_name": "Souza", "email": "a@x.com", "phone": "123"})),
            &MappingSettings::default(),
        );

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "fields": {
                    "TITLE": "Lead from Collect.chat: Ana",
                    "NAME": "Ana",
                    "LAST_NAME": "Souza",
                    "EMAIL": [{"VALUE": "a@x.com", "VALUE_TYPE": "WORK"}],
                    "PHONE": [{"VALUE": "123", "VALUE_TYPE": "WORK"}],
                    "SOURCE_ID": "WEB"
                }
            })
        );
    }

    #[test]
    fn test_qualified_mapping() {
        let settings = MappingSettings {
            source_id: "CALLBACK".to_string(),
            custom_fields: CustomFieldCodes {
                nationality: "UF_CRM_1700000001".to_string(),
                ..CustomFieldCodes::default()
            },
        };
        let record = LeadMapping::Qualified.build_record(
            &lead(json!({
                "name": "Ana",
                "last_name": "Souza",
                "email": "a@x.com",
                "phone": "123",
                "nationality": "BR",
                "tenure": "3 years",
                "type": "buyer",
                "page": "https://example.com/pricing",
                "ip": "203.0.113.7"
            })),
            &settings,
        );

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "fields": {
                    "TITLE": "Collect.chat lead - Ana",
                    "NAME": "Ana",
                    "EMAIL": [{"VALUE": "a@x.com", "VALUE_TYPE": "WORK"}],
                    "PHONE": [{"VALUE": "123", "VALUE_TYPE": "WORK"}],
                    "UF_CRM_1700000001": "BR",
                    "UF_CRM_TENURE": "3 years",
                    "UF_CRM_LEAD_TYPE": "buyer",
                    "COMMENTS": "Page: https://example.com/pricing\nIP: 203.0.113.7",
                    "SOURCE_ID": "CALLBACK"
                }
            })
        );
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let only_email = lead(json!({"email": "a@x.com"}));

        let contact = LeadMapping::Contact.build_record(&only_email, &MappingSettings::default());
        assert_eq!(contact.fields.title, "Lead from Collect.chat");
        assert_eq!(contact.fields.name, "");
        assert_eq!(contact.fields.last_name.as_deref(), Some(""));
        assert_eq!(contact.fields.phone, vec![MultiField::work("")]);

        let qualified =
            LeadMapping::Qualified.build_record(&only_email, &MappingSettings::default());
        assert_eq!(qualified.fields.comments.as_deref(), Some("Page: \nIP: "));
        assert_eq!(qualified.fields.custom["UF_CRM_NATIONALITY"], "");
    }

    #[test]
    fn test_parse_mapping_profile() {
        assert_eq!("contact".parse::<LeadMapping>().unwrap(), LeadMapping::Contact);
        assert_eq!(" Qualified ".parse::<LeadMapping>().unwrap(), LeadMapping::Qualified);
        assert!("v3".parse::<LeadMapping>().is_err());
        assert!(LeadMapping::Contact.echoes_payload());
        assert!(!LeadMapping::Qualified.echoes_payload());
    }
}
