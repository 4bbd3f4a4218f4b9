use serde::{Deserialize, Serialize};

/// The customer collection, in the order the server returned it.
pub type Customers = Vec<Customer>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

impl Customer {
    /// Name shown in the customer list.
    ///
    /// A non-blank business name wins; otherwise "first last".
    pub fn display_name(&self) -> String {
        match self.business_name.as_deref() {
            Some(business) if !business.trim().is_empty() => business.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Customer {
        Customer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "j@d.com".to_string(),
            business_name: None,
        }
    }

    #[test]
    fn test_display_name_uses_person_name() {
        assert_eq!(jane().display_name(), "Jane Doe");
    }

    #[test]
    fn test_display_name_prefers_business() {
        let customer = Customer {
            business_name: Some("Acme".to_string()),
            ..jane()
        };
        assert_eq!(customer.display_name(), "Acme");
        // Pure: asking twice gives the same answer
        assert_eq!(customer.display_name(), customer.display_name());
    }

    #[test]
    fn test_display_name_ignores_blank_business() {
        let customer = Customer {
            business_name: Some("   ".to_string()),
            ..jane()
        };
        assert_eq!(customer.display_name(), "Jane Doe");
    }

    #[test]
    fn test_parse_customers_response() {
        let json = r#"[
            {"firstName": "Jane", "lastName": "Doe", "email": "j@d.com"},
            {"firstName": "Wile", "lastName": "Coyote", "email": "w@acme.com", "businessName": "Acme"}
        ]"#;

        let customers: Customers = serde_json::from_str(json).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0], jane());
        assert_eq!(customers[1].business_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_serialize_omits_missing_business_name() {
        let value = serde_json::to_value(jane()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"firstName": "Jane", "lastName": "Doe", "email": "j@d.com"})
        );
    }
}
