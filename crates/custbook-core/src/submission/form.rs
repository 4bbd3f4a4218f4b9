use crate::models::Customer;

/// An input field of the add-customer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    BusinessName,
    Email,
}

impl Field {
    /// Fields in display order.
    pub const ALL: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::BusinessName,
        Field::Email,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::BusinessName => "Business Name",
            Field::Email => "Email Address",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::BusinessName)
    }

    /// Helper text shown under a field that failed validation.
    pub fn error_message(&self) -> &'static str {
        match self {
            Field::FirstName => "First name is required",
            Field::LastName => "Last name is required",
            Field::BusinessName => "",
            Field::Email => "Valid email is required",
        }
    }
}

/// Raw text of every field, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub email: String,
}

impl FormState {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::BusinessName => &self.business_name,
            Field::Email => &self.email,
        }
    }

    pub(crate) fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::BusinessName => &mut self.business_name,
            Field::Email => &mut self.email,
        }
    }

    /// Create payload. A blank business name is left out entirely.
    pub fn to_customer(&self) -> Customer {
        Customer {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            business_name: if self.business_name.trim().is_empty() {
                None
            } else {
                Some(self.business_name.clone())
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub first_name: bool,
    pub last_name: bool,
    pub email: bool,
}

impl FieldErrors {
    pub fn any(&self) -> bool {
        self.first_name || self.last_name || self.email
    }

    pub fn has_error(&self, field: Field) -> bool {
        match field {
            Field::FirstName => self.first_name,
            Field::LastName => self.last_name,
            Field::BusinessName => false,
            Field::Email => self.email,
        }
    }
}

/// Check every field of `form`. Business name is optional and never fails.
pub fn validate(form: &FormState) -> FieldErrors {
    let email = form.email.trim();
    FieldErrors {
        first_name: form.first_name.trim().is_empty(),
        last_name: form.last_name.trim().is_empty(),
        email: email.is_empty() || !email.contains('@'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str, email: &str) -> FormState {
        FormState {
            first_name: first.to_string(),
            last_name: last.to_string(),
            business_name: String::new(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_validate_minimal_valid_input() {
        let errors = validate(&form("A", "B", "a@b.com"));
        assert!(!errors.any());
    }

    #[test]
    fn test_validate_blank_names() {
        let errors = validate(&form("", "   ", "a@b.com"));
        assert!(errors.first_name);
        assert!(errors.last_name);
        assert!(!errors.email);
        assert!(errors.any());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate(&form("A", "B", "")).email);
        assert!(validate(&form("A", "B", "  \t")).email);
        assert!(validate(&form("A", "B", "no-at-sign.com")).email);
        assert!(!validate(&form("A", "B", "@")).email);
        assert!(!validate(&form("A", "B", " a@b ")).email);
    }

    #[test]
    fn test_business_name_never_invalid() {
        let mut state = form("A", "B", "a@b.com");
        state.business_name = "   ".to_string();
        assert!(!validate(&state).any());
        assert!(!validate(&state).has_error(Field::BusinessName));
    }

    #[test]
    fn test_to_customer_omits_blank_business_name() {
        let mut state = form("A", "B", "a@b.com");
        assert_eq!(state.to_customer().business_name, None);

        state.business_name = "  ".to_string();
        assert_eq!(state.to_customer().business_name, None);

        state.business_name = "Acme ".to_string();
        assert_eq!(state.to_customer().business_name.as_deref(), Some("Acme "));
    }

    #[test]
    fn test_field_accessors() {
        let mut state = FormState::default();
        state.value_mut(Field::Email).push_str("x@y");
        assert_eq!(state.value(Field::Email), "x@y");
        assert_eq!(state.email, "x@y");
        assert!(Field::Email.is_required());
        assert!(!Field::BusinessName.is_required());
    }
}
