use crate::auth::validators::email_domain;
use crate::common::validation::{ValidationResult, Validator};

/// Contact form fields after trimming
#[derive(Debug)]
pub struct ContactInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Every field present and the email plausibly shaped
pub struct ContactValidator;

impl<'a> Validator<ContactInput<'a>> for ContactValidator {
    fn validate(&self, data: &ContactInput<'a>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.is_empty() {
            result.add_error("name", "Name is required");
        }
        if email_domain(data.email).is_none() {
            result.add_error("email", "Invalid email format");
        }
        if data.message.is_empty() {
            result.add_error("message", "Message is required");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_contact_is_valid() {
        let result = ContactValidator.validate(&ContactInput {
            name: "Alice",
            email: "alice@example.com",
            message: "Hello",
        });
        assert!(result.is_valid);
    }

    #[test]
    fn test_contact_email_domain_is_not_restricted() {
        let result = ContactValidator.validate(&ContactInput {
            name: "Alice",
            email: "alice@company.org",
            message: "Hello",
        });
        assert!(result.is_valid);
    }

    #[test]
    fn test_contact_errors_name_each_field() {
        let result = ContactValidator.validate(&ContactInput {
            name: "",
            email: "not-an-email",
            message: "",
        });
        assert!(!result.is_valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "message"]);
    }
}
