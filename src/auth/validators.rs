use crate::common::validation::{ValidationResult, Validator};

/// Email providers accepted at signup
pub const ALLOWED_EMAIL_DOMAINS: [&str; 4] = ["gmail.com", "outlook.com", "yahoo.com", "hotmail.com"];
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Signup fields after trimming
#[derive(Debug)]
pub struct SignupInput<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

/// Email shape, domain allow-list and password length
pub struct SignupValidator;

impl<'a> Validator<SignupInput<'a>> for SignupValidator {
    fn validate(&self, data: &SignupInput<'a>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.is_empty() {
            result.add_error("name", "Name is required");
        }

        match email_domain(data.email) {
            None => result.add_error("email", "Invalid email format"),
            Some(domain) if !is_allowed_domain(domain) => {
                result.add_error("email", "Email domain is not allowed")
            }
            Some(_) => {}
        }

        if data.password.chars().count() < PASSWORD_MIN_CHARS {
            result.add_error("password", "Password must be at least 8 characters");
        }

        result
    }
}

/// Domain part of a plausibly shaped address: one `@`, non-empty local part,
/// a dot in the domain and no whitespace
pub fn email_domain(email: &str) -> Option<&str> {
    if email.chars().any(char::is_whitespace) {
        return None;
    }

    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }

    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() {
        return None;
    }

    Some(domain)
}

pub fn is_allowed_domain(domain: &str) -> bool {
    ALLOWED_EMAIL_DOMAINS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(email: &'a str, password: &'a str) -> SignupInput<'a> {
        SignupInput {
            email,
            password,
            name: "Alice",
        }
    }

    #[test]
    fn test_allowed_domains_case_insensitive() {
        let result = SignupValidator.validate(&input("alice@GMAIL.com", "password123"));
        assert!(result.is_valid);
        assert!(SignupValidator
            .validate(&input("bob@hotmail.com", "password123"))
            .is_valid);
    }

    #[test]
    fn test_disallowed_domain() {
        let result = SignupValidator.validate(&input("alice@example.com", "password123"));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "email");
    }

    #[test]
    fn test_malformed_emails() {
        for email in ["alice", "@gmail.com", "alice@", "a@b@gmail.com", "alice @gmail.com", "alice@gmail"] {
            let result = SignupValidator.validate(&input(email, "password123"));
            assert!(!result.is_valid, "{} should be rejected", email);
        }
    }

    #[test]
    fn test_short_password() {
        let result = SignupValidator.validate(&input("alice@gmail.com", "short"));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "password");
    }

    #[test]
    fn test_missing_name() {
        let result = SignupValidator.validate(&SignupInput {
            email: "alice@gmail.com",
            password: "password123",
            name: "",
        });
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "name");
    }
}
