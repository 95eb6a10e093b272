//! Registration form validation
//!
//! Every rule is checked; the caller gets the complete list of violations.

use serde::Serialize;
use shared::models::MemberRegistration;

/// One violated rule, keyed by the form field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate a (trimmed) registration
pub fn validate(reg: &MemberRegistration) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if reg.prenom.chars().count() < 2 {
        errors.push(FieldError::new(
            "prenom",
            "Le prénom est requis (minimum 2 caractères)",
        ));
    }
    if reg.nom.chars().count() < 2 {
        errors.push(FieldError::new(
            "nom",
            "Le nom est requis (minimum 2 caractères)",
        ));
    }
    if !is_valid_email(&reg.email) {
        errors.push(FieldError::new("email", "Email valide requis"));
    }
    if let Some(phone) = &reg.telephone
        && !is_valid_phone(phone)
    {
        errors.push(FieldError::new(
            "telephone",
            "Numéro de téléphone invalide (10 caractères minimum)",
        ));
    }
    if reg.adresse.chars().count() < 5 {
        errors.push(FieldError::new("adresse", "Adresse complète requise"));
    }
    if !is_valid_postal_code(&reg.code_postal) {
        errors.push(FieldError::new(
            "codePostal",
            "Code postal valide requis (5 chiffres)",
        ));
    }
    if reg.ville.is_empty() {
        errors.push(FieldError::new("ville", "Ville requise"));
    }
    if reg.pays.is_empty() {
        errors.push(FieldError::new("pays", "Pays requis"));
    }
    if reg.type_membre.is_empty() {
        errors.push(FieldError::new("typeMembre", "Type de membre requis"));
    }
    if !reg.conditions {
        errors.push(FieldError::new(
            "conditions",
            "Acceptation des conditions requise",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `local@domain.tld`: one `@`, a dot inside the domain, no whitespace
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// At least 10 characters from digits, spaces, `+`, `-` and parentheses
fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() >= 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

fn is_valid_postal_code(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}
