use serde::{Deserialize, Serialize};

/// Address-form fields, for inline per-field error display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    Zip,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Raw user input from the shipping step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
}

impl ShippingForm {
    /// Validate every field, collecting all failures rather than
    /// stopping at the first. Input is trimmed before length checks.
    pub fn validate(&self) -> Result<ShippingDetails, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let address = self.address.trim();
        let city = self.city.trim();
        let zip = self.zip.trim();

        if first_name.chars().count() < 2 {
            errors.push(FieldError::new(Field::FirstName, "First name must be at least 2 characters"));
        }
        if last_name.chars().count() < 2 {
            errors.push(FieldError::new(Field::LastName, "Last name must be at least 2 characters"));
        }
        if !is_plausible_email(email) {
            errors.push(FieldError::new(Field::Email, "Enter a valid email address"));
        }
        if phone.chars().count() < 10 {
            errors.push(FieldError::new(Field::Phone, "Phone must be at least 10 digits"));
        }
        if address.chars().count() < 5 {
            errors.push(FieldError::new(Field::Address, "Address must be at least 5 characters"));
        }
        if city.chars().count() < 2 {
            errors.push(FieldError::new(Field::City, "City must be at least 2 characters"));
        }
        if zip.chars().count() < 4 {
            errors.push(FieldError::new(Field::Zip, "ZIP must be at least 4 characters"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ShippingDetails {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            zip: zip.to_string(),
        })
    }
}

/// Structural check only; deliverability is the backend's problem.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Immutable snapshot captured when the shipping step passes
/// validation. Re-submitting the step replaces the whole snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
}

impl ShippingDetails {
    /// The exact string the order backend expects. The format is part
    /// of the wire contract; do not reorder or re-punctuate.
    pub fn formatted_address(&self) -> String {
        format!(
            "{} {}, {}, {} {}",
            self.first_name, self.last_name, self.address, self.city, self.zip
        )
    }
}

/// Card sub-fields collected on the payment step. They are not
/// validated client-side; the payment provider verifies them
/// server-side at capture time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}
