use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Deserializer};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

const BLANK: &str = "blank";

/// Registration form, as posted by the frontend.
///
/// Every field is optional at the decoding level, so a missing field is reported
/// as a validation error like any other rule. Fields sent as an explicit `null` are
/// remembered in `null_fields` and reported as such.
#[derive(Deserialize, Validate, Default, Clone)]
#[serde(from = "RegistrationForm")]
pub struct RegistrationRequest {
    #[validate(
        required(message = "This field is required."),
        custom = "text_field",
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom = "text_field",
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub address: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom = "email_field",
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    pub null_fields: Vec<&'static str>,
}

/// Wire shape of the form: `None` when a field is absent, `Some(None)` when it is `null`
#[derive(Deserialize)]
struct RegistrationForm {
    #[serde(default, deserialize_with = "nullable")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    email: Option<Option<String>>,
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<RegistrationForm> for RegistrationRequest {
    fn from(form: RegistrationForm) -> Self {
        let mut null_fields = Vec::new();
        let mut field = |name: &'static str, value: Option<Option<String>>| match value {
            Some(None) => {
                null_fields.push(name);
                None
            }
            value => value.flatten(),
        };

        let name = field("name", form.name);
        let address = field("address", form.address);
        let email = field("email", form.email);

        RegistrationRequest {
            name,
            address,
            email,
            null_fields,
        }
    }
}

impl RegistrationRequest {
    /// Trim the fields, check them and turn the form into a participant to save.
    pub fn validated(self) -> Result<NewParticipant, ValidationErrors> {
        let request = self.trimmed();

        let mut errors = ValidationErrors::new();
        for &field in &request.null_fields {
            errors.add(field, error_with("null", "This field may not be null."));
        }
        if let Err(rule_errors) = request.validate() {
            for (field, field_errors) in rule_errors.field_errors() {
                if !request.null_fields.contains(&field) {
                    for error in field_errors {
                        errors.add(field, error.clone());
                    }
                }
            }
        }
        if !errors.errors().is_empty() {
            return Err(errors);
        }

        // `required` guarantees the three fields once validate() passed
        let (Some(name), Some(address), Some(email)) =
            (request.name, request.address, request.email)
        else {
            return Err(ValidationErrors::new());
        };

        Ok(NewParticipant {
            name,
            address: Secret::new(address),
            email: Secret::new(email),
        })
    }

    fn trimmed(self) -> Self {
        let trim = |field: Option<String>| field.map(|value| value.trim().to_owned());

        RegistrationRequest {
            name: trim(self.name),
            address: trim(self.address),
            email: trim(self.email),
            null_fields: self.null_fields,
        }
    }
}

// Address and email never make it to the logs
impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("address", &self.address.as_ref().map(|_| "[REDACTED]"))
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("null_fields", &self.null_fields)
            .finish()
    }
}

fn error_with(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Non blank text, without NUL characters (PostgreSQL refuses them)
fn text_field(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(error_with(BLANK, "This field may not be blank."));
    }
    if value.contains('\0') {
        return Err(error_with("null_characters", "Null characters are not allowed."));
    }

    Ok(())
}

/// A text field holding an address with a dotted domain (or `localhost`)
fn email_field(value: &str) -> Result<(), ValidationError> {
    text_field(value)?;

    let dotted_domain = value
        .rsplit_once('@')
        .map(|(_, domain)| {
            domain == "localhost"
                || domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        })
        .unwrap_or(false);

    if !dotted_domain || !validator::validate_email(value) {
        return Err(error_with("email", "Enter a valid email address."));
    }

    Ok(())
}

/// Flatten validation errors into the `field -> messages` body sent back to clients.
///
/// A blank field only reports that it is blank, the other rules are meaningless on
/// an empty value.
pub fn error_messages(errors: &ValidationErrors) -> BTreeMap<&'static str, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = match errors.iter().find(|error| error.code == BLANK) {
                Some(blank) => vec![message_of(blank)],
                None => errors.iter().map(message_of).collect(),
            };
            (field, messages)
        })
        .collect()
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|message| message.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// A validated participant, ready to be inserted
#[derive(Debug)]
pub struct NewParticipant {
    pub name: String,
    pub address: Secret<String>,
    pub email: Secret<String>,
}

/// A registered participant
#[derive(Debug, Clone, FromRow)]
pub struct Participant {
    pub id: i32,
    pub name: String,
    pub registration_timestamp: DateTime<Utc>,
}
