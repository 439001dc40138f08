use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ApiError, FieldErrors};
use crate::models::{CreateBookingRequest, NewBooking};

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("regex compiles")
});

/// Resolves an optional IANA zone name. Absent or blank means UTC.
pub fn parse_timezone(value: Option<&str>) -> Result<Tz, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(chrono_tz::UTC),
        Some(name) => name.parse::<Tz>().map_err(|_| {
            ApiError::field("timezone", format!("Unknown timezone \"{name}\"."))
        }),
    }
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(value)
}

pub fn require_email(value: Option<&str>) -> Result<String, ApiError> {
    match value.map(normalize_email) {
        Some(email) if !email.is_empty() => Ok(email),
        _ => Err(ApiError::BadRequest("email is required".into())),
    }
}

/// Collects every field problem before failing, so the caller sees them all
/// at once.
pub fn validate_booking(request: CreateBookingRequest) -> Result<NewBooking, ApiError> {
    let mut errors = FieldErrors::new();
    let mut fail = |field: &str, message: &str| {
        errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    };

    if request.fitness_class.is_none() {
        fail("fitness_class", "This field is required.");
    }

    let client_name = request.client_name.as_deref().map(str::trim).unwrap_or("");
    match &request.client_name {
        None => fail("client_name", "This field is required."),
        Some(_) if client_name.is_empty() => fail("client_name", "This field may not be blank."),
        Some(_) if client_name.chars().count() > MAX_NAME_LEN => fail(
            "client_name",
            "Ensure this field has no more than 100 characters.",
        ),
        Some(_) => {}
    }

    let client_email = request
        .client_email
        .as_deref()
        .map(normalize_email)
        .unwrap_or_default();
    match &request.client_email {
        None => fail("client_email", "This field is required."),
        Some(_) if client_email.is_empty() => fail("client_email", "This field may not be blank."),
        Some(_) if !is_valid_email(&client_email) => {
            fail("client_email", "Enter a valid email address.")
        }
        Some(_) => {}
    }

    match request.fitness_class {
        Some(fitness_class) if errors.is_empty() => Ok(NewBooking {
            fitness_class,
            client_name: client_name.to_string(),
            client_email,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(class: Option<i64>, name: Option<&str>, email: Option<&str>) -> CreateBookingRequest {
        CreateBookingRequest {
            fitness_class: class,
            client_name: name.map(String::from),
            client_email: email.map(String::from),
        }
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone(None).unwrap(), chrono_tz::UTC);
        assert_eq!(parse_timezone(Some("")).unwrap(), chrono_tz::UTC);
        assert_eq!(parse_timezone(Some("UTC")).unwrap(), chrono_tz::UTC);
        assert_eq!(
            parse_timezone(Some("Asia/Kolkata")).unwrap(),
            chrono_tz::Asia::Kolkata
        );
        let errors = field_errors(parse_timezone(Some("Mars/Olympus")).unwrap_err());
        assert!(errors["timezone"][0].contains("Mars/Olympus"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("jane.doe+gym@mail.example.co.uk"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("ja ne@example.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(250))));
    }

    #[test]
    fn test_require_email() {
        assert_eq!(require_email(Some(" Jane@Example.com ")).unwrap(), "jane@example.com");
        assert!(matches!(require_email(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(require_email(Some("  ")), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_validate_booking_ok() {
        let booking =
            validate_booking(request(Some(3), Some(" Jane "), Some("JANE@example.com"))).unwrap();
        assert_eq!(
            booking,
            NewBooking {
                fitness_class: 3,
                client_name: "Jane".to_string(),
                client_email: "jane@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_booking_reports_every_field() {
        let errors = field_errors(validate_booking(request(None, None, None)).unwrap_err());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["fitness_class"], vec!["This field is required."]);
        assert_eq!(errors["client_name"], vec!["This field is required."]);
        assert_eq!(errors["client_email"], vec!["This field is required."]);
    }

    #[test]
    fn test_validate_booking_rejects_blank_and_malformed() {
        let errors =
            field_errors(validate_booking(request(Some(1), Some("   "), Some("nope"))).unwrap_err());
        assert_eq!(errors["client_name"], vec!["This field may not be blank."]);
        assert_eq!(errors["client_email"], vec!["Enter a valid email address."]);
        assert!(!errors.contains_key("fitness_class"));

        let long_name = "x".repeat(101);
        let errors = field_errors(
            validate_booking(request(Some(1), Some(&long_name), Some("a@b.io"))).unwrap_err(),
        );
        assert!(errors.contains_key("client_name"));
    }
}
