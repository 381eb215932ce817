use crate::domain::model::Notice;
use crate::utils::error::Result;
use crate::utils::validation::{email, min_chars, phone, required, FieldErrors, Validate};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Appointment times offered to clients.
pub const TIME_SLOTS: [&str; 11] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "14:00", "14:30", "15:00", "15:30",
    "16:00",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

impl RegisterForm {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

fn check_credentials(errors: &mut FieldErrors, address: &str, password: &str) {
    errors.check("email", required(address, "Email is required"));
    errors.check("email", email(address, "Please enter a valid email address."));
    errors.check("password", required(password, "Password is required"));
    errors.check(
        "password",
        min_chars(password, 6, "Password must be at least 6 characters"),
    );
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_credentials(&mut errors, &self.email, &self.password);
        errors.finish()
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check("name", required(&self.name, "Name is required"));
        check_credentials(&mut errors, &self.email, &self.password);
        errors.finish()
    }
}

/// A client's request for a first meeting with one psychologist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    /// Identity of the requested catalog record.
    pub psychologist: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub time: String,
    pub comment: String,
}

impl AppointmentRequest {
    pub fn time_slot(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok()
    }

    /// Confirmation shown once the request has passed validation.
    pub fn confirmation(&self, psychologist_name: &str) -> Notice {
        Notice::success(format!(
            "Appointment request sent for {}!",
            psychologist_name
        ))
    }
}

fn offered_slot(slot: Option<NaiveTime>) -> std::result::Result<(), &'static str> {
    let parsed = slot.ok_or("Time must be in HH:MM format")?;
    let offered = TIME_SLOTS
        .iter()
        .filter_map(|slot| NaiveTime::parse_from_str(slot, "%H:%M").ok())
        .any(|slot| slot == parsed);
    if offered {
        Ok(())
    } else {
        Err("Please choose one of the available time slots")
    }
}

impl Validate for AppointmentRequest {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check("name", required(&self.name, "Name is required"));
        errors.check(
            "name",
            min_chars(self.name.trim(), 2, "Name must be at least 2 characters"),
        );
        errors.check("email", required(&self.email, "Email is required"));
        errors.check("email", email(&self.email, "Invalid email address"));
        errors.check("phone", required(&self.phone, "Phone number is required"));
        errors.check(
            "phone",
            phone(
                self.phone.trim(),
                "Phone must be 10-15 digits (e.g. +380...)",
            ),
        );
        errors.check("time", required(&self.time, "Time is required"));
        errors.check("time", offered_slot(self.time_slot()));
        errors.check("comment", required(&self.comment, "Comment is required"));
        errors.check(
            "comment",
            min_chars(self.comment.trim(), 5, "Comment is too short"),
        );
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CatalogError;

    fn field_names(result: Result<()>) -> Vec<String> {
        match result {
            Err(CatalogError::ValidationError { errors }) => {
                errors.into_iter().map(|e| e.field).collect()
            }
            Ok(()) => vec![],
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    fn appointment() -> AppointmentRequest {
        AppointmentRequest {
            psychologist: "Dr. Sarah Davis".into(),
            name: "Olena".into(),
            email: "olena@example.com".into(),
            phone: "+380501234567".into(),
            time: "09:30".into(),
            comment: "First session, please".into(),
        }
    }

    #[test]
    fn test_login_form_rules() {
        assert!(LoginForm::new(" anna@example.com ", "secret1").validate().is_ok());
        assert_eq!(
            field_names(LoginForm::new("", "").validate()),
            vec!["email", "password"]
        );
        assert_eq!(
            field_names(LoginForm::new("anna@example.com", "12345").validate()),
            vec!["password"]
        );
    }

    #[test]
    fn test_register_form_requires_name() {
        let form = RegisterForm::new("  ", "anna@example.com", "secret1");
        assert_eq!(field_names(form.validate()), vec!["name"]);
    }

    #[test]
    fn test_valid_appointment() {
        let request = appointment();
        assert!(request.validate().is_ok());
        assert_eq!(
            request.time_slot(),
            NaiveTime::from_hms_opt(9, 30, 0)
        );
        assert_eq!(
            request.confirmation("Dr. Sarah Davis").message,
            "Appointment request sent for Dr. Sarah Davis!"
        );
    }

    #[test]
    fn test_appointment_reports_every_bad_field() {
        let request = AppointmentRequest {
            name: "O".into(),
            email: "not-an-email".into(),
            phone: "12345".into(),
            time: "12:00".into(),
            comment: "hi".into(),
            ..appointment()
        };
        assert_eq!(
            field_names(request.validate()),
            vec!["name", "email", "phone", "time", "comment"]
        );
    }

    #[test]
    fn test_appointment_time_format() {
        let request = AppointmentRequest {
            time: "half past nine".into(),
            ..appointment()
        };
        match request.validate() {
            Err(CatalogError::ValidationError { errors }) => {
                assert_eq!(errors[0].message, "Time must be in HH:MM format");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_time_check_uses_parsed_slot() {
        let padded = AppointmentRequest {
            time: " 14:30 ".into(),
            ..appointment()
        };
        assert_eq!(padded.time_slot(), NaiveTime::from_hms_opt(14, 30, 0));
        assert!(padded.validate().is_ok());

        let off_grid = AppointmentRequest {
            time: "14:45".into(),
            ..appointment()
        };
        assert!(off_grid.time_slot().is_some());
        assert_eq!(field_names(off_grid.validate()), vec!["time"]);
    }
}
