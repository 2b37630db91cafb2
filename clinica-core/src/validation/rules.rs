//! Entity rule checks
//!
//! A payload is valid iff every one of its fields passes its validator. Only a
//! verdict is reported, never the failing field.

use super::fields::*;
use crate::model::{
    ConsultationKey, NewAccount, NewAppointment, NewConsultation, NewDoctor, NewPatient,
};

pub trait Validate {
    fn is_valid(&self) -> bool;
}

impl Validate for NewAccount {
    fn is_valid(&self) -> bool {
        is_valid_name(&self.last_name)
            && is_valid_name(&self.first_name)
            && is_valid_user_name(&self.user_name)
            && is_valid_email(&self.user_email)
            && is_valid_password(&self.password)
    }
}

impl Validate for NewDoctor {
    fn is_valid(&self) -> bool {
        is_valid_name(&self.last_name)
            && is_valid_name(&self.first_name)
            && is_valid_email(&self.email)
            && is_valid_phone_number(&self.phone_number)
            && is_valid_speciality(&self.speciality)
    }
}

impl Validate for NewPatient {
    fn is_valid(&self) -> bool {
        is_valid_cnp(&self.cnp)
            && is_valid_name(&self.last_name)
            && is_valid_name(&self.first_name)
            && is_valid_email(&self.email)
            && is_valid_phone_number(&self.phone_number)
            && is_valid_age(self.age)
            && is_valid_date(&self.birthday)
            && is_valid_is_active(true)
    }
}

impl Validate for NewAppointment {
    fn is_valid(&self) -> bool {
        is_valid_date(&self.date) && is_valid_status(&self.status)
    }
}

impl Validate for NewConsultation {
    fn is_valid(&self) -> bool {
        is_valid_date(&self.date) && is_valid_diagnostic(&self.diagnostic)
    }
}

impl Validate for ConsultationKey {
    fn is_valid(&self) -> bool {
        is_valid_date(&self.date) && is_valid_diagnostic(&self.diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> NewDoctor {
        NewDoctor {
            last_name: "Ionescu".to_string(),
            first_name: "Maria".to_string(),
            email: "maria.ionescu@clinica.ro".to_string(),
            phone_number: "0722000111".to_string(),
            speciality: "Cardiolog".to_string(),
        }
    }

    #[test]
    fn test_valid_doctor() {
        assert!(doctor().is_valid());
    }

    #[test]
    fn test_any_bad_field_rejects_doctor() {
        let mut bad = doctor();
        bad.speciality = "Dentist".to_string();
        assert!(!bad.is_valid());

        let mut bad = doctor();
        bad.first_name = "maria".to_string();
        assert!(!bad.is_valid());

        let mut bad = doctor();
        bad.phone_number = "0822000111".to_string();
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_account_password_strength() {
        let mut account = NewAccount {
            last_name: "Popescu".to_string(),
            first_name: "Ion".to_string(),
            user_name: "ionpop".to_string(),
            user_email: "ion@example.com".to_string(),
            password: "parola!123".to_string(),
        };
        assert!(account.is_valid());
        account.password = "parola123".to_string();
        assert!(!account.is_valid());
    }

    #[test]
    fn test_patient_birthday_floor() {
        let mut patient = NewPatient {
            cnp: "1960101123456".to_string(),
            last_name: "Popescu".to_string(),
            first_name: "Ion".to_string(),
            email: "ion@example.com".to_string(),
            phone_number: "0712345678".to_string(),
            age: 28,
            birthday: "1996-01-01".to_string(),
        };
        assert!(patient.is_valid());
        patient.birthday = "1899-05-05".to_string();
        assert!(!patient.is_valid());
    }

    #[test]
    fn test_appointment_and_consultation() {
        let appointment = NewAppointment {
            patient_id: "1960101123456".to_string(),
            doctor_id: 1,
            date: "2024-03-10".to_string(),
            status: "Onorata".to_string(),
        };
        assert!(appointment.is_valid());

        let consultation = NewConsultation {
            patient_id: "1960101123456".to_string(),
            doctor_id: 1,
            date: "2024-03-10".to_string(),
            diagnostic: "Unknown".to_string(),
            investigations: String::new(),
        };
        assert!(!consultation.is_valid());
    }
}
