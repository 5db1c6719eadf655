use catalog::Document;
use chrono::NaiveDate;

/// Documents expiring within this many days are flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidityStatus {
    Expired,
    ExpiresIn(i64),
    Valid,
    Absent,
}

impl ValidityStatus {
    /// Compares the validity date with `today`, both as UTC calendar dates.
    pub fn evaluate(validity: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(validity) = validity else {
            return ValidityStatus::Absent;
        };
        let days = (validity - today).num_days();
        if days < 0 {
            ValidityStatus::Expired
        } else if days <= EXPIRY_WARNING_DAYS {
            ValidityStatus::ExpiresIn(days)
        } else {
            ValidityStatus::Valid
        }
    }

    pub fn of(document: &Document, today: NaiveDate) -> Self {
        Self::evaluate(document.validity, today)
    }

    pub fn label(&self) -> String {
        match self {
            ValidityStatus::Expired => "VENCIDO".to_string(),
            ValidityStatus::ExpiresIn(days) => format!("VENCE EM {days} DIAS"),
            ValidityStatus::Valid => "VÁLIDO".to_string(),
            ValidityStatus::Absent => "AUSENTE".to_string(),
        }
    }

    /// Text color class for the status cell.
    pub fn color_class(&self) -> &'static str {
        match self {
            ValidityStatus::Expired | ValidityStatus::ExpiresIn(_) => {
                "text-[var(--primary-color)]"
            }
            ValidityStatus::Valid => "text-[var(--secondary-color)]",
            ValidityStatus::Absent => "text-white",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::ValidityStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn thirty_days_out_is_still_a_warning() {
        let at = today().checked_add_days(Days::new(30));
        let s = ValidityStatus::evaluate(at, today());
        assert_eq!(s, ValidityStatus::ExpiresIn(30));
        assert_eq!(s.label(), "VENCE EM 30 DIAS");
    }

    #[test]
    fn thirty_one_days_out_is_valid() {
        let at = today().checked_add_days(Days::new(31));
        assert_eq!(ValidityStatus::evaluate(at, today()), ValidityStatus::Valid);
    }

    #[test]
    fn yesterday_is_expired() {
        let at = today().checked_sub_days(Days::new(1));
        let s = ValidityStatus::evaluate(at, today());
        assert_eq!(s, ValidityStatus::Expired);
        assert_eq!(s.label(), "VENCIDO");
    }

    #[test]
    fn today_expires_in_zero_days() {
        assert_eq!(
            ValidityStatus::evaluate(Some(today()), today()),
            ValidityStatus::ExpiresIn(0)
        );
    }

    #[test]
    fn missing_date_is_absent() {
        let s = ValidityStatus::evaluate(None, today());
        assert_eq!(s, ValidityStatus::Absent);
        assert_eq!(s.label(), "AUSENTE");
        assert_eq!(s.color_class(), "text-white");
    }
}
