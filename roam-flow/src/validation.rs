use chrono::{Duration, NaiveDate};

/// Local checks a draft must pass before any network call is made. The
/// backend re-checks; this layer exists so the shopper gets an answer
/// without a round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a preferred travel date.")]
    MissingTravelDate,
    #[error("Travel date must be at least {0} days from today.")]
    LeadTimeTooShort(u32),
}

/// Earliest selectable travel date.
pub fn min_travel_date(today: NaiveDate, lead_days: u32) -> NaiveDate {
    today + Duration::days(i64::from(lead_days))
}

pub fn validate_travel_date(
    travel_date: Option<NaiveDate>,
    today: NaiveDate,
    lead_days: u32,
) -> Result<NaiveDate, ValidationError> {
    let date = travel_date.ok_or(ValidationError::MissingTravelDate)?;
    if date < min_travel_date(today, lead_days) {
        return Err(ValidationError::LeadTimeTooShort(lead_days));
    }
    Ok(date)
}

/// Party total: per-person price times traveler count.
pub fn quote(price_per_person: i64, num_travelers: u32) -> i64 {
    price_per_person * i64::from(num_travelers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_date_is_rejected() {
        let err = validate_travel_date(None, date(2024, 6, 1), 7).unwrap_err();
        assert_eq!(err, ValidationError::MissingTravelDate);
        assert_eq!(err.to_string(), "Please select a preferred travel date.");
    }

    #[test]
    fn four_days_out_is_too_soon() {
        let err =
            validate_travel_date(Some(date(2024, 6, 5)), date(2024, 6, 1), 7).unwrap_err();
        assert_eq!(err, ValidationError::LeadTimeTooShort(7));
        assert_eq!(
            err.to_string(),
            "Travel date must be at least 7 days from today."
        );
    }

    #[test]
    fn nine_days_out_passes() {
        let ok = validate_travel_date(Some(date(2024, 6, 10)), date(2024, 6, 1), 7).unwrap();
        assert_eq!(ok, date(2024, 6, 10));
    }

    #[test]
    fn exactly_the_minimum_passes() {
        let ok = validate_travel_date(Some(date(2024, 6, 8)), date(2024, 6, 1), 7).unwrap();
        assert_eq!(ok, date(2024, 6, 8));
    }

    #[test]
    fn quote_scales_with_party_size() {
        assert_eq!(quote(19500, 1), 19500);
        assert_eq!(quote(19500, 2), 39000);
        assert_eq!(quote(19500, 10), 195000);
    }
}
