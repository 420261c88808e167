//! Lenient geolocation parsing for inspection submissions.
//!
//! Coordinates come from browser geolocation and are best-effort: absent or
//! unparsable values are stored as null with a warning, never a failure.

/// Outcome of parsing a latitude/longitude pair from raw form input.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateParse {
    pub coordinates: Option<(f64, f64)>,
    /// Non-fatal warning to surface to the submitter, if any.
    pub warning: Option<String>,
}

/// Parse a coordinate pair. Both values must be present and parse as
/// finite numbers within range; otherwise the pair is dropped.
pub fn parse_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> CoordinateParse {
    let lat = latitude.map(str::trim).unwrap_or_default();
    let lng = longitude.map(str::trim).unwrap_or_default();

    if lat.is_empty() || lng.is_empty() {
        return CoordinateParse {
            coordinates: None,
            warning: Some(
                "Location unavailable or not authorized. The inspection was saved without coordinates."
                    .to_string(),
            ),
        };
    }

    match (lat.parse::<f64>(), lng.parse::<f64>()) {
        (Ok(lat), Ok(lng))
            if lat.is_finite()
                && lng.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lng) =>
        {
            CoordinateParse {
                coordinates: Some((lat, lng)),
                warning: None,
            }
        }
        _ => CoordinateParse {
            coordinates: None,
            warning: Some(
                "Could not read the provided location. The inspection was saved without coordinates."
                    .to_string(),
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pair_parses() {
        let parsed = parse_coordinates(Some("-23.550520"), Some("-46.633308"));
        assert_eq!(parsed.coordinates, Some((-23.550520, -46.633308)));
        assert_eq!(parsed.warning, None);
    }

    #[test]
    fn missing_values_warn_without_failing() {
        let parsed = parse_coordinates(None, None);
        assert_eq!(parsed.coordinates, None);
        assert!(parsed.warning.is_some());

        let parsed = parse_coordinates(Some("-23.5"), Some(""));
        assert_eq!(parsed.coordinates, None);
    }

    #[test]
    fn garbage_warns_without_failing() {
        let parsed = parse_coordinates(Some("not-a-number"), Some("-46.6"));
        assert_eq!(parsed.coordinates, None);
        assert!(parsed.warning.is_some());
    }

    #[test]
    fn out_of_range_values_dropped() {
        assert_eq!(
            parse_coordinates(Some("91.0"), Some("10.0")).coordinates,
            None
        );
        assert_eq!(
            parse_coordinates(Some("45.0"), Some("181.0")).coordinates,
            None
        );
    }

    #[test]
    fn whitespace_is_trimmed() {
        let parsed = parse_coordinates(Some(" 10.5 "), Some(" 20.25 "));
        assert_eq!(parsed.coordinates, Some((10.5, 20.25)));
    }
}
