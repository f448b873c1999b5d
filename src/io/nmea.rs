//! NMEA-0183 sentence decoding.
//!
//! Only the GGA (fix data) sentence is consumed. Everything else on the
//! wire is reported as [`ParseError::NotRecognized`] so the stream loop
//! can skip it without treating it as a fault.

use crate::types::{ConversionError, GeodeticFix, ParseError};
use chrono::NaiveTime;

/// Suffix identifying a fix-data sentence, independent of the talker
/// prefix (`$GPGGA`, `$GNGGA`, ...).
const FIX_SENTENCE_SUFFIX: &str = "GGA";

/// Converts a `DDDMM.MMMM` coordinate field into signed decimal degrees.
///
/// The encoding has no delimiter between degrees and minutes: minutes
/// are the last two integer digits joined with the fractional part, and
/// degrees are whatever digits remain before them (an empty remainder is
/// 0 degrees). `S` and `W` negate the value; anything other than the
/// four hemisphere letters is rejected rather than silently treated as
/// positive, since an unknown indicator usually means a corrupt line.
pub fn ddmm_to_decimal(raw: &str, hemisphere: &str) -> Result<f64, ConversionError> {
    let sign = match hemisphere {
        "N" | "E" => 1.0,
        "S" | "W" => -1.0,
        other => return Err(ConversionError::UnknownHemisphere(other.to_string())),
    };

    if !raw.is_ascii() {
        return Err(ConversionError::NotNumeric);
    }
    let (integer, fraction) = raw
        .split_once('.')
        .ok_or(ConversionError::MissingDecimalPoint)?;

    let split = integer.len().saturating_sub(2);
    let (degree_digits, minute_digits) = integer.split_at(split);

    let minutes: f64 = format!("{minute_digits}.{fraction}")
        .parse()
        .map_err(|_| ConversionError::NotNumeric)?;
    let degrees: f64 = if degree_digits.is_empty() {
        0.0
    } else {
        degree_digits
            .parse()
            .map_err(|_| ConversionError::NotNumeric)?
    };

    Ok(sign * (degrees + minutes / 60.0))
}

/// Parses one GGA sentence into a [`GeodeticFix`].
///
/// Field positions (0-indexed, after splitting on `,`): [1] UTC time,
/// [2]/[3] latitude and hemisphere, [4]/[5] longitude and hemisphere,
/// [6] quality, [7] satellite count, [9] MSL altitude in meters. The
/// positional fields [2..5] and [9] are required; [1], [6] and [7] are
/// decoded leniently. A trailing `*HH` checksum is verified when
/// present. This function never panics, whatever the input.
pub fn parse_gga(line: &str) -> Result<GeodeticFix, ParseError> {
    let body = line.trim();
    let body = body.strip_prefix('$').unwrap_or(body);
    let (payload, checksum) = match body.rsplit_once('*') {
        Some((payload, given)) => (payload, Some(given)),
        None => (body, None),
    };

    let fields: Vec<&str> = payload.split(',').collect();
    match fields.first() {
        Some(id) if id.trim().ends_with(FIX_SENTENCE_SUFFIX) => {}
        _ => return Err(ParseError::NotRecognized),
    }

    if let Some(given) = checksum {
        verify_checksum(payload, given)?;
    }

    let field = |idx: usize| {
        fields
            .get(idx)
            .copied()
            .ok_or_else(|| ParseError::Malformed(format!("missing field {idx}")))
    };

    let latitude = ddmm_to_decimal(field(2)?, field(3)?)?;
    let longitude = ddmm_to_decimal(field(4)?, field(5)?)?;
    let altitude_msl: f64 = field(9)?
        .parse()
        .map_err(|_| ParseError::Malformed("altitude is not numeric".into()))?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ParseError::Malformed(format!(
            "latitude {latitude:.4} out of range"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ParseError::Malformed(format!(
            "longitude {longitude:.4} out of range"
        )));
    }

    Ok(GeodeticFix {
        latitude,
        longitude,
        altitude_msl,
        utc: fields.get(1).and_then(|f| parse_utc(f)),
        quality: fields.get(6).and_then(|f| f.parse().ok()),
        satellites: fields.get(7).and_then(|f| f.parse().ok()),
    })
}

/// UTC time-of-fix field: `hhmmss` with an optional fractional part.
fn parse_utc(field: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(field, "%H%M%S%.f").ok()
}

fn verify_checksum(payload: &str, given: &str) -> Result<(), ParseError> {
    let computed = payload.bytes().fold(0u8, |acc, b| acc ^ b);
    let given = u8::from_str_radix(given.trim(), 16)
        .map_err(|_| ParseError::Malformed("checksum field is not hex".into()))?;
    if computed != given {
        return Err(ParseError::Malformed(format!(
            "checksum mismatch: computed {computed:02X}, sentence says {given:02X}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CANONICAL: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn converts_degrees_and_minutes() {
        let lat = ddmm_to_decimal("4807.038", "N").unwrap();
        assert_abs_diff_eq!(lat, 48.0 + 7.038 / 60.0, epsilon = 1e-9);

        let lon = ddmm_to_decimal("01131.000", "E").unwrap();
        assert_abs_diff_eq!(lon, 11.0 + 31.0 / 60.0, epsilon = 1e-9);
    }

    #[test]
    fn conversion_round_trips() {
        for degrees in [0u32, 1, 48, 89, 120, 179] {
            for minutes in [0.0f64, 0.5, 7.038, 31.0, 59.999] {
                let encoded = format!("{degrees}{minutes:06.3}");
                let decoded = ddmm_to_decimal(&encoded, "N").unwrap();
                assert_abs_diff_eq!(
                    decoded,
                    f64::from(degrees) + minutes / 60.0,
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn hemisphere_flips_the_sign() {
        let north = ddmm_to_decimal("4807.038", "N").unwrap();
        let south = ddmm_to_decimal("4807.038", "S").unwrap();
        assert_abs_diff_eq!(south, -north, epsilon = 1e-12);

        let east = ddmm_to_decimal("01131.000", "E").unwrap();
        let west = ddmm_to_decimal("01131.000", "W").unwrap();
        assert_abs_diff_eq!(west, -east, epsilon = 1e-12);
    }

    #[test]
    fn short_degree_prefixes_decode() {
        // One integer digit: all of it is minutes.
        let v = ddmm_to_decimal("5.5", "N").unwrap();
        assert_abs_diff_eq!(v, 5.5 / 60.0, epsilon = 1e-12);
        // Exactly two integer digits: zero degrees.
        let v = ddmm_to_decimal("07.038", "N").unwrap();
        assert_abs_diff_eq!(v, 7.038 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn malformed_coordinates_are_rejected_not_zeroed() {
        assert_eq!(
            ddmm_to_decimal("4807", "N"),
            Err(ConversionError::MissingDecimalPoint)
        );
        assert_eq!(
            ddmm_to_decimal("48ab.038", "N"),
            Err(ConversionError::NotNumeric)
        );
        assert_eq!(
            ddmm_to_decimal("4807.03x", "N"),
            Err(ConversionError::NotNumeric)
        );
        assert_eq!(
            ddmm_to_decimal("4807.038", "Q"),
            Err(ConversionError::UnknownHemisphere("Q".to_string()))
        );
    }

    #[test]
    fn parses_the_canonical_gga_sentence() {
        let fix = parse_gga(CANONICAL).unwrap();
        assert_abs_diff_eq!(fix.latitude, 48.1173, epsilon = 1e-4);
        assert_abs_diff_eq!(fix.longitude, 11.5167, epsilon = 1e-4);
        assert_abs_diff_eq!(fix.altitude_msl, 545.4, epsilon = 1e-9);
        assert_eq!(fix.utc, NaiveTime::from_hms_opt(12, 35, 19));
        assert_eq!(fix.quality, Some(1));
        assert_eq!(fix.satellites, Some(8));
    }

    #[test]
    fn accepts_sentences_without_checksum() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert!(parse_gga(line).is_ok());
    }

    #[test]
    fn rejects_checksum_mismatch() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48";
        assert!(matches!(parse_gga(line), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn other_sentence_types_are_not_recognized() {
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        assert_eq!(parse_gga(rmc), Err(ParseError::NotRecognized));
        assert_eq!(parse_gga(""), Err(ParseError::NotRecognized));
        assert_eq!(parse_gga("garbage"), Err(ParseError::NotRecognized));
    }

    #[test]
    fn truncated_sentence_is_malformed() {
        assert!(matches!(
            parse_gga("$GPGGA,123519,4807.038,N"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn non_numeric_altitude_is_malformed() {
        let line = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,none,M,46.9,M,,";
        assert!(matches!(parse_gga(line), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn out_of_range_latitude_is_malformed() {
        // 99 degrees of latitude cannot come from a sane receiver.
        let line = "$GPGGA,123519,9907.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert!(matches!(parse_gga(line), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn optional_fields_fail_soft() {
        let line = "$GPGGA,notatime,4807.038,N,01131.000,E,x,y,0.9,545.4,M,46.9,M,,";
        let fix = parse_gga(line).unwrap();
        assert_eq!(fix.utc, None);
        assert_eq!(fix.quality, None);
        assert_eq!(fix.satellites, None);
        assert_abs_diff_eq!(fix.altitude_msl, 545.4, epsilon = 1e-9);
    }

    #[test]
    fn skip_then_recover_sequence() {
        let lines = [
            "$GPGSV,3,1,11,03,03,111,00,04,15,270,00*74",
            "",
            "$GPGGA,123519,4807.038,N",
            CANONICAL,
        ];
        let fixes: Vec<_> = lines.iter().filter_map(|l| parse_gga(l).ok()).collect();
        assert_eq!(fixes.len(), 1);
        assert_abs_diff_eq!(fixes[0].altitude_msl, 545.4, epsilon = 1e-9);
    }
}
