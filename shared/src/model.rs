use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::config::Settings;
use crate::store::CityStore;
use crate::CityError;

/// City identifier. Always compared as a string; records written by older
/// shells may carry numeric ids, which are read back as their decimal text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CityId(pub String);

impl CityId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
            Raw::Float(n) => Self(n.to_string()),
        })
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n,
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom)?,
    };

    // "NaN" and "inf" parse, but would be written back as `null`.
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "coordinate must be finite, got {value}"
        )));
    }
    Ok(value)
}

/// Map position. Coordinates picked from a map URL arrive as text, so both
/// numbers and numeric strings are accepted when reading.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CityError> {
        let position = Self { lat, lng };
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> Result<(), CityError> {
        let Self { lat, lng } = *self;
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(CityError::InvalidPosition { lat, lng });
        }
        Ok(())
    }
}

/// City data as submitted by the new-city form, before an id is assigned.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCity {
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// ISO-8601 visit date.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    pub position: Position,
}

/// A visited city. Field names match the JSON layout of the stored collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: CityId,
    pub city_name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    pub position: Position,
}

impl City {
    pub fn from_new(id: CityId, new: NewCity) -> Self {
        let NewCity {
            city_name,
            country,
            emoji,
            date,
            notes,
            position,
        } = new;

        Self {
            id,
            city_name,
            country,
            emoji,
            date,
            notes,
            position,
        }
    }
}

/// Core model: the configured settings plus the city store that owns all
/// application state.
#[derive(Debug, Default)]
pub struct Model {
    pub settings: Settings,
    pub store: CityStore,
}

impl Model {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: CityStore::new(settings.id_strategy),
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_stored_browser_record() {
        let raw = r#"{
            "cityName": "Lisbon",
            "country": "Portugal",
            "emoji": "🇵🇹",
            "date": "2027-10-31T15:59:59.138Z",
            "notes": "My favorite city so far!",
            "position": { "lat": 38.727881642324164, "lng": -9.140900099907554 },
            "id": 73930385
        }"#;

        let city: City = serde_json::from_str(raw).unwrap();
        assert_eq!(city.id, CityId::new("73930385"));
        assert_eq!(city.city_name, "Lisbon");
        assert_eq!(city.emoji.as_deref(), Some("🇵🇹"));
        assert!((city.position.lat - 38.727_881_642_324_164).abs() < f64::EPSILON);
    }

    #[test]
    fn test_position_accepts_numeric_strings() {
        let position: Position =
            serde_json::from_str(r#"{ "lat": "40.46", "lng": "-3.75" }"#).unwrap();
        assert_eq!(position, Position { lat: 40.46, lng: -3.75 });
    }

    #[test]
    fn test_id_serializes_as_string() {
        let city = City::from_new(
            CityId::new("1700000000000"),
            NewCity {
                city_name: "Berlin".into(),
                position: Position { lat: 52.52, lng: 13.40 },
                ..NewCity::default()
            },
        );
        let json = serde_json::to_value(&city).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["cityName"], "Berlin");
        assert!(json.get("emoji").is_none());
    }

    #[test]
    fn test_position_range() {
        assert!(Position::new(0.0, 0.0).is_ok());
        assert!(Position::new(90.0, 180.0).is_ok());
        assert!(Position::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            Position::new(91.0, 0.0),
            Err(CityError::InvalidPosition { .. })
        ));
        assert!(Position::new(0.0, 180.5).is_err());
        assert!(Position::new(f64::NAN, 0.0).is_err());
        assert!(Position::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_position_rejects_non_finite_text() {
        for raw in ["NaN", "inf", "-infinity", "1e999"] {
            let json = format!(r#"{{ "lat": "{raw}", "lng": "0" }}"#);
            assert!(
                serde_json::from_str::<Position>(&json).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
