use serde::{Deserialize, Serialize};

use crate::model::City;
use crate::store::CityStore;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CityItem {
    pub id: String,
    pub city_name: String,
    pub country: String,
    pub emoji: Option<String>,
    /// Raw ISO date, for the shell's own formatting.
    pub date: String,
    /// "June 12, 2027", or the raw date when it is not ISO-8601.
    pub display_date: String,
    pub notes: String,
    pub lat: f64,
    pub lng: f64,
    /// Whether this is the currently selected city.
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CountryItem {
    pub country: String,
    pub emoji: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ViewModel {
    pub cities: Vec<CityItem>,
    pub current_city: Option<CityItem>,
    /// Distinct countries in the order their first city was added.
    pub countries: Vec<CountryItem>,
    pub is_loading: bool,
    pub error: String,
}

impl ViewModel {
    pub fn from_store(store: &CityStore) -> Self {
        let active_id = store.current_city().map(|city| &city.id);

        let cities = store
            .cities()
            .iter()
            .map(|city| city_item(city, active_id == Some(&city.id)))
            .collect();

        Self {
            cities,
            current_city: store.current_city().map(|city| city_item(city, true)),
            countries: countries(store.cities()),
            is_loading: store.is_loading(),
            error: store.error().to_string(),
        }
    }
}

fn city_item(city: &City, is_active: bool) -> CityItem {
    CityItem {
        id: city.id.to_string(),
        city_name: city.city_name.clone(),
        country: city.country.clone(),
        emoji: city.emoji.clone(),
        date: city.date.clone(),
        display_date: format_date(&city.date),
        notes: city.notes.clone(),
        lat: city.position.lat,
        lng: city.position.lng,
        is_active,
    }
}

fn countries(cities: &[City]) -> Vec<CountryItem> {
    let mut out: Vec<CountryItem> = Vec::new();
    for city in cities {
        if city.country.is_empty() || out.iter().any(|c| c.country == city.country) {
            continue;
        }
        out.push(CountryItem {
            country: city.country.clone(),
            emoji: city.emoji.clone(),
        });
    }
    out
}

/// Formats the `YYYY-MM-DD` prefix of an ISO-8601 date as "Month D, YYYY".
pub fn format_date(date: &str) -> String {
    let parts = date
        .get(..10)
        .map(|prefix| prefix.splitn(3, '-').collect::<Vec<_>>());

    let Some([year, month, day]) = parts.as_deref() else {
        return date.to_string();
    };

    let (Ok(year), Ok(month), Ok(day)) = (
        year.parse::<u32>(),
        month.parse::<usize>(),
        day.parse::<u32>(),
    ) else {
        return date.to_string();
    };

    match MONTHS.get(month.wrapping_sub(1)) {
        Some(name) if (1..=31).contains(&day) => format!("{name} {day}, {year}"),
        _ => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IdStrategy, StorageFailurePolicy};
    use crate::model::{NewCity, Position};

    fn new_city(name: &str, country: &str, emoji: &str) -> NewCity {
        NewCity {
            city_name: name.into(),
            country: country.into(),
            emoji: Some(emoji.into()),
            date: "2027-06-12T10:00:00.000Z".into(),
            notes: String::new(),
            position: Position { lat: 10.0, lng: 10.0 },
        }
    }

    #[test]
    fn test_countries_are_distinct_in_first_seen_order() {
        let mut store = CityStore::new(IdStrategy::Uuid);
        store.create_city(new_city("Lisbon", "Portugal", "🇵🇹"));
        store.create_city(new_city("Madrid", "Spain", "🇪🇸"));
        store.create_city(new_city("Porto", "Portugal", "🇵🇹"));

        let view = ViewModel::from_store(&store);
        let countries: Vec<_> = view.countries.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(countries, ["Portugal", "Spain"]);
        assert_eq!(view.cities.len(), 3);
    }

    #[test]
    fn test_active_flag_follows_selection() {
        let mut store = CityStore::new(IdStrategy::Uuid);
        store.create_city(new_city("Lisbon", "Portugal", "🇵🇹"));
        let madrid = store.create_city(new_city("Madrid", "Spain", "🇪🇸")).unwrap();

        let view = ViewModel::from_store(&store);
        let active: Vec<_> = view.cities.iter().filter(|c| c.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, madrid.id.as_str());
        assert_eq!(view.current_city.unwrap().city_name, "Madrid");
    }

    #[test]
    fn test_empty_store() {
        let store = CityStore::restore(None, IdStrategy::Uuid, StorageFailurePolicy::SilentEmpty);
        let view = ViewModel::from_store(&store);
        assert_eq!(view, ViewModel::default());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2027-06-12T10:00:00.000Z"), "June 12, 2027");
        assert_eq!(format_date("2027-01-05"), "January 5, 2027");
        assert_eq!(format_date("2027-13-05"), "2027-13-05");
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date(""), "");
    }
}
