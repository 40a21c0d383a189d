//! The structured itinerary payload produced by a successful generation.
//!
//! Field names here are the wire contract: the JSON Schema sent to the
//! provider (`generation::schema`) mirrors these structs exactly and a
//! drift test keeps the two in sync.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContent {
    pub summary: TripSummary,
    /// One entry per day, numbered 1..=summary.duration_days.
    pub daily_itinerary: Vec<DayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub total_cost_usd: f64,
    pub cost_per_person_usd: f64,
    pub duration_days: u32,
    pub number_of_people: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
    pub restaurants: Vec<Restaurant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Free-form time of day, e.g. "09:00" or "afternoon".
    pub time: String,
    pub name: String,
    pub duration_minutes: u32,
    pub estimated_cost_usd: f64,
    pub estimated_cost_per_person_usd: f64,
    /// 0.0 to 5.0.
    pub rating: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub meal: Meal,
    pub name: String,
    pub cuisine: String,
    pub estimated_cost_per_person_usd: f64,
    /// 0.0 to 5.0.
    pub rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

/// Builds a well-formed `PlanContent` for use across the crate's tests.
#[cfg(test)]
pub(crate) fn sample_content(start: NaiveDate, duration_days: u32, people: u32) -> PlanContent {
    let daily_itinerary = (1..=duration_days)
        .map(|day| DayPlan {
            day,
            date: start + chrono::Days::new(u64::from(day) - 1),
            activities: vec![Activity {
                time: "09:00".to_string(),
                name: format!("Walking tour, day {day}"),
                duration_minutes: 120,
                estimated_cost_usd: 40.0,
                estimated_cost_per_person_usd: 40.0 / f64::from(people),
                rating: 4.5,
                description: "Guided walk through the old town".to_string(),
            }],
            restaurants: vec![Restaurant {
                meal: Meal::Dinner,
                name: "Trattoria Prova".to_string(),
                cuisine: "Italian".to_string(),
                estimated_cost_per_person_usd: 35.0,
                rating: 4.2,
            }],
        })
        .collect();

    PlanContent {
        summary: TripSummary {
            total_cost_usd: 120.0 * f64::from(duration_days),
            cost_per_person_usd: 120.0 * f64::from(duration_days) / f64::from(people),
            duration_days,
            number_of_people: people,
        },
        daily_itinerary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_json_round_trip() {
        let content = sample_content(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 3, 2);
        let json = serde_json::to_string(&content).unwrap();
        let recovered: PlanContent = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, content);
    }

    #[test]
    fn test_meal_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Meal::Breakfast).unwrap(), "breakfast");
        assert_eq!(serde_json::to_value(Meal::Lunch).unwrap(), "lunch");
        assert_eq!(serde_json::to_value(Meal::Dinner).unwrap(), "dinner");
    }

    #[test]
    fn test_unknown_meal_rejected() {
        let result: Result<Meal, _> = serde_json::from_value(serde_json::json!("brunch"));
        assert!(result.is_err());
    }

    #[test]
    fn test_date_uses_iso_format() {
        let content = sample_content(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(), 1, 1);
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["daily_itinerary"][0]["date"], "2025-07-15");
    }
}
