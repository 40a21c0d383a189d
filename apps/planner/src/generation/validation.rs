//! Validation on both sides of the LLM call: the incoming request before
//! any prompt is built, and the generated content before it is accepted.

use crate::models::content::PlanContent;
use crate::models::request::{GenerationRequest, TripFacts};

/// Validates a generation request. An empty vec means valid; empty notes
/// and fully-absent preferences are fine.
pub fn validate_request(request: &GenerationRequest) -> Vec<String> {
    let mut errors = Vec::new();
    let facts = &request.facts;

    if facts.destination.trim().is_empty() {
        errors.push("destination must not be empty".to_string());
    }
    if facts.end_date <= facts.start_date {
        errors.push(format!(
            "end date {} must be after start date {}",
            facts.end_date, facts.start_date
        ));
    }
    if facts.group_size < 1 {
        errors.push("group size must be at least 1".to_string());
    }

    errors
}

/// Business validation of generated content against the trip facts.
///
/// The schema constrains shape and ranges, but the model can still produce
/// an internally inconsistent itinerary (wrong day count, duplicate days,
/// dates outside the trip). Violations are collected, not short-circuited.
pub fn validate_content(content: &PlanContent, facts: &TripFacts) -> Vec<String> {
    let mut errors = Vec::new();

    let expected_days = facts.duration_days();
    let summary = &content.summary;

    if i64::from(summary.duration_days) != expected_days {
        errors.push(format!(
            "summary.duration_days is {} but the trip spans {} days",
            summary.duration_days, expected_days
        ));
    }
    if summary.number_of_people < 1 {
        errors.push("summary.number_of_people must be at least 1".to_string());
    }
    if summary.total_cost_usd < 0.0 || summary.cost_per_person_usd < 0.0 {
        errors.push("summary costs must not be negative".to_string());
    }

    if content.daily_itinerary.len() as i64 != expected_days {
        errors.push(format!(
            "itinerary has {} entries but the trip spans {} days",
            content.daily_itinerary.len(),
            expected_days
        ));
    }

    for (index, entry) in content.daily_itinerary.iter().enumerate() {
        let expected_day = index as u32 + 1;
        if entry.day != expected_day {
            errors.push(format!(
                "itinerary entry {index} is numbered day {} (expected {expected_day})",
                entry.day
            ));
        }
        if entry.date < facts.start_date || entry.date > facts.end_date {
            errors.push(format!(
                "day {} is dated {} which is outside {}..{}",
                entry.day, entry.date, facts.start_date, facts.end_date
            ));
        }

        for activity in &entry.activities {
            if activity.duration_minutes == 0 {
                errors.push(format!(
                    "activity '{}' on day {} has zero duration",
                    activity.name, entry.day
                ));
            }
            if activity.estimated_cost_usd < 0.0 || activity.estimated_cost_per_person_usd < 0.0 {
                errors.push(format!(
                    "activity '{}' on day {} has a negative cost",
                    activity.name, entry.day
                ));
            }
            if !(0.0..=5.0).contains(&activity.rating) {
                errors.push(format!(
                    "activity '{}' on day {} has rating {} outside 0.0-5.0",
                    activity.name, entry.day, activity.rating
                ));
            }
        }

        for restaurant in &entry.restaurants {
            if restaurant.estimated_cost_per_person_usd < 0.0 {
                errors.push(format!(
                    "restaurant '{}' on day {} has a negative cost",
                    restaurant.name, entry.day
                ));
            }
            if !(0.0..=5.0).contains(&restaurant.rating) {
                errors.push(format!(
                    "restaurant '{}' on day {} has rating {} outside 0.0-5.0",
                    restaurant.name, entry.day, restaurant.rating
                ));
            }
        }
    }

    errors
}
