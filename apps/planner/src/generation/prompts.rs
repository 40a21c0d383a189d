//! Prompt construction for plan generation.
//!
//! The system prompt fixes the output contract; the user prompt enumerates
//! trip facts, each preference that is actually present, and each note
//! verbatim. Absent preferences and empty note lists are omitted entirely —
//! no placeholders.

use std::fmt::Write as _;

use crate::models::request::GenerationRequest;

/// System prompt for plan generation — enforces schema-conformant JSON.
pub const SYSTEM_PROMPT: &str = "You are an expert travel planner. \
    Produce a complete day-by-day itinerary for the trip described by the user. \
    You MUST respond with a single JSON object conforming exactly to the provided JSON schema. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    All costs are realistic estimates in USD. \
    All ratings are between 0.0 and 5.0. \
    The itinerary MUST contain exactly one entry per trip day, numbered from 1, \
    and every date MUST fall within the trip's date range.";

pub fn build_user_prompt(request: &GenerationRequest) -> String {
    let facts = &request.facts;
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Plan a trip with the following details.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "TRIP:");
    let _ = writeln!(prompt, "- Destination: {}", facts.destination);
    let _ = writeln!(
        prompt,
        "- Dates: {} to {} ({} days, inclusive)",
        facts.start_date,
        facts.end_date,
        facts.duration_days()
    );
    let _ = writeln!(prompt, "- Group size: {} people", facts.group_size);

    let prefs = &request.preferences;
    if !prefs.is_empty() {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "PREFERENCES:");
        if let Some(budget) = &prefs.budget {
            let _ = writeln!(prompt, "- Budget: {budget}");
        }
        if let Some(accommodation) = &prefs.accommodation {
            let _ = writeln!(prompt, "- Accommodation: {accommodation}");
        }
        if let Some(activities) = &prefs.activities {
            let _ = writeln!(prompt, "- Preferred activities: {}", activities.join(", "));
        }
        if let Some(eating) = &prefs.eating_habits {
            let _ = writeln!(prompt, "- Eating habits: {eating}");
        }
    }

    if !request.notes.is_empty() {
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "TRAVELER NOTES:");
        for note in &request.notes {
            let _ = writeln!(prompt, "- {note}");
        }
    }

    let _ = writeln!(prompt);
    if request.options.include_budget_breakdown {
        let _ = writeln!(
            prompt,
            "Break down estimated costs per activity and per person."
        );
    }
    if request.options.include_restaurants {
        let _ = writeln!(
            prompt,
            "Suggest a breakfast, lunch and dinner restaurant for each day."
        );
    } else {
        let _ = writeln!(prompt, "Leave each day's restaurants list empty.");
    }

    prompt
}
