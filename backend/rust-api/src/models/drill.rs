use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sample drill prompts served when no curated drill exists for the day.
/// In production these would come from the drills table.
const SAMPLE_PROMPTS: [(&str, DrillLevel); 7] = [
    (
        "Describe your morning routine. What do you do from the moment you wake up until you leave for work or start your day?",
        DrillLevel::Intermediate,
    ),
    (
        "Talk about a memorable trip you took. Where did you go, who were you with, and what made it special?",
        DrillLevel::Intermediate,
    ),
    (
        "Explain your favorite hobby to someone who has never tried it. Why do you enjoy it and how did you get started?",
        DrillLevel::Intermediate,
    ),
    (
        "Describe the neighborhood you live in. What do you like about it and what would you change?",
        DrillLevel::Beginner,
    ),
    (
        "If you could have dinner with any historical figure, who would you choose and what would you talk about?",
        DrillLevel::Advanced,
    ),
    (
        "Talk about a skill you would like to learn. Why is it important to you and how would you go about learning it?",
        DrillLevel::Intermediate,
    ),
    (
        "Describe your ideal weekend. What activities would you do and who would you spend it with?",
        DrillLevel::Beginner,
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillPrompt {
    pub id: String,
    pub date: NaiveDate,
    pub prompt: String,
    pub language: String,
    pub level: DrillLevel,
}

fn prompt_for(index: usize, date: NaiveDate) -> DrillPrompt {
    let (text, level) = SAMPLE_PROMPTS[index % SAMPLE_PROMPTS.len()];
    DrillPrompt {
        id: format!("drill-{}", date),
        date,
        prompt: text.to_string(),
        language: "English".to_string(),
        level,
    }
}

/// Today's drill, rotating through the sample set by day of year so the
/// same calendar day always yields the same prompt.
pub fn todays_drill(today: NaiveDate) -> DrillPrompt {
    prompt_for(today.ordinal() as usize, today)
}

/// The most recent `count` drills ending today, newest first.
pub fn recent_drills(today: NaiveDate, count: usize) -> Vec<DrillPrompt> {
    (0..count)
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            prompt_for(date.ordinal() as usize, date)
        })
        .collect()
}
