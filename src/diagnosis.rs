use serde::{Deserialize, Serialize};
use std::time::Duration;
use time_humanize::{Accuracy, HumanTime, Tense};

/// Qualitative label for a final percentage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Diagnosis {
    Poor,
    Average,
    Good,
    Excellent,
}

impl Diagnosis {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 40.0 {
            Diagnosis::Poor
        } else if percentage < 60.0 {
            Diagnosis::Average
        } else if percentage < 70.0 {
            Diagnosis::Good
        } else {
            Diagnosis::Excellent
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Diagnosis::Poor => "Poor eyesight. We recommend you see an eye doctor.",
            Diagnosis::Average => {
                "Average eyesight. Include foods rich in vitamin A (carrots, spinach) in your diet."
            }
            Diagnosis::Good => {
                "Good eyesight. Avoid habits that strain your eyes, like staring at screens too long."
            }
            Diagnosis::Excellent => "Excellent eyesight! Your vision is in great condition.",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Diagnosis::Poor => {
                "Vision problems can stem from many underlying causes. An optometrist or \
                 ophthalmologist can examine your eyes thoroughly, and early detection and \
                 treatment help preserve your sight and prevent further complications."
            }
            Diagnosis::Average => {
                "A healthy diet helps preserve your vision. Vitamin A supports good sight, \
                 particularly in low light, and nutrient-dense foods contribute to long-term \
                 eye health."
            }
            Diagnosis::Good => {
                "Prolonged screen time leads to eye strain. Follow the 20-20-20 rule: every 20 \
                 minutes, look at something 20 feet away for at least 20 seconds."
            }
            Diagnosis::Excellent => {
                "Keep it that way: eat a balanced diet, stay active, wear sunglasses against UV \
                 light and book regular eye exams to catch issues early."
            }
        }
    }
}

/// Final outcome of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub score: u32,
    pub rounds: u32,
    pub total_elapsed_secs: u64,
    pub percentage: f64,
    pub diagnosis: Diagnosis,
}

impl SessionResult {
    pub fn new(score: u32, rounds: u32, total_elapsed_secs: u64) -> Self {
        let percentage = if rounds == 0 {
            0.0
        } else {
            score as f64 / rounds as f64 * 100.0
        };
        Self {
            score,
            rounds,
            total_elapsed_secs,
            percentage,
            diagnosis: Diagnosis::from_percentage(percentage),
        }
    }

    pub fn share_text(&self) -> String {
        format!("I scored {:.1}% on the Eye Test!", self.percentage)
    }

    /// Human readable total time, e.g. "37 seconds".
    pub fn humanized_time(&self) -> String {
        if self.total_elapsed_secs == 0 {
            return "0 seconds".to_string();
        }
        HumanTime::from(Duration::from_secs(self.total_elapsed_secs))
            .to_text_en(Accuracy::Precise, Tense::Present)
    }
}

/// Percent-encodes `text` for use in a query string.
pub fn url_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn share_url(result: &SessionResult) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}",
        url_encode(&result.share_text())
    )
}
