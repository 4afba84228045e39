use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RingError {
    #[error("a target time is required")]
    MissingTime,
    #[error("invalid time '{0}', expected H[H][:M[M]]")]
    MalformedTime(String),
    #[error("hour {0} is out of range, expected 0-23")]
    HourOutOfRange(u32),
    #[error("minute {0} is out of range, expected 0-59")]
    MinuteOutOfRange(u32),
}

/// Hour and minute of the day at which the alarm fires.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct TargetTime {
    hour: u32,
    minute: u32,
}

impl TargetTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, RingError> {
        if hour > 23 {
            return Err(RingError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(RingError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TargetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TargetTime {
    type Err = RingError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Err(RingError::MissingTime);
        }
        let (hour_text, minute_text) = match token.split_once(':') {
            Some((hour, minute)) => (hour, Some(minute)),
            None => (token, None),
        };
        let hour = parse_field(hour_text, token)?;
        let minute = match minute_text {
            Some(text) => parse_field(text, token)?,
            None => 0,
        };
        Self::new(hour, minute)
    }
}

/// One or two ASCII digits.
fn parse_field(text: &str, token: &str) -> Result<u32, RingError> {
    let well_formed = matches!(text.len(), 1 | 2) && text.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(RingError::MalformedTime(token.to_string()));
    }
    text.parse()
        .map_err(|_| RingError::MalformedTime(token.to_string()))
}

/// clap value parser for the positional time token.
pub fn parse_target_time(token: &str) -> Result<TargetTime, RingError> {
    token.parse()
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PopupContent {
    Message(String),
    Clock,
}

impl PopupContent {
    /// Joins trailing arguments into the popup content. An empty join means
    /// the popup shows the time instead.
    pub fn from_words(words: &[String], title_case: bool) -> Self {
        let joined = words.join(" ");
        if joined.is_empty() {
            return Self::Clock;
        }
        if title_case {
            Self::Message(to_title_case(&joined))
        } else {
            Self::Message(joined)
        }
    }

    pub fn is_clock(&self) -> bool {
        matches!(self, Self::Clock)
    }

    pub fn render(&self, now: NaiveDateTime) -> String {
        match self {
            Self::Message(text) => text.clone(),
            Self::Clock => clock_text(now),
        }
    }
}

pub fn clock_text(now: NaiveDateTime) -> String {
    format!("It's {:02}:{:02}", now.hour(), now.minute())
}

/// Uppercases every letter that follows a non-letter and lowercases the rest.
pub fn to_title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}
