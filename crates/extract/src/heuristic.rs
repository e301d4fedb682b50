//! Pattern-based entity extraction, independent of any model.
//!
//! PERSON and ORG share one rule (runs of capitalized words), so the two
//! labels always receive the same set. Capitalization alone cannot tell a
//! person from an organization; this extractor does not try.

use regex::Regex;

use crate::schema::{DATE, EntityMap, ORG, PERSON};

const CAPITALIZED_RUN: &str = r"[A-Z][a-z]+(?:\s[A-Z][a-z]+)*";
const DAY_MONTH_YEAR: &str = r"(?i)\b\d{1,2}\s(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\s\d{4}\b";

const CALENDAR_WORDS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
    "Saturday", "Sunday",
];

pub struct HeuristicExtractor {
    capitalized: Regex,
    date: Regex,
}

impl HeuristicExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            capitalized: Regex::new(CAPITALIZED_RUN)?,
            date: Regex::new(DAY_MONTH_YEAR)?,
        })
    }

    /// Every label is present in the output, possibly with an empty set.
    pub fn extract(&self, text: &str) -> EntityMap {
        let mut entities = EntityMap::new();
        for label in [PERSON, ORG, DATE] {
            entities.ensure_label(label);
        }

        for m in self.capitalized.find_iter(text) {
            if is_calendar_only(m.as_str()) {
                continue;
            }
            entities.insert(PERSON, m.as_str());
            entities.insert(ORG, m.as_str());
        }

        for m in self.date.find_iter(text) {
            entities.insert(DATE, m.as_str());
        }

        entities
    }
}

/// Month and weekday names are capitalized but are never names on their own.
fn is_calendar_only(run: &str) -> bool {
    run.split_whitespace().all(|word| CALENDAR_WORDS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_names_places_and_dates() {
        let extractor = HeuristicExtractor::new().unwrap();
        let entities = extractor.extract("John Smith met Jane Doe on 3 January 2024 in London.");

        let names = set(&["John Smith", "Jane Doe", "London"]);
        assert_eq!(entities.get(PERSON), Some(&names));
        assert_eq!(entities.get(DATE), Some(&set(&["3 January 2024"])));
    }

    #[test]
    fn test_person_and_org_are_indistinguishable() {
        let extractor = HeuristicExtractor::new().unwrap();
        let entities = extractor.extract("Acme Holdings hired Maria Lopez.");

        assert_eq!(entities.get(PERSON), entities.get(ORG));
        assert!(entities.contains(PERSON, "Acme Holdings"));
        assert!(entities.contains(ORG, "Maria Lopez"));
    }

    #[test]
    fn test_date_formats() {
        let extractor = HeuristicExtractor::new().unwrap();
        let entities = extractor.extract("Filed 12 march 2023, revised 01 Sept 2023, not 5 apples 2023.");

        assert_eq!(entities.get(DATE), Some(&set(&["12 march 2023", "01 Sept 2023"])));
    }

    #[test]
    fn test_no_matches_yields_empty_labels() {
        let extractor = HeuristicExtractor::new().unwrap();
        let entities = extractor.extract("nothing capitalized here, 42 times.");

        assert!(entities.is_empty());
        assert_eq!(entities.labels().collect::<Vec<_>>(), vec![DATE, ORG, PERSON]);
    }
}
