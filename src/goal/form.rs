//! Normalizes the submitted goals form into a flat list of entries.
//!
//! Browsers and scripts send goals in one of two shapes:
//! - map form, `goals[<category id>]=<amount>`,
//! - array form, repeated `goals=<amount>` or `goals[]=<amount>`, where the n-th value belongs to
//!   the category with ID n, counting from 1.

use crate::goal::core::RawGoalEntry;

/// A goals form after normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GoalsForm {
    /// The month field, if the form had one.
    pub month: Option<String>,
    /// The year field, if the form had one.
    pub year: Option<String>,
    /// One entry per goal input, in form order.
    pub entries: Vec<RawGoalEntry>,
}

impl GoalsForm {
    /// Build the form from the decoded key/value pairs of a urlencoded body.
    ///
    /// Unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        let mut array_index = 0;

        for (key, value) in pairs {
            match key.as_str() {
                "month" => form.month = Some(value),
                "year" => form.year = Some(value),
                "goals" | "goals[]" => {
                    array_index += 1;
                    form.entries
                        .push(RawGoalEntry::new(&array_index.to_string(), &value));
                }
                _ => {
                    if let Some(category) = key
                        .strip_prefix("goals[")
                        .and_then(|rest| rest.strip_suffix(']'))
                    {
                        form.entries.push(RawGoalEntry::new(category, &value));
                    } else {
                        tracing::debug!("Ignoring unknown goals form field {key:?}");
                    }
                }
            }
        }

        form
    }
}

#[cfg(test)]
mod tests {
    use crate::goal::core::RawGoalEntry;

    use super::GoalsForm;

    fn pairs(body: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(body).unwrap()
    }

    #[test]
    fn parses_map_form() {
        let form = GoalsForm::from_pairs(pairs("month=3&year=2024&goals%5B4%5D=100&goals%5B7%5D=25.5"));

        assert_eq!(
            form,
            GoalsForm {
                month: Some("3".to_owned()),
                year: Some("2024".to_owned()),
                entries: vec![RawGoalEntry::new("4", "100"), RawGoalEntry::new("7", "25.5")],
            }
        );
    }

    #[test]
    fn parses_array_form_by_position() {
        let form = GoalsForm::from_pairs(pairs("goals=100&goals=&goals=30"));

        assert_eq!(
            form.entries,
            vec![
                RawGoalEntry::new("1", "100"),
                RawGoalEntry::new("2", ""),
                RawGoalEntry::new("3", "30"),
            ]
        );
        assert_eq!(form.month, None);
        assert_eq!(form.year, None);
    }

    #[test]
    fn parses_bracketed_array_form() {
        let form = GoalsForm::from_pairs(pairs("goals%5B%5D=5&goals%5B%5D=6"));

        assert_eq!(
            form.entries,
            vec![RawGoalEntry::new("1", "5"), RawGoalEntry::new("2", "6")]
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let form = GoalsForm::from_pairs(pairs("submit=Save&goalsx=1"));

        assert_eq!(form, GoalsForm::default());
    }
}
