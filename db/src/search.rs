//! Filters for listing doctors.
//!
//! A [`DoctorFilter`] is a conjunction of optional per-field constraints. The
//! same filter is evaluated in SQL by the Postgres store and in memory by
//! [`DoctorFilter::matches`]. The two agree on ASCII text under any collation.
//! Beyond ASCII they only agree if the database uses a UTF-8 locale whose
//! lowercasing follows Unicode: the `C` locale folds ASCII letters only, and
//! locale-specific foldings (Turkish dotless `i`) differ from `to_lowercase`.

use serde::{Deserialize, Serialize};

use crate::models::Doctor;

/// How a filter value is compared against the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// The stored value equals the filter value.
    #[default]
    #[serde(alias = "eq")]
    Exact,

    /// The filter value occurs anywhere in the stored value, ignoring case.
    #[serde(alias = "like")]
    Contains,
}

impl MatchOperator {
    /// The Postgres operator implementing this comparison.
    pub fn to_postgres_operator(self) -> &'static str {
        match self {
            MatchOperator::Exact => "=",
            MatchOperator::Contains => "ILIKE",
        }
    }

    /// Turns a filter value into the bind value for [`Self::to_postgres_operator`].
    pub fn to_postgres_value(self, value: &str) -> String {
        match self {
            MatchOperator::Exact => value.to_string(),
            MatchOperator::Contains => format!("%{}%", escape_like(value)),
        }
    }

    /// Evaluates this comparison in memory.
    ///
    /// Case folding uses [`str::to_lowercase`], which `ILIKE` only mirrors
    /// for non-ASCII text under a UTF-8 locale.
    pub fn matches(self, stored: &str, value: &str) -> bool {
        match self {
            MatchOperator::Exact => stored == value,
            MatchOperator::Contains => stored.to_lowercase().contains(&value.to_lowercase()),
        }
    }
}

/// Escapes `LIKE` metacharacters, so the value is matched literally.
///
/// Postgres uses `\` as the default escape character of `LIKE` / `ILIKE`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A single constraint on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub column: &'static str,
    pub operator: MatchOperator,
    pub value: String,
}

/// Constraints for listing doctors. Unset fields do not constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub specialization: Option<String>,

    /// How `gender` is compared. `name` and `specialization` always use
    /// [`MatchOperator::Contains`].
    pub gender_match: MatchOperator,
}

/// Drops blank values, they impose no constraint.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl DoctorFilter {
    /// Builds a filter from optional query values.
    pub fn new(
        name: Option<String>,
        gender: Option<String>,
        specialization: Option<String>,
        gender_match: MatchOperator,
    ) -> Self {
        Self {
            name: non_blank(name),
            gender: non_blank(gender),
            specialization: non_blank(specialization),
            gender_match,
        }
    }

    /// A filter that matches every doctor.
    pub fn all() -> Self {
        Self::default()
    }

    /// The constraints of this filter, one per supplied field.
    pub fn constraints(&self) -> Vec<FieldFilter> {
        [
            ("name", MatchOperator::Contains, &self.name),
            ("gender", self.gender_match, &self.gender),
            ("specialization", MatchOperator::Contains, &self.specialization),
        ]
        .into_iter()
        .filter_map(|(column, operator, value)| {
            value.as_ref().map(|value| FieldFilter {
                column,
                operator,
                value: value.clone(),
            })
        })
        .collect()
    }

    /// Whether `doctor` satisfies every constraint of this filter.
    pub fn matches(&self, doctor: &Doctor) -> bool {
        self.constraints().iter().all(|c| {
            let stored = match c.column {
                "name" => doctor.name.as_str(),
                "gender" => doctor.gender.as_str(),
                "specialization" => doctor.specialization.as_str(),
                _ => return false,
            };
            c.operator.matches(stored, &c.value)
        })
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::{models::generate_id, validation::DoctorDraft};

    fn doctor(name: &str, gender: &str, specialization: &str) -> Doctor {
        DoctorDraft {
            name: Some(name.into()),
            gender: Some(gender.into()),
            specialization: Some(specialization.into()),
            description: Some("description".into()),
        }
        .validate()
        .unwrap()
        .into_doctor(generate_id(), OffsetDateTime::now_utc())
    }

    fn filter(
        name: Option<&str>,
        gender: Option<&str>,
        specialization: Option<&str>,
    ) -> DoctorFilter {
        DoctorFilter::new(
            name.map(Into::into),
            gender.map(Into::into),
            specialization.map(Into::into),
            MatchOperator::Exact,
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");

        assert!(DoctorFilter::all().matches(&amy));
        assert!(DoctorFilter::all().constraints().is_empty());
    }

    #[test]
    fn blank_values_are_ignored() {
        let f = filter(Some(""), Some("  "), None);
        assert!(f.constraints().is_empty());
    }

    #[test]
    fn text_fields_match_case_insensitive_substrings() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");

        assert!(filter(None, None, Some("cardio")).matches(&amy));
        assert!(filter(Some("AMY"), None, None).matches(&amy));
        assert!(filter(Some("lee"), None, Some("LOGY")).matches(&amy));
        assert!(!filter(Some("zzz-no-match"), None, None).matches(&amy));
    }

    #[test]
    fn non_ascii_text_folds_with_unicode_rules() {
        let elise = doctor("Dr. ÉLISE Ørsted", "female", "Neurologie");

        assert!(filter(Some("élise ør"), None, None).matches(&elise));
        assert!(MatchOperator::Contains.matches("STRAẞE", "straße"));
    }

    #[test]
    fn gender_matches_exactly_by_default() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");
        let bob = doctor("Dr. Bob Stone", "male", "Neurology");

        let males = filter(None, Some("male"), None);
        assert!(males.matches(&bob));
        assert!(!males.matches(&amy));
    }

    #[test]
    fn gender_substring_policy() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");

        let mut f = filter(None, Some("MALE"), None);
        assert!(!f.matches(&amy));

        f.gender_match = MatchOperator::Contains;
        assert!(f.matches(&amy));
    }

    #[test]
    fn all_constraints_must_hold() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");

        assert!(filter(Some("amy"), Some("female"), Some("cardio")).matches(&amy));
        assert!(!filter(Some("amy"), Some("male"), Some("cardio")).matches(&amy));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(
            MatchOperator::Contains.to_postgres_value("a_b"),
            "%a\\_b%"
        );
        assert_eq!(MatchOperator::Exact.to_postgres_value("a_b"), "a_b");
    }

    #[test]
    fn metacharacters_match_literally_in_memory() {
        let amy = doctor("Dr. Amy Lee", "female", "Cardiology");
        assert!(!filter(Some("%"), None, None).matches(&amy));
        assert!(!filter(Some("A.y"), None, None).matches(&amy));
    }
}
