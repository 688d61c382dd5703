use anyhow::{bail, Result};
use std::collections::BTreeMap;

use crate::scoring::{
    Band, Combine, FactorRule, InputRecord, RuleKind, ScoreError, ScoringPolicy, Weight,
};

/// One course entry as the user typed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub name: String,
    /// Letter grade, or "-" for not yet graded.
    pub grade: String,
    pub credits: f64,
}

/// Parse a `name:grade:credits` course spec, e.g. `Algebra:A:3`.
/// A grade of `-` means "not yet graded".
pub fn parse_course(spec: &str) -> Result<Course> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    if parts.len() != 3 {
        bail!("Course must be name:grade:credits, e.g. Algebra:A:3 (got '{}')", spec);
    }
    let name = parts[0].trim();
    if name.is_empty() {
        bail!("Course name is required: '{}'", spec);
    }
    let credits: f64 = match parts[2].trim().parse() {
        Ok(c) => c,
        Err(_) => bail!("Credits must be a number: '{}'", spec),
    };
    Ok(Course {
        name: name.to_string(),
        grade: parts[1].trim().to_string(),
        credits,
    })
}

/// The standard 4.0 letter-grade table.
pub fn grade_points() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("A+".to_string(), 4.0),
        ("A".to_string(), 4.0),
        ("A-".to_string(), 3.7),
        ("B+".to_string(), 3.3),
        ("B".to_string(), 3.0),
        ("B-".to_string(), 2.7),
        ("C+".to_string(), 2.3),
        ("C".to_string(), 2.0),
        ("C-".to_string(), 1.7),
        ("D+".to_string(), 1.3),
        ("D".to_string(), 1.0),
        ("D-".to_string(), 0.7),
        ("F".to_string(), 0.0),
    ])
}

fn is_ungraded(grade: &str) -> bool {
    grade.is_empty() || grade == "-"
}

/// Build a GPA policy and input record from a course list.
///
/// One rule per course: grade lookup weighted by credits read from the input
/// record. Courses that can't be scored are excluded rather than aborting
/// the calculation:
/// - ungraded courses (`-`) get weight 0 silently;
/// - unknown grades get weight 0 and an [`ScoreError::InvalidInput`] naming
///   the course's grade field;
/// - negative or non-finite credits are left to the engine's skip-and-flag
///   pass, which zeroes the course and reports the credits field.
///
/// If every course ends up excluded the weighted average has zero total
/// weight and the result comes back flagged `no_data`.
pub fn build(
    courses: &[Course],
    max_scale: f64,
) -> (ScoringPolicy, InputRecord, Vec<ScoreError>) {
    let table = grade_points();
    let mut rules = Vec::with_capacity(courses.len());
    let mut input = InputRecord::new();
    let mut errors = Vec::new();

    for course in courses {
        let grade_field = format!("{}.grade", course.name);
        let credits_field = format!("{}.credits", course.name);

        let known_grade = table
            .keys()
            .any(|key| key.eq_ignore_ascii_case(&course.grade));

        let weight = if is_ungraded(&course.grade) {
            Weight::Fixed(0.0)
        } else if !known_grade {
            errors.push(ScoreError::InvalidInput {
                field: grade_field.clone(),
                expected: "letter grade",
                found: format!("category `{}`", course.grade),
            });
            Weight::Fixed(0.0)
        } else {
            Weight::Field {
                field: credits_field.clone(),
            }
        };

        rules.push(FactorRule {
            name: course.name.clone(),
            rule: RuleKind::Lookup {
                field: grade_field.clone(),
                table: table.clone(),
                default: 0.0,
            },
            weight,
        });

        input.set(&grade_field, course.grade.as_str());
        input.set(&credits_field, course.credits);
    }

    let policy = ScoringPolicy {
        name: "gpa".to_string(),
        combine: Combine::WeightedAverage { max_scale },
        rules,
        params: vec![],
        bands: bands(),
    };

    (policy, input, errors)
}

fn bands() -> Vec<Band> {
    vec![
        Band {
            threshold_low: 3.9,
            label: "summa-cum-laude".to_string(),
            message: "Summa cum laude range.".to_string(),
        },
        Band {
            threshold_low: 3.7,
            label: "magna-cum-laude".to_string(),
            message: "Magna cum laude range.".to_string(),
        },
        Band {
            threshold_low: 3.5,
            label: "cum-laude".to_string(),
            message: "Cum laude range.".to_string(),
        },
        Band {
            threshold_low: 3.0,
            label: "honor-roll".to_string(),
            message: "Honor roll territory.".to_string(),
        },
        Band {
            threshold_low: 2.0,
            label: "good-standing".to_string(),
            message: "Good academic standing.".to_string(),
        },
        Band {
            threshold_low: 0.0,
            label: "academic-warning".to_string(),
            message: "Below good standing.".to_string(),
        },
    ]
}
