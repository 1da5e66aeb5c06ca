// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Grading collaborator seam.
//!
//! Challenge evaluation is owned by an external pipeline; this module only
//! fixes the interface the attestation flow calls through, plus a
//! deterministic stand-in so the full flow is exercisable without that
//! pipeline.

use utoipa::ToSchema;

/// Minimum score considered a pass.
pub const PASS_THRESHOLD: u64 = 70;

/// Outcome of grading a challenge submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub struct GradeOutcome {
    /// Evaluated score, 0..=100.
    pub score: u64,
    /// Whether the score clears [`PASS_THRESHOLD`].
    pub passed: bool,
}

/// Evaluates challenge submissions into a score.
pub trait Grader: Send + Sync {
    /// Grade a submission for a topic's challenge.
    fn grade(&self, topic: &str, challenge_id: &str, answers: &[String]) -> GradeOutcome;
}

/// Deterministic stand-in for the external grading pipeline.
///
/// Scores the fraction of non-empty answers. Useful for development and for
/// driving the attestation flow end-to-end in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalGrader;

impl Grader for LocalGrader {
    fn grade(&self, _topic: &str, _challenge_id: &str, answers: &[String]) -> GradeOutcome {
        let total = answers.len() as u64;
        let score = if total == 0 {
            0
        } else {
            let answered = answers.iter().filter(|a| !a.trim().is_empty()).count() as u64;
            answered * 100 / total
        };
        GradeOutcome {
            score,
            passed: score >= PASS_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submission_scores_zero() {
        let outcome = LocalGrader.grade("topic", "ch-1", &[]);
        assert_eq!(outcome.score, 0);
        assert!(!outcome.passed);
    }

    #[test]
    fn full_submission_scores_hundred() {
        let answers = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcome = LocalGrader.grade("topic", "ch-1", &answers);
        assert_eq!(outcome.score, 100);
        assert!(outcome.passed);
    }

    #[test]
    fn blank_answers_do_not_count() {
        let answers = vec!["a".to_string(), "   ".to_string()];
        let outcome = LocalGrader.grade("topic", "ch-1", &answers);
        assert_eq!(outcome.score, 50);
        assert!(!outcome.passed);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        // 7 of 10 answered → exactly the threshold.
        let answers: Vec<String> = (0..10)
            .map(|i| if i < 7 { "x".to_string() } else { String::new() })
            .collect();
        let outcome = LocalGrader.grade("topic", "ch-1", &answers);
        assert_eq!(outcome.score, PASS_THRESHOLD);
        assert!(outcome.passed);
    }
}
