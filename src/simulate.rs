use crate::models::{RiskAssessment, StudentRecord};

/// User-modified metrics for a what-if run. Unset fields keep the student's value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustments {
    pub attendance: Option<f64>,
    pub assignment_submission: Option<f64>,
    pub library_visits: Option<u32>,
    pub gpa: Option<f64>,
    pub counselor_visits: Option<u32>,
    pub lab_participation: Option<f64>,
    pub peer_engagement: Option<u32>,
}

impl Adjustments {
    pub fn is_empty(&self) -> bool {
        *self == Adjustments::default()
    }

    /// Copy of `student` with the adjustments applied, each clamped to the range
    /// the simulator offers. A GPA change also replaces the previous-semester GPA.
    pub fn apply(&self, student: &StudentRecord) -> StudentRecord {
        let mut modified = student.clone();

        if let Some(value) = self.attendance {
            modified.attendance = value.clamp(0.0, 100.0);
        }
        if let Some(value) = self.assignment_submission {
            modified.assignment_submission = value.clamp(0.0, 100.0);
        }
        if let Some(value) = self.library_visits {
            modified.library_visits = value.min(20);
        }
        if let Some(value) = self.gpa {
            let gpa = value.clamp(0.0, 10.0);
            modified.gpa = gpa;
            modified.previous_semester_gpa = gpa;
        }
        if let Some(value) = self.counselor_visits {
            modified.counselor_visits = value.min(10);
        }
        if let Some(value) = self.lab_participation {
            modified.lab_participation = value.clamp(0.0, 100.0);
        }
        if let Some(value) = self.peer_engagement {
            modified.peer_engagement = value.clamp(1, 10);
        }

        modified
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub baseline: RiskAssessment,
    pub simulated: RiskAssessment,
    pub student: StudentRecord,
}

impl Simulation {
    /// Points removed from the score; negative when the change makes things worse.
    pub fn improvement(&self) -> f64 {
        self.baseline.score - self.simulated.score
    }

    pub fn relative_improvement(&self) -> Option<f64> {
        if self.baseline.score > 0.0 {
            Some(self.improvement() / self.baseline.score * 100.0)
        } else {
            None
        }
    }

    pub fn tier_changed(&self) -> bool {
        self.baseline.level != self.simulated.level
    }
}

/// Re-scores `student` with `adjustments` applied. The original record is untouched.
pub fn simulate(student: &StudentRecord, adjustments: &Adjustments) -> Simulation {
    let modified = adjustments.apply(student);
    Simulation {
        baseline: student.assess(),
        simulated: modified.assess(),
        student: modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{map_row, RawRow};
    use crate::models::RiskLevel;

    fn struggling_student() -> StudentRecord {
        map_row(
            &RawRow::new([
                ("name", "Karan Malhotra"),
                ("attendance", "50"),
                ("gpa", "5.5"),
                ("assignment_submission", "40"),
                ("library_visits", "1"),
                ("financial_aid_delay_days", "30"),
                ("counselor_visits", "0"),
                ("lab_participation", "50"),
                ("peer_engagement", "2"),
            ]),
            7,
        )
    }

    #[test]
    fn improving_metrics_lowers_score_and_changes_tier() {
        let student = struggling_student();
        let adjustments = Adjustments {
            attendance: Some(90.0),
            assignment_submission: Some(90.0),
            gpa: Some(8.0),
            ..Adjustments::default()
        };
        let result = simulate(&student, &adjustments);

        assert_eq!(result.baseline.level, RiskLevel::AtRisk);
        assert_eq!(result.simulated.level, RiskLevel::LowRisk);
        assert!(result.tier_changed());
        assert!(result.improvement() > 0.0);
        let relative = result.relative_improvement().expect("baseline above zero");
        assert!(relative > 0.0 && relative <= 100.0);
        assert_eq!(result.student.previous_semester_gpa, 8.0);
        assert_eq!(student.attendance, 50.0);
    }

    #[test]
    fn worsening_metrics_reports_negative_improvement() {
        let student = struggling_student();
        let adjustments = Adjustments {
            counselor_visits: Some(10),
            ..Adjustments::default()
        };
        let result = simulate(&student, &adjustments);
        assert!(result.improvement() < 0.0);
    }

    #[test]
    fn adjustments_clamped_to_simulator_ranges() {
        let student = struggling_student();
        let adjustments = Adjustments {
            attendance: Some(140.0),
            library_visits: Some(99),
            gpa: Some(-1.0),
            peer_engagement: Some(0),
            ..Adjustments::default()
        };
        let modified = adjustments.apply(&student);
        assert_eq!(modified.attendance, 100.0);
        assert_eq!(modified.library_visits, 20);
        assert_eq!(modified.gpa, 0.0);
        assert_eq!(modified.peer_engagement, 1);
    }

    #[test]
    fn no_adjustments_keeps_score() {
        let student = struggling_student();
        let adjustments = Adjustments::default();
        assert!(adjustments.is_empty());
        let result = simulate(&student, &adjustments);
        assert_eq!(result.improvement(), 0.0);
        assert!(!result.tier_changed());
    }
}
