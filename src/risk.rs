use crate::models::{FeatureSubset, RiskAssessment, RiskFactor, RiskLevel, StudentRecord};

pub const AT_RISK_THRESHOLD: f64 = 30.0;
pub const HIGH_RISK_THRESHOLD: f64 = 65.0;

pub const MAX_RISK_FACTORS: usize = 5;
pub const MAX_INTERVENTIONS: usize = 4;

pub const IDEAL_ATTENDANCE: f64 = 75.0;
pub const IDEAL_PREVIOUS_GPA: f64 = 7.5;
pub const IDEAL_ASSIGNMENT_SUBMISSION: f64 = 80.0;
pub const IDEAL_LIBRARY_VISITS: f64 = 8.0;
pub const IDEAL_COUNSELOR_VISITS: f64 = 2.0;
pub const IDEAL_LAB_PARTICIPATION: f64 = 85.0;
pub const IDEAL_PEER_ENGAGEMENT: f64 = 7.0;

/// Delay, in days, at which the financial aid factor saturates.
pub const FINANCIAL_AID_SATURATION_DAYS: f64 = 60.0;
/// Deviation from the optimal counselor visit count at which that factor saturates.
pub const COUNSELOR_SATURATION_DEVIATION: f64 = 5.0;

/// One of the eight weighted terms summed into a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Attendance,
    PreviousGpa,
    AssignmentSubmission,
    FinancialAidDelay,
    LibraryVisits,
    CounselorVisits,
    LabParticipation,
    PeerEngagement,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Attendance,
        Factor::PreviousGpa,
        Factor::AssignmentSubmission,
        Factor::FinancialAidDelay,
        Factor::LibraryVisits,
        Factor::CounselorVisits,
        Factor::LabParticipation,
        Factor::PeerEngagement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Factor::Attendance => "Attendance",
            Factor::PreviousGpa => "Previous Semester GPA",
            Factor::AssignmentSubmission => "Assignment Submission",
            Factor::FinancialAidDelay => "Financial Aid Delay",
            Factor::LibraryVisits => "Library Visits",
            Factor::CounselorVisits => "Counselor Visits",
            Factor::LabParticipation => "Lab Participation",
            Factor::PeerEngagement => "Peer Engagement",
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Factor::Attendance => 22.4,
            Factor::PreviousGpa => 18.7,
            Factor::AssignmentSubmission => 15.3,
            Factor::FinancialAidDelay => 9.8,
            Factor::LibraryVisits => 7.2,
            Factor::CounselorVisits => 6.5,
            Factor::LabParticipation => 5.9,
            Factor::PeerEngagement => 4.8,
        }
    }

    /// Contribution of this factor to the total score. Always within
    /// `0.0..=self.weight()` for the capped factors and `>= 0.0` otherwise.
    pub fn contribution(self, features: &ResolvedFeatures) -> f64 {
        let weight = self.weight();
        match self {
            Factor::Attendance => deficit(IDEAL_ATTENDANCE, features.attendance, weight),
            Factor::PreviousGpa => {
                deficit(IDEAL_PREVIOUS_GPA, features.previous_semester_gpa, weight)
            }
            Factor::AssignmentSubmission => deficit(
                IDEAL_ASSIGNMENT_SUBMISSION,
                features.assignment_submission,
                weight,
            ),
            Factor::FinancialAidDelay => {
                (features.financial_aid_delay_days / FINANCIAL_AID_SATURATION_DAYS * weight)
                    .clamp(0.0, weight)
            }
            Factor::LibraryVisits => deficit(IDEAL_LIBRARY_VISITS, features.library_visits, weight),
            Factor::CounselorVisits => {
                let deviation = (features.counselor_visits - IDEAL_COUNSELOR_VISITS).abs();
                (deviation / COUNSELOR_SATURATION_DEVIATION * weight).min(weight)
            }
            Factor::LabParticipation => {
                deficit(IDEAL_LAB_PARTICIPATION, features.lab_participation, weight)
            }
            Factor::PeerEngagement => {
                deficit(IDEAL_PEER_ENGAGEMENT, features.peer_engagement, weight)
            }
        }
    }
}

fn deficit(ideal: f64, value: f64, weight: f64) -> f64 {
    ((ideal - value) / ideal * weight).max(0.0)
}

/// Feature values with every default applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFeatures {
    pub attendance: f64,
    pub previous_semester_gpa: f64,
    pub assignment_submission: f64,
    pub library_visits: f64,
    pub financial_aid_delay_days: f64,
    pub counselor_visits: f64,
    pub lab_participation: f64,
    pub peer_engagement: f64,
}

impl ResolvedFeatures {
    pub fn from_subset(subset: &FeatureSubset) -> Self {
        let gpa = finite(subset.gpa);
        Self {
            attendance: finite(subset.attendance).unwrap_or(IDEAL_ATTENDANCE),
            previous_semester_gpa: finite(subset.previous_semester_gpa)
                .or(gpa)
                .unwrap_or(IDEAL_PREVIOUS_GPA),
            assignment_submission: finite(subset.assignment_submission)
                .unwrap_or(IDEAL_ASSIGNMENT_SUBMISSION),
            library_visits: finite(subset.library_visits).unwrap_or(IDEAL_LIBRARY_VISITS),
            financial_aid_delay_days: finite(subset.financial_aid_delay_days).unwrap_or(0.0),
            counselor_visits: finite(subset.counselor_visits).unwrap_or(IDEAL_COUNSELOR_VISITS),
            lab_participation: finite(subset.lab_participation)
                .unwrap_or(IDEAL_LAB_PARTICIPATION),
            peer_engagement: finite(subset.peer_engagement).unwrap_or(IDEAL_PEER_ENGAGEMENT),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub factor: Factor,
    pub value: f64,
}

/// Every factor's contribution, in weight order. Unlike [`explain`], this
/// breakdown sums to the unclamped score.
pub fn contributions(features: &FeatureSubset) -> Vec<Contribution> {
    let resolved = ResolvedFeatures::from_subset(features);
    Factor::ALL
        .iter()
        .map(|factor| Contribution {
            factor: *factor,
            value: factor.contribution(&resolved),
        })
        .collect()
}

pub fn score(features: &FeatureSubset) -> f64 {
    let resolved = ResolvedFeatures::from_subset(features);
    let total: f64 = Factor::ALL
        .iter()
        .map(|factor| factor.contribution(&resolved))
        .sum();
    total.clamp(0.0, 100.0)
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < AT_RISK_THRESHOLD {
            RiskLevel::LowRisk
        } else if score < HIGH_RISK_THRESHOLD {
            RiskLevel::AtRisk
        } else {
            RiskLevel::HighRisk
        }
    }
}

pub fn assess(features: &FeatureSubset) -> RiskAssessment {
    let score = score(features);
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
    }
}

/// Ranks the dimensions on which a student falls short of the ideal, largest
/// impact first, keeping at most [`MAX_RISK_FACTORS`].
///
/// This is a diagnostic view. Counselor visits are never listed and the list is
/// truncated, so the impacts shown do not generally sum to the student's score.
pub fn explain(student: &StudentRecord) -> Vec<RiskFactor> {
    let resolved = ResolvedFeatures::from_subset(&student.features());
    let mut factors = Vec::new();

    if student.attendance < IDEAL_ATTENDANCE {
        factors.push(RiskFactor {
            factor: Factor::Attendance.label(),
            current_value: format!("{:.1}%", student.attendance),
            expected_value: "75%+",
            impact: Factor::Attendance.contribution(&resolved),
        });
    }

    if student.assignment_submission < IDEAL_ASSIGNMENT_SUBMISSION {
        factors.push(RiskFactor {
            factor: Factor::AssignmentSubmission.label(),
            current_value: format!("{:.1}%", student.assignment_submission),
            expected_value: "80%+",
            impact: Factor::AssignmentSubmission.contribution(&resolved),
        });
    }

    if f64::from(student.library_visits) < IDEAL_LIBRARY_VISITS {
        factors.push(RiskFactor {
            factor: Factor::LibraryVisits.label(),
            current_value: format!("{}/month", student.library_visits),
            expected_value: "8+/month",
            impact: Factor::LibraryVisits.contribution(&resolved),
        });
    }

    if student.financial_aid_delay_days > 0 {
        factors.push(RiskFactor {
            factor: Factor::FinancialAidDelay.label(),
            current_value: format!("{} days", student.financial_aid_delay_days),
            expected_value: "0 days",
            impact: Factor::FinancialAidDelay.contribution(&resolved),
        });
    }

    if student.previous_semester_gpa < IDEAL_PREVIOUS_GPA {
        factors.push(RiskFactor {
            factor: Factor::PreviousGpa.label(),
            current_value: format!("{:.2}", student.previous_semester_gpa),
            expected_value: "7.5+",
            impact: Factor::PreviousGpa.contribution(&resolved),
        });
    }

    if student.lab_participation < IDEAL_LAB_PARTICIPATION {
        factors.push(RiskFactor {
            factor: Factor::LabParticipation.label(),
            current_value: format!("{:.1}%", student.lab_participation),
            expected_value: "85%+",
            impact: Factor::LabParticipation.contribution(&resolved),
        });
    }

    if f64::from(student.peer_engagement) < IDEAL_PEER_ENGAGEMENT {
        factors.push(RiskFactor {
            factor: Factor::PeerEngagement.label(),
            current_value: format!("{}/10", student.peer_engagement),
            expected_value: "7+/10",
            impact: Factor::PeerEngagement.contribution(&resolved),
        });
    }

    factors.sort_by(|a, b| {
        b.impact
            .partial_cmp(&a.impact)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    factors.truncate(MAX_RISK_FACTORS);
    factors
}

struct InterventionRule {
    applies: fn(&StudentRecord) -> bool,
    actions: &'static [&'static str],
}

fn low_attendance(student: &StudentRecord) -> bool {
    student.attendance < IDEAL_ATTENDANCE
}

fn low_submission(student: &StudentRecord) -> bool {
    student.assignment_submission < IDEAL_ASSIGNMENT_SUBMISSION
}

fn low_library_use(student: &StudentRecord) -> bool {
    f64::from(student.library_visits) < IDEAL_LIBRARY_VISITS
}

fn delayed_aid(student: &StudentRecord) -> bool {
    student.financial_aid_delay_days > 0
}

fn low_previous_gpa(student: &StudentRecord) -> bool {
    student.previous_semester_gpa < IDEAL_PREVIOUS_GPA
}

fn isolated(student: &StudentRecord) -> bool {
    student.peer_engagement < 5
}

fn low_lab_participation(student: &StudentRecord) -> bool {
    student.lab_participation < IDEAL_LAB_PARTICIPATION
}

const INTERVENTION_RULES: [InterventionRule; 7] = [
    InterventionRule {
        applies: low_attendance,
        actions: &[
            "Schedule attendance improvement meeting with student and parents",
            "Implement daily attendance tracking with counselor check-ins",
        ],
    },
    InterventionRule {
        applies: low_submission,
        actions: &[
            "Assign peer mentor for assignment guidance and time management",
            "Enroll in academic skills workshop series",
        ],
    },
    InterventionRule {
        applies: low_library_use,
        actions: &[
            "Introduce to library resources and study group programs",
            "Create structured study schedule with library time blocks",
        ],
    },
    InterventionRule {
        applies: delayed_aid,
        actions: &[
            "Connect with financial aid office for installment plan options",
            "Refer to scholarship opportunities and emergency aid programs",
        ],
    },
    InterventionRule {
        applies: low_previous_gpa,
        actions: &[
            "Enroll in subject-specific tutoring sessions",
            "Schedule weekly academic progress meetings with faculty advisor",
        ],
    },
    InterventionRule {
        applies: isolated,
        actions: &[
            "Encourage participation in student clubs and peer support groups",
            "Assign to collaborative project teams to build social connections",
        ],
    },
    InterventionRule {
        applies: low_lab_participation,
        actions: &["Provide additional lab session support and hands-on guidance"],
    },
];

pub fn recommend(student: &StudentRecord) -> Vec<String> {
    INTERVENTION_RULES
        .iter()
        .filter(|rule| (rule.applies)(student))
        .flat_map(|rule| rule.actions.iter())
        .take(MAX_INTERVENTIONS)
        .map(|action| action.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub weight: f64,
    pub scored: bool,
}

/// Weights as presented to users. The last three are listed for reference but
/// are not part of [`score`].
pub const FEATURE_IMPORTANCE: [FeatureImportance; 11] = [
    FeatureImportance { feature: "Attendance", weight: 22.4, scored: true },
    FeatureImportance { feature: "Previous GPA", weight: 18.7, scored: true },
    FeatureImportance { feature: "Assignment Submission", weight: 15.3, scored: true },
    FeatureImportance { feature: "Financial Aid Delay", weight: 9.8, scored: true },
    FeatureImportance { feature: "Library Visits", weight: 7.2, scored: true },
    FeatureImportance { feature: "Counselor Visits", weight: 6.5, scored: true },
    FeatureImportance { feature: "Lab Participation", weight: 5.9, scored: true },
    FeatureImportance { feature: "Peer Engagement", weight: 4.8, scored: true },
    FeatureImportance { feature: "Current GPA", weight: 3.5, scored: false },
    FeatureImportance { feature: "Age", weight: 3.2, scored: false },
    FeatureImportance { feature: "Hostel Status", weight: 2.7, scored: false },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialAidStatus, Residence};
    use chrono::Utc;
    use proptest::prelude::*;

    fn ideal_features() -> FeatureSubset {
        FeatureSubset {
            attendance: Some(75.0),
            gpa: Some(7.5),
            previous_semester_gpa: Some(7.5),
            assignment_submission: Some(80.0),
            library_visits: Some(8.0),
            financial_aid_delay_days: Some(0.0),
            counselor_visits: Some(2.0),
            lab_participation: Some(85.0),
            peer_engagement: Some(7.0),
        }
    }

    fn sample_student() -> StudentRecord {
        StudentRecord {
            id: "1".to_string(),
            name: "Rahul Kumar".to_string(),
            student_id: "CS2021001".to_string(),
            department: "Computer Science".to_string(),
            semester: 5,
            age: 20,
            gender: "Male".to_string(),
            residence: Residence::Hostel,
            financial_aid_status: FinancialAidStatus::Delayed,
            attendance: 50.0,
            gpa: 5.8,
            previous_semester_gpa: 5.5,
            assignment_submission: 40.0,
            library_visits: 1,
            financial_aid_delay_days: 30,
            counselor_visits: 0,
            lab_participation: 50.0,
            peer_engagement: 2,
            last_updated: Utc::now(),
        }
    }

    fn ideal_student() -> StudentRecord {
        StudentRecord {
            attendance: 75.0,
            gpa: 7.5,
            previous_semester_gpa: 7.5,
            assignment_submission: 80.0,
            library_visits: 8,
            financial_aid_delay_days: 0,
            counselor_visits: 2,
            lab_participation: 85.0,
            peer_engagement: 7,
            financial_aid_status: FinancialAidStatus::Current,
            ..sample_student()
        }
    }

    #[test]
    fn ideal_reference_values_score_zero() {
        assert_eq!(score(&ideal_features()), 0.0);
        assert_eq!(score(&FeatureSubset::default()), 0.0);
    }

    #[test]
    fn better_than_ideal_contributes_nothing() {
        let features = FeatureSubset {
            attendance: Some(100.0),
            previous_semester_gpa: Some(10.0),
            assignment_submission: Some(100.0),
            library_visits: Some(20.0),
            lab_participation: Some(100.0),
            peer_engagement: Some(10.0),
            ..ideal_features()
        };
        assert_eq!(score(&features), 0.0);
    }

    #[test]
    fn mixed_profile_components() {
        let student = sample_student();
        let parts = contributions(&student.features());
        let expected = [
            (Factor::Attendance, 25.0 / 75.0 * 22.4),
            (Factor::PreviousGpa, 2.0 / 7.5 * 18.7),
            (Factor::AssignmentSubmission, 7.65),
            (Factor::FinancialAidDelay, 4.9),
            (Factor::LibraryVisits, 6.3),
            (Factor::CounselorVisits, 2.6),
            (Factor::LabParticipation, 35.0 / 85.0 * 5.9),
            (Factor::PeerEngagement, 5.0 / 7.0 * 4.8),
        ];
        for (part, (factor, value)) in parts.iter().zip(expected.iter()) {
            assert_eq!(part.factor, *factor);
            assert!((part.value - value).abs() < 1e-9, "{:?}", factor);
        }

        let assessment = student.assess();
        let total: f64 = expected.iter().map(|(_, value)| value).sum();
        assert!((assessment.score - total).abs() < 1e-9);
        assert!((assessment.score - 39.76).abs() < 0.01);
        assert_eq!(assessment.level, RiskLevel::AtRisk);
        assert_eq!(assessment.color().as_str(), "orange");
    }

    #[test]
    fn tier_boundaries_belong_to_higher_tier() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::LowRisk);
        assert_eq!(RiskLevel::from_score(29.999), RiskLevel::LowRisk);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::AtRisk);
        assert_eq!(RiskLevel::from_score(64.999), RiskLevel::AtRisk);
        assert_eq!(RiskLevel::from_score(65.0), RiskLevel::HighRisk);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::HighRisk);
    }

    #[test]
    fn financial_delay_saturates_at_weight() {
        let at_cap = FeatureSubset {
            financial_aid_delay_days: Some(60.0),
            ..ideal_features()
        };
        let past_cap = FeatureSubset {
            financial_aid_delay_days: Some(400.0),
            ..ideal_features()
        };
        assert!((score(&at_cap) - 9.8).abs() < 1e-9);
        assert!((score(&past_cap) - 9.8).abs() < 1e-9);
    }

    #[test]
    fn counselor_visits_penalized_in_both_directions() {
        let none = FeatureSubset {
            counselor_visits: Some(0.0),
            ..ideal_features()
        };
        let many = FeatureSubset {
            counselor_visits: Some(4.0),
            ..ideal_features()
        };
        let excessive = FeatureSubset {
            counselor_visits: Some(30.0),
            ..ideal_features()
        };
        assert!((score(&none) - 2.6).abs() < 1e-9);
        assert!((score(&many) - 2.6).abs() < 1e-9);
        assert!((score(&excessive) - 6.5).abs() < 1e-9);
    }

    #[test]
    fn previous_gpa_defaults_to_current_gpa() {
        let features = FeatureSubset {
            gpa: Some(3.75),
            ..FeatureSubset::default()
        };
        assert!((score(&features) - 18.7 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_inputs_fall_back_to_defaults() {
        let features = FeatureSubset {
            attendance: Some(f64::NAN),
            library_visits: Some(f64::INFINITY),
            ..ideal_features()
        };
        assert_eq!(score(&features), 0.0);
    }

    #[test]
    fn extreme_inputs_clamp_to_hundred() {
        let features = FeatureSubset {
            attendance: Some(-10_000.0),
            ..ideal_features()
        };
        assert_eq!(score(&features), 100.0);
        assert_eq!(assess(&features).level, RiskLevel::HighRisk);
    }

    #[test]
    fn explain_ranks_by_impact_and_truncates() {
        let factors = explain(&sample_student());
        assert_eq!(factors.len(), MAX_RISK_FACTORS);
        assert_eq!(factors[0].factor, "Assignment Submission");
        assert_eq!(factors[1].factor, "Attendance");
        assert_eq!(factors[2].factor, "Library Visits");
        assert_eq!(factors[3].factor, "Previous Semester GPA");
        assert_eq!(factors[4].factor, "Financial Aid Delay");
        assert!(factors
            .windows(2)
            .all(|pair| pair[0].impact >= pair[1].impact));
    }

    #[test]
    fn explain_lists_only_dimensions_worse_than_threshold() {
        assert!(explain(&ideal_student()).is_empty());

        let student = StudentRecord {
            attendance: 74.0,
            counselor_visits: 9,
            ..ideal_student()
        };
        let factors = explain(&student);
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor, "Attendance");
        assert_eq!(factors[0].current_value, "74.0%");
        assert!((factors[0].impact - 1.0 / 75.0 * 22.4).abs() < 1e-9);
    }

    #[test]
    fn explain_caps_financial_delay_impact() {
        let student = StudentRecord {
            financial_aid_delay_days: 120,
            ..ideal_student()
        };
        let factors = explain(&student);
        assert_eq!(factors.len(), 1);
        assert!((factors[0].impact - 9.8).abs() < 1e-9);
    }

    #[test]
    fn recommend_follows_rule_order_and_truncates() {
        let actions = recommend(&sample_student());
        assert_eq!(
            actions,
            vec![
                "Schedule attendance improvement meeting with student and parents",
                "Implement daily attendance tracking with counselor check-ins",
                "Assign peer mentor for assignment guidance and time management",
                "Enroll in academic skills workshop series",
            ]
        );
    }

    #[test]
    fn recommend_single_trigger() {
        assert!(recommend(&ideal_student()).is_empty());

        let student = StudentRecord {
            lab_participation: 60.0,
            ..ideal_student()
        };
        assert_eq!(
            recommend(&student),
            vec!["Provide additional lab session support and hands-on guidance"]
        );
    }

    #[test]
    fn moderate_peer_engagement_is_explained_but_not_acted_on() {
        let student = StudentRecord {
            peer_engagement: 5,
            ..ideal_student()
        };
        let factors = explain(&student);
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor, "Peer Engagement");
        assert_eq!(factors[0].current_value, "5/10");
        assert!(recommend(&student).is_empty());

        let isolated = StudentRecord {
            peer_engagement: 4,
            ..ideal_student()
        };
        assert_eq!(
            recommend(&isolated),
            vec![
                "Encourage participation in student clubs and peer support groups",
                "Assign to collaborative project teams to build social connections",
            ]
        );
    }

    #[test]
    fn feature_importance_weights_sum_to_hundred() {
        let all: f64 = FEATURE_IMPORTANCE.iter().map(|entry| entry.weight).sum();
        assert!((all - 100.0).abs() < 1e-9);

        let scored: f64 = FEATURE_IMPORTANCE
            .iter()
            .filter(|entry| entry.scored)
            .map(|entry| entry.weight)
            .sum();
        let factors: f64 = Factor::ALL.iter().map(|factor| factor.weight()).sum();
        assert!((scored - factors).abs() < 1e-9);
        assert_eq!(FEATURE_IMPORTANCE.iter().filter(|e| !e.scored).count(), 3);
    }

    fn arb_feature() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            Just(None),
            Just(Some(f64::NAN)),
            (-1_000.0f64..1_000.0).prop_map(Some),
        ]
    }

    fn arb_subset() -> impl Strategy<Value = FeatureSubset> {
        (
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
            arb_feature(),
        )
            .prop_map(|(a, b, c, d, e, f, g, h, i)| FeatureSubset {
                attendance: a,
                gpa: b,
                previous_semester_gpa: c,
                assignment_submission: d,
                library_visits: e,
                financial_aid_delay_days: f,
                counselor_visits: g,
                lab_participation: h,
                peer_engagement: i,
            })
    }

    proptest! {
        #[test]
        fn score_stays_in_range(features in arb_subset()) {
            let value = score(&features);
            prop_assert!((0.0..=100.0).contains(&value));
            prop_assert_eq!(value, score(&features));
        }

        #[test]
        fn score_non_decreasing_as_attendance_drops(
            features in arb_subset(),
            high in 0.0f64..100.0,
            drop in 0.0f64..100.0,
        ) {
            let better = FeatureSubset { attendance: Some(high), ..features.clone() };
            let worse = FeatureSubset { attendance: Some(high - drop), ..features };
            prop_assert!(score(&worse) >= score(&better));
        }

        #[test]
        fn score_non_decreasing_as_previous_gpa_drops(
            features in arb_subset(),
            high in 0.0f64..10.0,
            drop in 0.0f64..10.0,
        ) {
            let better = FeatureSubset { previous_semester_gpa: Some(high), ..features.clone() };
            let worse = FeatureSubset { previous_semester_gpa: Some(high - drop), ..features };
            prop_assert!(score(&worse) >= score(&better));
        }

        #[test]
        fn score_non_decreasing_as_engagement_metrics_drop(
            features in arb_subset(),
            submission in 0.0f64..100.0,
            library in 0.0f64..20.0,
            lab in 0.0f64..100.0,
            peer in 1.0f64..10.0,
            drop in 0.0f64..5.0,
        ) {
            let better = FeatureSubset {
                assignment_submission: Some(submission),
                library_visits: Some(library),
                lab_participation: Some(lab),
                peer_engagement: Some(peer),
                ..features.clone()
            };
            for worse in [
                FeatureSubset { assignment_submission: Some(submission - drop), ..better.clone() },
                FeatureSubset { library_visits: Some(library - drop), ..better.clone() },
                FeatureSubset { lab_participation: Some(lab - drop), ..better.clone() },
                FeatureSubset { peer_engagement: Some(peer - drop), ..better.clone() },
            ] {
                prop_assert!(score(&worse) >= score(&better));
            }
        }

        #[test]
        fn score_non_decreasing_as_delay_grows(
            features in arb_subset(),
            days in 0.0f64..200.0,
            extra in 0.0f64..200.0,
        ) {
            let sooner = FeatureSubset { financial_aid_delay_days: Some(days), ..features.clone() };
            let later = FeatureSubset { financial_aid_delay_days: Some(days + extra), ..features };
            prop_assert!(score(&later) >= score(&sooner));
        }
    }
}
