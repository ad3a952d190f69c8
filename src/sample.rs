use chrono::Utc;
use rand::Rng;

use crate::models::{FinancialAidStatus, Residence, StudentRecord};

pub const SAMPLE_NAMES: [&str; 20] = [
    "Rahul Kumar",
    "Priya Sharma",
    "Amit Patel",
    "Ananya Singh",
    "Arjun Reddy",
    "Divya Gupta",
    "Karan Malhotra",
    "Meera Iyer",
    "Neha Verma",
    "Rohan Desai",
    "Sneha Kapoor",
    "Vikram Shah",
    "Anjali Nair",
    "Aditya Joshi",
    "Kavya Rao",
    "Siddharth Mehta",
    "Pooja Saxena",
    "Ravi Pillai",
    "Ishita Bose",
    "Varun Khanna",
];

pub const DEPARTMENTS: [&str; 5] = [
    "Computer Science",
    "Mechanical Engineering",
    "Electronics",
    "Civil Engineering",
    "MBA",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskProfile {
    High,
    AtRisk,
    Low,
}

struct ProfileMetrics {
    attendance: f64,
    gpa: f64,
    previous_semester_gpa: f64,
    assignment_submission: f64,
    library_visits: u32,
    financial_aid_delay_days: u32,
    counselor_visits: u32,
    lab_participation: f64,
    peer_engagement: u32,
}

fn profile_metrics<R: Rng>(rng: &mut R, profile: RiskProfile) -> ProfileMetrics {
    match profile {
        RiskProfile::High => ProfileMetrics {
            attendance: rng.gen_range(45.0..65.0),
            gpa: rng.gen_range(5.0..6.5),
            previous_semester_gpa: rng.gen_range(5.0..6.8),
            assignment_submission: rng.gen_range(30.0..55.0),
            library_visits: rng.gen_range(0..3),
            financial_aid_delay_days: if rng.gen_bool(0.5) {
                rng.gen_range(20..60)
            } else {
                0
            },
            counselor_visits: rng.gen_range(0..2),
            lab_participation: rng.gen_range(40.0..65.0),
            peer_engagement: rng.gen_range(1..5),
        },
        RiskProfile::AtRisk => ProfileMetrics {
            attendance: rng.gen_range(65.0..80.0),
            gpa: rng.gen_range(6.5..7.7),
            previous_semester_gpa: rng.gen_range(6.2..7.7),
            assignment_submission: rng.gen_range(60.0..80.0),
            library_visits: rng.gen_range(4..9),
            financial_aid_delay_days: if rng.gen_bool(0.3) {
                rng.gen_range(10..30)
            } else {
                0
            },
            counselor_visits: rng.gen_range(1..4),
            lab_participation: rng.gen_range(65.0..80.0),
            peer_engagement: rng.gen_range(4..7),
        },
        RiskProfile::Low => ProfileMetrics {
            attendance: rng.gen_range(85.0..100.0),
            gpa: rng.gen_range(7.8..10.0),
            previous_semester_gpa: rng.gen_range(7.5..10.0),
            assignment_submission: rng.gen_range(85.0..100.0),
            library_visits: rng.gen_range(8..16),
            financial_aid_delay_days: 0,
            counselor_visits: rng.gen_range(1..4),
            lab_participation: rng.gen_range(85.0..100.0),
            peer_engagement: rng.gen_range(7..10),
        },
    }
}

pub fn create_student<R: Rng>(
    rng: &mut R,
    ordinal: usize,
    name: &str,
    department: &str,
    profile: RiskProfile,
) -> StudentRecord {
    let metrics = profile_metrics(rng, profile);
    let prefix: String = department.chars().take(2).collect::<String>().to_uppercase();
    let intake_year = 2020 + rng.gen_range(0..4);

    StudentRecord {
        id: ordinal.to_string(),
        name: name.to_string(),
        student_id: format!("{prefix}{intake_year}{ordinal:03}"),
        department: department.to_string(),
        semester: rng.gen_range(1..=8),
        age: rng.gen_range(18..23),
        gender: if rng.gen_bool(0.6) { "Male" } else { "Female" }.to_string(),
        residence: if rng.gen_bool(0.4) {
            Residence::Hostel
        } else {
            Residence::DayScholar
        },
        financial_aid_status: if metrics.financial_aid_delay_days > 0 {
            FinancialAidStatus::Delayed
        } else {
            FinancialAidStatus::Current
        },
        attendance: metrics.attendance,
        gpa: metrics.gpa,
        previous_semester_gpa: metrics.previous_semester_gpa,
        assignment_submission: metrics.assignment_submission,
        library_visits: metrics.library_visits,
        financial_aid_delay_days: metrics.financial_aid_delay_days,
        counselor_visits: metrics.counselor_visits,
        lab_participation: metrics.lab_participation,
        peer_engagement: metrics.peer_engagement,
        last_updated: Utc::now(),
    }
}

/// Twenty students: six high-risk, eight at-risk and six low-risk archetypes,
/// departments assigned round-robin.
pub fn generate<R: Rng>(rng: &mut R) -> Vec<StudentRecord> {
    SAMPLE_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let profile = match index {
                0..=5 => RiskProfile::High,
                6..=13 => RiskProfile::AtRisk,
                _ => RiskProfile::Low,
            };
            let department = DEPARTMENTS[index % DEPARTMENTS.len()];
            create_student(rng, index + 1, name, department, profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_twenty_students_with_sequential_ids() {
        let students = generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(students.len(), 20);
        for (index, student) in students.iter().enumerate() {
            assert_eq!(student.id, (index + 1).to_string());
            assert_eq!(student.name, SAMPLE_NAMES[index]);
            assert_eq!(student.department, DEPARTMENTS[index % DEPARTMENTS.len()]);
            assert!((1..=8).contains(&student.semester));
            assert!((18..23).contains(&student.age));
            assert!((1..=10).contains(&student.peer_engagement));
        }
        assert!(students[0].student_id.starts_with("CO"));
        assert!(students[0].student_id.ends_with("001"));
    }

    #[test]
    fn archetypes_land_in_expected_tiers() {
        for seed in 0..20 {
            let students = generate(&mut StdRng::seed_from_u64(seed));
            let high_floor = students[..6]
                .iter()
                .map(|student| student.assess().score)
                .fold(f64::INFINITY, f64::min);
            for student in &students[14..] {
                let assessment = student.assess();
                assert_eq!(assessment.level, RiskLevel::LowRisk);
                assert!(assessment.score < high_floor);
            }
        }
    }

    #[test]
    fn same_seed_same_collection() {
        let mut first = generate(&mut StdRng::seed_from_u64(9));
        let mut second = generate(&mut StdRng::seed_from_u64(9));
        for student in first.iter_mut().chain(second.iter_mut()) {
            student.last_updated = chrono::DateTime::<Utc>::default();
        }
        assert_eq!(first, second);
    }

    #[test]
    fn delay_and_status_agree() {
        let students = generate(&mut StdRng::seed_from_u64(3));
        for student in &students {
            let delayed = student.financial_aid_status == FinancialAidStatus::Delayed;
            assert_eq!(delayed, student.financial_aid_delay_days > 0);
        }
    }
}
