use crate::models::{Residence, RiskLevel, ScoredStudent, StudentRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub total: usize,
    pub high_risk: usize,
    pub at_risk: usize,
    pub low_risk: usize,
    pub avg_attendance: f64,
    pub avg_gpa: f64,
    pub engagement_rate: f64,
}

impl RiskSummary {
    pub fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::LowRisk => self.low_risk,
            RiskLevel::AtRisk => self.at_risk,
            RiskLevel::HighRisk => self.high_risk,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierCounts {
    pub high_risk: usize,
    pub at_risk: usize,
    pub low_risk: usize,
}

impl TierCounts {
    fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::LowRisk => self.low_risk += 1,
            RiskLevel::AtRisk => self.at_risk += 1,
            RiskLevel::HighRisk => self.high_risk += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high_risk + self.at_risk + self.low_risk
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentStats {
    pub department: String,
    pub tiers: TierCounts,
}

impl DepartmentStats {
    pub fn high_risk_share(&self) -> f64 {
        let total = self.tiers.total();
        if total == 0 {
            0.0
        } else {
            self.tiers.high_risk as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub label: String,
    pub high_risk: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemesterStats {
    pub semester: u32,
    pub high_risk: usize,
    pub at_risk: usize,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn summarize(students: &[StudentRecord]) -> RiskSummary {
    let mut tiers = TierCounts::default();
    for student in students {
        tiers.add(student.assess().level);
    }

    let mut summary = RiskSummary {
        total: students.len(),
        high_risk: tiers.high_risk,
        at_risk: tiers.at_risk,
        low_risk: tiers.low_risk,
        avg_attendance: mean(students.iter().map(|s| s.attendance)),
        avg_gpa: mean(students.iter().map(|s| s.gpa)),
        engagement_rate: 0.0,
    };
    summary.engagement_rate = 100.0 - summary.share(summary.high_risk);
    summary
}

/// Tier counts per department, in order of first appearance.
pub fn by_department(students: &[StudentRecord]) -> Vec<DepartmentStats> {
    let mut stats: Vec<DepartmentStats> = Vec::new();

    for student in students {
        let level = student.assess().level;
        match stats
            .iter_mut()
            .find(|entry| entry.department == student.department)
        {
            Some(entry) => entry.tiers.add(level),
            None => {
                let mut tiers = TierCounts::default();
                tiers.add(level);
                stats.push(DepartmentStats {
                    department: student.department.clone(),
                    tiers,
                });
            }
        }
    }

    stats
}

pub fn high_risk_by_gender(students: &[StudentRecord]) -> Vec<GroupCount> {
    ["Male", "Female"]
        .iter()
        .map(|gender| GroupCount {
            label: gender.to_string(),
            high_risk: students
                .iter()
                .filter(|s| s.gender.eq_ignore_ascii_case(gender))
                .filter(|s| s.assess().level == RiskLevel::HighRisk)
                .count(),
        })
        .collect()
}

pub fn high_risk_by_residence(students: &[StudentRecord]) -> Vec<GroupCount> {
    [Residence::Hostel, Residence::DayScholar]
        .iter()
        .map(|residence| GroupCount {
            label: residence.label().to_string(),
            high_risk: students
                .iter()
                .filter(|s| s.residence == *residence)
                .filter(|s| s.assess().level == RiskLevel::HighRisk)
                .count(),
        })
        .collect()
}

/// High and at-risk counts for semesters 1 through 8, omitting empty semesters.
pub fn by_semester(students: &[StudentRecord]) -> Vec<SemesterStats> {
    (1..=8)
        .map(|semester| {
            let mut tiers = TierCounts::default();
            for student in students.iter().filter(|s| s.semester == semester) {
                tiers.add(student.assess().level);
            }
            SemesterStats {
                semester,
                high_risk: tiers.high_risk,
                at_risk: tiers.at_risk,
            }
        })
        .filter(|stats| stats.high_risk + stats.at_risk > 0)
        .collect()
}

/// First `limit` high-risk students in collection order.
pub fn high_risk_students(students: &[StudentRecord], limit: usize) -> Vec<ScoredStudent<'_>> {
    students
        .iter()
        .map(StudentRecord::scored)
        .filter(|scored| scored.assessment.level == RiskLevel::HighRisk)
        .take(limit)
        .collect()
}
