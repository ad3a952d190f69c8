use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Residence {
    Hostel,
    DayScholar,
}

impl Residence {
    pub fn as_str(self) -> &'static str {
        match self {
            Residence::Hostel => "hostel",
            Residence::DayScholar => "day_scholar",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Residence::Hostel => "Hostel",
            Residence::DayScholar => "Day Scholar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialAidStatus {
    Current,
    Delayed,
    #[serde(rename = "none")]
    NotApplicable,
}

impl FinancialAidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FinancialAidStatus::Current => "current",
            FinancialAidStatus::Delayed => "delayed",
            FinancialAidStatus::NotApplicable => "none",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "current" => Some(FinancialAidStatus::Current),
            "delayed" => Some(FinancialAidStatus::Delayed),
            "none" => Some(FinancialAidStatus::NotApplicable),
            _ => None,
        }
    }
}

/// A student as stored in the collection. Risk score, tier and colour are not
/// fields here: they are recomputed from the scoring inputs on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub student_id: String,
    pub department: String,
    pub semester: u32,
    pub age: u32,
    pub gender: String,
    pub residence: Residence,
    pub financial_aid_status: FinancialAidStatus,
    pub attendance: f64,
    pub gpa: f64,
    pub previous_semester_gpa: f64,
    pub assignment_submission: f64,
    pub library_visits: u32,
    pub financial_aid_delay_days: u32,
    pub counselor_visits: u32,
    pub lab_participation: f64,
    pub peer_engagement: u32,
    pub last_updated: DateTime<Utc>,
}

impl StudentRecord {
    pub fn features(&self) -> FeatureSubset {
        FeatureSubset {
            attendance: Some(self.attendance),
            gpa: Some(self.gpa),
            previous_semester_gpa: Some(self.previous_semester_gpa),
            assignment_submission: Some(self.assignment_submission),
            library_visits: Some(f64::from(self.library_visits)),
            financial_aid_delay_days: Some(f64::from(self.financial_aid_delay_days)),
            counselor_visits: Some(f64::from(self.counselor_visits)),
            lab_participation: Some(self.lab_participation),
            peer_engagement: Some(f64::from(self.peer_engagement)),
        }
    }

    pub fn assess(&self) -> RiskAssessment {
        risk::assess(&self.features())
    }

    pub fn scored(&self) -> ScoredStudent<'_> {
        ScoredStudent {
            record: self,
            assessment: self.assess(),
        }
    }
}

/// Scoring inputs where any field may be absent. Absent and non-finite values
/// resolve to the neutral defaults in [`risk`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSubset {
    pub attendance: Option<f64>,
    pub gpa: Option<f64>,
    pub previous_semester_gpa: Option<f64>,
    pub assignment_submission: Option<f64>,
    pub library_visits: Option<f64>,
    pub financial_aid_delay_days: Option<f64>,
    pub counselor_visits: Option<f64>,
    pub lab_participation: Option<f64>,
    pub peer_engagement: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum RiskLevel {
    LowRisk,
    AtRisk,
    HighRisk,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "Low Risk",
            RiskLevel::AtRisk => "At Risk",
            RiskLevel::HighRisk => "High Risk",
        }
    }

    pub fn color(self) -> RiskColor {
        match self {
            RiskLevel::LowRisk => RiskColor::Green,
            RiskLevel::AtRisk => RiskColor::Orange,
            RiskLevel::HighRisk => RiskColor::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskColor {
    Green,
    Orange,
    Red,
}

impl RiskColor {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskColor::Green => "green",
            RiskColor::Orange => "orange",
            RiskColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
}

impl RiskAssessment {
    pub fn color(&self) -> RiskColor {
        self.level.color()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredStudent<'a> {
    pub record: &'a StudentRecord,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskFactor {
    pub factor: &'static str,
    pub current_value: String,
    pub expected_value: &'static str,
    pub impact: f64,
}
