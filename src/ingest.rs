use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::ImportError;
use crate::models::{FinancialAidStatus, Residence, StudentRecord};

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const TEMPLATE: &str = "\
name,student_id,department,semester,age,gender,attendance,gpa,assignment_submission,library_visits,financial_aid_status,financial_aid_delay_days,counselor_visits,lab_participation,peer_engagement,hostel_or_day_scholar,previous_semester_gpa
Rahul Kumar,CS2021001,Computer Science,5,20,Male,58,6.2,45,2,delayed,30,0,60,4,hostel,6.8
Priya Sharma,ME2022015,Mechanical Engineering,3,19,Female,92,8.5,95,12,current,0,2,90,8,day_scholar,8.2
Amit Patel,EC2021023,Electronics,6,21,Male,75,7.5,80,8,current,0,2,85,7,hostel,7.5
";

/// Target fields of an uploaded row, each with its header aliases in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    StudentId,
    Department,
    Semester,
    Age,
    Gender,
    Attendance,
    Gpa,
    AssignmentSubmission,
    LibraryVisits,
    PreviousSemesterGpa,
    FinancialAidStatus,
    FinancialAidDelayDays,
    CounselorVisits,
    LabParticipation,
    PeerEngagement,
    Residence,
}

impl Field {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["name", "student_name", "full_name"],
            Field::StudentId => &["student_id", "roll_number", "id", "enrollment_no"],
            Field::Department => &["department", "dept", "branch", "stream"],
            Field::Semester => &["semester", "sem"],
            Field::Age => &["age"],
            Field::Gender => &["gender"],
            Field::Attendance => &["attendance", "attendance_percentage", "att_percent"],
            Field::Gpa => &["gpa", "cgpa", "grade", "grade_point"],
            Field::AssignmentSubmission => &["assignment_submission", "assignments"],
            Field::LibraryVisits => &["library_visits", "library"],
            Field::PreviousSemesterGpa => &["previous_semester_gpa", "previous_gpa", "prev_gpa"],
            Field::FinancialAidStatus => &["financial_aid_status"],
            Field::FinancialAidDelayDays => &["financial_aid_delay_days"],
            Field::CounselorVisits => &["counselor_visits"],
            Field::LabParticipation => &["lab_participation"],
            Field::PeerEngagement => &["peer_engagement"],
            Field::Residence => &["hostel_or_day_scholar"],
        }
    }
}

/// Lenient conversion from a cell. `None` means "use the default".
pub trait Coerce: Sized {
    fn coerce(raw: &str) -> Option<Self>;
}

impl Coerce for String {
    fn coerce(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl Coerce for f64 {
    fn coerce(raw: &str) -> Option<Self> {
        leading_float(raw)
    }
}

impl Coerce for u32 {
    fn coerce(raw: &str) -> Option<Self> {
        leading_integer(raw).and_then(|value| u32::try_from(value).ok())
    }
}

impl Coerce for FinancialAidStatus {
    fn coerce(raw: &str) -> Option<Self> {
        FinancialAidStatus::parse(raw)
    }
}

impl Coerce for Residence {
    fn coerce(raw: &str) -> Option<Self> {
        if raw.to_ascii_lowercase().contains("hostel") {
            Some(Residence::Hostel)
        } else {
            Some(Residence::DayScholar)
        }
    }
}

fn leading_float(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if let Ok(value) = text.parse::<f64>() {
        return Some(value).filter(|v| v.is_finite());
    }

    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !text[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    // Exponent only counts when digits follow it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn leading_integer(raw: &str) -> Option<i64> {
    let text = raw.trim();
    let mut end = 0;
    for (index, ch) in text.char_indices() {
        match ch {
            '+' | '-' if index == 0 => {}
            '0'..='9' => {}
            _ => break,
        }
        end = index + ch.len_utf8();
    }
    text[..end].parse::<i64>().ok()
}

/// One uploaded row keyed by lower-cased header.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cells = HashMap::new();
        for (header, value) in pairs {
            cells
                .entry(header.as_ref().trim().to_ascii_lowercase())
                .or_insert_with(|| value.as_ref().trim().to_string());
        }
        Self { cells }
    }

    fn cell(&self, header: &str) -> Option<&str> {
        self.cells
            .get(header)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// First alias whose cell is present and coerces cleanly.
    pub fn value<T: Coerce>(&self, field: Field) -> Option<T> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.cell(alias).and_then(T::coerce))
    }

    pub fn value_or<T: Coerce>(&self, field: Field, default: T) -> T {
        self.value(field).unwrap_or(default)
    }
}

/// Builds a record from an uploaded row. Never fails: anything missing or
/// unparseable takes its documented default.
pub fn map_row(row: &RawRow, ordinal: usize) -> StudentRecord {
    let gpa = row.value_or(Field::Gpa, 7.5);

    StudentRecord {
        id: ordinal.to_string(),
        name: row.value_or(Field::Name, format!("Student {ordinal}")),
        student_id: row.value_or(Field::StudentId, format!("STU{ordinal}")),
        department: row.value_or(Field::Department, "Unknown".to_string()),
        semester: row.value_or(Field::Semester, 1),
        age: row.value_or(Field::Age, 20),
        gender: row.value_or(Field::Gender, "Male".to_string()),
        residence: row.value_or(Field::Residence, Residence::DayScholar),
        financial_aid_status: row.value_or(Field::FinancialAidStatus, FinancialAidStatus::Current),
        attendance: row.value_or(Field::Attendance, 75.0),
        gpa,
        previous_semester_gpa: row.value_or(Field::PreviousSemesterGpa, gpa),
        assignment_submission: row.value_or(Field::AssignmentSubmission, 80.0),
        library_visits: row.value_or(Field::LibraryVisits, 8),
        financial_aid_delay_days: row.value_or(Field::FinancialAidDelayDays, 0),
        counselor_visits: row.value_or(Field::CounselorVisits, 2),
        lab_participation: row.value_or(Field::LabParticipation, 85.0),
        peer_engagement: row.value_or(Field::PeerEngagement, 7),
        last_updated: Utc::now(),
    }
}

pub fn validate_upload(path: &Path, size: u64) -> Result<(), ImportError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if !name.to_ascii_lowercase().ends_with(".csv") {
        return Err(ImportError::UnsupportedExtension { name });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ImportError::TooLarge { size });
    }
    Ok(())
}

pub fn parse_csv<R: Read>(input: R) -> Result<Vec<StudentRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let mut students = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = RawRow::new(headers.iter().zip(record.iter()));
        students.push(map_row(&row, index + 1));
    }

    if students.is_empty() {
        return Err(ImportError::Empty);
    }

    debug!(rows = students.len(), "mapped uploaded rows");
    Ok(students)
}

pub fn read_csv(path: &Path) -> Result<Vec<StudentRecord>, ImportError> {
    let size = std::fs::metadata(path)?.len();
    validate_upload(path, size)?;

    let students = parse_csv(File::open(path)?)?;
    info!(path = %path.display(), rows = students.len(), "parsed student upload");
    Ok(students)
}
