use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::models::StudentRecord;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    name: &'a str,
    student_id: &'a str,
    department: &'a str,
    semester: u32,
    age: u32,
    gender: &'a str,
    attendance: f64,
    gpa: f64,
    assignment_submission: f64,
    library_visits: u32,
    financial_aid_status: &'a str,
    financial_aid_delay_days: u32,
    counselor_visits: u32,
    lab_participation: f64,
    peer_engagement: u32,
    hostel_or_day_scholar: &'a str,
    previous_semester_gpa: f64,
    risk_score: f64,
    risk_level: &'static str,
}

impl<'a> From<&'a StudentRecord> for ExportRow<'a> {
    fn from(student: &'a StudentRecord) -> Self {
        let assessment = student.assess();
        Self {
            id: &student.id,
            name: &student.name,
            student_id: &student.student_id,
            department: &student.department,
            semester: student.semester,
            age: student.age,
            gender: &student.gender,
            attendance: student.attendance,
            gpa: student.gpa,
            assignment_submission: student.assignment_submission,
            library_visits: student.library_visits,
            financial_aid_status: student.financial_aid_status.as_str(),
            financial_aid_delay_days: student.financial_aid_delay_days,
            counselor_visits: student.counselor_visits,
            lab_participation: student.lab_participation,
            peer_engagement: student.peer_engagement,
            hostel_or_day_scholar: student.residence.as_str(),
            previous_semester_gpa: student.previous_semester_gpa,
            risk_score: assessment.score,
            risk_level: assessment.level.label(),
        }
    }
}

/// Writes one row per student with a header row. Column names are accepted by
/// the upload mapper, so an export can be uploaded again unchanged.
pub fn write_csv<'a, W, I>(output: W, students: I) -> anyhow::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let mut writer = csv::Writer::from_writer(output);
    let mut written = 0usize;

    for student in students {
        writer.serialize(ExportRow::from(student))?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

pub fn write_csv_file<'a, I>(path: &Path, students: I) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, students)
}
