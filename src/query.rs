use std::cmp::Ordering;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::models::{RiskLevel, ScoredStudent, StudentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    RiskScore,
    Name,
    StudentId,
    Department,
    Semester,
    Attendance,
    Gpa,
}

#[derive(Debug, Clone)]
pub struct StudentQuery {
    pub search: Option<String>,
    pub departments: Vec<String>,
    pub risk_levels: Vec<RiskLevel>,
    pub sort: SortField,
    pub descending: bool,
    pub page: usize,
    pub page_size: usize,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            search: None,
            departments: Vec::new(),
            risk_levels: Vec::new(),
            sort: SortField::RiskScore,
            descending: true,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StudentQuery {
    fn matches(&self, scored: &ScoredStudent<'_>) -> bool {
        let student = scored.record;

        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = student.name.to_lowercase().contains(&needle)
                || student.student_id.to_lowercase().contains(&needle)
                || student.department.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if !self.departments.is_empty()
            && !self
                .departments
                .iter()
                .any(|dept| dept.eq_ignore_ascii_case(&student.department))
        {
            return false;
        }

        self.risk_levels.is_empty() || self.risk_levels.contains(&scored.assessment.level)
    }
}

fn compare(a: &ScoredStudent<'_>, b: &ScoredStudent<'_>, field: SortField) -> Ordering {
    match field {
        SortField::RiskScore => a
            .assessment
            .score
            .partial_cmp(&b.assessment.score)
            .unwrap_or(Ordering::Equal),
        SortField::Name => a.record.name.cmp(&b.record.name),
        SortField::StudentId => a.record.student_id.cmp(&b.record.student_id),
        SortField::Department => a.record.department.cmp(&b.record.department),
        SortField::Semester => a.record.semester.cmp(&b.record.semester),
        SortField::Attendance => a
            .record
            .attendance
            .partial_cmp(&b.record.attendance)
            .unwrap_or(Ordering::Equal),
        SortField::Gpa => a
            .record
            .gpa
            .partial_cmp(&b.record.gpa)
            .unwrap_or(Ordering::Equal),
    }
}

#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub rows: Vec<ScoredStudent<'a>>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl Page<'_> {
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// 1-based position of the first row on this page, 0 when nothing matched.
    pub fn first_position(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    pub fn last_position(&self) -> usize {
        ((self.page - 1) * self.page_size + self.rows.len()).min(self.total)
    }
}

pub fn run<'a>(students: &'a [StudentRecord], query: &StudentQuery) -> Page<'a> {
    let page_size = query.page_size.max(1);

    let mut matched: Vec<ScoredStudent<'a>> = students
        .iter()
        .map(StudentRecord::scored)
        .filter(|scored| query.matches(scored))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort);
        if query.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let total = matched.len();
    let last_page = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, last_page);
    let rows = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        rows,
        total,
        page,
        page_size,
    }
}

/// Distinct departments in order of first appearance.
pub fn departments(students: &[StudentRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for student in students {
        if !seen.contains(&student.department.as_str()) {
            seen.push(&student.department);
        }
    }
    seen
}
