use std::fmt::Write;

use chrono::NaiveDate;

use crate::analytics;
use crate::models::{RiskLevel, ScoredStudent, StudentRecord};
use crate::query::Page;
use crate::risk::{self, FEATURE_IMPORTANCE};
use crate::simulate::Simulation;

pub const PREVIEW_ROWS: usize = 10;

fn student_line(scored: &ScoredStudent<'_>) -> String {
    let student = scored.record;
    format!(
        "- {} ({}, {}) score {:.2} [{}]",
        student.name,
        student.student_id,
        student.department,
        scored.assessment.score,
        scored.assessment.level.label()
    )
}

pub fn render_dashboard(students: &[StudentRecord]) -> String {
    let summary = analytics::summarize(students);
    let mut output = String::new();

    let _ = writeln!(output, "# Dashboard");
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total Students: {}", summary.total);
    let _ = writeln!(
        output,
        "- High Risk Students: {} ({:.1}% of total)",
        summary.high_risk,
        summary.share(summary.high_risk)
    );
    let _ = writeln!(output, "- Average Attendance: {:.1}%", summary.avg_attendance);
    let _ = writeln!(output, "- Engagement Rate: {:.1}%", summary.engagement_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Distribution");
    for level in [RiskLevel::LowRisk, RiskLevel::AtRisk, RiskLevel::HighRisk] {
        let count = summary.count(level);
        let _ = writeln!(
            output,
            "- {}: {} ({:.0}%)",
            level.label(),
            count,
            summary.share(count)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Department Risk");
    let departments = analytics::by_department(students);
    if departments.is_empty() {
        let _ = writeln!(output, "No students loaded.");
    } else {
        for stats in departments.iter() {
            let _ = writeln!(
                output,
                "- {}: {} of {} high risk ({:.1}%)",
                stats.department,
                stats.tiers.high_risk,
                stats.tiers.total(),
                stats.high_risk_share()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## High Risk Students");
    let flagged = analytics::high_risk_students(students, 5);
    if flagged.is_empty() {
        let _ = writeln!(output, "No high-risk students.");
    } else {
        for scored in flagged.iter() {
            let _ = writeln!(output, "{}", student_line(scored));
        }
    }

    output
}

pub fn render_list(page: &Page<'_>) -> String {
    let mut output = String::new();

    if page.rows.is_empty() {
        let _ = writeln!(output, "No students match these filters.");
        return output;
    }

    let _ = writeln!(
        output,
        "{:<6} {:<12} {:<22} {:<24} {:>3} {:>7} {:>5} {:>6}  {}",
        "ID", "Student ID", "Name", "Department", "Sem", "Attend", "GPA", "Score", "Level"
    );
    for scored in page.rows.iter() {
        let student = scored.record;
        let _ = writeln!(
            output,
            "{:<6} {:<12} {:<22} {:<24} {:>3} {:>6.1}% {:>5.2} {:>6.1}  {}",
            student.id,
            student.student_id,
            student.name,
            student.department,
            student.semester,
            student.attendance,
            student.gpa,
            scored.assessment.score,
            scored.assessment.level.label()
        );
    }
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Showing {} to {} of {} students (page {} of {})",
        page.first_position(),
        page.last_position(),
        page.total,
        page.page,
        page.total_pages()
    );

    output
}

pub fn render_detail(student: &StudentRecord) -> String {
    let assessment = student.assess();
    let mut output = String::new();

    let _ = writeln!(output, "# {} ({})", student.name, student.student_id);
    let _ = writeln!(
        output,
        "{} · Semester {} · Age {} · {} · {}",
        student.department,
        student.semester,
        student.age,
        student.gender,
        student.residence.label()
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Risk score {:.1} ({}, {})",
        assessment.score,
        assessment.level.label(),
        assessment.color().as_str()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Metrics");
    let _ = writeln!(output, "- Attendance: {:.1}%", student.attendance);
    let _ = writeln!(
        output,
        "- GPA: {:.2} (previous semester {:.2})",
        student.gpa, student.previous_semester_gpa
    );
    let _ = writeln!(
        output,
        "- Assignment Submission: {:.1}%",
        student.assignment_submission
    );
    let _ = writeln!(output, "- Library Visits: {}/month", student.library_visits);
    let _ = writeln!(
        output,
        "- Financial Aid: {} ({} days delay)",
        student.financial_aid_status.as_str(),
        student.financial_aid_delay_days
    );
    let _ = writeln!(output, "- Counselor Visits: {}", student.counselor_visits);
    let _ = writeln!(output, "- Lab Participation: {:.1}%", student.lab_participation);
    let _ = writeln!(output, "- Peer Engagement: {}/10", student.peer_engagement);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Breakdown");
    for part in risk::contributions(&student.features()) {
        let _ = writeln!(
            output,
            "- {}: {:.2} of {}",
            part.factor.label(),
            part.value,
            part.factor.weight()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Risk Factors");
    let factors = risk::explain(student);
    if factors.is_empty() {
        let _ = writeln!(output, "No factors below their reference values.");
    } else {
        for factor in factors.iter() {
            let _ = writeln!(
                output,
                "- {}: {} (expected {}), impact {:.2}",
                factor.factor, factor.current_value, factor.expected_value, factor.impact
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommended Interventions");
    let actions = risk::recommend(student);
    if actions.is_empty() {
        let _ = writeln!(output, "No interventions needed.");
    } else {
        for (index, action) in actions.iter().enumerate() {
            let _ = writeln!(output, "{}. {}", index + 1, action);
        }
    }

    output
}

pub fn render_not_found(key: &str) -> String {
    format!("Student not found: {key}\n")
}

pub fn render_simulation(simulation: &Simulation) -> String {
    let mut output = String::new();
    let student = &simulation.student;

    let _ = writeln!(output, "# What-if for {} ({})", student.name, student.student_id);
    let _ = writeln!(
        output,
        "Current: {:.1} ({})",
        simulation.baseline.score,
        simulation.baseline.level.label()
    );
    let _ = writeln!(
        output,
        "Simulated: {:.1} ({})",
        simulation.simulated.score,
        simulation.simulated.level.label()
    );

    let improvement = simulation.improvement();
    if improvement > 0.0 {
        match simulation.relative_improvement() {
            Some(relative) => {
                let _ = writeln!(
                    output,
                    "Risk score improved by {:.1} points ({:.1}%)",
                    improvement, relative
                );
            }
            None => {
                let _ = writeln!(output, "Risk score improved by {:.1} points", improvement);
            }
        }
    } else if improvement < 0.0 {
        let _ = writeln!(output, "Risk score increased by {:.1} points", improvement.abs());
    } else {
        let _ = writeln!(output, "Risk score unchanged");
    }

    if simulation.tier_changed() {
        let _ = writeln!(
            output,
            "Student moves from {} to {}",
            simulation.baseline.level.label(),
            simulation.simulated.level.label()
        );
    }

    output
}

pub fn render_analytics(students: &[StudentRecord]) -> String {
    let summary = analytics::summarize(students);
    let mut output = String::new();

    let _ = writeln!(output, "# Analytics");
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total Students: {}", summary.total);
    let _ = writeln!(
        output,
        "- High Risk Students: {} ({:.1}% of total)",
        summary.high_risk,
        summary.share(summary.high_risk)
    );
    let _ = writeln!(output, "- Average Attendance: {:.1}%", summary.avg_attendance);
    let _ = writeln!(output, "- Average GPA: {:.2}", summary.avg_gpa);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Feature Importance");
    for entry in FEATURE_IMPORTANCE.iter() {
        let note = if entry.scored { "" } else { " (not scored)" };
        let _ = writeln!(output, "- {}: {}{}", entry.feature, entry.weight, note);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Department Comparison");
    for stats in analytics::by_department(students).iter() {
        let _ = writeln!(
            output,
            "- {}: {} high, {} at risk, {} low",
            stats.department, stats.tiers.high_risk, stats.tiers.at_risk, stats.tiers.low_risk
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## High Risk by Gender");
    for group in analytics::high_risk_by_gender(students).iter() {
        let _ = writeln!(output, "- {}: {}", group.label, group.high_risk);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## High Risk by Residence");
    for group in analytics::high_risk_by_residence(students).iter() {
        let _ = writeln!(output, "- {}: {}", group.label, group.high_risk);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk by Semester");
    let semesters = analytics::by_semester(students);
    if semesters.is_empty() {
        let _ = writeln!(output, "No high-risk or at-risk students.");
    } else {
        for stats in semesters.iter() {
            let _ = writeln!(
                output,
                "- Sem {}: {} high, {} at risk",
                stats.semester, stats.high_risk, stats.at_risk
            );
        }
    }

    output
}

pub fn render_import_preview(students: &[StudentRecord]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} students found", students.len());
    let _ = writeln!(output, "Preview (first {} rows):", PREVIEW_ROWS.min(students.len()));
    for student in students.iter().take(PREVIEW_ROWS) {
        let _ = writeln!(output, "{}", student_line(&student.scored()));
    }
    output
}

/// Nests a rendered page one heading level deeper under `title`.
fn demote(page: &str, title: &str) -> String {
    let body = page.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    format!("## {title}\n{}", body.replace("\n## ", "\n### "))
}

pub fn build_report(students: &[StudentRecord], generated_on: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Early Signal Report");
    let _ = writeln!(output, "Generated on {} for {} students", generated_on, students.len());
    let _ = writeln!(output);
    output.push_str(&demote(&render_dashboard(students), "Overview"));
    let _ = writeln!(output);
    output.push_str(&demote(&render_analytics(students), "Analytics"));

    let mut ranked: Vec<ScoredStudent<'_>> = students.iter().map(StudentRecord::scored).collect();
    ranked.sort_by(|a, b| {
        b.assessment
            .score
            .partial_cmp(&a.assessment.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");
    if ranked.is_empty() {
        let _ = writeln!(output, "No students loaded.");
    } else {
        for scored in ranked.iter().take(10) {
            let _ = writeln!(output, "{}", student_line(scored));
            for action in risk::recommend(scored.record).iter() {
                let _ = writeln!(output, "  - {}", action);
            }
        }
    }

    output
}
