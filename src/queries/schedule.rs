use std::collections::HashMap;

use crate::models::{Meeting, ScheduleRow, SectionId, SectionWithMeetings};

/// Collapse one-row-per-meeting into one entry per enrolled section, in the
/// order sections first appear. Rows with null meeting columns yield a
/// section with no meetings.
pub fn group_schedule(rows: Vec<ScheduleRow>) -> Vec<SectionWithMeetings> {
    let mut sections: Vec<SectionWithMeetings> = Vec::new();
    let mut index: HashMap<SectionId, usize> = HashMap::new();

    for row in rows {
        let meeting = match (row.day_of_week, row.start_time, row.end_time) {
            (Some(day), Some(start), Some(end)) => Some(Meeting::new(day, start, end)),
            _ => None,
        };

        let i = *index.entry(row.section_id).or_insert_with(|| {
            sections.push(SectionWithMeetings {
                section_id: row.section_id,
                section_code: row.section_code,
                course_code: row.course_code,
                course_title: row.course_title,
                credits: row.credits,
                instructor_name: row.instructor_name,
                meetings: Vec::new(),
            });
            sections.len() - 1
        });

        if let Some(meeting) = meeting {
            sections[i].meetings.push(meeting);
        }
    }

    sections
}
