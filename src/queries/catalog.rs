//! Catalog nesting: flat join rows → departments → courses → sections

use std::collections::HashMap;

use crate::models::{CatalogCourse, CatalogDepartment, CatalogRow, CatalogSection};

/// Groups rows by department (first-seen order), then course within the
/// department (first-seen order), keeping section rows in row order.
/// Null course/section columns contribute nothing at that level.
pub fn nest_catalog(rows: Vec<CatalogRow>) -> Vec<CatalogDepartment> {
    let mut departments: Vec<CatalogDepartment> = Vec::new();
    let mut dept_index: HashMap<i32, usize> = HashMap::new();
    let mut course_index: HashMap<(i32, i32), usize> = HashMap::new();

    for row in rows {
        let d = *dept_index.entry(row.dept_id).or_insert_with(|| {
            departments.push(CatalogDepartment {
                dept_id: row.dept_id,
                dept_code: row.dept_code.clone(),
                dept_name: row.dept_name.clone(),
                courses: Vec::new(),
            });
            departments.len() - 1
        });

        let Some(course_id) = row.course_id else {
            continue;
        };
        let courses = &mut departments[d].courses;
        let c = *course_index
            .entry((row.dept_id, course_id))
            .or_insert_with(|| {
                courses.push(CatalogCourse {
                    course_id,
                    course_code: row.course_code.clone().unwrap_or_default(),
                    course_title: row.course_title.clone().unwrap_or_default(),
                    credits: row.credits.unwrap_or_default(),
                    sections: Vec::new(),
                });
                courses.len() - 1
            });

        let Some(section_id) = row.section_id else {
            continue;
        };
        courses[c].sections.push(CatalogSection {
            section_id,
            section_code: row.section_code.unwrap_or_default(),
            capacity: row.capacity.unwrap_or_default(),
            remaining_slots: row.remaining_slots.unwrap_or_default(),
            instructor_name: row.instructor_name,
        });
    }

    departments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept_only(dept_id: i32, code: &str) -> CatalogRow {
        CatalogRow {
            dept_id,
            dept_code: code.into(),
            dept_name: format!("{} Department", code),
            course_id: None,
            course_code: None,
            course_title: None,
            credits: None,
            section_id: None,
            section_code: None,
            capacity: None,
            remaining_slots: None,
            instructor_name: None,
        }
    }

    fn course_only(dept_id: i32, course_id: i32) -> CatalogRow {
        CatalogRow {
            course_id: Some(course_id),
            course_code: Some(format!("C{}", course_id)),
            course_title: Some(format!("Course {}", course_id)),
            credits: Some(3),
            ..dept_only(dept_id, "D")
        }
    }

    fn with_section(dept_id: i32, course_id: i32, section_id: i32) -> CatalogRow {
        CatalogRow {
            section_id: Some(section_id),
            section_code: Some(format!("S{}", section_id)),
            capacity: Some(30),
            remaining_slots: Some(12),
            instructor_name: Some("Ada Lovelace".into()),
            ..course_only(dept_id, course_id)
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let rows = vec![
            with_section(2, 20, 200),
            with_section(1, 10, 100),
            with_section(2, 21, 210),
            with_section(2, 20, 201),
        ];

        let catalog = nest_catalog(rows);

        assert_eq!(
            catalog.iter().map(|d| d.dept_id).collect::<Vec<_>>(),
            vec![2, 1]
        );
        let courses: Vec<_> = catalog[0].courses.iter().map(|c| c.course_id).collect();
        assert_eq!(courses, vec![20, 21]);
        let sections: Vec<_> = catalog[0].courses[0]
            .sections
            .iter()
            .map(|s| s.section_id)
            .collect();
        assert_eq!(sections, vec![200, 201]);
    }

    #[test]
    fn department_without_courses_has_empty_list() {
        let catalog = nest_catalog(vec![dept_only(3, "PHIL")]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog[0].courses.is_empty());
    }

    #[test]
    fn course_without_sections_has_empty_list() {
        let catalog = nest_catalog(vec![course_only(1, 10), with_section(1, 11, 110)]);
        assert_eq!(catalog[0].courses.len(), 2);
        assert!(catalog[0].courses[0].sections.is_empty());
        assert_eq!(catalog[0].courses[1].sections.len(), 1);
    }

    #[test]
    fn section_fields_are_carried() {
        let catalog = nest_catalog(vec![with_section(1, 10, 100)]);
        let section = &catalog[0].courses[0].sections[0];
        assert_eq!(section.section_code, "S100");
        assert_eq!(section.capacity, 30);
        assert_eq!(section.remaining_slots, 12);
        assert_eq!(section.instructor_name.as_deref(), Some("Ada Lovelace"));
    }
}
