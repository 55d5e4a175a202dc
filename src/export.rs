//! CSV audit export for successfully inserted records.
//!
//! One row per record, fixed column order, numerics rendered as decimal
//! text, the category pair as a JSON array literal. Missing optional fields
//! become empty cells. Export failures never affect store state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;

use crate::course::Course;

/// Column order of the audit file.
pub const COLUMNS: [&str; 13] = [
    "tenant_id",
    "course_id",
    "name",
    "description",
    "instructor",
    "price",
    "original_price",
    "rating",
    "students",
    "duration",
    "image_url",
    "categories",
    "level",
];

/// Write `courses_<timestamp>.csv` under `output_dir` (created if absent).
/// Returns the path of the written file.
pub fn write_csv(courses: &[Course], output_dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {output_dir:?}"))?;

    let filename = format!("courses_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    let path = output_dir.join(filename);

    let file = fs::File::create(&path).with_context(|| format!("cannot create {path:?}"))?;
    write_csv_to(courses, file).with_context(|| format!("cannot write {path:?}"))?;

    Ok(path)
}

/// Write the audit rows to any writer.
pub fn write_csv_to<W: io::Write>(courses: &[Course], writer: W) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;

    for course in courses {
        csv_writer.write_record([
            course.tenant_id.clone(),
            course.course_id.clone(),
            course.name.clone(),
            course.description.clone(),
            course.instructor.clone(),
            course.price.to_string(),
            course
                .original_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            course.rating.to_string(),
            course.students.to_string(),
            course.duration.clone(),
            course.image_url.clone(),
            course
                .categories
                .as_ref()
                .map(|pair| pair.to_json_literal())
                .unwrap_or_default(),
            course
                .level
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::CourseGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render(courses: &[Course]) -> String {
        let mut buf = Vec::new();
        write_csv_to(courses, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_matches_column_order() {
        let text = render(&[]);
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    fn parse_row(text: &str) -> Vec<String> {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        record.iter().map(str::to_string).collect()
    }

    #[test]
    fn test_row_rendering() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let course = generator.generate(&mut rng);

        let row = parse_row(&render(std::slice::from_ref(&course)));
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "TENANT_A");
        assert_eq!(row[1], course.course_id);
        // Decimal text, not float renderings like 4.0999999.
        assert_eq!(row[5], course.price.to_string());
        assert_eq!(row[7], course.rating.to_string());
        // Category pair as a JSON array literal.
        let pair = course.categories.as_ref().unwrap();
        assert_eq!(row[11], pair.to_json_literal());
        assert_eq!(row[12], course.level.unwrap().as_str());
    }

    #[test]
    fn test_missing_optionals_render_empty() {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let mut course = generator.generate(&mut rng);
        course.categories = None;
        course.level = None;
        course.original_price = None;

        let row = parse_row(&render(&[course]));
        assert_eq!(row[6], "", "original_price cell must be empty");
        assert_eq!(row[11], "", "categories cell must be empty");
        assert_eq!(row[12], "", "level cell must be empty");
    }

    #[test]
    fn test_write_csv_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("audit").join("output");

        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        let courses = vec![generator.generate(&mut rng)];

        let path = write_csv(&courses, &nested).unwrap();
        assert!(path.exists());
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("courses_"));
    }
}
