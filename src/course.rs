//! Course record model.
//!
//! A [`Course`] is the unit of storage: it lives in a partitioned key-value
//! table addressed by `(tenant_id, course_id)`. Records are self-contained,
//! written once, and destroyed only through the tenant-wide cleanup path.

use rust_decimal::Decimal;

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Level {
    /// All levels, in ascending difficulty order.
    pub const ALL: [Level; 4] = [
        Level::Beginner,
        Level::Intermediate,
        Level::Advanced,
        Level::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
        }
    }

    /// Parse a stored level label. Unknown labels map to `None` so that
    /// foreign records degrade to the "unspecified" bucket instead of failing.
    pub fn parse(s: &str) -> Option<Level> {
        match s {
            "Beginner" => Some(Level::Beginner),
            "Intermediate" => Some(Level::Intermediate),
            "Advanced" => Some(Level::Advanced),
            "Expert" => Some(Level::Expert),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered coarse/fine category labels, e.g. ("Programming", "Python").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPair {
    pub coarse: String,
    pub fine: String,
}

impl CategoryPair {
    pub fn new(coarse: impl Into<String>, fine: impl Into<String>) -> Self {
        Self {
            coarse: coarse.into(),
            fine: fine.into(),
        }
    }

    /// Render as a JSON array-of-strings literal, the form the CSV export
    /// uses for the category column.
    pub fn to_json_literal(&self) -> String {
        serde_json::json!([self.coarse, self.fine]).to_string()
    }
}

/// The addressable key of a course record. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseKey {
    /// Partition key, fixed per run.
    pub tenant_id: String,
    /// Sort key, a random UUID unique within the tenant.
    pub course_id: String,
}

/// A single course record.
///
/// `categories` and `level` are optional on the read side: a tenant partition
/// may contain records written by other tools that never set them. `price`,
/// `original_price`, and `rating` are exact decimals end to end; binary floats
/// never enter the write path.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub tenant_id: String,
    pub course_id: String,
    pub name: String,
    pub description: String,
    pub instructor: String,
    /// Sale price, integer-valued, never above `original_price`.
    pub price: Decimal,
    /// List price the sale price was derived from.
    pub original_price: Option<Decimal>,
    /// Rating in [3.5, 5.0] with exactly one fractional digit.
    pub rating: Decimal,
    pub students: u32,
    pub duration: String,
    pub image_url: String,
    pub categories: Option<CategoryPair>,
    pub level: Option<Level>,
}

impl Course {
    pub fn key(&self) -> CourseKey {
        CourseKey {
            tenant_id: self.tenant_id.clone(),
            course_id: self.course_id.clone(),
        }
    }
}
