//! Synthetic course generator.
//!
//! Produces schema-valid records with randomized fields drawn from fixed
//! pools. Generation is infallible and parameterized over the RNG, so tests
//! can seed a `StdRng` and get reproducible output.

use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::course::{CategoryPair, Course, Level};

const COURSE_NAMES: &[&str] = &[
    "Introduction to Python",
    "Advanced JavaScript",
    "React from Scratch",
    "Complete Node.js",
    "Machine Learning Basics",
    "Data Science with Python",
    "AWS Cloud Practitioner",
    "Docker and Kubernetes",
    "Full Stack Web Development",
    "Angular Fundamentals",
    "Vue.js Masterclass",
    "Essential TypeScript",
    "Advanced MongoDB",
    "Complete PostgreSQL",
    "Cybersecurity Fundamentals",
    "Ethical Hacking",
    "DevOps with Jenkins",
    "Git and GitHub",
    "Algorithms and Data Structures",
    "Object-Oriented Programming",
    "Microservices with Spring Boot",
    "Flutter Development",
    "React Native",
    "Unity Game Development",
    "Rust Programming",
    "Golang Programming",
    "Swift iOS Development",
    "Kotlin Android",
    "Blockchain Development",
    "UI/UX Design",
    "Digital Marketing",
    "SQL for Beginners",
    "Excel for Analysts",
    "Project Management",
    "Agile Scrum",
    "Leadership Skills",
];

const VARIATIONS: &[&str] = &[
    "Complete",
    "Advanced",
    "From Scratch",
    "Masterclass",
    "Hands-On",
    "2024",
];

const INSTRUCTORS: &[&str] = &[
    "Dr. Maria Gonzalez",
    "Prof. Carlos Rodriguez",
    "Ana Martinez",
    "Pedro Lopez",
    "Dr. Laura Fernandez",
    "Miguel Torres",
    "Prof. Carmen Ruiz",
    "Dr. Jose Garcia",
    "Isabel Moreno",
    "Roberto Jimenez",
    "Dr. Patricia Herrera",
    "Prof. Antonio Silva",
    "Lucia Vargas",
    "Dr. Fernando Castro",
    "Monica Ortega",
    "Prof. Diego Ramirez",
    "Dr. Cristina Mendoza",
    "Alejandro Pena",
    "Beatriz Aguilar",
    "Prof. Raul Vega",
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Programming", "Python"),
    ("Programming", "JavaScript"),
    ("Web Development", "Frontend"),
    ("Web Development", "Backend"),
    ("Web Development", "Full Stack"),
    ("Data Science", "Machine Learning"),
    ("Data Science", "Analytics"),
    ("Cloud Computing", "AWS"),
    ("Cloud Computing", "Azure"),
    ("DevOps", "Docker"),
    ("DevOps", "Kubernetes"),
    ("Databases", "SQL"),
    ("Databases", "NoSQL"),
    ("Security", "Cybersecurity"),
    ("Security", "Ethical Hacking"),
    ("Mobile", "Android"),
    ("Mobile", "iOS"),
    ("Mobile", "React Native"),
    ("Mobile", "Flutter"),
    ("Design", "UI/UX"),
    ("Design", "Graphics"),
    ("Marketing", "Digital"),
    ("Marketing", "SEO"),
    ("Business", "Management"),
    ("Business", "Leadership"),
    ("Blockchain", "Cryptocurrency"),
    ("Blockchain", "Web3"),
    ("Games", "Unity"),
    ("Games", "Unreal Engine"),
];

const DURATIONS: &[&str] = &[
    "2 hours", "4 hours", "6 hours", "8 hours", "10 hours", "12 hours", "15 hours", "20 hours",
    "25 hours", "30 hours", "40 hours", "50 hours",
];

/// Generates randomized but schema-valid course records for one tenant.
pub struct CourseGenerator {
    tenant_id: String,
}

impl CourseGenerator {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
        }
    }

    /// Generate one course. Cannot fail.
    ///
    /// Invariants: `20 <= price <= original_price <= 200` (the list price is
    /// drawn first, the sale price is bounded by it), and the rating is a
    /// one-fractional-digit decimal in [3.5, 5.0].
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Course {
        let base = COURSE_NAMES[rng.gen_range(0..COURSE_NAMES.len())];
        let variation = VARIATIONS[rng.gen_range(0..VARIATIONS.len())];
        let name = format!("{base} - {variation}");

        let description = format!(
            "Learn {} in a practical, effective way. This course takes you \
             from the fundamentals to advanced techniques, with real projects \
             and exercises to consolidate what you learn.",
            base.to_lowercase()
        );

        let original_price = rng.gen_range(50..=200i64);
        let price = rng.gen_range(20..=original_price);

        // Rating as an integer in [35, 50] scaled down once, so the decimal
        // always has exactly one fractional digit.
        let rating = Decimal::new(rng.gen_range(35..=50), 1);

        let (coarse, fine) = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let level = Level::ALL[rng.gen_range(0..Level::ALL.len())];

        let image_id = random_uuid(rng).simple().to_string();

        Course {
            tenant_id: self.tenant_id.clone(),
            course_id: random_uuid(rng).to_string(),
            name,
            description,
            instructor: INSTRUCTORS[rng.gen_range(0..INSTRUCTORS.len())].to_string(),
            price: Decimal::from(price),
            original_price: Some(Decimal::from(original_price)),
            rating,
            students: rng.gen_range(100..=50_000),
            duration: DURATIONS[rng.gen_range(0..DURATIONS.len())].to_string(),
            image_url: format!("https://example.com/images/course_{}.jpg", &image_id[..8]),
            categories: Some(CategoryPair::new(coarse, fine)),
            level: Some(level),
        }
    }
}

/// Generate a UUID v4 from the provided RNG.
fn random_uuid<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}
