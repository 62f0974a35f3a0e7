use crate::types::Category;

/// Collector names, as they appear in logs and `/api/health`
pub const DEVPOST_COLLECTOR: &str = "devpost";
pub const INDEED_COLLECTOR: &str = "indeed";
pub const KAGGLE_COLLECTOR: &str = "kaggle";
pub const COURSERA_COLLECTOR: &str = "coursera";

pub const DEVPOST_LISTING_URL: &str = "https://devpost.com/hackathons";
pub const INDEED_LISTING_URL: &str = "https://www.indeed.com/jobs?q=software+developer&l=remote";
pub const KAGGLE_LISTING_URL: &str = "https://www.kaggle.com/competitions";
pub const COURSERA_LISTING_URL: &str = "https://www.coursera.org/courses?query=free";

/// Sources seeded for a user on their first collection run, one per category
pub const DEFAULT_SOURCES: [(&str, &str, Category); 4] = [
    ("Devpost Hackathons", DEVPOST_LISTING_URL, Category::Hackathon),
    ("Indeed Jobs", INDEED_LISTING_URL, Category::Job),
    ("Kaggle Competitions", KAGGLE_LISTING_URL, Category::Competition),
    ("Coursera Free Courses", COURSERA_LISTING_URL, Category::Certification),
];
