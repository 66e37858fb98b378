use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub author: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub review_id: i64,
    pub reviewer_id: i64,
    pub book_id: i64,
    pub rating: f64,
    pub created_at: Option<NaiveDateTime>,
}
