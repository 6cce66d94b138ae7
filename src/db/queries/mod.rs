pub mod quizzes;
pub mod users;
