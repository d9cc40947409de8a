pub mod question_api;
