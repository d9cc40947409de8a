pub mod a001_question;
