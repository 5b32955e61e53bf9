pub mod question;
pub mod video_case;
