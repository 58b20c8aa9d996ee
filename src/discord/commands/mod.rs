pub mod create_announcement;
