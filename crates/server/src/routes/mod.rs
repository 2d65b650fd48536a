pub mod admin;
pub mod ai;
pub mod auth;
pub mod chat;
pub mod cron;
pub mod health;
pub mod team_members;
pub mod unsubscribe;
pub mod user;
