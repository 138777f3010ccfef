// Ranking: top-k candidates per job, top-k jobs per resume.

pub mod handlers;
pub mod service;
