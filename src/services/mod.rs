pub mod transition;
pub mod vote_service;
