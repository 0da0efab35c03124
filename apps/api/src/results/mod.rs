// Result storage and answer collection.
// Answers arrive either as one batch (`POST /results`) or one question at a
// time through a session; both paths end in `store_scored_result`.

pub mod handlers;
pub mod repository;
pub mod service;
pub mod sessions;
