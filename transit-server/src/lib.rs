//! Door-to-door bus and walk trip planner.
//!
//! A web service that answers: "I am here at this time - how do I get there
//! by bus and on foot?"

pub mod config;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod spatial;
pub mod web;
