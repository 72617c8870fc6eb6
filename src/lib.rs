//! Survey Debrief - Post-survey follow-up interviews
//!
//! After a participant answers a survey question, this service opens a short
//! chat in which an LLM interviewer asks why they answered the way they did.
//! Each turn streams back to the browser, is logged per session, and the
//! finished transcript is archived before a completion code is handed out.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
