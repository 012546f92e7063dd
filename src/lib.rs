//! `anafit` library crate.
//!
//! Analyses share one contract: [`analysis::Analysis`] turns coordinates and
//! data into an [`domain::AnalysisResult`] of named parameters. Curve fits
//! ([`fit::Fit`]) implement the same contract and additionally keep their
//! model, so results can be evaluated on new coordinates.
//!
//! The binary (`anafit`) is a thin wrapper around [`app::run`].

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
