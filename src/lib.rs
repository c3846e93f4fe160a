//! reqbump - dependency-update bot library
//!
//! This library provides the pieces of a bot that keeps Python requirements
//! of GitHub repositories current:
//! - Requirement parsing and PEP 440 update decisions
//! - Manifest extraction and rewriting (requirements.txt, requirements.lock,
//!   setup.py, Pipfile)
//! - PyPI lookups and GitHub content access
//! - Operator review and pull-request publication

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod host;
pub mod http;
pub mod imports;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod publish;
pub mod registry;
pub mod review;
pub mod update;
pub mod verify;
